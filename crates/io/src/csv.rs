// CSV/TSV import/export for reconciliation tables

use std::io::Read;
use std::path::Path;

use commrec_recon::{OutputTable, ReconError, Table};

/// Read a delimited file into a table. The first record is the header row.
pub fn read_table(path: &Path, name: &str) -> Result<Table, ReconError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    parse_table(&content, delimiter, name)
        .map_err(|e| ReconError::Io(format!("{}: {e}", path.display())))
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Lines agreeing with the header width, weighted by that width
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, ReconError> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| ReconError::Io(format!("cannot open {}: {e}", path.display())))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| ReconError::Io(format!("cannot read {}: {e}", path.display())))?;

    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            // Excel-exported CSVs are usually Windows-1252
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };
    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

fn parse_table(content: &str, delimiter: u8, name: &str) -> Result<Table, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let columns: Vec<String> = match records.next() {
        Some(header) => header?.iter().map(|h| h.to_string()).collect(),
        None => return Ok(Table::new(name, Vec::new())),
    };

    let mut table = Table::new(name, columns);
    for record in records {
        let record = record?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        table.push_row(record.iter().map(|f| f.to_string()).collect());
    }
    Ok(table)
}

/// Write a result table as comma-separated text with a header row.
pub fn write_table(table: &OutputTable, path: &Path) -> Result<(), ReconError> {
    let io_err = |e: csv::Error| ReconError::Io(format!("{}: {e}", path.display()));
    let mut writer = csv::WriterBuilder::new().from_path(path).map_err(io_err)?;

    writer.write_record(&table.columns).map_err(io_err)?;
    for row in &table.rows {
        let record: Vec<String> = row.iter().map(|c| c.to_display()).collect();
        writer.write_record(&record).map_err(io_err)?;
    }

    writer
        .flush()
        .map_err(|e| ReconError::Io(format!("{}: {e}", path.display())))?;
    Ok(())
}
