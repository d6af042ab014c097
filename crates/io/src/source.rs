// Format dispatch: pick the CSV or workbook reader/writer by file extension

use std::path::{Path, PathBuf};

use commrec_recon::{InputLocation, OutputTable, ReconError, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Workbook,
}

impl FileKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" | "tsv" | "txt" => Some(Self::Csv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Some(Self::Workbook),
            _ => None,
        }
    }
}

/// Load a table from a CSV file or a workbook sheet.
pub fn load_table(path: &Path, sheet: Option<&str>, name: &str) -> Result<Table, ReconError> {
    match FileKind::from_path(path) {
        Some(FileKind::Csv) => {
            if let Some(sheet) = sheet {
                log::debug!("ignoring sheet '{}' for CSV input {}", sheet, path.display());
            }
            crate::csv::read_table(path, name)
        }
        Some(FileKind::Workbook) => crate::xlsx::read_sheet(path, sheet, name),
        None => Err(ReconError::Io(format!(
            "unsupported input format: {} (expected .csv, .xlsx, .xls or .ods)",
            path.display()
        ))),
    }
}

/// Load one side of a reconciliation; relative paths resolve against `base`.
pub fn load_location(base: &Path, location: &InputLocation, name: &str) -> Result<Table, ReconError> {
    let path = base.join(&location.file);
    load_table(&path, location.sheet.as_deref(), name)
}

/// Write result tables. A `.xlsx` path gets one workbook; any other path is
/// treated as a directory receiving one `<table>.csv` per table.
/// Returns the files written.
pub fn write_tables(tables: &[OutputTable], path: &Path) -> Result<Vec<PathBuf>, ReconError> {
    let is_xlsx = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));

    if is_xlsx {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir(parent)?;
        }
        crate::xlsx::write_workbook(tables, path)?;
        return Ok(vec![path.to_path_buf()]);
    }

    create_dir(path)?;
    let mut written = Vec::with_capacity(tables.len());
    for table in tables {
        let file = path.join(format!("{}.csv", table.name));
        crate::csv::write_table(table, &file)?;
        written.push(file);
    }
    Ok(written)
}

fn create_dir(dir: &Path) -> Result<(), ReconError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| ReconError::Io(format!("cannot create {}: {e}", dir.display())))
}
