//! Input preparation commands: `consolidate`, `snapshot`, `clean-orders`.
//!
//! Each reads one CSV or workbook sheet, transforms it with the engine, and
//! writes the result with the same xlsx / CSV-directory rules as `run`.

use std::path::{Path, PathBuf};

use commrec_recon::cleaning::clean_orders;
use commrec_recon::consolidate::{consolidate_commissions, ConsolidateColumns};
use commrec_recon::snapshot::{aggregate_snapshot, snapshot_table, SnapshotColumns};
use commrec_recon::{OutputTable, Table};
use serde::Serialize;

use crate::exit_codes::EXIT_ERROR;
use crate::CliError;

pub const CONSOLIDATED_SHEET: &str = "consolidated";
pub const CLEANED_SHEET: &str = "orders";

fn load(input: &Path, sheet: Option<&str>, name: &str) -> Result<Table, CliError> {
    Ok(commrec_io::load_table(input, sheet, name)?)
}

fn write(tables: &[OutputTable], output: &Path) -> Result<(), CliError> {
    for path in commrec_io::write_tables(tables, output)? {
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn json_error(e: serde_json::Error) -> CliError {
    CliError {
        code: EXIT_ERROR,
        message: format!("JSON serialization error: {e}"),
        hint: None,
    }
}

/// Pretty JSON to stdout. Shared by every `--json` flag.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let json_str = serde_json::to_string_pretty(value).map_err(json_error)?;
    println!("{json_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// consolidate
// ---------------------------------------------------------------------------

pub struct ConsolidateArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub sheet: Option<String>,
    pub columns: ConsolidateColumns,
    pub json: bool,
}

pub fn cmd_consolidate(args: ConsolidateArgs) -> Result<(), CliError> {
    let table = load(&args.input, args.sheet.as_deref(), "commission_exports")?;
    let consolidation = consolidate_commissions(&table, &args.columns)?;

    write(&[consolidation.to_table(CONSOLIDATED_SHEET, &args.columns)], &args.output)?;

    let r = &consolidation.report;
    eprintln!(
        "{} rows -> {} grouped rows; locators {} -> {}",
        table.len(),
        consolidation.rows.len(),
        r.raw_locators,
        r.grouped_locators,
    );
    eprintln!(
        "{} perfect, {} variances, {} missing after grouping, {} new after grouping",
        r.perfect_matches, r.variances, r.missing_after_group, r.new_after_group,
    );
    if r.preserved() {
        eprintln!("totals preserved");
    } else {
        log::warn!("per-locator totals changed by grouping");
    }

    if args.json {
        print_json(r)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// snapshot
// ---------------------------------------------------------------------------

pub fn cmd_snapshot(
    input: PathBuf,
    output: PathBuf,
    sheet: Option<String>,
    json: bool,
) -> Result<(), CliError> {
    let table = load(&input, sheet.as_deref(), "commission_snapshot")?;
    let columns = SnapshotColumns::default();
    let snapshots = aggregate_snapshot(&table, &columns)?;

    write(&[snapshot_table(&snapshots, &columns)], &output)?;
    eprintln!("{} rows -> {} booking locators", table.len(), snapshots.len());

    if json {
        print_json(&snapshots)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// clean-orders
// ---------------------------------------------------------------------------

pub fn cmd_clean_orders(
    input: PathBuf,
    column: String,
    output: PathBuf,
    sheet: Option<String>,
    json: bool,
) -> Result<(), CliError> {
    let table = load(&input, sheet.as_deref(), "orders")?;
    let cleaned = clean_orders(&table, &column)?;

    let mut out = OutputTable::from(&cleaned.table);
    out.name = CLEANED_SHEET.to_string();
    write(&[out], &output)?;

    eprintln!(
        "{} rows in, {} dropped, {} with unexpected characters",
        cleaned.input_rows,
        cleaned.dropped_rows,
        cleaned.invalid_rows.len(),
    );

    if json {
        print_json(&cleaned)?;
    }
    Ok(())
}
