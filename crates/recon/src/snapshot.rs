use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::coerce::{parse_amount, parse_excelish_date};
use crate::error::ReconError;
use crate::table::{Cell, OutputTable, Table};

/// Sheet name of the aggregated snapshot.
pub const SNAPSHOT_SHEET: &str = "booking_locator_agg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotColumns {
    pub locator: String,
    pub gross_amount: String,
    pub commission: String,
    pub currency: String,
    pub sale_date: String,
    pub service_date: String,
}

impl Default for SnapshotColumns {
    fn default() -> Self {
        Self {
            locator: "BookingLocator".into(),
            gross_amount: "GrossAmountUSD".into(),
            commission: "CommissionWithoutTaxUSD".into(),
            currency: "Currency".into(),
            sale_date: "SaleDate".into(),
            service_date: "ServiceDate".into(),
        }
    }
}

/// One aggregated booking locator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocatorSnapshot {
    pub locator: String,
    pub commission: Decimal,
    pub gross_amount: Decimal,
    pub rows: usize,
    /// Most frequent currency; ties go to the alphabetically first.
    pub currency: Option<String>,
    pub sale_date_min: Option<NaiveDate>,
    pub sale_date_max: Option<NaiveDate>,
}

#[derive(Default)]
struct Acc {
    commission: Decimal,
    gross_amount: Decimal,
    rows: usize,
    currencies: HashMap<String, usize>,
    sale_date_min: Option<NaiveDate>,
    sale_date_max: Option<NaiveDate>,
}

/// Roll a commission snapshot up to one row per booking locator.
///
/// Every configured column must exist, including the service date which is
/// validated but not reported. Rows whose locator is empty or `nan` are
/// excluded; unreadable amounts and dates are skipped.
pub fn aggregate_snapshot(
    table: &Table,
    columns: &SnapshotColumns,
) -> Result<Vec<LocatorSnapshot>, ReconError> {
    let mut table = table.clone();
    table.drop_unnamed_columns();

    let locator_idx = table.require_column(&columns.locator)?;
    let gross_idx = table.require_column(&columns.gross_amount)?;
    let commission_idx = table.require_column(&columns.commission)?;
    let currency_idx = table.require_column(&columns.currency)?;
    let sale_idx = table.require_column(&columns.sale_date)?;
    table.require_column(&columns.service_date)?;

    let mut groups: BTreeMap<String, Acc> = BTreeMap::new();

    for i in 0..table.len() {
        let locator = table.cell(i, locator_idx).trim();
        if locator.is_empty() || locator.eq_ignore_ascii_case("nan") {
            continue;
        }
        let acc = groups.entry(locator.to_string()).or_default();
        acc.rows += 1;
        if let Some(v) = parse_amount(table.cell(i, commission_idx)) {
            acc.commission += v;
        }
        if let Some(v) = parse_amount(table.cell(i, gross_idx)) {
            acc.gross_amount += v;
        }
        let currency = table.cell(i, currency_idx).trim();
        if !currency.is_empty() {
            *acc.currencies.entry(currency.to_string()).or_default() += 1;
        }
        if let Some(d) = parse_excelish_date(table.cell(i, sale_idx)) {
            acc.sale_date_min = Some(acc.sale_date_min.map_or(d, |m| m.min(d)));
            acc.sale_date_max = Some(acc.sale_date_max.map_or(d, |m| m.max(d)));
        }
    }

    let snapshots: Vec<LocatorSnapshot> = groups
        .into_iter()
        .map(|(locator, acc)| LocatorSnapshot {
            locator,
            commission: acc.commission,
            gross_amount: acc.gross_amount,
            rows: acc.rows,
            currency: mode(&acc.currencies),
            sale_date_min: acc.sale_date_min,
            sale_date_max: acc.sale_date_max,
        })
        .collect();

    log::info!("{}: {} unique locators", table.name, snapshots.len());
    Ok(snapshots)
}

fn mode(counts: &HashMap<String, usize>) -> Option<String> {
    counts
        .iter()
        .max_by(|(a, ca), (b, cb)| ca.cmp(cb).then_with(|| b.cmp(a)))
        .map(|(c, _)| c.clone())
}

pub fn snapshot_table(snapshots: &[LocatorSnapshot], columns: &SnapshotColumns) -> OutputTable {
    let mut out = OutputTable::new(
        SNAPSHOT_SHEET,
        vec![
            columns.locator.clone(),
            columns.commission.clone(),
            columns.gross_amount.clone(),
            "Rows".into(),
            columns.currency.clone(),
            "SaleDateMin".into(),
            "SaleDateMax".into(),
        ],
    );
    let date = |d: Option<NaiveDate>| d.map(|d| Cell::text(d.to_string())).unwrap_or(Cell::Empty);
    for s in snapshots {
        out.rows.push(vec![
            Cell::text(s.locator.as_str()),
            Cell::Number(s.commission),
            Cell::Number(s.gross_amount),
            Cell::Count(s.rows),
            s.currency.as_deref().map(Cell::text).unwrap_or(Cell::Empty),
            date(s.sale_date_min),
            date(s.sale_date_max),
        ]);
    }
    out
}
