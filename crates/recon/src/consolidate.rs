use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::coerce::amount_or_zero;
use crate::error::ReconError;
use crate::table::{Cell, OutputTable, Table};

/// Column names for the commission export being consolidated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolidateColumns {
    pub provider: String,
    pub locator: String,
    pub value: String,
}

impl Default for ConsolidateColumns {
    fn default() -> Self {
        Self {
            provider: "Provider".into(),
            locator: "BookingLocator".into(),
            value: "BilledCommissionUSD".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsolidatedRow {
    pub provider: String,
    pub locator: String,
    pub value: Decimal,
}

/// Per-locator comparison of totals before and after grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsolidationReport {
    pub raw_locators: usize,
    pub grouped_locators: usize,
    pub perfect_matches: usize,
    /// Locators whose totals differ by more than 0.01.
    pub variances: usize,
    pub missing_after_group: usize,
    pub new_after_group: usize,
    /// Non-empty value cells that were read as 0.
    pub coerced_values: usize,
}

impl ConsolidationReport {
    pub fn preserved(&self) -> bool {
        self.variances == 0 && self.missing_after_group == 0 && self.new_after_group == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Consolidation {
    pub rows: Vec<ConsolidatedRow>,
    pub report: ConsolidationReport,
}

/// Collapse duplicate (provider, locator) rows into one summed row.
///
/// Rows with an empty provider or locator cannot be grouped and are left
/// out; the report surfaces the effect on per-locator totals.
pub fn consolidate_commissions(
    table: &Table,
    columns: &ConsolidateColumns,
) -> Result<Consolidation, ReconError> {
    let provider_idx = table.require_column(&columns.provider)?;
    let locator_idx = table.require_column(&columns.locator)?;
    let value_idx = table.require_column(&columns.value)?;

    let mut grouped: BTreeMap<(String, String), Decimal> = BTreeMap::new();
    let mut raw_totals: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut coerced_values = 0;

    for i in 0..table.len() {
        let provider = table.cell(i, provider_idx).trim();
        let locator = table.cell(i, locator_idx).trim();
        let (value, coerced) = amount_or_zero(table.cell(i, value_idx));
        if coerced {
            coerced_values += 1;
        }

        if !locator.is_empty() {
            *raw_totals.entry(locator.to_string()).or_default() += value;
        }
        if !provider.is_empty() && !locator.is_empty() {
            *grouped
                .entry((provider.to_string(), locator.to_string()))
                .or_default() += value;
        }
    }

    let rows: Vec<ConsolidatedRow> = grouped
        .into_iter()
        .map(|((provider, locator), value)| ConsolidatedRow {
            provider,
            locator,
            value,
        })
        .collect();

    let mut grouped_totals: BTreeMap<&str, Decimal> = BTreeMap::new();
    for r in &rows {
        *grouped_totals.entry(r.locator.as_str()).or_default() += r.value;
    }

    let threshold = Decimal::new(1, 2);
    let mut report = ConsolidationReport {
        raw_locators: raw_totals.len(),
        grouped_locators: grouped_totals.len(),
        coerced_values,
        ..Default::default()
    };
    for (locator, raw) in &raw_totals {
        match grouped_totals.get(locator.as_str()) {
            Some(after) if (*raw - *after).round_dp(2).abs() > threshold => report.variances += 1,
            Some(_) => report.perfect_matches += 1,
            None => report.missing_after_group += 1,
        }
    }
    report.new_after_group = grouped_totals
        .keys()
        .filter(|l| !raw_totals.contains_key(**l))
        .count();

    log::info!(
        "{}: {} rows consolidated into {}",
        table.name,
        table.len(),
        rows.len()
    );

    Ok(Consolidation { rows, report })
}

impl Consolidation {
    pub fn to_table(&self, name: &str, columns: &ConsolidateColumns) -> OutputTable {
        let mut out = OutputTable::new(
            name,
            vec![
                columns.provider.clone(),
                columns.locator.clone(),
                columns.value.clone(),
            ],
        );
        for r in &self.rows {
            out.rows.push(vec![
                Cell::text(r.provider.as_str()),
                Cell::text(r.locator.as_str()),
                Cell::Number(r.value),
            ]);
        }
        out
    }
}
