use std::fmt::Write as _;

use crate::engine::ReconOutcome;
use crate::model::{Category, JoinedRecord, ProviderSummaryRow, SummaryRow, Totals};
use crate::table::{Cell, OutputTable, Table};

pub const SUMMARY_SHEET: &str = "summary";
pub const PROVIDER_SUMMARY_SHEET: &str = "provider_summary";

const EXPECTED: &str = "ExpectedCommissionUSD";
const BILLED: &str = "BilledCommissionUSD";
const GAP: &str = "CommissionGapUSD";

/// Leading columns of every partition table.
const JOINED_COLUMNS: [&str; 6] = ["key", "Provider", EXPECTED, BILLED, GAP, "Presence"];

impl ReconOutcome {
    /// The six result tables in workbook order: four partitions, summary,
    /// provider summary.
    pub fn tables(&self) -> Vec<OutputTable> {
        let mut tables: Vec<OutputTable> = Category::ALL
            .iter()
            .map(|c| {
                partition_table(
                    c.table_name(),
                    self.partitions.get(*c),
                    &self.orders,
                    &self.commissions,
                )
            })
            .collect();
        tables.push(summary_table(&self.summary));
        tables.push(provider_summary_table(&self.provider_summary));
        tables
    }
}

/// Joined fields first, then every original order column and every original
/// commission column. Names present on both sides, or equal to a joined field
/// ignoring case, get `_order` / `_commission` suffixes.
pub fn partition_table(
    name: &str,
    records: &[JoinedRecord],
    orders: &Table,
    commissions: &Table,
) -> OutputTable {
    let mut columns: Vec<String> = JOINED_COLUMNS.iter().map(|c| c.to_string()).collect();
    columns.extend(side_headers(orders, commissions, "_order"));
    columns.extend(side_headers(commissions, orders, "_commission"));

    let mut out = OutputTable::new(name, columns);
    for r in records {
        let mut row = vec![
            Cell::text(r.key.as_str()),
            Cell::text(r.provider.as_str()),
            Cell::Number(r.expected_commission),
            Cell::Number(r.billed_commission),
            Cell::Number(r.commission_gap),
            Cell::text(r.presence.to_string()),
        ];
        row.extend(source_cells(orders, r.order_row));
        row.extend(source_cells(commissions, r.commission_row));
        out.rows.push(row);
    }
    out
}

fn side_headers<'a>(
    table: &'a Table,
    other: &'a Table,
    suffix: &'a str,
) -> impl Iterator<Item = String> + 'a {
    table.columns.iter().map(move |c| {
        let joined = JOINED_COLUMNS.iter().any(|j| j.eq_ignore_ascii_case(c));
        if joined || other.column_index(c).is_some() {
            format!("{c}{suffix}")
        } else {
            c.clone()
        }
    })
}

fn source_cells(table: &Table, row: Option<usize>) -> Vec<Cell> {
    match row.and_then(|i| table.rows.get(i)) {
        Some(values) => values.iter().map(|v| Cell::text(v.as_str())).collect(),
        None => vec![Cell::Empty; table.columns.len()],
    }
}

fn totals_cells(t: &Totals) -> [Cell; 4] {
    [
        Cell::Count(t.records),
        Cell::Number(t.expected_commission),
        Cell::Number(t.billed_commission),
        Cell::Number(t.commission_gap),
    ]
}

pub fn summary_table(rows: &[SummaryRow]) -> OutputTable {
    let columns = ["Category", "Records", EXPECTED, BILLED, GAP]
        .iter()
        .map(|c| c.to_string())
        .collect();
    let mut out = OutputTable::new(SUMMARY_SHEET, columns);
    for r in rows {
        let mut row = vec![Cell::text(r.category.label())];
        row.extend(totals_cells(&r.totals));
        out.rows.push(row);
    }
    out
}

pub fn provider_summary_table(rows: &[ProviderSummaryRow]) -> OutputTable {
    let columns = ["Category", "Provider", "Records", EXPECTED, BILLED, GAP]
        .iter()
        .map(|c| c.to_string())
        .collect();
    let mut out = OutputTable::new(PROVIDER_SUMMARY_SHEET, columns);
    for r in rows {
        let mut row = vec![Cell::text(r.category.label()), Cell::text(r.provider.as_str())];
        row.extend(totals_cells(&r.totals));
        out.rows.push(row);
    }
    out
}

/// Fixed-width text rendering of a table, for terminal output.
pub fn render_text(table: &OutputTable) -> String {
    let cells: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|r| r.iter().map(Cell::to_display).collect())
        .collect();
    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, h)| {
            cells
                .iter()
                .filter_map(|r| r.get(i))
                .map(|v| v.chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_line(&mut out, &table.columns, &widths);
    for r in &cells {
        push_line(&mut out, r, &widths);
    }
    out
}

fn push_line(out: &mut String, values: &[String], widths: &[usize]) {
    let parts: Vec<String> = values
        .iter()
        .zip(widths)
        .map(|(v, w)| format!("{v:>w$}", w = *w))
        .collect();
    let _ = writeln!(out, "{}", parts.join("  "));
}
