use serde::Serialize;

use crate::error::ReconError;
use crate::table::Table;

/// Clean an order confirmation number before it is used as a locator.
///
/// Commas become spaces, trailing hyphens are dropped, and anything other
/// than ASCII letters, digits and hyphens is removed. Returns `None` when
/// nothing is left.
pub fn clean_confirmation(raw: &str) -> Option<String> {
    let text = raw.trim().replace(',', " ");
    let text = text.trim_end_matches('-');
    let kept: String = text
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    let collapsed = kept.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Letters, digits and hyphens only, at least one character.
pub fn is_valid_confirmation(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[derive(Debug, Clone, Serialize)]
pub struct CleanedOrders {
    #[serde(skip)]
    pub table: Table,
    pub input_rows: usize,
    /// Rows removed because the confirmation cleaned down to nothing.
    pub dropped_rows: usize,
    /// Row indices (in the cleaned table) that still fail validation.
    pub invalid_rows: Vec<usize>,
}

/// Rewrite `column` with cleaned confirmations and drop rows left empty.
pub fn clean_orders(table: &Table, column: &str) -> Result<CleanedOrders, ReconError> {
    let idx = table.require_column(column)?;
    let mut cleaned = Table::new(table.name.clone(), table.columns.clone());

    for row in &table.rows {
        let raw = row.get(idx).map(String::as_str).unwrap_or("");
        if let Some(value) = clean_confirmation(raw) {
            let mut row = row.clone();
            row[idx] = value;
            cleaned.push_row(row);
        }
    }

    let invalid_rows: Vec<usize> = cleaned
        .rows
        .iter()
        .enumerate()
        .filter(|(_, r)| !is_valid_confirmation(&r[idx]))
        .map(|(i, _)| i)
        .collect();

    let dropped_rows = table.len() - cleaned.len();
    if dropped_rows > 0 {
        log::info!("{}: dropped {dropped_rows} rows with empty confirmation", table.name);
    }
    if !invalid_rows.is_empty() {
        log::warn!(
            "{}: {} confirmations with unexpected characters",
            table.name,
            invalid_rows.len()
        );
    }

    Ok(CleanedOrders {
        table: cleaned,
        input_rows: table.len(),
        dropped_rows,
        invalid_rows,
    })
}
