use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::model::UNASSIGNED;
use crate::table::Table;

/// Raw provider name -> canonical provider name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasMap(HashMap<String, String>);

impl AliasMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object of raw name -> canonical name. `origin` names the
    /// source in the error message.
    pub fn from_json(input: &str, origin: impl fmt::Display) -> Result<Self, ReconError> {
        serde_json::from_str(input).map_err(|e| ReconError::ConfigParse(format!("{origin}: {e}")))
    }

    /// Mapped name, or the raw value unchanged when no alias exists.
    pub fn canonical<'a>(&'a self, raw: &'a str) -> &'a str {
        self.0.get(raw).map(String::as_str).unwrap_or(raw)
    }

    /// Alias for a cell as read: the exact text first, then the trimmed text.
    /// Without an alias the trimmed text is returned.
    pub fn canonical_cell<'a>(&'a self, cell: &'a str) -> &'a str {
        let trimmed = cell.trim();
        self.0
            .get(cell)
            .or_else(|| self.0.get(trimmed))
            .map(String::as_str)
            .unwrap_or(trimmed)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for AliasMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Picks a provider per row from an ordered list of candidate columns.
///
/// Candidates are matched against the table headers case-insensitively once,
/// up front; candidates the table lacks are skipped. Per row, the first
/// candidate with a non-empty value wins and is passed through the alias map.
pub struct ProviderResolver<'a> {
    columns: Vec<usize>,
    aliases: &'a AliasMap,
}

impl<'a> ProviderResolver<'a> {
    pub fn new(table: &Table, candidates: &[String], aliases: &'a AliasMap) -> Self {
        let columns = candidates
            .iter()
            .filter_map(|name| table.column_index(name))
            .collect();
        Self { columns, aliases }
    }

    /// Whether any candidate column exists on the table.
    pub fn has_columns(&self) -> bool {
        !self.columns.is_empty()
    }

    /// Canonical provider for a row, or `None` if no candidate has a value.
    pub fn resolve_raw(&self, row: &[String]) -> Option<String> {
        self.columns
            .iter()
            .filter_map(|&i| row.get(i))
            .find(|v| !v.trim().is_empty())
            .map(|v| self.aliases.canonical_cell(v).to_string())
    }

    /// Like [`resolve_raw`](Self::resolve_raw) but never empty.
    pub fn resolve(&self, row: &[String]) -> String {
        self.resolve_raw(row).unwrap_or_else(|| UNASSIGNED.to_string())
    }
}
