use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::classify::Tolerance;
use crate::error::ReconError;
use crate::model::Side;

/// Provider columns tried when the config does not list any.
pub const DEFAULT_PROVIDER_COLS: [&str; 3] = ["provider", "supplier", "operator"];

// ---------------------------------------------------------------------------
// File format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// `.toml` files are TOML, everything else is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

// ---------------------------------------------------------------------------
// Raw (as written on disk)
// ---------------------------------------------------------------------------

/// Every recognized key, all optional so that a missing one surfaces as a
/// `MissingConfigKey` rather than a serde error. Legacy spellings are aliases.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    input_file: Option<String>,
    #[serde(alias = "odv_sheet")]
    orders_sheet: Option<String>,
    #[serde(alias = "com_sheet")]
    commissions_sheet: Option<String>,
    orders_file: Option<String>,
    commissions_file: Option<String>,
    #[serde(alias = "odv_key")]
    orders_key: Option<String>,
    #[serde(alias = "com_key")]
    commissions_key: Option<String>,
    #[serde(alias = "odv_commission_col")]
    orders_commission_col: Option<String>,
    #[serde(alias = "com_commission_col")]
    commissions_commission_col: Option<String>,
    provider_cols: Option<Vec<String>>,
    tolerance: Option<Decimal>,
    provider_map_file: Option<String>,
    output_file: Option<String>,
}

// ---------------------------------------------------------------------------
// Validated config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ReconConfig {
    pub sources: SourceConfig,
    /// Column names below are trimmed and lowercased.
    pub orders_key: String,
    pub commissions_key: String,
    pub orders_commission_col: String,
    pub commissions_commission_col: String,
    /// Candidate provider columns in priority order.
    pub provider_cols: Vec<String>,
    pub tolerance: Tolerance,
    pub provider_map_file: Option<String>,
    pub output_file: Option<String>,
}

/// Where the two input tables come from. Paths are as written in the config;
/// the caller resolves them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceConfig {
    pub input_file: Option<String>,
    pub orders_sheet: Option<String>,
    pub commissions_sheet: Option<String>,
    pub orders_file: Option<String>,
    pub commissions_file: Option<String>,
}

/// File and optional sheet for one side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputLocation {
    pub file: String,
    pub sheet: Option<String>,
}

impl SourceConfig {
    /// A per-side file wins over the shared `input_file`.
    pub fn location(&self, side: Side) -> Result<InputLocation, ReconError> {
        let (own_file, sheet, keys) = match side {
            Side::Orders => (
                &self.orders_file,
                &self.orders_sheet,
                vec!["orders_file", "input_file"],
            ),
            Side::Commissions => (
                &self.commissions_file,
                &self.commissions_sheet,
                vec!["commissions_file", "input_file"],
            ),
        };
        let file = own_file
            .as_ref()
            .or(self.input_file.as_ref())
            .ok_or(ReconError::MissingConfigKey(keys))?;
        Ok(InputLocation {
            file: file.clone(),
            sheet: sheet.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn parse(input: &str, format: ConfigFormat) -> Result<Self, ReconError> {
        match format {
            ConfigFormat::Json => Self::from_json(input),
            ConfigFormat::Toml => Self::from_toml(input),
        }
    }

    pub fn from_json(input: &str) -> Result<Self, ReconError> {
        let raw: RawConfig =
            serde_json::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        Self::from_raw(raw)
    }

    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let raw: RawConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ReconError> {
        let orders_key = required(raw.orders_key, &["orders_key", "odv_key"])?;
        let commissions_key = required(raw.commissions_key, &["commissions_key", "com_key"])?;
        let orders_commission_col = required(
            raw.orders_commission_col,
            &["orders_commission_col", "odv_commission_col"],
        )?;
        let commissions_commission_col = required(
            raw.commissions_commission_col,
            &["commissions_commission_col", "com_commission_col"],
        )?;

        let provider_cols = raw
            .provider_cols
            .unwrap_or_else(|| DEFAULT_PROVIDER_COLS.iter().map(|c| c.to_string()).collect())
            .iter()
            .map(|c| column_name(c))
            .filter(|c| !c.is_empty())
            .collect();

        let tolerance = match raw.tolerance {
            Some(value) => Tolerance::new(value)?,
            None => Tolerance::default(),
        };

        Ok(Self {
            sources: SourceConfig {
                input_file: raw.input_file,
                orders_sheet: raw.orders_sheet,
                commissions_sheet: raw.commissions_sheet,
                orders_file: raw.orders_file,
                commissions_file: raw.commissions_file,
            },
            orders_key,
            commissions_key,
            orders_commission_col,
            commissions_commission_col,
            provider_cols,
            tolerance,
            provider_map_file: raw.provider_map_file,
            output_file: raw.output_file,
        })
    }

    /// Key column and amount column for one side.
    pub fn columns(&self, side: Side) -> (&str, &str) {
        match side {
            Side::Orders => (&self.orders_key, &self.orders_commission_col),
            Side::Commissions => (&self.commissions_key, &self.commissions_commission_col),
        }
    }
}

fn column_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn required(value: Option<String>, keys: &[&'static str]) -> Result<String, ReconError> {
    match value.as_deref().map(column_name) {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(ReconError::MissingConfigKey(keys.to_vec())),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const VALID_JSON: &str = r#"{
        "input_file": "portfolio.xlsx",
        "orders_sheet": "Orders",
        "commissions_sheet": "Commissions",
        "orders_key": " BookingLocator ",
        "commissions_key": "Locator",
        "orders_commission_col": "ExpectedCommission",
        "commissions_commission_col": "BilledCommission",
        "output_file": "reconciliation.xlsx"
    }"#;

    #[test]
    fn parse_valid_json_with_defaults() {
        let config = ReconConfig::from_json(VALID_JSON).unwrap();
        assert_eq!(config.orders_key, "bookinglocator");
        assert_eq!(config.commissions_key, "locator");
        assert_eq!(config.orders_commission_col, "expectedcommission");
        assert_eq!(config.provider_cols, vec!["provider", "supplier", "operator"]);
        assert_eq!(config.tolerance.value(), Decimal::from_str("0.25").unwrap());
        assert_eq!(config.output_file.as_deref(), Some("reconciliation.xlsx"));
        assert!(config.provider_map_file.is_none());
    }

    #[test]
    fn legacy_key_spellings_accepted() {
        let input = r#"{
            "input_file": "in.xlsx",
            "odv_sheet": "ODV",
            "com_sheet": "COM",
            "odv_key": "Confirmation",
            "com_key": "Locator",
            "odv_commission_col": "Expected",
            "com_commission_col": "Billed",
            "provider_cols": ["Operator", " Provider "],
            "tolerance": 1.5
        }"#;
        let config = ReconConfig::from_json(input).unwrap();
        assert_eq!(config.sources.orders_sheet.as_deref(), Some("ODV"));
        assert_eq!(config.sources.commissions_sheet.as_deref(), Some("COM"));
        assert_eq!(config.orders_key, "confirmation");
        assert_eq!(config.provider_cols, vec!["operator", "provider"]);
        assert_eq!(config.tolerance.value(), Decimal::from_str("1.5").unwrap());
    }

    #[test]
    fn parse_toml() {
        let input = r#"
input_file = "in.xlsx"
orders_key = "BookingLocator"
commissions_key = "BookingLocator"
orders_commission_col = "ExpectedCommissionUSD"
commissions_commission_col = "BilledCommissionUSD"
tolerance = 0
provider_cols = ["vendor"]
"#;
        let config = ReconConfig::from_toml(input).unwrap();
        assert_eq!(config.tolerance.value(), Decimal::ZERO);
        assert_eq!(config.provider_cols, vec!["vendor"]);
    }

    #[test]
    fn reject_missing_key() {
        let input = r#"{
            "orders_key": "a",
            "commissions_key": "b",
            "orders_commission_col": "c"
        }"#;
        let err = ReconConfig::from_json(input).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("commissions_commission_col"));
        assert!(err.to_string().contains("com_commission_col"));
    }

    #[test]
    fn reject_blank_key() {
        let input = r#"{
            "orders_key": "  ",
            "commissions_key": "b",
            "orders_commission_col": "c",
            "commissions_commission_col": "d"
        }"#;
        let err = ReconConfig::from_json(input).unwrap_err();
        assert!(err.to_string().contains("orders_key"));
    }

    #[test]
    fn reject_negative_tolerance() {
        let input = r#"{
            "orders_key": "a",
            "commissions_key": "b",
            "orders_commission_col": "c",
            "commissions_commission_col": "d",
            "tolerance": -0.5
        }"#;
        let err = ReconConfig::from_json(input).unwrap_err();
        assert!(matches!(err, ReconError::InvalidTolerance(_)));
    }

    #[test]
    fn reject_malformed_json() {
        let err = ReconConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn per_side_file_overrides_input_file() {
        let input = r#"{
            "input_file": "shared.xlsx",
            "commissions_file": "billed.csv",
            "orders_sheet": "Orders",
            "orders_key": "a",
            "commissions_key": "b",
            "orders_commission_col": "c",
            "commissions_commission_col": "d"
        }"#;
        let config = ReconConfig::from_json(input).unwrap();
        let orders = config.sources.location(Side::Orders).unwrap();
        assert_eq!(orders.file, "shared.xlsx");
        assert_eq!(orders.sheet.as_deref(), Some("Orders"));
        let commissions = config.sources.location(Side::Commissions).unwrap();
        assert_eq!(commissions.file, "billed.csv");
        assert_eq!(commissions.sheet, None);
    }

    #[test]
    fn missing_input_location() {
        let config = ReconConfig {
            sources: SourceConfig::default(),
            orders_key: "a".into(),
            commissions_key: "b".into(),
            orders_commission_col: "c".into(),
            commissions_commission_col: "d".into(),
            provider_cols: Vec::new(),
            tolerance: Tolerance::default(),
            provider_map_file: None,
            output_file: None,
        };
        let err = config.sources.location(Side::Orders).unwrap_err();
        assert!(err.to_string().contains("input_file"));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("recon.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("recon.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("recon")), ConfigFormat::Json);
    }
}
