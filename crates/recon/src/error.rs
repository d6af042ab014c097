use std::fmt;

use rust_decimal::Decimal;

#[derive(Debug)]
pub enum ReconError {
    /// JSON / TOML parse or deserialization error.
    ConfigParse(String),
    /// A required configuration key is absent. Lists every accepted spelling.
    MissingConfigKey(Vec<&'static str>),
    /// Tolerance must be zero or positive.
    InvalidTolerance(Decimal),
    /// A configured column is absent from an input table.
    MissingColumn { table: String, column: String },
    /// A configured sheet is absent from an input workbook.
    MissingSheet { sheet: String, available: Vec<String> },
    /// IO error (file read, workbook open, etc.).
    Io(String),
}

impl ReconError {
    /// Configuration problems (missing key, bad tolerance, unparsable file).
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::ConfigParse(_) | Self::MissingConfigKey(_) | Self::InvalidTolerance(_)
        )
    }

    /// Input tables do not carry what the config asks for.
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::MissingColumn { .. } | Self::MissingSheet { .. })
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::MissingConfigKey(keys) => {
                write!(f, "missing configuration key, expected one of: {}", keys.join(", "))
            }
            Self::InvalidTolerance(value) => {
                write!(f, "tolerance must be >= 0, got {value}")
            }
            Self::MissingColumn { table, column } => {
                write!(f, "{table}: missing column '{column}'")
            }
            Self::MissingSheet { sheet, available } => {
                write!(f, "sheet '{sheet}' not found, available sheets: {}", available.join(", "))
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
