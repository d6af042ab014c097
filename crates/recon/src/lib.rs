//! `commrec-recon`: commission reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded tables, returns classified
//! records, partitions and summaries. No CLI or IO dependencies.

pub mod classify;
pub mod cleaning;
pub mod coerce;
pub mod config;
pub mod consolidate;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod report;
pub mod snapshot;
pub mod summary;
pub mod table;

pub use classify::{classify, Partitions, Tolerance};
pub use config::{ConfigFormat, InputLocation, ReconConfig};
pub use engine::{check_schema, run, ReconOutcome};
pub use error::ReconError;
pub use matcher::reconcile;
pub use model::{Category, ClassifiedRecord, JoinedRecord, Presence, Side};
pub use normalize::normalize_key;
pub use provider::{AliasMap, ProviderResolver};
pub use table::{Cell, OutputTable, Table};
