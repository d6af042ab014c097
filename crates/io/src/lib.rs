// File I/O operations

pub mod aliases;
pub mod csv;
pub mod source;
pub mod xlsx;

pub use aliases::{resolve_alias_map, ALIAS_FILE_CANDIDATES};
pub use source::{load_location, load_table, write_tables, FileKind};
