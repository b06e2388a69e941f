//! User configuration: dialect override files.

pub mod dialect;

pub use dialect::{resolve_dialect, ConfigError, ConfiguredDialect, DialectConfig};
