//! Configuration loaded from `vaulted.toml`.

pub mod settings;

pub use settings::{ExportFormat, Settings};
