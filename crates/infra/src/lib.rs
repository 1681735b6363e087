//! Infrastructure layer: configuration, catalog files, the file-backed
//! override store and batch quoting.

pub mod batch;
pub mod catalog_files;
pub mod config;
pub mod override_store;

mod integration_tests;

pub use batch::{BatchReport, run_batch};
pub use catalog_files::load_catalog;
pub use config::EngineConfig;
pub use override_store::{FileOverrideRepository, OverrideBackup, parse_backup};
