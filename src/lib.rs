pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{csv_tables::CsvTableLoader, storage::LocalStorage};
pub use config::EngineConfig;
pub use core::engine::{EngineSettings, FeeEngine};
pub use domain::model::{CalculationRequest, CalculationResult, Channel};
pub use domain::ports::ReferenceData;
pub use domain::response::FeeResponse;
pub use domain::tables::ReferenceTables;
pub use utils::error::{FeeError, Result};
