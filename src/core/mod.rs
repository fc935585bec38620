pub mod day_range;
pub mod engine;
pub mod girth;
pub mod threshold_price;
pub mod weight_check;

pub use crate::domain::model::{CalculationRequest, CalculationResult};
pub use crate::domain::ports::{ReferenceData, Storage, TableLoader};
pub use crate::utils::error::Result;
