//! Default fee schedule compiled into the binary.
//!
//! The same files ship under `data/` so deployments can copy and edit them.

use crate::adapters::csv_tables::parse_tables;
use crate::domain::tables::ReferenceTables;
use crate::utils::error::Result;

const PRODUCT_FEES: &str = include_str!("../../data/product_fees.csv");
const MAX_WEIGHTS: &str = include_str!("../../data/max_weights.csv");
const THRESHOLDS: &str = include_str!("../../data/thresholds.csv");

pub fn tables() -> Result<ReferenceTables> {
    parse_tables(
        PRODUCT_FEES.as_bytes(),
        MAX_WEIGHTS.as_bytes(),
        THRESHOLDS.as_bytes(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::ReferenceData;

    #[test]
    fn test_builtin_schedule_parses() {
        let tables = tables().unwrap();
        assert_eq!(tables.fees().len(), 5);
        assert_eq!(tables.max_weights().len(), 5);
        assert_eq!(tables.thresholds().len(), 3);
        assert_eq!(tables.fees()[0].plc_name, "Small");
    }
}
