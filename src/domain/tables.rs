use crate::domain::model::{ProductFee, ProductMaxWeight, ProductThreshold};
use crate::domain::ports::ReferenceData;
use crate::utils::error::{FeeError, Result};
use crate::utils::validation::Validate;
use rust_decimal::Decimal;
use std::collections::HashSet;

/// In-memory fee schedules, sorted and validated once at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTables {
    fees: Vec<ProductFee>,
    max_weights: Vec<ProductMaxWeight>,
    thresholds: Vec<ProductThreshold>,
}

impl ReferenceTables {
    pub fn new(
        mut fees: Vec<ProductFee>,
        mut max_weights: Vec<ProductMaxWeight>,
        mut thresholds: Vec<ProductThreshold>,
    ) -> Result<Self> {
        fees.sort_by(|a, b| a.weight.cmp(&b.weight));
        max_weights.sort_by(|a, b| a.min_weight.cmp(&b.min_weight));
        thresholds.sort_by_key(|t| t.day_threshold.unwrap_or(u64::MAX));

        let tables = Self {
            fees,
            max_weights,
            thresholds,
        };
        tables.validate()?;

        tracing::debug!(
            fees = tables.fees.len(),
            brackets = tables.max_weights.len(),
            periods = tables.thresholds.len(),
            "reference tables ready"
        );
        Ok(tables)
    }

    fn validate_fees(&self) -> Result<()> {
        if self.fees.is_empty() {
            return Err(FeeError::reference_data("product_fees", "table is empty"));
        }

        let mut codes = HashSet::new();
        for fee in &self.fees {
            if !codes.insert(fee.plc_code.as_str()) {
                return Err(FeeError::reference_data(
                    "product_fees",
                    format!("duplicate category code '{}'", fee.plc_code),
                ));
            }
            if fee.girth_threshold < Decimal::ZERO {
                return Err(FeeError::reference_data(
                    "product_fees",
                    format!("negative girth threshold for '{}'", fee.plc_code),
                ));
            }
        }
        Ok(())
    }

    fn validate_brackets(&self) -> Result<()> {
        let Some(first) = self.max_weights.first() else {
            return Err(FeeError::reference_data("max_weights", "table is empty"));
        };
        // every non-negative weight must fall in exactly one bracket
        if !first.min_weight.is_zero() {
            return Err(FeeError::reference_data(
                "max_weights",
                format!(
                    "lowest bracket '{}' must start at 0, not {}",
                    first.plc_name, first.min_weight
                ),
            ));
        }

        let last_index = self.max_weights.len() - 1;
        for (index, bracket) in self.max_weights.iter().enumerate() {
            let Some(fee) = self.fees.iter().find(|fee| fee.plc_name == bracket.plc_name) else {
                return Err(FeeError::reference_data(
                    "max_weights",
                    format!("bracket '{}' has no fee row", bracket.plc_name),
                ));
            };
            if fee.local_order_fee != bracket.local_order_fee {
                return Err(FeeError::reference_data(
                    "max_weights",
                    format!(
                        "bracket '{}' local order fee {} disagrees with product fee {}",
                        bracket.plc_name, bracket.local_order_fee, fee.local_order_fee
                    ),
                ));
            }

            let Some(max) = bracket.max_weight else {
                if index != last_index {
                    return Err(FeeError::reference_data(
                        "max_weights",
                        format!("only the top bracket may be open, not '{}'", bracket.plc_name),
                    ));
                }
                continue;
            };

            if max < bracket.min_weight {
                return Err(FeeError::reference_data(
                    "max_weights",
                    format!("bracket '{}' has max below min", bracket.plc_name),
                ));
            }

            if let Some(next) = self.max_weights.get(index + 1) {
                if next.min_weight != max {
                    return Err(FeeError::reference_data(
                        "max_weights",
                        format!(
                            "gap or overlap between '{}' (max {}) and '{}' (min {})",
                            bracket.plc_name, max, next.plc_name, next.min_weight
                        ),
                    ));
                }
            }
        }
        Ok(())
    }

    fn validate_thresholds(&self) -> Result<()> {
        if self.thresholds.is_empty() {
            return Err(FeeError::reference_data("thresholds", "table is empty"));
        }

        let last_index = self.thresholds.len() - 1;
        let mut previous = 0u64;
        for (index, threshold) in self.thresholds.iter().enumerate() {
            if threshold.fee_per_cbm_per_day < Decimal::ZERO
                || threshold.random_threshold < Decimal::ZERO
            {
                return Err(FeeError::reference_data(
                    "thresholds",
                    format!("negative rate in period '{}'", threshold.period),
                ));
            }

            match threshold.day_threshold {
                Some(boundary) if boundary <= previous => {
                    return Err(FeeError::reference_data(
                        "thresholds",
                        format!(
                            "period '{}' boundary {} does not ascend past {}",
                            threshold.period, boundary, previous
                        ),
                    ));
                }
                Some(boundary) => previous = boundary,
                None if index != last_index => {
                    return Err(FeeError::reference_data(
                        "thresholds",
                        format!("only the last period may be open, not '{}'", threshold.period),
                    ));
                }
                None => {}
            }
        }
        Ok(())
    }
}

impl Validate for ReferenceTables {
    fn validate(&self) -> Result<()> {
        self.validate_fees()?;
        self.validate_brackets()?;
        self.validate_thresholds()
    }
}

impl ReferenceData for ReferenceTables {
    fn fees(&self) -> &[ProductFee] {
        &self.fees
    }

    fn max_weights(&self) -> &[ProductMaxWeight] {
        &self.max_weights
    }

    fn thresholds(&self) -> &[ProductThreshold] {
        &self.thresholds
    }
}
