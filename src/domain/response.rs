use crate::core::threshold_price::{present, round_for_presentation};
use crate::domain::model::{
    CalculationResult, CheckOutcome, FeeSchedule, GirthMeasure, PricedSegment, ProductFee,
};
use crate::utils::error::{FeeError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseData {
    pub weight_check: Vec<ProductFee>,
    pub results: Vec<CheckOutcome>,
    pub exceeds_all_brackets: bool,
    pub plc_name: Option<String>,
    pub girth: GirthMeasure,
    pub day_range: Vec<PricedSegment>,
    pub fee_schedule: Option<FeeSchedule>,
}

/// Envelope handed to the HTTP layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeResponse {
    pub status: bool,
    pub message: String,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub fulfillment_cost: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_price: Option<String>,
    #[serde(
        rename = "totalFulFilmentPrice",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub total_fulfillment_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl FeeResponse {
    pub fn success(result: CalculationResult, scale: u32) -> Self {
        let message = if result.weight_check.weight_check.is_empty() {
            "No fee category matched; fulfillment fee set to 0".to_string()
        } else {
            "Fulfillment cost calculated".to_string()
        };

        Self {
            status: true,
            message,
            fulfillment_cost: Some(round_for_presentation(result.fulfillment_cost, scale)),
            threshold_price: Some(present(result.threshold.threshold_price, scale)),
            total_fulfillment_price: Some(present(result.total_fulfillment_price, scale)),
            data: Some(ResponseData {
                weight_check: result.weight_check.weight_check,
                results: result.weight_check.results,
                exceeds_all_brackets: result.weight_check.exceeds_all_brackets,
                plc_name: result.plc_name,
                girth: result.girth,
                day_range: result.threshold.segments,
                fee_schedule: result.fee_schedule,
            }),
        }
    }

    pub fn failure(error: &FeeError) -> Self {
        Self {
            status: false,
            message: error.user_friendly_message(),
            fulfillment_cost: None,
            threshold_price: None,
            total_fulfillment_price: None,
            data: None,
        }
    }

    /// Status code and body for a finished calculation.
    pub fn from_outcome(outcome: Result<CalculationResult>, scale: u32) -> (u16, Self) {
        match outcome {
            Ok(result) => (200, Self::success(result, scale)),
            Err(error) => {
                tracing::info!(
                    category = ?error.category(),
                    "calculation rejected: {}",
                    error
                );
                (error.http_status(), Self::failure(&error))
            }
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
