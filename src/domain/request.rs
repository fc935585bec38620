use crate::domain::model::{CalculationRequest, Channel};
use crate::utils::error::{FeeError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;

/// Loosely typed request body, as posted by the dashboard.
///
/// Each measure may arrive as a JSON number or a numeric string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub length: Value,
    #[serde(default)]
    pub height: Value,
    #[serde(default)]
    pub width: Value,
    #[serde(default)]
    pub weight: Value,
    #[serde(default)]
    pub days: Value,
    #[serde(default)]
    pub channel: Option<Channel>,
}

impl RequestBody {
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Measures are whole centimetres and kilograms; fractions are truncated toward zero.
fn coerce_measure(field: &str, value: &Value) -> Result<Decimal> {
    let parsed = match value {
        Value::Number(number) => parse_decimal(&number.to_string()),
        Value::String(text) => parse_decimal(text),
        Value::Null => {
            return Err(FeeError::invalid_dimension(field, "null", "is required"));
        }
        _ => None,
    };
    let measure = parsed.ok_or_else(|| FeeError::invalid_dimension(field, value, "must be numeric"))?;
    // truncating -0.5 would hide the sign
    if measure < Decimal::ZERO {
        return Err(FeeError::invalid_dimension(field, measure, "must not be negative"));
    }
    Ok(measure.trunc())
}

/// Fractional day counts are truncated toward zero.
fn coerce_days(value: &Value) -> Result<i64> {
    let invalid = |reason: &str| FeeError::InvalidDayRangeError {
        days: value.to_string(),
        reason: reason.to_string(),
    };

    let parsed = match value {
        Value::Null => return Ok(0),
        Value::Number(number) => parse_decimal(&number.to_string()),
        Value::String(text) if text.trim().is_empty() => return Ok(0),
        Value::String(text) => parse_decimal(text),
        _ => None,
    };

    parsed
        .ok_or_else(|| invalid("must be an integer"))?
        .trunc()
        .to_i64()
        .ok_or_else(|| invalid("is out of range"))
}

impl TryFrom<RequestBody> for CalculationRequest {
    type Error = FeeError;

    fn try_from(body: RequestBody) -> Result<Self> {
        Ok(CalculationRequest {
            length: coerce_measure("length", &body.length)?,
            height: coerce_measure("height", &body.height)?,
            width: coerce_measure("width", &body.width)?,
            weight: coerce_measure("weight", &body.weight)?,
            days: coerce_days(&body.days)?,
            channel: body.channel.unwrap_or_default(),
        })
    }
}
