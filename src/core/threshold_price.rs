use crate::domain::model::{DayRange, PricedSegment, ThresholdPrice};
use crate::utils::error::{FeeError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PRESENTATION_SCALE: u32 = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMode {
    /// days x fee per m3 per day x parcel volume
    #[default]
    PerVolume,
    /// days x the period's fixed `random_threshold` fee
    Fixed,
}

/// Prices every segment and sums them. No rounding happens here.
pub fn price_calculation(range: &DayRange, volume_cbm: Decimal, mode: ThresholdMode) -> Result<ThresholdPrice> {
    let mut segments = Vec::with_capacity(range.segments.len());
    let mut total = Decimal::ZERO;

    for segment in &range.segments {
        let days = segment.days();
        let day_count = Decimal::from(days);
        let cost = match mode {
            ThresholdMode::PerVolume => day_count
                .checked_mul(segment.fee_per_cbm_per_day)
                .and_then(|cost| cost.checked_mul(volume_cbm)),
            ThresholdMode::Fixed => day_count.checked_mul(segment.random_threshold),
        }
        .and_then(|cost| total.checked_add(cost).map(|sum| (cost, sum)));

        let Some((cost, sum)) = cost else {
            return Err(FeeError::InvalidDayRangeError {
                days: range.total_days().to_string(),
                reason: "threshold price overflows".to_string(),
            });
        };

        total = sum;
        segments.push(PricedSegment {
            segment: segment.clone(),
            days,
            cost,
        });
    }

    Ok(ThresholdPrice {
        segments,
        threshold_price: total,
    })
}

pub fn round_for_presentation(value: Decimal, scale: u32) -> Decimal {
    value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

/// Fixed-scale string, e.g. `0.0100` for scale 4.
pub fn present(value: Decimal, scale: u32) -> String {
    format!("{:.*}", scale as usize, round_for_presentation(value, scale))
}
