use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of the fee table, one per weight/size category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFee {
    #[serde(alias = "plc_name")]
    pub plc_name: String,
    #[serde(alias = "plc_code")]
    pub plc_code: String,
    #[serde(alias = "weight_limit")]
    pub weight_limit: String,
    pub weight: Decimal,
    #[serde(alias = "girth_threshold")]
    pub girth_threshold: Decimal,
    #[serde(alias = "local_order_fee")]
    pub local_order_fee: Decimal,
    #[serde(alias = "local_return_fee")]
    pub local_return_fee: Decimal,
    #[serde(alias = "cross_border_order_fee")]
    pub cross_border_order_fee: Decimal,
    #[serde(alias = "cross_border_return_fee")]
    pub cross_border_return_fee: Decimal,
    #[serde(alias = "removal_fee")]
    pub removal_fee: Decimal,
    #[serde(alias = "disposal_fee")]
    pub disposal_fee: Decimal,
}

/// Weight bracket. `max_weight = None` marks the open top bracket.
///
/// `local_order_fee` must agree with the category's `ProductFee` row; charges are
/// always read from the fee row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMaxWeight {
    pub plc_name: String,
    pub min_weight: Decimal,
    pub max_weight: Option<Decimal>,
    pub local_order_fee: Decimal,
}

impl ProductMaxWeight {
    /// Inclusive at both ends.
    pub fn contains(&self, weight: Decimal) -> bool {
        weight >= self.min_weight && self.max_weight.map_or(true, |max| weight <= max)
    }
}

/// Billing period. `day_threshold` is the exclusive upper day boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductThreshold {
    pub period: String,
    pub day_threshold: Option<u64>,
    pub fee_per_cbm_per_day: Decimal,
    pub random_threshold: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    #[default]
    Local,
    CrossBorder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub length: Decimal,
    pub height: Decimal,
    pub width: Decimal,
    pub weight: Decimal,
    pub days: i64,
    #[serde(default)]
    pub channel: Channel,
}

impl CalculationRequest {
    pub fn new(length: Decimal, height: Decimal, width: Decimal, weight: Decimal, days: i64) -> Self {
        Self {
            length,
            height,
            width,
            weight,
            days,
            channel: Channel::Local,
        }
    }

    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channel = channel;
        self
    }
}

/// Dimensional measures derived from a parcel's length, height and width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GirthMeasure {
    /// Length plus girth, in centimetres.
    pub girth_value: Decimal,
    pub volumetric_weight: Decimal,
    pub volume_cbm: Decimal,
    /// `max(actual weight, volumetric weight)`.
    pub effective_weight: Decimal,
}

/// Output of the dimension and weight resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightResolution {
    pub data: Vec<ProductFee>,
    pub girth: GirthMeasure,
    pub plc_name: Option<String>,
    pub bracket: Option<ProductMaxWeight>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    Weight,
    Girth,
}

/// Diagnostic record for one candidate the checker looked at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutcome {
    pub plc_name: String,
    pub plc_code: String,
    pub rule: MatchRule,
    pub girth_value: Decimal,
    pub girth_threshold: Decimal,
    pub within_girth: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightCheck {
    pub weight_check: Vec<ProductFee>,
    pub results: Vec<CheckOutcome>,
    pub exceeds_all_brackets: bool,
}

impl WeightCheck {
    pub fn empty() -> Self {
        Self {
            weight_check: Vec::new(),
            results: Vec::new(),
            exceeds_all_brackets: false,
        }
    }

    pub fn first_match(&self) -> Option<&ProductFee> {
        self.weight_check.first()
    }
}

/// A contiguous `[start_day, end_day)` slice of the requested duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySegment {
    pub period: String,
    pub start_day: u64,
    pub end_day: u64,
    pub fee_per_cbm_per_day: Decimal,
    pub random_threshold: Decimal,
}

impl DaySegment {
    /// Zero for an inverted segment.
    pub fn days(&self) -> u64 {
        self.end_day.saturating_sub(self.start_day)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRange {
    pub segments: Vec<DaySegment>,
}

impl DayRange {
    pub fn total_days(&self) -> u64 {
        self.segments.iter().map(DaySegment::days).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedSegment {
    #[serde(flatten)]
    pub segment: DaySegment,
    pub days: u64,
    pub cost: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdPrice {
    pub segments: Vec<PricedSegment>,
    pub threshold_price: Decimal,
}

/// Ancillary fees of the selected category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeSchedule {
    pub plc_code: String,
    pub local_order_fee: Decimal,
    pub local_return_fee: Decimal,
    pub cross_border_order_fee: Decimal,
    pub cross_border_return_fee: Decimal,
    pub removal_fee: Decimal,
    pub disposal_fee: Decimal,
}

impl From<&ProductFee> for FeeSchedule {
    fn from(fee: &ProductFee) -> Self {
        Self {
            plc_code: fee.plc_code.clone(),
            local_order_fee: fee.local_order_fee,
            local_return_fee: fee.local_return_fee,
            cross_border_order_fee: fee.cross_border_order_fee,
            cross_border_return_fee: fee.cross_border_return_fee,
            removal_fee: fee.removal_fee,
            disposal_fee: fee.disposal_fee,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub girth: GirthMeasure,
    pub plc_name: Option<String>,
    pub weight_check: WeightCheck,
    pub day_range: DayRange,
    pub threshold: ThresholdPrice,
    pub fulfillment_cost: Decimal,
    pub total_fulfillment_price: Decimal,
    pub fee_schedule: Option<FeeSchedule>,
}

impl CalculationResult {
    pub fn threshold_price(&self) -> Decimal {
        self.threshold.threshold_price
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn segment(start_day: u64, end_day: u64) -> DaySegment {
        DaySegment {
            period: "P1".to_string(),
            start_day,
            end_day,
            fee_per_cbm_per_day: dec!(0.5),
            random_threshold: dec!(0.02),
        }
    }

    #[test]
    fn test_segment_days() {
        assert_eq!(segment(30, 45).days(), 15);
        assert_eq!(segment(10, 10).days(), 0);
    }

    #[test]
    fn test_inverted_segment_counts_zero_days() {
        assert_eq!(segment(45, 30).days(), 0);

        let range = DayRange {
            segments: vec![segment(0, 30), segment(45, 30)],
        };
        assert_eq!(range.total_days(), 30);
    }
}
