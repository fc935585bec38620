use crate::core::day_range::partition_days;
use crate::core::girth::{measure_girth, resolve_weight_list, DEFAULT_VOLUMETRIC_DIVISOR};
use crate::core::threshold_price::{price_calculation, ThresholdMode, DEFAULT_PRESENTATION_SCALE};
use crate::core::weight_check::check_weight;
use crate::domain::model::{CalculationRequest, CalculationResult, Channel, FeeSchedule, WeightResolution};
use crate::domain::ports::ReferenceData;
use crate::domain::request::RequestBody;
use crate::domain::response::FeeResponse;
use crate::utils::error::{FeeError, Result};
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub volumetric_divisor: Decimal,
    pub threshold_mode: ThresholdMode,
    pub presentation_scale: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            volumetric_divisor: DEFAULT_VOLUMETRIC_DIVISOR,
            threshold_mode: ThresholdMode::PerVolume,
            presentation_scale: DEFAULT_PRESENTATION_SCALE,
        }
    }
}

/// Fulfillment fee facade: resolve, check, partition, price.
///
/// Holds only the injected tables and settings, so one engine can serve any
/// number of threads.
pub struct FeeEngine<R: ReferenceData> {
    tables: R,
    settings: EngineSettings,
}

impl<R: ReferenceData> FeeEngine<R> {
    pub fn new(tables: R) -> Self {
        Self::with_settings(tables, EngineSettings::default())
    }

    pub fn with_settings(tables: R, settings: EngineSettings) -> Self {
        Self { tables, settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn tables(&self) -> &R {
        &self.tables
    }

    pub fn compute_fulfillment_cost(&self, request: &CalculationRequest) -> Result<CalculationResult> {
        let resolution = match resolve_weight_list(&self.tables, request, self.settings.volumetric_divisor) {
            Ok(resolution) => resolution,
            Err(FeeError::NoBracketMatchError { weight }) => {
                tracing::warn!(%weight, "no weight bracket matched, fulfillment fee defaults to zero");
                self.unmatched(request)?
            }
            Err(e) => return Err(e),
        };

        let weight_check = check_weight(&self.tables, &resolution);
        let day_range = partition_days(self.tables.thresholds(), request.days)?;
        let threshold = price_calculation(&day_range, resolution.girth.volume_cbm, self.settings.threshold_mode)?;

        let selected = weight_check.first_match();
        let fulfillment_cost = selected.map_or(Decimal::ZERO, |fee| match request.channel {
            Channel::Local => fee.local_order_fee,
            Channel::CrossBorder => fee.cross_border_order_fee,
        });
        let total_fulfillment_price = fulfillment_cost
            .checked_add(threshold.threshold_price)
            .ok_or_else(|| FeeError::InvalidDayRangeError {
                days: request.days.to_string(),
                reason: "total price overflows".to_string(),
            })?;

        tracing::debug!(
            plc_name = ?resolution.plc_name,
            %fulfillment_cost,
            threshold_price = %threshold.threshold_price,
            %total_fulfillment_price,
            "computed fulfillment cost"
        );

        Ok(CalculationResult {
            girth: resolution.girth,
            plc_name: resolution.plc_name,
            fee_schedule: selected.map(FeeSchedule::from),
            weight_check,
            day_range,
            threshold,
            fulfillment_cost,
            total_fulfillment_price,
        })
    }

    /// Coerces a raw JSON body, computes, and renders the response envelope with
    /// its status code.
    pub fn quote_json(&self, body: &str) -> (u16, FeeResponse) {
        let outcome = RequestBody::from_json(body)
            .and_then(CalculationRequest::try_from)
            .and_then(|request| self.compute_fulfillment_cost(&request));
        FeeResponse::from_outcome(outcome, self.settings.presentation_scale)
    }

    /// Only reached after the resolver has validated the dimensions.
    fn unmatched(&self, request: &CalculationRequest) -> Result<WeightResolution> {
        Ok(WeightResolution {
            data: Vec::new(),
            girth: measure_girth(request, self.settings.volumetric_divisor)?,
            plc_name: None,
            bracket: None,
        })
    }
}
