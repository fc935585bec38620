//! Dimension and weight resolution.
//!
//! Girth follows the carrier length-plus-girth convention,
//! `length + 2 * (height + width)`. Volumetric weight is the parcel volume in cm³
//! divided by the configured divisor, and the bracket is chosen on
//! `max(weight, volumetric weight)`.

use crate::domain::model::{CalculationRequest, GirthMeasure, ProductMaxWeight, WeightResolution};
use crate::domain::ports::ReferenceData;
use crate::utils::error::{FeeError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub const DEFAULT_VOLUMETRIC_DIVISOR: Decimal = dec!(6000);

const CM3_PER_CBM: Decimal = dec!(1000000);

pub fn validate_dimensions(request: &CalculationRequest) -> Result<()> {
    let fields = [
        ("length", request.length),
        ("height", request.height),
        ("width", request.width),
        ("weight", request.weight),
    ];

    for (field, value) in fields {
        if value < Decimal::ZERO {
            return Err(FeeError::invalid_dimension(field, value, "must not be negative"));
        }
    }

    if fields.iter().all(|(_, value)| value.is_zero()) {
        return Err(FeeError::invalid_dimension(
            "dimensions",
            "0",
            "at least one of length, height, width or weight must be positive",
        ));
    }

    Ok(())
}

pub fn measure_girth(request: &CalculationRequest, volumetric_divisor: Decimal) -> Result<GirthMeasure> {
    let overflow = || FeeError::invalid_dimension("dimensions", "overflow", "parcel is too large to price");

    let girth_value = request
        .height
        .checked_add(request.width)
        .and_then(|sum| sum.checked_mul(dec!(2)))
        .and_then(|girth| girth.checked_add(request.length))
        .ok_or_else(overflow)?;

    let volume_cm3 = request
        .length
        .checked_mul(request.height)
        .and_then(|area| area.checked_mul(request.width))
        .ok_or_else(overflow)?;

    let volumetric_weight = volume_cm3
        .checked_div(volumetric_divisor)
        .ok_or_else(|| FeeError::InvalidConfigValueError {
            field: "girth.volumetric_divisor".to_string(),
            value: volumetric_divisor.to_string(),
            reason: "Divisor must be greater than zero".to_string(),
        })?;

    Ok(GirthMeasure {
        girth_value,
        volumetric_weight,
        volume_cbm: volume_cm3 / CM3_PER_CBM,
        effective_weight: request.weight.max(volumetric_weight),
    })
}

/// Brackets are contiguous and share boundaries, so the first containing bracket
/// is the lower one. Weights past the last finite bracket land in the last bracket.
pub fn select_bracket(brackets: &[ProductMaxWeight], weight: Decimal) -> Option<&ProductMaxWeight> {
    let first = brackets.first()?;
    if let Some(bracket) = brackets.iter().find(|b| b.contains(weight)) {
        return Some(bracket);
    }
    if weight < first.min_weight {
        Some(first)
    } else {
        brackets.last()
    }
}

pub fn resolve_weight_list<R: ReferenceData + ?Sized>(
    tables: &R,
    request: &CalculationRequest,
    volumetric_divisor: Decimal,
) -> Result<WeightResolution> {
    validate_dimensions(request)?;
    let girth = measure_girth(request, volumetric_divisor)?;

    let bracket = select_bracket(tables.max_weights(), girth.effective_weight).ok_or(
        FeeError::NoBracketMatchError {
            weight: girth.effective_weight,
        },
    )?;

    let data: Vec<_> = tables
        .fees()
        .iter()
        .filter(|fee| fee.plc_name == bracket.plc_name)
        .cloned()
        .collect();

    tracing::debug!(
        girth = %girth.girth_value,
        effective_weight = %girth.effective_weight,
        plc_name = %bracket.plc_name,
        rows = data.len(),
        "resolved weight bracket"
    );

    Ok(WeightResolution {
        data,
        girth,
        plc_name: Some(bracket.plc_name.clone()),
        bracket: Some(bracket.clone()),
    })
}
