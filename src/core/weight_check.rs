use crate::domain::model::{CheckOutcome, MatchRule, ProductFee, WeightCheck, WeightResolution};
use crate::domain::ports::ReferenceData;

/// Checks the resolved category against the parcel girth, escalating to heavier
/// categories until one accommodates it.
///
/// `weight_check` keeps every candidate that fits, lightest first. `results`
/// records every candidate that was examined.
pub fn check_weight<R: ReferenceData + ?Sized>(tables: &R, resolution: &WeightResolution) -> WeightCheck {
    let Some(resolved) = resolution.data.first() else {
        tracing::warn!(
            plc_name = ?resolution.plc_name,
            "no fee row for resolved category"
        );
        return WeightCheck::empty();
    };

    let fees = tables.fees();
    let start = fees
        .iter()
        .position(|fee| fee.plc_code == resolved.plc_code)
        .unwrap_or(fees.len());
    let girth_value = resolution.girth.girth_value;

    let candidates: Vec<&ProductFee> = if start < fees.len() {
        fees[start..].iter().collect()
    } else {
        // resolved row is not part of the injected fee table
        vec![resolved]
    };

    let mut weight_check = Vec::new();
    let mut results = Vec::with_capacity(candidates.len());
    for (index, fee) in candidates.into_iter().enumerate() {
        let within_girth = girth_value <= fee.girth_threshold;
        results.push(CheckOutcome {
            plc_name: fee.plc_name.clone(),
            plc_code: fee.plc_code.clone(),
            rule: if index == 0 { MatchRule::Weight } else { MatchRule::Girth },
            girth_value,
            girth_threshold: fee.girth_threshold,
            within_girth,
        });
        if within_girth {
            weight_check.push(fee.clone());
        }
    }

    let exceeds_all_brackets = weight_check.is_empty();
    if exceeds_all_brackets {
        tracing::warn!(girth = %girth_value, "girth exceeds every category threshold");
    } else if weight_check[0].plc_code != resolved.plc_code {
        tracing::debug!(
            from = %resolved.plc_code,
            to = %weight_check[0].plc_code,
            "escalated category on girth"
        );
    }

    WeightCheck {
        weight_check,
        results,
        exceeds_all_brackets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::builtin;
    use crate::core::girth::{resolve_weight_list, DEFAULT_VOLUMETRIC_DIVISOR};
    use crate::domain::model::CalculationRequest;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn resolve(length: Decimal, height: Decimal, width: Decimal, weight: Decimal) -> (WeightResolution, WeightCheck) {
        let tables = builtin::tables().unwrap();
        let request = CalculationRequest::new(length, height, width, weight, 0);
        let resolution = resolve_weight_list(&tables, &request, DEFAULT_VOLUMETRIC_DIVISOR).unwrap();
        let check = check_weight(&tables, &resolution);
        (resolution, check)
    }

    #[test]
    fn test_weight_rule_selects_resolved_category() {
        let (_, check) = resolve(dec!(20), dec!(10), dec!(10), dec!(1));
        assert_eq!(check.first_match().unwrap().plc_code, "PLC-M");
        assert_eq!(check.results[0].rule, MatchRule::Weight);
        assert!(check.results[0].within_girth);
        assert!(!check.exceeds_all_brackets);
        // heavier categories also fit and follow in order
        assert_eq!(check.weight_check.len(), 4);
    }

    #[test]
    fn test_long_thin_parcel_escalates_on_girth() {
        // girth = 100 + 2 * (2 + 2) = 108 > Small threshold 90; volume 400 cm3
        let (resolution, check) = resolve(dec!(100), dec!(2), dec!(2), dec!(0.2));
        assert_eq!(resolution.plc_name.as_deref(), Some("Small"));
        assert_eq!(check.first_match().unwrap().plc_code, "PLC-M");
        assert!(!check.results[0].within_girth);
        assert_eq!(check.results[1].rule, MatchRule::Girth);
        assert!(check.results[1].within_girth);
    }

    #[test]
    fn test_girth_beyond_every_threshold_flags_result() {
        // girth = 496 + 2 * (1 + 1) = 500, above the Bulky limit of 420
        let (_, check) = resolve(dec!(496), dec!(1), dec!(1), dec!(0.1));
        assert!(check.weight_check.is_empty());
        assert!(check.exceeds_all_brackets);
        assert!(check.results.iter().all(|r| !r.within_girth));
    }

    #[test]
    fn test_unmatched_resolution_yields_empty_check() {
        let tables = builtin::tables().unwrap();
        let (mut resolution, _) = resolve(dec!(20), dec!(10), dec!(10), dec!(1));
        resolution.data.clear();
        let check = check_weight(&tables, &resolution);
        assert!(check.weight_check.is_empty());
        assert!(check.results.is_empty());
    }
}
