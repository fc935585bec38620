use crate::domain::model::{DayRange, DaySegment, ProductThreshold};
use crate::utils::error::{FeeError, Result};

/// Splits `days` into `[start, end)` segments aligned to the threshold periods.
///
/// A period covers the days from the previous boundary up to, but excluding, its
/// own `day_threshold`. The last period is open above, so a count landing exactly
/// on a boundary stays in the lower period and anything past the final boundary is
/// billed at the last period's rate.
pub fn partition_days(thresholds: &[ProductThreshold], days: i64) -> Result<DayRange> {
    let days = u64::try_from(days).map_err(|_| FeeError::InvalidDayRangeError {
        days: days.to_string(),
        reason: "must not be negative".to_string(),
    })?;

    if days == 0 {
        return Ok(DayRange::default());
    }
    if thresholds.is_empty() {
        return Err(FeeError::reference_data("thresholds", "no periods to partition into"));
    }

    let last_index = thresholds.len() - 1;
    let mut segments = Vec::new();
    let mut lower = 0u64;

    for (index, threshold) in thresholds.iter().enumerate() {
        if lower >= days {
            break;
        }
        let upper = match threshold.day_threshold {
            Some(boundary) if index != last_index => boundary,
            _ => u64::MAX,
        };
        let end = upper.min(days);
        if end > lower {
            segments.push(DaySegment {
                period: threshold.period.clone(),
                start_day: lower,
                end_day: end,
                fee_per_cbm_per_day: threshold.fee_per_cbm_per_day,
                random_threshold: threshold.random_threshold,
            });
        }
        lower = lower.max(upper);
    }

    let range = DayRange { segments };
    debug_assert_eq!(range.total_days(), days);
    tracing::debug!(days, segments = range.segments.len(), "partitioned day range");
    Ok(range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn periods(boundaries: &[Option<u64>]) -> Vec<ProductThreshold> {
        boundaries
            .iter()
            .enumerate()
            .map(|(index, boundary)| ProductThreshold {
                period: format!("P{}", index + 1),
                day_threshold: *boundary,
                fee_per_cbm_per_day: dec!(0.5),
                random_threshold: dec!(0.02),
            })
            .collect()
    }

    fn spans(range: &DayRange) -> Vec<(u64, u64, &str)> {
        range
            .segments
            .iter()
            .map(|s| (s.start_day, s.end_day, s.period.as_str()))
            .collect()
    }

    #[test]
    fn test_zero_days_is_empty() {
        let range = partition_days(&periods(&[Some(30), None]), 0).unwrap();
        assert!(range.is_empty());
    }

    #[test]
    fn test_spans_three_periods() {
        let range = partition_days(&periods(&[Some(30), Some(60), None]), 75).unwrap();
        assert_eq!(spans(&range), vec![(0, 30, "P1"), (30, 60, "P2"), (60, 75, "P3")]);
        assert_eq!(range.total_days(), 75);
    }

    #[test]
    fn test_boundary_day_stays_in_lower_period() {
        let range = partition_days(&periods(&[Some(30), Some(60), None]), 30).unwrap();
        assert_eq!(spans(&range), vec![(0, 30, "P1")]);
    }

    #[test]
    fn test_finite_last_period_is_open_above() {
        let range = partition_days(&periods(&[Some(30), Some(60)]), 90).unwrap();
        assert_eq!(spans(&range), vec![(0, 30, "P1"), (30, 90, "P2")]);
    }

    #[test]
    fn test_negative_days_rejected() {
        let err = partition_days(&periods(&[None]), -1).unwrap_err();
        assert!(matches!(err, FeeError::InvalidDayRangeError { .. }));
    }

    #[test]
    fn test_empty_table_with_days_is_reference_error() {
        let err = partition_days(&[], 5).unwrap_err();
        assert!(matches!(err, FeeError::ReferenceDataError { .. }));
        assert!(partition_days(&[], 0).unwrap().is_empty());
    }
}
