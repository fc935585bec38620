use crate::utils::error::{FeeError, Result};
use rust_decimal::Decimal;
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(FeeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(FeeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_decimal(field_name: &str, value: Decimal) -> Result<()> {
    if value <= Decimal::ZERO {
        return Err(FeeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value must be greater than zero".to_string(),
        });
    }
    Ok(())
}

pub fn validate_file_extensions(
    field_name: &str,
    files: &[&str],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        match std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            Some(extension) if allowed_set.contains(extension) => {}
            Some(extension) => {
                return Err(FeeError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.to_string(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
            None => {
                return Err(FeeError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.to_string(),
                    reason: "File has no extension or invalid filename".to_string(),
                });
            }
        }
    }

    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| FeeError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(FeeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(FeeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("tables.base_path", "./data").is_ok());
        assert!(validate_path("tables.base_path", "").is_err());
        assert!(validate_path("tables.base_path", "da\0ta").is_err());
    }

    #[test]
    fn test_validate_positive_decimal() {
        assert!(validate_positive_decimal("girth.volumetric_divisor", dec!(6000)).is_ok());
        assert!(validate_positive_decimal("girth.volumetric_divisor", dec!(0)).is_err());
        assert!(validate_positive_decimal("girth.volumetric_divisor", dec!(-5)).is_err());
    }

    #[test]
    fn test_validate_file_extensions() {
        assert!(validate_file_extensions("tables", &["fees.csv", "weights.csv"], &["csv"]).is_ok());
        assert!(validate_file_extensions("tables", &["fees.xlsx"], &["csv"]).is_err());
        assert!(validate_file_extensions("tables", &["fees"], &["csv"]).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("pricing.presentation_scale", 4u32, 0, 12).is_ok());
        assert!(validate_range("pricing.presentation_scale", 13u32, 0, 12).is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some(3);
        let missing: Option<i32> = None;
        assert_eq!(*validate_required_field("x", &present).unwrap(), 3);
        assert!(matches!(
            validate_required_field("x", &missing),
            Err(FeeError::MissingConfigError { .. })
        ));
    }
}
