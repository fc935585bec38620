use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeeError {
    #[error("Invalid dimensions: {field} = '{value}' ({reason})")]
    InvalidDimensionsError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("No weight bracket matches effective weight {weight}")]
    NoBracketMatchError { weight: Decimal },

    #[error("Invalid day range: {days} ({reason})")]
    InvalidDayRangeError { days: String, reason: String },

    #[error("Reference data error in '{table}': {message}")]
    ReferenceDataError { table: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid configuration value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    ReferenceData,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FeeError {
    pub fn invalid_dimension(field: &str, value: impl ToString, reason: &str) -> Self {
        FeeError::InvalidDimensionsError {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn reference_data(table: &str, message: impl Into<String>) -> Self {
        FeeError::ReferenceDataError {
            table: table.to_string(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            FeeError::InvalidDimensionsError { .. }
            | FeeError::InvalidDayRangeError { .. }
            | FeeError::NoBracketMatchError { .. } => ErrorCategory::Input,
            FeeError::ReferenceDataError { .. } | FeeError::CsvError(_) => {
                ErrorCategory::ReferenceData
            }
            FeeError::ConfigValidationError { .. }
            | FeeError::InvalidConfigValueError { .. }
            | FeeError::MissingConfigError { .. } => ErrorCategory::Configuration,
            FeeError::IoError(_) | FeeError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => match self {
                FeeError::NoBracketMatchError { .. } => ErrorSeverity::Low,
                _ => ErrorSeverity::High,
            },
            ErrorCategory::ReferenceData | ErrorCategory::Configuration => {
                ErrorSeverity::Critical
            }
            ErrorCategory::System => ErrorSeverity::Medium,
        }
    }

    /// Status code the excluded HTTP layer should answer with.
    pub fn http_status(&self) -> u16 {
        match (self.category(), self) {
            (ErrorCategory::Input, _) | (_, FeeError::SerializationError(_)) => 400,
            _ => 500,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            FeeError::InvalidDimensionsError { .. } => {
                "Provide non-negative numeric length, height, width and weight, with at least one above zero"
            }
            FeeError::InvalidDayRangeError { .. } => "Provide days as a non-negative integer",
            FeeError::NoBracketMatchError { .. } => {
                "Check that max_weights.csv covers the parcel's effective weight"
            }
            FeeError::ReferenceDataError { .. } | FeeError::CsvError(_) => {
                "Fix the reference table named in the message and restart"
            }
            FeeError::ConfigValidationError { .. }
            | FeeError::InvalidConfigValueError { .. }
            | FeeError::MissingConfigError { .. } => {
                "Review the TOML configuration file and command line flags"
            }
            FeeError::IoError(_) => "Check that the file exists and is readable",
            FeeError::SerializationError(_) => "Check that the input is well-formed JSON",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            FeeError::InvalidDimensionsError { field, reason, .. } => {
                format!("Parcel {} is invalid: {}", field, reason)
            }
            FeeError::InvalidDayRangeError { reason, .. } => {
                format!("Day count is invalid: {}", reason)
            }
            FeeError::NoBracketMatchError { .. } => {
                "No fee bracket applies to this parcel".to_string()
            }
            FeeError::ReferenceDataError { table, .. } => {
                format!("Fee schedule '{}' could not be used", table)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FeeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_input_errors_map_to_bad_request() {
        let err = FeeError::invalid_dimension("length", "-1", "must not be negative");
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.http_status(), 400);
        assert_eq!(err.severity(), ErrorSeverity::High);

        let err = FeeError::NoBracketMatchError { weight: dec!(3) };
        assert_eq!(err.severity(), ErrorSeverity::Low);
    }

    #[test]
    fn test_reference_errors_are_critical() {
        let err = FeeError::reference_data("thresholds", "table is empty");
        assert_eq!(err.http_status(), 500);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.to_string().contains("thresholds"));
    }
}
