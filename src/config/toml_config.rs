use crate::adapters::builtin;
use crate::adapters::csv_tables::{CsvTableLoader, TableFiles};
use crate::adapters::storage::LocalStorage;
use crate::core::engine::EngineSettings;
use crate::core::girth::DEFAULT_VOLUMETRIC_DIVISOR;
use crate::core::threshold_price::{ThresholdMode, DEFAULT_PRESENTATION_SCALE};
use crate::domain::ports::TableLoader;
use crate::domain::tables::ReferenceTables;
use crate::utils::error::{FeeError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub engine: EngineInfo,
    #[serde(default)]
    pub tables: TablesConfig,
    #[serde(default)]
    pub girth: GirthConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineInfo {
    pub name: String,
    pub description: Option<String>,
    pub version: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableSource {
    #[default]
    Builtin,
    Files,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TablesConfig {
    #[serde(default)]
    pub source: TableSource,
    pub base_path: Option<String>,
    pub fees: Option<String>,
    pub max_weights: Option<String>,
    pub thresholds: Option<String>,
}

impl TablesConfig {
    pub fn files(&self) -> TableFiles {
        let defaults = TableFiles::default();
        TableFiles {
            fees: self.fees.clone().unwrap_or(defaults.fees),
            max_weights: self.max_weights.clone().unwrap_or(defaults.max_weights),
            thresholds: self.thresholds.clone().unwrap_or(defaults.thresholds),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GirthConfig {
    pub volumetric_divisor: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingConfig {
    pub threshold_mode: Option<ThresholdMode>,
    pub presentation_scale: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub log_level: Option<String>,
    pub json_logs: Option<bool>,
}

fn env_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // ${VAR} or ${VAR:-fallback}
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").expect("static pattern")
    })
}

impl EngineConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FeeError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| FeeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Unset variables without a fallback are left as written.
    fn substitute_env_vars(content: &str) -> String {
        env_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                match (std::env::var(var_name), caps.get(2)) {
                    (Ok(value), _) => value,
                    (Err(_), Some(fallback)) => fallback.as_str().to_string(),
                    (Err(_), None) => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    pub fn volumetric_divisor(&self) -> Decimal {
        self.girth.volumetric_divisor.unwrap_or(DEFAULT_VOLUMETRIC_DIVISOR)
    }

    pub fn threshold_mode(&self) -> ThresholdMode {
        self.pricing.threshold_mode.unwrap_or_default()
    }

    pub fn presentation_scale(&self) -> u32 {
        self.pricing.presentation_scale.unwrap_or(DEFAULT_PRESENTATION_SCALE)
    }

    pub fn log_level(&self) -> &str {
        self.monitoring.log_level.as_deref().unwrap_or("info")
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring.json_logs.unwrap_or(false)
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            volumetric_divisor: self.volumetric_divisor(),
            threshold_mode: self.threshold_mode(),
            presentation_scale: self.presentation_scale(),
        }
    }

    /// Loads the configured schedules once; call at startup.
    pub async fn load_tables(&self) -> Result<ReferenceTables> {
        match self.tables.source {
            TableSource::Builtin => {
                tracing::info!("Using built-in fee schedules");
                builtin::tables()
            }
            TableSource::Files => {
                let base_path =
                    validation::validate_required_field("tables.base_path", &self.tables.base_path)?;
                let loader = CsvTableLoader::new(LocalStorage::new(base_path.clone()), self.tables.files());
                loader.load().await
            }
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("engine.name", &self.engine.name)?;
        validation::validate_positive_decimal("girth.volumetric_divisor", self.volumetric_divisor())?;
        validation::validate_range("pricing.presentation_scale", self.presentation_scale(), 0, 12)?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level()) {
            return Err(FeeError::InvalidConfigValueError {
                field: "monitoring.log_level".to_string(),
                value: self.log_level().to_string(),
                reason: format!("Valid levels: {}", valid_levels.join(", ")),
            });
        }

        if self.tables.source == TableSource::Files {
            let base_path = validation::validate_required_field("tables.base_path", &self.tables.base_path)?;
            validation::validate_path("tables.base_path", base_path)?;

            let files = self.tables.files();
            validation::validate_file_extensions(
                "tables",
                &[
                    files.fees.as_str(),
                    files.max_weights.as_str(),
                    files.thresholds.as_str(),
                ],
                &["csv"],
            )?;
        }

        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            engine: EngineInfo {
                name: "fulfillment-fee-engine".to_string(),
                description: None,
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            tables: TablesConfig::default(),
            girth: GirthConfig::default(),
            pricing: PricingConfig::default(),
            monitoring: MonitoringConfig::default(),
        }
    }
}

impl Validate for EngineConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
[engine]
name = "fees"
version = "1.0"
"#,
        )
        .unwrap();

        assert_eq!(config.tables.source, TableSource::Builtin);
        assert_eq!(config.volumetric_divisor(), dec!(6000));
        assert_eq!(config.threshold_mode(), ThresholdMode::PerVolume);
        assert_eq!(config.presentation_scale(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let config = EngineConfig::from_toml_str(
            r#"
[engine]
name = "fees"
version = "1.0"

[tables]
source = "files"
base_path = "./data"
fees = "fees.csv"

[girth]
volumetric_divisor = 5000

[pricing]
threshold_mode = "fixed"
presentation_scale = 2

[monitoring]
log_level = "debug"
json_logs = true
"#,
        )
        .unwrap();

        let settings = config.engine_settings();
        assert_eq!(settings.volumetric_divisor, dec!(5000));
        assert_eq!(settings.threshold_mode, ThresholdMode::Fixed);
        assert_eq!(settings.presentation_scale, 2);
        assert_eq!(config.tables.files().fees, "fees.csv");
        assert_eq!(config.tables.files().thresholds, "thresholds.csv");
        assert!(config.json_logs());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("FEE_ENGINE_TEST_TABLES", "/srv/fees");

        let config = EngineConfig::from_toml_str(
            r#"
[engine]
name = "fees"
version = "1.0"

[tables]
source = "files"
base_path = "${FEE_ENGINE_TEST_TABLES}"
fees = "${FEE_ENGINE_TEST_UNSET:-fallback.csv}"
"#,
        )
        .unwrap();

        assert_eq!(config.tables.base_path.as_deref(), Some("/srv/fees"));
        assert_eq!(config.tables.fees.as_deref(), Some("fallback.csv"));

        std::env::remove_var("FEE_ENGINE_TEST_TABLES");
    }

    #[test]
    fn test_config_validation() {
        let missing_base = EngineConfig::from_toml_str(
            r#"
[engine]
name = "fees"
version = "1.0"

[tables]
source = "files"
"#,
        )
        .unwrap();
        assert!(matches!(
            missing_base.validate(),
            Err(FeeError::MissingConfigError { .. })
        ));

        let zero_divisor = EngineConfig::from_toml_str(
            r#"
[engine]
name = "fees"
version = "1.0"

[girth]
volumetric_divisor = 0
"#,
        )
        .unwrap();
        assert!(zero_divisor.validate().is_err());

        let bad_level = EngineConfig::from_toml_str(
            r#"
[engine]
name = "fees"
version = "1.0"

[monitoring]
log_level = "loud"
"#,
        )
        .unwrap();
        assert!(bad_level.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[engine]\nname = \"file-test\"\nversion = \"1.0\"\n")
            .unwrap();

        let config = EngineConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.engine.name, "file-test");
    }
}
