use crate::config::toml_config::{EngineConfig, TableSource};
use crate::domain::model::Channel;
use crate::domain::request::RequestBody;
use crate::utils::error::Result;
use clap::Parser;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "fee-quote")]
#[command(about = "Quote fulfillment, girth and storage threshold fees for one parcel")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory holding product_fees.csv, max_weights.csv and thresholds.csv
    #[arg(long)]
    pub tables_dir: Option<String>,

    /// Raw JSON request body; overrides the individual measure flags
    #[arg(long)]
    pub request: Option<String>,

    #[arg(long, help = "Parcel length in cm")]
    pub length: Option<String>,

    #[arg(long, help = "Parcel height in cm")]
    pub height: Option<String>,

    #[arg(long, help = "Parcel width in cm")]
    pub width: Option<String>,

    #[arg(long, help = "Parcel weight in kg")]
    pub weight: Option<String>,

    #[arg(long, default_value = "0", help = "Delivery/storage duration in days")]
    pub days: String,

    #[arg(long, help = "Charge the cross-border order fee")]
    pub cross_border: bool,

    #[arg(long, help = "Override the volumetric divisor (cm3 per kg)")]
    pub volumetric_divisor: Option<Decimal>,

    #[arg(long, help = "Pretty-print the JSON response")]
    pub pretty: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

fn measure(value: &Option<String>) -> Value {
    value.clone().map(Value::String).unwrap_or(Value::Null)
}

impl CliConfig {
    /// File configuration with command line overrides applied.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_file(path)?,
            None => EngineConfig::default(),
        };

        if let Some(dir) = &self.tables_dir {
            config.tables.source = TableSource::Files;
            config.tables.base_path = Some(dir.clone());
        }
        if let Some(divisor) = self.volumetric_divisor {
            config.girth.volumetric_divisor = Some(divisor);
        }

        Ok(config)
    }

    pub fn request_body(&self) -> Result<RequestBody> {
        if let Some(raw) = &self.request {
            return RequestBody::from_json(raw);
        }

        Ok(RequestBody {
            length: measure(&self.length),
            height: measure(&self.height),
            width: measure(&self.width),
            weight: measure(&self.weight),
            days: Value::String(self.days.clone()),
            channel: self.cross_border.then_some(Channel::CrossBorder),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CalculationRequest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_flags_build_request() {
        let cli = CliConfig::parse_from([
            "fee-quote", "--length", "20", "--height", "10", "--width", "10", "--weight", "1", "--days", "45",
        ]);
        let request = CalculationRequest::try_from(cli.request_body().unwrap()).unwrap();
        assert_eq!(request.length, dec!(20));
        assert_eq!(request.days, 45);
        assert_eq!(request.channel, Channel::Local);
    }

    #[test]
    fn test_raw_request_wins_over_flags() {
        let cli = CliConfig::parse_from([
            "fee-quote",
            "--length",
            "99",
            "--request",
            r#"{"length": 1, "height": 2, "width": 3, "weight": 4}"#,
        ]);
        let request = CalculationRequest::try_from(cli.request_body().unwrap()).unwrap();
        assert_eq!(request.length, dec!(1));
    }

    #[test]
    fn test_overrides_apply_to_default_config() {
        let cli = CliConfig::parse_from(["fee-quote", "--tables-dir", "/srv/fees", "--volumetric-divisor", "5000"]);
        let config = cli.engine_config().unwrap();
        assert_eq!(config.tables.source, TableSource::Files);
        assert_eq!(config.tables.base_path.as_deref(), Some("/srv/fees"));
        assert_eq!(config.volumetric_divisor(), dec!(5000));
    }
}
