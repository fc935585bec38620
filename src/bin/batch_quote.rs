use anyhow::Context;
use clap::Parser;
use fulfillment_fee_engine::adapters::csv_tables::write_rows;
use fulfillment_fee_engine::core::threshold_price::present;
use fulfillment_fee_engine::domain::request::RequestBody;
use fulfillment_fee_engine::utils::{logger, validation::Validate};
use fulfillment_fee_engine::{CalculationRequest, Channel, EngineConfig, FeeEngine, LocalStorage, ReferenceData};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "batch-quote")]
#[command(about = "Quote fulfillment fees for every parcel in a CSV file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// CSV with columns length,height,width,weight,days[,channel]
    #[arg(short, long)]
    input: String,

    /// Output CSV path
    #[arg(short, long, default_value = "quotes.csv")]
    output: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Deserialize)]
struct ParcelRow {
    length: String,
    height: String,
    width: String,
    weight: String,
    #[serde(default)]
    days: String,
    #[serde(default)]
    channel: Option<Channel>,
}

impl From<ParcelRow> for RequestBody {
    fn from(row: ParcelRow) -> Self {
        RequestBody {
            length: Value::String(row.length),
            height: Value::String(row.height),
            width: Value::String(row.width),
            weight: Value::String(row.weight),
            days: Value::String(row.days),
            channel: row.channel,
        }
    }
}

#[derive(Debug, Serialize)]
struct QuoteRow {
    line: usize,
    plc_name: String,
    girth: String,
    fulfillment_cost: String,
    threshold_price: String,
    total_fulfillment_price: String,
    status: bool,
    message: String,
}

impl QuoteRow {
    fn rejected(line: usize, message: String) -> Self {
        Self {
            line,
            plc_name: String::new(),
            girth: String::new(),
            fulfillment_cost: String::new(),
            threshold_price: String::new(),
            total_fulfillment_price: String::new(),
            status: false,
            message,
        }
    }
}

fn quote<R: ReferenceData>(engine: &FeeEngine<R>, line: usize, row: ParcelRow) -> QuoteRow {
    let scale = engine.settings().presentation_scale;
    let outcome = CalculationRequest::try_from(RequestBody::from(row))
        .and_then(|request| engine.compute_fulfillment_cost(&request));

    match outcome {
        Ok(result) => QuoteRow {
            line,
            plc_name: result.plc_name.clone().unwrap_or_default(),
            girth: result.girth.girth_value.to_string(),
            fulfillment_cost: present(result.fulfillment_cost, scale),
            threshold_price: present(result.threshold_price(), scale),
            total_fulfillment_price: present(result.total_fulfillment_price, scale),
            status: true,
            message: String::new(),
        },
        Err(e) => {
            tracing::warn!("Line {} rejected: {}", line, e);
            QuoteRow::rejected(line, e.user_friendly_message())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path).with_context(|| format!("loading {}", path))?,
        None => EngineConfig::default(),
    };
    config.validate().context("validating configuration")?;

    let tables = config.load_tables().await.context("loading fee schedules")?;
    let engine = FeeEngine::with_settings(tables, config.engine_settings());

    tracing::info!("📁 Reading parcels from {}", args.input);
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(&args.input)
        .with_context(|| format!("opening {}", args.input))?;

    let mut quotes = Vec::new();
    for (index, row) in reader.deserialize::<ParcelRow>().enumerate() {
        let line = index + 2;
        quotes.push(match row {
            Ok(row) => quote(&engine, line, row),
            Err(e) => QuoteRow::rejected(line, e.to_string()),
        });
    }
    let quoted = quotes.iter().filter(|q| q.status).count();
    let rejected = quotes.len() - quoted;

    // relative output paths resolve against the working directory
    let storage = LocalStorage::new(".".to_string());
    write_rows(&storage, &args.output, &quotes)
        .await
        .with_context(|| format!("writing {}", args.output))?;

    tracing::info!("✅ {} quoted, {} rejected, written to {}", quoted, rejected, args.output);
    println!("✅ {} quoted, {} rejected", quoted, rejected);
    println!("📁 Output saved to: {}", args.output);
    Ok(())
}
