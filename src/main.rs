use clap::Parser;
use fulfillment_fee_engine::utils::error::ErrorSeverity;
use fulfillment_fee_engine::utils::{logger, validation::Validate};
use fulfillment_fee_engine::{CalculationRequest, CliConfig, FeeEngine, FeeError, FeeResponse};

fn exit_code(error: &FeeError) -> i32 {
    match error.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(error: FeeError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        error,
        error.category(),
        error.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", error.recovery_suggestion());
    eprintln!("❌ {}", error.user_friendly_message());
    eprintln!("💡 {}", error.recovery_suggestion());
    std::process::exit(exit_code(&error).max(1));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.engine_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    if config.json_logs() {
        logger::init_json_logger(if cli.verbose { "debug" } else { config.log_level() });
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting {} v{}", config.engine.name, config.engine.version);
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = config.validate() {
        fail(e);
    }

    let tables = match config.load_tables().await {
        Ok(tables) => tables,
        Err(e) => fail(e),
    };
    let engine = FeeEngine::with_settings(tables, config.engine_settings());

    let request = match cli.request_body().and_then(CalculationRequest::try_from) {
        Ok(request) => request,
        Err(e) => {
            let (status, response) = FeeResponse::from_outcome(Err(e), config.presentation_scale());
            println!("{}", response.to_json()?);
            std::process::exit(if status >= 500 { 3 } else { 1 });
        }
    };

    let outcome = engine.compute_fulfillment_cost(&request);
    let code = outcome.as_ref().err().map(exit_code).unwrap_or(0);
    let (status, response) = FeeResponse::from_outcome(outcome, config.presentation_scale());

    let body = if cli.pretty {
        response.to_json_pretty()?
    } else {
        response.to_json()?
    };
    println!("{}", body);

    if response.status {
        tracing::info!("✅ Quote completed (HTTP {})", status);
    } else {
        tracing::warn!("Quote rejected (HTTP {})", status);
    }

    if code > 0 {
        std::process::exit(code);
    }

    Ok(())
}
