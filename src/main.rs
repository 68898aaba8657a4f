use anyhow::Context;
use clap::Parser;
use meetpoint::utils::error::{ErrorSeverity, MeetError};
use meetpoint::utils::{logger, validation::Validate};
use meetpoint::{
    CliConfig, GeocodeCache, MapboxClient, MeetingPointEngine, MeetingPointResponse, TomlConfig,
};
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli.addresses);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<MeetError>() {
            Some(err) => {
                tracing::error!(
                    "Resolution failed: {} (Category: {:?}, Severity: {:?})",
                    err,
                    err.category(),
                    err.severity()
                );
                eprintln!("❌ {}", err.user_friendly_message());
                eprintln!("💡 {}", err.recovery_suggestion());
                match err.severity() {
                    ErrorSeverity::Low => ExitCode::SUCCESS,
                    ErrorSeverity::Medium => ExitCode::from(2),
                    ErrorSeverity::High => ExitCode::from(1),
                    ErrorSeverity::Critical => ExitCode::from(3),
                }
            }
            None => {
                tracing::error!("Resolution failed: {:#}", e);
                eprintln!("❌ {:#}", e);
                ExitCode::from(1)
            }
        },
    }
}

async fn run(cli: &CliConfig) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => TomlConfig::from_file(path)
            .with_context(|| format!("failed to load config file '{}'", path))?,
        None => TomlConfig::default(),
    };
    config.validate()?;

    let token = cli
        .token
        .as_deref()
        .or_else(|| config.mapbox.token())
        .ok_or_else(|| MeetError::MissingConfig {
            field: "MAPBOX_TOKEN".to_string(),
        })?;

    let request = cli.to_request(config.engine.default_budget)?;
    let client = Arc::new(MapboxClient::new(&config.mapbox, token)?);
    let cache = GeocodeCache::from_settings(&config.cache);
    let engine = MeetingPointEngine::new(
        client.clone(),
        client.clone(),
        client,
        cache,
        config.engine.clone(),
    );

    let result = engine.resolve(&request).await?;
    tracing::info!("Outcome: {:?} at {} min", result.outcome(), result.effective_budget());

    let json = MeetingPointResponse::from(&result).to_json(cli.pretty)?;
    println!("{}", json);
    Ok(())
}
