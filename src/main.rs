use clap::Parser;
use solar_curtail::utils::error::ErrorSeverity;
use solar_curtail::utils::{logger, validation::Validate};
use solar_curtail::{CliArgs, ControlEngine, LocalPublisher, MarketPriceClient, RunOutcome};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("Starting solar-curtail CLI");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    let config = match args.into_config().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration validation failed: {}", e);
            tracing::error!("Suggestion: {}", e.recovery_suggestion());
            eprintln!("{}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let prices = match MarketPriceClient::new(&config.settings) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    let publisher = LocalPublisher::new(config.output_path.clone());
    let outbox = publisher.outbox_path();
    let at = config.at;

    let engine = ControlEngine::new(prices, publisher, config);
    let result = match at {
        Some(now) => engine.run_at(now).await,
        None => engine.run().await,
    };

    match result {
        Ok(RunOutcome::Skipped { contract_start }) => {
            println!(
                "Contract starts at {}; nothing to do",
                contract_start.to_rfc3339()
            );
        }
        Ok(RunOutcome::Published {
            decision, topic, ..
        }) => {
            println!("{} -> {}", topic, decision.command);
            println!("{}", decision.reason);
            println!("Command written to: {}", outbox.display());
        }
        Err(e) => {
            tracing::error!(
                "Solar control failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("{}", e.user_friendly_message());
            eprintln!("Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Medium => 2, // transient, next run may succeed
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}
