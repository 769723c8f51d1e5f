#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use solar_curtail::config::lambda::LambdaResponse;
#[cfg(feature = "lambda")]
use solar_curtail::utils::{logger, validation::Validate};
#[cfg(feature = "lambda")]
use solar_curtail::{ControlEngine, IotDataPublisher, LambdaConfig, MarketPriceClient};

#[cfg(feature = "lambda")]
type LambdaEngine = ControlEngine<MarketPriceClient, IotDataPublisher, LambdaConfig>;

#[cfg(feature = "lambda")]
fn into_lambda_error(e: solar_curtail::ControlError) -> Error {
    tracing::error!(
        category = ?e.category(),
        severity = ?e.severity(),
        suggestion = %e.recovery_suggestion(),
        "Solar control failed: {}",
        e
    );
    Box::new(e)
}

// The schedule event carries nothing we use.
#[cfg(feature = "lambda")]
async fn function_handler(
    engine: &LambdaEngine,
    _event: LambdaEvent<serde_json::Value>,
) -> Result<LambdaResponse, Error> {
    tracing::info!("Starting solar panel control function");

    let outcome = engine.run().await.map_err(into_lambda_error)?;

    tracing::info!("Solar panel control completed successfully");
    Ok(LambdaResponse::from(&outcome))
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    // Resolved once per cold start; warm invocations reuse the engine.
    let config = LambdaConfig::from_env().map_err(into_lambda_error)?;
    config.validate().map_err(into_lambda_error)?;

    let prices = MarketPriceClient::new(&config.settings).map_err(into_lambda_error)?;
    let publisher = IotDataPublisher::from_config(&config).await;
    let engine = ControlEngine::new(prices, publisher, config);

    let engine = &engine;
    run(service_fn(move |event| async move {
        function_handler(engine, event).await
    }))
    .await
}
