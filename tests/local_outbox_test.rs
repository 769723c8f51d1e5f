#![cfg(feature = "cli")]

use anyhow::Result;
use clap::Parser;
use httpmock::prelude::*;
use solar_curtail::{CliArgs, ControlEngine, LocalPublisher, MarketPriceClient, RunOutcome};
use tempfile::TempDir;

fn quarter_hour_curve() -> serde_json::Value {
    // 15-minute buckets around 12:00 UTC, given in market-local offsets.
    serde_json::json!({
        "data": {"marketPrices": {"electricityPrices": [
            {"from": "2025-07-10T13:45:00+02:00", "till": "2025-07-10T14:00:00+02:00", "marketPrice": 0.02, "perUnit": "KWH"},
            {"from": "2025-07-10T14:00:00+02:00", "till": "2025-07-10T14:15:00+02:00", "marketPrice": 0.005, "perUnit": "KWH"},
            {"from": "2025-07-10T14:15:00+02:00", "till": "2025-07-10T14:30:00+02:00", "marketPrice": 0.03, "perUnit": "KWH"}
        ]}}
    })
}

#[tokio::test]
async fn test_cli_cycle_writes_command_to_outbox() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/graphql")
                .body_contains("2025-07-10");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(quarter_hour_curve());
        })
        .await;

    let args = CliArgs::parse_from([
        "solar-curtail",
        "--device-id",
        "shelly-garage",
        "--output-path",
        &output_path,
        "--price-api-url",
        &server.url("/graphql"),
        "--at",
        "2025-07-10T12:00:00Z",
    ]);
    let config = args.into_config()?;
    let at = config.at.unwrap();

    let prices = MarketPriceClient::new(&config.settings)?;
    let publisher = LocalPublisher::new(output_path.clone());
    let outbox = publisher.outbox_path();
    let engine = ControlEngine::new(prices, publisher, config);

    let outcome = engine.run_at(at).await?;
    api_mock.assert_async().await;

    // 12:00Z is exactly the start of the 0.005 bucket, which the fee pushes below zero.
    match &outcome {
        RunOutcome::Published { decision, .. } => assert_eq!(decision.market_price, 0.005),
        other => panic!("unexpected outcome: {:?}", other),
    }

    let content = std::fs::read_to_string(&outbox)?;
    let lines: Vec<serde_json::Value> = content
        .lines()
        .map(|line| serde_json::from_str::<serde_json::Value>(line))
        .collect::<std::result::Result<_, _>>()?;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["topic"], "shelly-garage/command/switch:0");
    assert_eq!(lines[0]["payload"]["command"], "on");
    assert_eq!(lines[0]["payload"]["timestamp"], "2025-07-10T12:00:00Z");

    Ok(())
}

#[tokio::test]
async fn test_cli_cycle_before_contract_writes_nothing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200).json_body(quarter_hour_curve());
        })
        .await;

    let args = CliArgs::parse_from([
        "solar-curtail",
        "--device-id",
        "shelly-garage",
        "--output-path",
        &output_path,
        "--price-api-url",
        &server.url("/graphql"),
        "--contract-start",
        "2025-07-02T00:00:00+02:00",
        "--at",
        "2025-07-01T21:00:00Z",
    ]);
    let config = args.into_config()?;
    let at = config.at.unwrap();

    let prices = MarketPriceClient::new(&config.settings)?;
    let publisher = LocalPublisher::new(output_path);
    let outbox = publisher.outbox_path();
    let engine = ControlEngine::new(prices, publisher, config);

    let outcome = engine.run_at(at).await?;

    assert!(matches!(outcome, RunOutcome::Skipped { .. }));
    api_mock.assert_hits_async(0).await;
    assert!(!outbox.exists());

    Ok(())
}
