use anyhow::Result;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tcg_pipeline::config::Config;
use tcg_pipeline::error::PipelineError;
use tcg_pipeline::flatten::flatten_card;
use tcg_pipeline::load::{JsonFileLoader, LoadStage};
use tcg_pipeline::pipeline::Pipeline;
use tcg_pipeline::reconcile::reconcile;
use tcg_pipeline::table::Table;
use tcg_pipeline::types::{RawPrice, RawProduct, ResultsEnvelope};
use tcg_pipeline::validate::validate_pricing_batch;
use tempfile::tempdir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serves canned JSON responses on a local port, one request per
/// connection. Unknown paths get a 404.
async fn spawn_catalog_stub(routes: HashMap<String, (u16, Value)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let routes = routes.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]).to_string();
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();

                let (status, body) = routes
                    .get(&path)
                    .map(|(status, body)| (*status, body.to_string()))
                    .unwrap_or((404, "{}".to_string()));
                let reason = if status == 200 { "OK" } else { "Error" };
                let response = format!(
                    "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{addr}")
}

fn stub_config(base_url: &str, card_fetch_delay_ms: u64) -> Config {
    let mut config = Config::default();
    config.api.catalog_base_url = base_url.to_string();
    config.api.pricing_base_url = base_url.to_string();
    config.api.timeout_seconds = 5;
    config.api.card_fetch_delay_ms = card_fetch_delay_ms;
    config
}

/// Canned product payload in the upstream envelope shape: two cards, one
/// accessory, one cosmetic pattern variant.
fn products_payload() -> Value {
    json!({
        "results": [
            {
                "productId": 501,
                "name": "Pikachu - 025/198",
                "extendedData": [
                    { "name": "Number", "value": "025/198" },
                    { "name": "Rarity", "value": "Common" }
                ]
            },
            {
                "productId": 502,
                "name": "Scarlet & Violet Booster Box",
                "extendedData": []
            },
            {
                "productId": 503,
                "name": "Charmander (Poke Ball Pattern) - 004/198",
                "extendedData": [ { "name": "Number", "value": "004/198" } ]
            },
            {
                "productId": 504,
                "name": "Pokémon Catcher (Full Art) - 154/198",
                "extendedData": [ { "name": "Number", "value": "154/198" } ]
            }
        ]
    })
}

fn prices_payload() -> Value {
    json!({
        "results": [
            { "productId": 501, "marketPrice": 1.25, "subTypeName": "Normal" },
            { "productId": 501, "marketPrice": 7.80, "subTypeName": "Reverse Holofoil" },
            { "productId": 504, "marketPrice": 0.15, "subTypeName": "Reverse Holofoil" }
        ]
    })
}

#[tokio::test]
async fn pricing_batch_flows_from_raw_payload_to_artifact() -> Result<()> {
    let products: ResultsEnvelope<RawProduct> = serde_json::from_value(products_payload())?;
    let prices: ResultsEnvelope<RawPrice> = serde_json::from_value(prices_payload())?;

    let reconciled = reconcile(&products.results, &prices.results);
    let validated = validate_pricing_batch(&reconciled)?;

    // Accessory and pattern variant dropped; names normalized
    assert_eq!(validated.len(), 2);
    assert_eq!(validated[0].name, "Pikachu");
    assert_eq!(validated[0].market_price, Some(1.25));
    assert_eq!(validated[1].name, "Pokemon Catcher");
    // Only a reverse-foil price existed for 504, so its price is absent
    assert_eq!(validated[1].market_price, None);

    let batch = Table::from_records(&validated)?;
    assert!(!batch.is_structurally_empty());
    assert_eq!(
        batch.columns(),
        &["product_id", "name", "card_number", "market_price"]
    );

    let temp_dir = tempdir()?;
    let loader = JsonFileLoader::new(temp_dir.path().to_string_lossy());
    let artifact = loader.write_table(&batch, "pricing").await?;

    let records: Vec<Value> = serde_json::from_str(&std::fs::read_to_string(&artifact)?)?;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["card_number"], json!("025/198"));
    assert_eq!(records[1]["market_price"], Value::Null);
    Ok(())
}

#[tokio::test]
async fn batch_with_one_bad_record_never_reaches_the_loader() -> Result<()> {
    // Record without a Number field survives reconciliation only if the
    // predicate is bypassed upstream; simulate that by blanking the number
    let products: ResultsEnvelope<RawProduct> = serde_json::from_value(json!({
        "results": [
            {
                "productId": 601,
                "name": "Squirtle - 007/198",
                "extendedData": [ { "name": "Number", "value": "007/198" } ]
            },
            {
                "productId": 602,
                "name": "Wartortle - 008/198",
                "extendedData": [ { "name": "Number", "value": "  " } ]
            }
        ]
    }))?;

    let reconciled = reconcile(&products.results, &[]);
    let validation = validate_pricing_batch(&reconciled);
    assert!(validation.is_err(), "whole batch must be rejected");

    // Fail-closed means zero artifacts: the loader is only reached with a
    // fully validated batch
    let temp_dir = tempdir()?;
    if let Ok(validated) = validation {
        let loader = JsonFileLoader::new(temp_dir.path().to_string_lossy());
        loader
            .write_table(&Table::from_records(&validated)?, "pricing")
            .await?;
    }
    assert_eq!(std::fs::read_dir(temp_dir.path())?.count(), 0);
    Ok(())
}

#[tokio::test]
async fn card_run_skips_failing_cards_and_trainer_gallery_reprints() -> Result<()> {
    let routes = HashMap::from([
        (
            "/sets/me02".to_string(),
            (
                200,
                json!({
                    "id": "me02",
                    "cards": [
                        { "id": "me02-001" },
                        { "id": "me02-002" },
                        { "id": "me02-003-TG" }
                    ]
                }),
            ),
        ),
        (
            "/cards/me02-001".to_string(),
            (
                200,
                json!({
                    "id": "me02-001",
                    "name": "Pikachu",
                    "hp": 60,
                    "attacks": [ { "name": "Gnaw", "cost": ["Colorless"] } ]
                }),
            ),
        ),
        ("/cards/me02-002".to_string(), (500, json!({}))),
        (
            "/cards/me02-003-TG".to_string(),
            (200, json!({ "id": "me02-003-TG", "name": "Trainer Gallery" })),
        ),
    ]);
    let base_url = spawn_catalog_stub(routes).await;
    let pipeline = Pipeline::new(stub_config(&base_url, 0))?;

    let table = pipeline.run_cards().await?;

    // The failing card is skipped, the -TG reprint is never requested
    assert_eq!(table.row_count(), 1);
    let dense = table.to_dense_records();
    assert_eq!(dense[0]["name"], json!("Pikachu"));
    assert_eq!(dense[0]["attack_1_cost"], json!("Colorless"));
    Ok(())
}

#[tokio::test]
async fn pacing_applies_only_after_a_successful_card_fetch() -> Result<()> {
    // The only card in the set fails, and the configured pause is far
    // longer than the test timeout: the run finishes promptly only if
    // failed fetches are not paced.
    let routes = HashMap::from([
        (
            "/sets/me02".to_string(),
            (200, json!({ "id": "me02", "cards": [ { "id": "me02-009" } ] })),
        ),
        ("/cards/me02-009".to_string(), (500, json!({}))),
    ]);
    let base_url = spawn_catalog_stub(routes).await;
    let pipeline = Pipeline::new(stub_config(&base_url, 60_000))?;

    let result = tokio::time::timeout(Duration::from_secs(5), pipeline.run_cards())
        .await
        .expect("run must finish without pacing the failed fetch");

    // With every card skipped the set's batch is empty, which the
    // aggregate refuses to hand off
    match result.unwrap_err() {
        PipelineError::EmptyBatch { source_id } => assert_eq!(source_id, "me02"),
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[test]
fn flattened_cards_of_mixed_width_concatenate_by_column_union() {
    let pikachu = json!({
        "id": "me02-025",
        "name": "Pikachu",
        "hp": 60,
        "types": ["Lightning"],
        "legal": { "standard": true },
        "set": { "id": "me02", "cardCount": { "official": 15, "total": 15 } },
        "attacks": [
            { "name": "Gnaw", "damage": 10, "cost": ["Colorless"] },
            { "name": "Thunder Jolt", "damage": 30, "cost": ["Lightning", "Colorless"] }
        ]
    });
    let ditto = json!({
        "id": "me02-132",
        "name": "Ditto",
        "hp": 70,
        "set": { "id": "me02" }
    });

    let batch_a = Table::from_rows(vec![flatten_card(&pikachu)]);
    let batch_b = Table::from_rows(vec![flatten_card(&ditto)]);
    let combined = Table::concat(vec![batch_a, batch_b]);

    assert_eq!(combined.row_count(), 2);
    assert!(combined.columns().contains(&"attack_2_cost".to_string()));
    assert!(!combined.columns().contains(&"attack_3_name".to_string()));

    let dense = combined.to_dense_records();
    assert_eq!(dense[0]["attack_2_cost"], json!("Lightning, Colorless"));
    assert_eq!(dense[1]["attack_1_name"], Value::Null);
    assert_eq!(dense[1]["set_cardCount_official"], Value::Null);
}
