use crate::config::Config;
use crate::constants::{
    product_group_for_set, supported_set_codes, CARD_SET_IDS, PRICING_CATEGORY_ID,
    SERIES_ALLOWLIST, SET_PRODUCT_GROUPS, TRAINER_GALLERY_MARKER,
};
use crate::error::{PipelineError, Result};
use crate::fetch::{build_client, fetch_json};
use crate::flatten::flatten_card;
use crate::reconcile::reconcile;
use crate::table::Table;
use crate::types::{RawPrice, RawProduct, ResultsEnvelope, SeriesRecord};
use crate::validate::{validate_pricing_batch, validate_series_batch, validate_set_batch};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

/// Sequential multi-source extraction pipelines.
///
/// Sources are processed strictly one after another; a run either
/// completes all of them or fails on the first unrecoverable error, and no
/// partial table is ever returned. The only per-item failure tolerance is
/// the card-detail fetch loop, where a failing card URL is logged and
/// skipped so the rest of the set can proceed.
pub struct Pipeline {
    client: reqwest::Client,
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Result<Self> {
        let client = build_client(config.api.timeout_seconds)?;
        Ok(Self { client, config })
    }

    /// Pricing pipeline: one batch per entry of the static set table,
    /// reconciled against the price list and validated fail-closed.
    ///
    /// `only_sets` restricts the run to a subset of set codes; the static
    /// table's order still determines batch order. An unknown code, or a
    /// filter naming no codes at all, is a configuration error.
    #[instrument(skip(self))]
    pub async fn run_pricing(&self, only_sets: Option<&[String]>) -> Result<Table> {
        if let Some(requested) = only_sets {
            if requested.is_empty() {
                return Err(PipelineError::Config(
                    "set filter must name at least one set code".to_string(),
                ));
            }
            for code in requested {
                if product_group_for_set(code).is_none() {
                    return Err(PipelineError::Config(format!(
                        "unknown set code '{}', supported: {}",
                        code,
                        supported_set_codes().join(", ")
                    )));
                }
            }
        }

        let mut batches = Vec::new();

        for (set_code, group_id) in SET_PRODUCT_GROUPS {
            if let Some(requested) = only_sets {
                if !requested.iter().any(|code| code == set_code) {
                    continue;
                }
            }
            info!("Processing set: {}", set_code);
            let batch = self.pricing_batch(*group_id).await?;
            batches.push(ensure_non_empty(batch, set_code)?);
        }

        Ok(Table::concat(batches))
    }

    async fn pricing_batch(&self, group_id: u32) -> Result<Table> {
        let base = &self.config.api.pricing_base_url;
        let products_url = format!("{base}/{PRICING_CATEGORY_ID}/{group_id}/products");
        let prices_url = format!("{base}/{PRICING_CATEGORY_ID}/{group_id}/prices");

        let products_doc = fetch_json(&self.client, &products_url).await?;
        let prices_doc = fetch_json(&self.client, &prices_url).await?;

        let products: ResultsEnvelope<RawProduct> = serde_json::from_value(products_doc)?;
        let prices: ResultsEnvelope<RawPrice> = serde_json::from_value(prices_doc)?;

        let reconciled = reconcile(&products.results, &prices.results);
        let validated = validate_pricing_batch(&reconciled)?;
        info!("Validation passed for {} cards", validated.len());

        Table::from_records(&validated)
    }

    /// Series pipeline: the catalog API's series index, validated and
    /// filtered to the configured allowlist.
    #[instrument(skip(self))]
    pub async fn run_series(&self) -> Result<Table> {
        let url = format!("{}/series", self.config.api.catalog_base_url);
        let doc = fetch_json(&self.client, &url).await?;

        let entries = doc
            .as_array()
            .ok_or_else(|| PipelineError::MissingField("series index array".into()))?;
        let validated = validate_series_batch(entries)?;
        info!("Validation passed for {} series entries", validated.len());

        let kept: Vec<SeriesRecord> = validated
            .into_iter()
            .filter(|s| SERIES_ALLOWLIST.contains(&s.id.as_str()))
            .collect();

        ensure_non_empty(Table::from_records(&kept)?, "series")
    }

    /// Set pipeline: one batch per allowlisted series, each row a set
    /// summary with its nested card counts flattened.
    #[instrument(skip(self))]
    pub async fn run_sets(&self) -> Result<Table> {
        let mut batches = Vec::new();

        for series_id in SERIES_ALLOWLIST {
            info!("Processing series: {}", series_id);
            let url = format!("{}/series/{}", self.config.api.catalog_base_url, series_id);
            let doc = fetch_json(&self.client, &url).await?;
            let batch = self.set_batch(&doc)?;
            batches.push(ensure_non_empty(batch, series_id)?);
        }

        Ok(Table::concat(batches))
    }

    fn set_batch(&self, series_doc: &Value) -> Result<Table> {
        let series_id = series_doc.get("id").cloned().unwrap_or(Value::Null);
        let sets = series_doc
            .get("sets")
            .and_then(Value::as_array)
            .ok_or_else(|| PipelineError::MissingField("sets not found".into()))?;

        let candidates: Vec<Value> = sets
            .iter()
            .map(|s| {
                json!({
                    "series_id": series_id,
                    "set_id": s.get("id"),
                    "set_name": s.get("name"),
                    "official_card_count": s.pointer("/cardCount/official"),
                    "total_card_count": s.pointer("/cardCount/total"),
                    "logo": s.get("logo"),
                    "symbol": s.get("symbol"),
                })
            })
            .collect();

        let validated = validate_set_batch(&candidates)?;
        info!("Validation passed for {} set entries", validated.len());

        Table::from_records(&validated)
    }

    /// Card pipeline: one batch per configured set, each row a flattened
    /// card detail document.
    #[instrument(skip(self))]
    pub async fn run_cards(&self) -> Result<Table> {
        let mut batches = Vec::new();

        for set_id in CARD_SET_IDS {
            info!("Collecting cards for set: {}", set_id);
            let batch = self.card_batch(set_id).await?;
            batches.push(ensure_non_empty(batch, set_id)?);
        }

        Ok(Table::concat(batches))
    }

    async fn card_batch(&self, set_id: &str) -> Result<Table> {
        let base = &self.config.api.catalog_base_url;
        let set_url = format!("{base}/sets/{set_id}");
        let set_doc = fetch_json(&self.client, &set_url).await?;

        let cards = set_doc
            .get("cards")
            .and_then(Value::as_array)
            .ok_or_else(|| PipelineError::MissingField("cards not found".into()))?;

        // Trainer-gallery reprints are skipped when deriving detail URLs
        let card_ids: Vec<&str> = cards
            .iter()
            .filter_map(|c| c.get("id").and_then(Value::as_str))
            .filter(|id| !id.contains(TRAINER_GALLERY_MARKER))
            .collect();

        let mut table = Table::new();
        for card_id in card_ids {
            let card_url = format!("{base}/cards/{card_id}");
            // A single failing card URL is logged and skipped so the rest
            // of the set can proceed; catalog/price/series/set fetches
            // stay fatal.
            match fetch_json(&self.client, &card_url).await {
                Ok(card) => {
                    info!(
                        "Retrieved card: {} - {}",
                        card_id,
                        card.get("name").and_then(|v| v.as_str()).unwrap_or("Unknown")
                    );
                    table.push_row(flatten_card(&card));
                    // Pace only successful retrievals
                    tokio::time::sleep(std::time::Duration::from_millis(
                        self.config.api.card_fetch_delay_ms,
                    ))
                    .await;
                }
                Err(e) => {
                    warn!("Failed to fetch {}: {}", card_url, e);
                }
            }
        }

        Ok(table)
    }
}

/// The all-or-nothing invariant: a structurally empty batch aborts the
/// whole aggregate before any concatenation, so a downstream drop+replace
/// load can never wipe prior data with an empty result.
fn ensure_non_empty(batch: Table, source_id: &str) -> Result<Table> {
    if batch.is_structurally_empty() {
        return Err(PipelineError::EmptyBatch {
            source_id: source_id.to_string(),
        });
    }
    Ok(batch)
}
