//! Eager, fail-closed batch validation.
//!
//! Every validator here is two-phase: records are checked into a temporary
//! collection first, and the batch is returned only if every record
//! conformed. The first non-conforming record aborts the whole batch with
//! its index and offending field; a partial/valid subset is never
//! returned.

use crate::error::{PipelineError, Result};
use crate::reconcile::ReconciledCard;
use crate::types::{CardPricingRecord, SeriesRecord, SetRecord};
use serde_json::Value;
use std::collections::HashSet;

fn invalid(index: usize, field: &str, reason: &str) -> PipelineError {
    PipelineError::Validation {
        index,
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// Validates reconciled cards into canonical pricing records.
///
/// Required: positive product id, unique per batch; non-empty name;
/// non-empty card number. A negative market price is a failure; an absent
/// one is not.
pub fn validate_pricing_batch(cards: &[ReconciledCard]) -> Result<Vec<CardPricingRecord>> {
    let mut validated = Vec::with_capacity(cards.len());
    let mut seen_ids = HashSet::new();

    for (index, card) in cards.iter().enumerate() {
        if card.name.trim().is_empty() {
            return Err(invalid(index, "name", "must not be empty"));
        }
        let card_number = match &card.card_number {
            Some(number) if !number.trim().is_empty() => number.clone(),
            Some(_) => return Err(invalid(index, "card_number", "must not be empty")),
            None => return Err(invalid(index, "card_number", "missing")),
        };
        if let Some(price) = card.market_price {
            if price < 0.0 {
                return Err(invalid(index, "market_price", "must not be negative"));
            }
        }
        if !seen_ids.insert(card.product_id) {
            return Err(invalid(index, "product_id", "duplicate within batch"));
        }

        validated.push(CardPricingRecord {
            product_id: card.product_id,
            name: card.name.clone(),
            card_number,
            market_price: card.market_price,
        });
    }

    Ok(validated)
}

/// Validates raw series-index entries: {id, name} required strings,
/// logo an optional URL.
pub fn validate_series_batch(entries: &[Value]) -> Result<Vec<SeriesRecord>> {
    let mut validated = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        let id = require_str(entry, index, "id")?;
        let name = require_str(entry, index, "name")?;
        let logo = optional_url(entry, index, "logo")?;

        validated.push(SeriesRecord { id, name, logo });
    }

    Ok(validated)
}

/// Validates per-set summary rows built from a series detail document.
pub fn validate_set_batch(entries: &[Value]) -> Result<Vec<SetRecord>> {
    let mut validated = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        validated.push(SetRecord {
            series_id: require_str(entry, index, "series_id")?,
            set_id: require_str(entry, index, "set_id")?,
            set_name: require_str(entry, index, "set_name")?,
            official_card_count: optional_int(entry, index, "official_card_count")?,
            total_card_count: optional_int(entry, index, "total_card_count")?,
            logo: optional_str(entry, index, "logo")?,
            symbol: optional_str(entry, index, "symbol")?,
        });
    }

    Ok(validated)
}

fn require_str(entry: &Value, index: usize, field: &str) -> Result<String> {
    match entry.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(invalid(index, field, "must not be empty")),
        Some(_) => Err(invalid(index, field, "wrong type, expected string")),
        None => Err(invalid(index, field, "missing")),
    }
}

fn optional_str(entry: &Value, index: usize, field: &str) -> Result<Option<String>> {
    match entry.get(field) {
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(invalid(index, field, "wrong type, expected string")),
    }
}

fn optional_int(entry: &Value, index: usize, field: &str) -> Result<Option<i64>> {
    match entry.get(field) {
        Some(Value::Number(n)) => match n.as_i64() {
            Some(v) => Ok(Some(v)),
            None => Err(invalid(index, field, "wrong type, expected integer")),
        },
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(invalid(index, field, "wrong type, expected integer")),
    }
}

fn optional_url(entry: &Value, index: usize, field: &str) -> Result<Option<String>> {
    match optional_str(entry, index, field)? {
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => Ok(Some(url)),
        Some(_) => Err(invalid(index, field, "not a valid URL")),
        None => Ok(None),
    }
}
