use serde::{Deserialize, Serialize};

/// One nested card document as returned by the catalog API.
pub type RawCardData = serde_json::Value;

/// A name/value pair from a product's `extendedData` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtendedField {
    pub name: String,
    pub value: String,
}

/// Upstream catalog entry from the product API. Discarded after
/// reconciliation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProduct {
    pub product_id: i64,
    pub name: String,
    #[serde(default)]
    pub extended_data: Vec<ExtendedField>,
}

/// Upstream price entry from the price API. Discarded after
/// reconciliation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPrice {
    pub product_id: i64,
    pub market_price: Option<f64>,
    pub sub_type_name: String,
}

/// Envelope both pricing endpoints wrap their payloads in.
#[derive(Debug, Deserialize)]
pub struct ResultsEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// A validated, reconciled card pricing row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardPricingRecord {
    pub product_id: i64,
    pub name: String,
    pub card_number: String,
    pub market_price: Option<f64>,
}

/// A validated series-index entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRecord {
    pub id: String,
    pub name: String,
    pub logo: Option<String>,
}

/// A validated per-set summary row, flattened from a series detail
/// document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetRecord {
    pub series_id: String,
    pub set_id: String,
    pub set_name: String,
    pub official_card_count: Option<i64>,
    pub total_card_count: Option<i64>,
    pub logo: Option<String>,
    pub symbol: Option<String>,
}
