use crate::constants::{EXCLUDED_PRICE_SUBTYPE, PATTERN_VARIANT_MARKERS};
use crate::normalize::normalize_card_name;
use crate::types::{RawPrice, RawProduct};
use std::collections::HashMap;

/// A product joined with its market price, before schema validation.
/// `card_number` is still optional here; its absence becomes a validation
/// failure downstream.
#[derive(Debug, Clone)]
pub struct ReconciledCard {
    pub product_id: i64,
    pub name: String,
    pub card_number: Option<String>,
    pub market_price: Option<f64>,
}

/// A product is a card when it carries a "Number" extended field;
/// accessories and sealed product do not.
pub fn is_card(product: &RawProduct) -> bool {
    product.extended_data.iter().any(|f| f.name == "Number")
}

/// The card number from the first "Number" extended field, if any.
pub fn card_number(product: &RawProduct) -> Option<String> {
    product
        .extended_data
        .iter()
        .find(|f| f.name == "Number")
        .map(|f| f.value.clone())
}

fn is_pattern_variant(product: &RawProduct) -> bool {
    PATTERN_VARIANT_MARKERS
        .iter()
        .any(|marker| product.name.contains(marker))
}

/// Joins the product catalog against the price list by product id.
///
/// Reverse-foil price rows are excluded from the index up front: the two
/// lists share product ids across printings, and without the exclusion a
/// reverse-foil entry can overwrite the standard price for the same id.
/// A product with no surviving price entry is not an error; its market
/// price is simply absent. Output preserves product input order.
pub fn reconcile(products: &[RawProduct], prices: &[RawPrice]) -> Vec<ReconciledCard> {
    let price_by_product: HashMap<i64, Option<f64>> = prices
        .iter()
        .filter(|p| p.sub_type_name != EXCLUDED_PRICE_SUBTYPE)
        .map(|p| (p.product_id, p.market_price))
        .collect();

    products
        .iter()
        .filter(|p| is_card(p))
        .filter(|p| !is_pattern_variant(p))
        .map(|product| ReconciledCard {
            product_id: product.product_id,
            name: normalize_card_name(&product.name),
            card_number: card_number(product),
            market_price: price_by_product
                .get(&product.product_id)
                .copied()
                .flatten(),
        })
        .collect()
}
