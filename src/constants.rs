//! Static source tables and upstream endpoint constants.
//!
//! The set-code → product-group table is the sole source-enumeration
//! mechanism for the pricing pipeline. Order is significant: it determines
//! the row order of the aggregated output, so keep it an ordered slice
//! rather than a map. Adding a newly released set means adding an entry
//! here.

/// TCGplayer category id for the Pokemon line on the pricing API.
pub const PRICING_CATEGORY_ID: u32 = 3;

/// Ordered mapping from human-readable set code to the pricing API's
/// numeric product-group identifier.
pub const SET_PRODUCT_GROUPS: &[(&str, u32)] = &[("sv01", 22873), ("sv02", 23120)];

/// Series kept from the catalog API's series index.
pub const SERIES_ALLOWLIST: &[&str] = &["swsh", "sv", "me"];

/// Sets whose cards are collected by the card-detail pipeline.
pub const CARD_SET_IDS: &[&str] = &["me02"];

/// Price rows with this subtype are excluded from the price index so a
/// reverse-foil price never shadows the standard price for the same
/// product id.
pub const EXCLUDED_PRICE_SUBTYPE: &str = "Reverse Holofoil";

/// Products whose names carry these markers are cosmetic pattern variants,
/// not distinct cards, and are dropped during reconciliation.
pub const PATTERN_VARIANT_MARKERS: &[&str] = &["(Poke Ball Pattern)", "(Master Ball Pattern)"];

/// Known variant-qualifier parentheticals stripped from card names.
/// Matched case-sensitively as literal substrings.
pub const VARIANT_QUALIFIERS: &[&str] = &[
    "(Secret)",
    "(Full Art)",
    "(Reverse Holofoil)",
    "(Rainbow Rare)",
    "(Gold)",
];

/// Card ids containing this marker are trainer-gallery reprints and are
/// skipped when collecting card detail URLs.
pub const TRAINER_GALLERY_MARKER: &str = "-TG";

/// Look up the product-group id for a set code.
pub fn product_group_for_set(set_code: &str) -> Option<u32> {
    SET_PRODUCT_GROUPS
        .iter()
        .find(|(code, _)| *code == set_code)
        .map(|(_, group)| *group)
}

/// All set codes known to the pricing pipeline, in output order.
pub fn supported_set_codes() -> Vec<&'static str> {
    SET_PRODUCT_GROUPS.iter().map(|(code, _)| *code).collect()
}
