use crate::table::Row;
use crate::types::RawCardData;
use serde_json::{json, Value};

/// Top-level scalar keys copied verbatim from a card document.
const SCALAR_KEYS: &[&str] = &[
    "category",
    "hp",
    "id",
    "illustrator",
    "image",
    "localId",
    "name",
    "rarity",
    "regulationMark",
    "retreat",
    "stage",
];

/// Converts one nested card document into a flat sparse row.
///
/// Pure transform: absent optional fields become null columns, nothing
/// fails. The `legal` object flattens to `legal_*` columns; the `set`
/// object flattens one level deep to `set_*` / `set_{key}_{subkey}`
/// columns (upstream data nests at most two levels, so deeper values pass
/// through as-is). Attacks produce four columns per attack at 1-based
/// positions, so rows are variable-width: a card with fewer attacks simply
/// lacks the higher-indexed columns.
pub fn flatten_card(card: &RawCardData) -> Row {
    let mut flat = Row::new();

    for key in SCALAR_KEYS {
        flat.insert(
            key.to_string(),
            card.get(*key).cloned().unwrap_or(Value::Null),
        );
    }

    if let Some(Value::Object(legal)) = card.get("legal") {
        for (key, value) in legal {
            flat.insert(format!("legal_{key}"), value.clone());
        }
    }

    if let Some(Value::Object(set)) = card.get("set") {
        for (key, value) in set {
            match value {
                Value::Object(sub) => {
                    for (sub_key, sub_val) in sub {
                        flat.insert(format!("set_{key}_{sub_key}"), sub_val.clone());
                    }
                }
                other => {
                    flat.insert(format!("set_{key}"), other.clone());
                }
            }
        }
    }

    flat.insert("types".to_string(), json!(join_strings(card.get("types"))));

    let attacks = match card.get("attacks") {
        Some(Value::Array(attacks)) => attacks.as_slice(),
        _ => &[],
    };

    // Audit copy of the original attack list, serialized verbatim
    flat.insert(
        "attacks_json".to_string(),
        json!(Value::Array(attacks.to_vec()).to_string()),
    );

    for (i, attack) in attacks.iter().enumerate() {
        let prefix = format!("attack_{}", i + 1);
        flat.insert(
            format!("{prefix}_name"),
            attack.get("name").cloned().unwrap_or(Value::Null),
        );
        flat.insert(
            format!("{prefix}_damage"),
            attack.get("damage").cloned().unwrap_or(Value::Null),
        );
        flat.insert(
            format!("{prefix}_effect"),
            attack.get("effect").cloned().unwrap_or(Value::Null),
        );
        flat.insert(
            format!("{prefix}_cost"),
            json!(join_strings(attack.get("cost"))),
        );
    }

    flat
}

/// Joins a JSON array of strings with ", "; anything else joins to "".
fn join_strings(value: Option<&Value>) -> String {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        _ => String::new(),
    }
}
