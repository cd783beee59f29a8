use crate::constants::VARIANT_QUALIFIERS;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// A trailing parenthetical consisting solely of digits, e.g. the printed
/// collector number in "Charizard (010)".
static TRAILING_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\d+\)\s*$").unwrap());

/// Reduces a vendor product name to a canonical card name.
///
/// The vendor encodes variant information inconsistently: sometimes after a
/// dash ("Pikachu - 025/198"), sometimes as a trailing collector number
/// ("Charizard (010)"), sometimes as a qualifier parenthetical
/// ("Mew (Full Art)"). The steps run in a fixed order: dash truncation
/// first so qualifiers after the dash are already gone, diacritic folding
/// last so it cannot interfere with the literal ASCII qualifier matches.
/// The transform is idempotent.
pub fn normalize_card_name(raw: &str) -> String {
    // 1. Keep only the part before the first dash, if any
    let name = match raw.split_once('-') {
        Some((before, _)) => before.trim(),
        None => raw,
    };

    // 2. Drop known variant-qualifier parentheticals wherever they appear
    let mut name = name.to_string();
    for qualifier in VARIANT_QUALIFIERS {
        if name.contains(qualifier) {
            name = name.replace(qualifier, "");
        }
    }

    // 3. Drop trailing printed collector numbers like "(025)". Qualifier
    //    removal can leave a number newly trailing ("Charizard (010)
    //    (Full Art)"), so this runs after it, and to a fixpoint.
    while TRAILING_NUMBER_RE.is_match(&name) {
        name = TRAILING_NUMBER_RE.replace(&name, "").into_owned();
    }

    // 4. Fold accented characters to their base letter
    let name: String = name.nfd().filter(|c| !is_combining_mark(*c)).collect();

    // 5. Trim
    name.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_at_first_dash() {
        assert_eq!(normalize_card_name("Pikachu - 025/198"), "Pikachu");
        assert_eq!(normalize_card_name("Iono - 185/193 - 2023"), "Iono");
    }

    #[test]
    fn strips_trailing_collector_number() {
        assert_eq!(normalize_card_name("Charizard (010)"), "Charizard");
    }

    #[test]
    fn strips_number_exposed_by_qualifier_removal() {
        assert_eq!(normalize_card_name("Charizard (010) (Full Art)"), "Charizard");
        assert_eq!(normalize_card_name("Mewtwo (150) (Secret)"), "Mewtwo");
    }

    #[test]
    fn keeps_non_numeric_parentheticals() {
        assert_eq!(
            normalize_card_name("Professor's Research (Turo)"),
            "Professor's Research (Turo)"
        );
    }

    #[test]
    fn strips_variant_qualifiers() {
        assert_eq!(normalize_card_name("Mew (Full Art)"), "Mew");
        assert_eq!(normalize_card_name("Gardevoir ex (Secret)"), "Gardevoir ex");
        assert_eq!(normalize_card_name("Pikachu (Rainbow Rare)"), "Pikachu");
    }

    #[test]
    fn folds_diacritics_after_qualifier_matching() {
        assert_eq!(normalize_card_name("Pokémon (Full Art)"), "Pokemon");
        assert_eq!(normalize_card_name("Flabébé"), "Flabebe");
    }

    #[test]
    fn idempotent() {
        for raw in [
            "Pikachu - 025/198",
            "Charizard (010)",
            "Charizard (010) (Full Art)",
            "Pokémon (Full Art)",
            "Mew (Secret)",
            "Porygon (137) (233)",
            "  plain name  ",
            "",
        ] {
            let once = normalize_card_name(raw);
            assert_eq!(normalize_card_name(&once), once);
        }
    }
}
