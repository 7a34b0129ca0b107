//! Ingredient and tag key normalization.
//!
//! Turns free text like " Fresh Tomatoes, chopped" into the matching key
//! `"tomato"`. The same function runs when the catalog is built and when a
//! query comes in, so the two sides always agree.

use std::collections::HashSet;
use std::sync::LazyLock;

use unicode_normalization::UnicodeNormalization;

/// Quantity, unit and preparation words that never identify an ingredient.
const STOP_WORDS_RAW: &[&str] = &[
    // Volume
    "cup",
    "cups",
    "tablespoon",
    "tablespoons",
    "teaspoon",
    "teaspoons",
    "tbsp",
    "tbs",
    "tsp",
    "fl",
    "oz",
    "ounce",
    "ounces",
    "pint",
    "pints",
    "quart",
    "quarts",
    "gallon",
    "gallons",
    "ml",
    "milliliter",
    "milliliters",
    "liter",
    "liters",
    "litre",
    "litres",
    // Weight
    "g",
    "gram",
    "grams",
    "kg",
    "kilogram",
    "kilograms",
    "mg",
    "lb",
    "lbs",
    "pound",
    "pounds",
    // Count
    "pinch",
    "pinches",
    "dash",
    "dashes",
    "clove",
    "cloves",
    "slice",
    "slices",
    "piece",
    "pieces",
    "handful",
    "handfuls",
    "sprig",
    "sprigs",
    "stalk",
    "stalks",
    "can",
    "cans",
    "package",
    "packages",
    "pkg",
    // Size
    "small",
    "medium",
    "large",
    "extra",
    // Preparation
    "fresh",
    "freshly",
    "chopped",
    "finely",
    "roughly",
    "coarsely",
    "thinly",
    "diced",
    "minced",
    "sliced",
    "grated",
    "shredded",
    "crushed",
    "peeled",
    "halved",
    "quartered",
    "cubed",
    "melted",
    "softened",
    "beaten",
    "sifted",
    "rinsed",
    "drained",
    "trimmed",
    "divided",
    "optional",
    "to",
    "taste",
    "of",
    "and",
    "or",
];

static STOP_WORDS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS_RAW.iter().copied().collect());

/// Canonicalize a raw ingredient or tag string into its matching key.
///
/// Never fails; returns an empty string when nothing meaningful is left
/// (blank input, pure punctuation, or only stop words).
pub fn normalize(raw: &str) -> String {
    let folded: String = raw.nfkc().collect::<String>().to_lowercase();

    let cleaned: String = folded
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    let mut tokens = cleaned.split_whitespace().filter(|t| !is_stop_word(t));

    let Some(first) = tokens.next() else {
        return String::new();
    };

    let mut key = singularize(first).to_string();
    for token in tokens {
        key.push(' ');
        key.push_str(token);
    }
    key
}

fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(token) || STOP_WORDS.contains(singularize(token))
}

/// Light singularization: "tomatoes" -> "tomato", "onions" -> "onion".
///
/// Only tokens longer than four characters are touched, and the result is
/// always a fixed point (singularizing it again changes nothing).
fn singularize(token: &str) -> &str {
    if token.chars().count() <= 4 || token.ends_with("ss") {
        return token;
    }
    if let Some(stem) = token.strip_suffix("es") {
        if ["o", "x", "z", "ch", "sh", "ss"]
            .iter()
            .any(|end| stem.ends_with(end))
        {
            return stem;
        }
    }
    token.strip_suffix('s').unwrap_or(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_words_case_and_plural() {
        assert_eq!(normalize(" Fresh Tomatoes "), "tomato");
        assert_eq!(normalize("tomatoes"), "tomato");
        assert_eq!(normalize(" Fresh Tomatoes "), normalize("tomatoes"));
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t\n"), "");
        assert_eq!(normalize("!!! ---"), "");
        assert_eq!(normalize("2 cups, chopped"), "2");
        assert_eq!(normalize("fresh chopped cup"), "");
    }

    #[test]
    fn test_punctuation_becomes_space() {
        assert_eq!(normalize("salt-and-pepper"), "salt pepper");
        assert_eq!(normalize("Chicken (boneless)"), "chicken boneless");
        assert_eq!(normalize("olive_oil"), "olive_oil");
    }

    #[test]
    fn test_only_first_token_singularized() {
        assert_eq!(normalize("green onions"), "green onions");
        assert_eq!(normalize("onions green"), "onion green");
    }

    #[test]
    fn test_short_tokens_kept() {
        assert_eq!(normalize("Eggs"), "eggs");
        assert_eq!(normalize("peas"), "peas");
    }

    #[test]
    fn test_singular_forms() {
        assert_eq!(normalize("peaches"), "peach");
        assert_eq!(normalize("boxes of raisins"), "box raisins");
        assert_eq!(normalize("cheeses"), "cheese");
        assert_eq!(normalize("olives"), "olive");
        assert_eq!(normalize("glasses"), "glass");
        assert_eq!(normalize("swiss chard"), "swiss chard");
    }

    #[test]
    fn test_nfkc_folds_compatibility_forms() {
        // Fullwidth letters and the "ﬁ" ligature collapse to plain ASCII.
        assert_eq!(normalize("ＢＵＴＴＥＲ"), "butter");
        assert_eq!(normalize("ﬁgs"), "figs");
        assert_eq!(normalize("jalape\u{006E}\u{0303}o"), "jalapeño");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            " Fresh Tomatoes ",
            "glasses",
            "cheeses",
            "Large Eggs, beaten",
            "2 cups all-purpose flour",
            "Crème Fraîche",
            "potatoes, peeled & diced",
            "ＢＵＴＴＥＲ",
            "boxes",
            "slices of bread",
            "dashes",
            "____",
            "Ⅻ apples",
            "",
        ];
        for raw in samples {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {raw:?}");
        }
    }
}
