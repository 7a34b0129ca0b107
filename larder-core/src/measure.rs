//! Quantity/unit extraction for ingredient links.
//!
//! Scans the front of an ingredient line ("1 1/2 cups flour") for an amount
//! and a cooking unit. Anything it cannot recognise is simply left out; the
//! raw text is always kept alongside.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Amount + unit found at the start of an ingredient line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    pub quantity: Option<String>,
    pub unit: Option<String>,
}

/// Units sorted longest first so "tablespoons" wins over "tb".
static UNITS_SORTED: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    let mut units = UNITS_RAW.to_vec();
    units.sort_by(|a, b| b.len().cmp(&a.len()));
    units
});

const UNITS_RAW: &[&str] = &[
    "fluid ounces",
    "fluid ounce",
    "tablespoons",
    "tablespoon",
    "teaspoons",
    "teaspoon",
    "gallons",
    "gallon",
    "quarts",
    "quart",
    "pints",
    "pint",
    "cups",
    "cup",
    "tbsp",
    "tbs",
    "tsp",
    "fl oz",
    "milliliters",
    "milliliter",
    "liters",
    "liter",
    "litres",
    "litre",
    "ml",
    "l",
    "ounces",
    "ounce",
    "pounds",
    "pound",
    "lbs",
    "lb",
    "oz",
    "kilograms",
    "kilogram",
    "grams",
    "gram",
    "kg",
    "mg",
    "g",
    "packages",
    "package",
    "pinches",
    "pinch",
    "dashes",
    "dash",
    "cloves",
    "clove",
    "slices",
    "slice",
    "sprigs",
    "sprig",
    "stalks",
    "stalk",
    "pieces",
    "piece",
    "handfuls",
    "handful",
    "cans",
    "can",
    "sticks",
    "stick",
];

const VULGAR_FRACTIONS: &[char] = &['½', '⅓', '⅔', '¼', '¾', '⅕', '⅛', '⅜', '⅝', '⅞'];

/// Pull a leading quantity and unit out of a raw ingredient line.
pub fn measure(raw: &str) -> Measurement {
    let (quantity, rest) = extract_quantity(raw);
    let unit = quantity.as_ref().and_then(|_| extract_unit(&rest));
    Measurement { quantity, unit }
}

/// Returns (quantity, remaining text).
fn extract_quantity(s: &str) -> (Option<String>, String) {
    let s = s.trim();
    let words: Vec<&str> = s.split_whitespace().collect();

    // Mixed number: "1 1/2"
    if let [first, second, ..] = words.as_slice() {
        if first.chars().all(|c| c.is_ascii_digit()) && is_fraction(second) {
            if let Some(pos) = s.find(second) {
                let end = pos + second.len();
                return (Some(format!("{first} {second}")), s[end..].trim().to_string());
            }
        }
    }

    if let Some(first) = words.first() {
        if is_fraction(first) {
            return (Some((*first).to_string()), s[first.len()..].trim().to_string());
        }
    }

    let mut amount = String::new();
    let mut chars = s.char_indices().peekable();
    while let Some(&(_, c)) = chars.peek() {
        if c.is_ascii_digit() || c == '.' || VULGAR_FRACTIONS.contains(&c) {
            amount.push(c);
            chars.next();
        } else {
            break;
        }
    }

    if amount.is_empty() || amount == "." {
        return (None, s.to_string());
    }
    let rest = chars.peek().map(|&(i, _)| &s[i..]).unwrap_or("");
    (Some(amount), rest.trim().to_string())
}

fn is_fraction(s: &str) -> bool {
    match s.split_once('/') {
        Some((num, den)) => {
            !num.is_empty()
                && !den.is_empty()
                && num.chars().all(|c| c.is_ascii_digit())
                && den.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

fn extract_unit(s: &str) -> Option<String> {
    let lower = s.to_lowercase();
    UNITS_SORTED.iter().find_map(|&unit| {
        let after = lower.strip_prefix(unit)?;
        let boundary = after.is_empty()
            || after.starts_with(|c: char| c.is_whitespace() || c == '.' || c == ',');
        boundary.then(|| unit.to_string())
    })
}
