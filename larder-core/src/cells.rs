//! Cell parsers for loosely formatted spreadsheet data.
//!
//! Every parser here is total: a cell it cannot make sense of yields the
//! documented default (empty list, `None`) instead of an error, so one bad
//! cell never aborts a load.

use std::sync::LazyLock;

use regex::Regex;

use crate::table::Cell;

static LIST_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[;,]").unwrap());
static LINE_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r?\n+").unwrap());
static STEP_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*[;|]\s*").unwrap());
static STEP_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:\d+[).:\-]\s*|[-•]\s*)").unwrap());
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static ISO_DURATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^pt(?:(\d+)h)?(?:(\d+)m)?(?:(\d+)s)?$").unwrap());
static HOURS_PHRASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*(?:h|hr|hour|hours)").unwrap());
static MINUTES_PHRASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*(?:m|min|mins|minute|minutes)").unwrap());
static CLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s*:\s*(\d{1,2})\s*$").unwrap());
static INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Parse a cell holding a list of short strings (ingredients, tags).
///
/// Accepts structured lists, JSON arrays, Python-style list literals and
/// comma/semicolon separated text.
pub fn parse_list_cell(cell: &Cell) -> Vec<String> {
    let text = match cell {
        Cell::Empty => return Vec::new(),
        Cell::List(items) => return items.iter().map(ToString::to_string).collect(),
        other => other.to_string(),
    };

    let s = text.trim();
    if s.is_empty() {
        return Vec::new();
    }

    if let Some(items) = parse_bracketed(s) {
        return items;
    }

    LIST_SPLIT
        .split(s)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a cell holding recipe instructions into ordered steps.
pub fn parse_steps_cell(cell: &Cell) -> Vec<String> {
    let text = match cell {
        Cell::Empty => return Vec::new(),
        Cell::List(items) => return clean_all(items.iter().map(ToString::to_string)),
        other => other.to_string(),
    };

    let s = text.trim();
    if s.is_empty() {
        return Vec::new();
    }

    if let Some(items) = parse_bracketed(s) {
        return clean_all(items.into_iter());
    }

    let lines: Vec<&str> = LINE_SPLIT
        .split(s)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.len() > 1 {
        return lines.into_iter().map(strip_step_marker).collect();
    }

    let parts: Vec<&str> = STEP_SPLIT
        .split(s)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() > 1 {
        return parts.into_iter().map(strip_step_marker).collect();
    }

    vec![s.to_string()]
}

/// Parse a duration cell into whole minutes.
///
/// Handles plain numbers, ISO-8601 style `PT1H30M`, phrases like
/// `1 hr 30 min`, clock style `1:30`, and finally falls back to the last
/// integer in the text (`minutes 55`).
pub fn parse_duration(cell: &Cell) -> Option<u32> {
    match cell {
        Cell::Int(n) => u32::try_from(*n).ok(),
        Cell::Float(f) if f.is_finite() && *f >= 0.0 => Some(f.trunc().min(u32::MAX as f64) as u32),
        Cell::Text(s) => parse_duration_text(s),
        _ => None,
    }
}

fn parse_duration_text(raw: &str) -> Option<u32> {
    let s = raw.trim().to_lowercase();
    if s.is_empty() {
        return None;
    }

    if let Some(caps) = ISO_DURATION.captures(&s) {
        let group = |i: usize| caps.get(i).map(|m| to_u32(m.as_str())).unwrap_or(0);
        let (hours, minutes, seconds) = (group(1), group(2), group(3));
        let round_up = u32::from(hours == 0 && minutes == 0 && seconds > 0);
        return Some(
            hours
                .saturating_mul(60)
                .saturating_add(minutes)
                .saturating_add(round_up),
        );
    }

    // Fractional phrases ("1.5 hours") round to the nearest minute.
    let phrase = |re: &Regex| {
        re.captures(&s)
            .and_then(|c| c[1].parse::<f64>().ok())
            .unwrap_or(0.0)
    };
    let total = (phrase(&HOURS_PHRASE) * 60.0 + phrase(&MINUTES_PHRASE)).round();
    if total >= 1.0 {
        return Some(total.min(u32::MAX as f64) as u32);
    }

    if let Some(caps) = CLOCK.captures(&s) {
        return Some(
            to_u32(&caps[1])
                .saturating_mul(60)
                .saturating_add(to_u32(&caps[2])),
        );
    }

    INTEGER
        .find_iter(&s)
        .last()
        .and_then(|m| m.as_str().parse().ok())
}

fn to_u32(digits: &str) -> u32 {
    digits.parse().unwrap_or(u32::MAX)
}

/// Tidy display text: trim, drop surrounding brackets/quotes, collapse
/// whitespace.
pub fn clean_display(text: &str) -> String {
    let t = text
        .trim()
        .trim_matches(|c| matches!(c, '[' | ']' | '"' | '\''));
    WHITESPACE_RUN.replace_all(t, " ").trim().to_string()
}

fn clean_all(items: impl Iterator<Item = String>) -> Vec<String> {
    items
        .map(|item| clean_display(&item))
        .filter(|item| !item.is_empty())
        .collect()
}

fn strip_step_marker(line: &str) -> String {
    STEP_MARKER.replace(line, "").into_owned()
}

/// `[...]` text parsed as a JSON array first, then as a relaxed list literal.
fn parse_bracketed(s: &str) -> Option<Vec<String>> {
    if !(s.starts_with('[') && s.ends_with(']')) {
        return None;
    }

    if let Ok(serde_json::Value::Array(values)) = serde_json::from_str::<serde_json::Value>(s) {
        return Some(values.iter().map(json_to_string).collect());
    }

    parse_list_literal(s)
}

fn json_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Relaxed list literal: `['a', "b", 3, None]`.
///
/// Quoted strings may use either quote style with backslash escapes; bare
/// items must be numbers or `True`/`False`/`None`. Anything else fails the
/// whole parse.
fn parse_list_literal(s: &str) -> Option<Vec<String>> {
    let inner = s.strip_prefix('[')?.strip_suffix(']')?;
    let mut chars = inner.chars().peekable();
    let mut items = Vec::new();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let Some(&c) = chars.peek() else {
            break;
        };

        if c == '\'' || c == '"' {
            chars.next();
            let mut item = String::new();
            loop {
                match chars.next()? {
                    '\\' => match chars.next()? {
                        'n' => item.push('\n'),
                        't' => item.push('\t'),
                        other => item.push(other),
                    },
                    ch if ch == c => break,
                    ch => item.push(ch),
                }
            }
            items.push(item);
        } else {
            let mut bare = String::new();
            while let Some(ch) = chars.next_if(|ch| *ch != ',') {
                bare.push(ch);
            }
            let bare = bare.trim();
            match bare {
                "None" => items.push(String::new()),
                "True" | "False" => items.push(bare.to_string()),
                _ if bare.parse::<f64>().is_ok() => items.push(bare.to_string()),
                _ => return None,
            }
        }

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        match chars.next() {
            Some(',') => continue,
            None => break,
            Some(_) => return None,
        }
    }

    Some(items)
}
