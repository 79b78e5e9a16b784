use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRolls {
    pub values: Vec<i64>,
    /// Tokens that were not integers.
    pub skipped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredRolls {
    pub rolls: Vec<u32>,
    pub out_of_range: usize,
}

fn separators() -> &'static Regex {
    static SEP: OnceLock<Regex> = OnceLock::new();
    SEP.get_or_init(|| Regex::new(r"[\s,;]+").expect("static separator pattern"))
}

/// Parse free-form roll entry text. Unparsable tokens are counted, not fatal.
pub fn parse_rolls(text: &str) -> ParsedRolls {
    let mut out = ParsedRolls::default();
    for token in separators().split(text) {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        match token.parse::<i64>() {
            Ok(v) => out.values.push(v),
            Err(_) => out.skipped += 1,
        }
    }
    out
}

/// Keep only values that are valid faces of a `sides`-faced die.
pub fn filter_in_range(values: &[i64], sides: u32) -> FilteredRolls {
    let mut out = FilteredRolls::default();
    for &v in values {
        if v >= 1 && v <= i64::from(sides) {
            out.rolls.push(v as u32);
        } else {
            out.out_of_range += 1;
        }
    }
    out
}
