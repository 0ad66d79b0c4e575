//! Common utilities and helper functions
//!
//! Text helpers shared by discovery, the price parser and the outer surfaces.

pub mod error;

use regex::Regex;
use std::sync::OnceLock;

use self::error::ParseError;

/// Turn a director name into the listing URL path segment
///
/// Lowercases the name and joins its words with single hyphens.
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Upper-case the first letter of each whitespace-separated word
///
/// The remainder of each word is left untouched, so "paul thomas anderson"
/// becomes "Paul Thomas Anderson" and "McDonagh" keeps its inner capital.
pub fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse upstream price text into an amount
///
/// Empty text, `"0"` and anything containing `"null"` mean "no price" and
/// yield `0.0`. Otherwise the first `digits.digits` run is the amount.
///
/// # Errors
///
/// Returns `ParseError::InvalidPrice` when the text has no decimal amount.
pub fn parse_price(text: &str) -> Result<f64, ParseError> {
    static PRICE_RE: OnceLock<Regex> = OnceLock::new();

    let text = text.trim();
    if text.is_empty() || text == "0" || text.contains("null") {
        return Ok(0.0);
    }

    let re = PRICE_RE.get_or_init(|| Regex::new(r"\d+\.\d+").expect("Invalid regex pattern"));

    re.find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .ok_or_else(|| ParseError::InvalidPrice(text.to_string()))
}

/// Format an amount for display: `$` prefix, two decimals
pub fn format_money(amount: f64) -> String {
    format!("${amount:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Paul Thomas Anderson"), "paul-thomas-anderson");
        assert_eq!(slugify("  Agnès   Varda "), "agnès-varda");
        assert_eq!(slugify("kubrick"), "kubrick");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("paul thomas anderson"), "Paul Thomas Anderson");
        assert_eq!(title_case("martin McDonagh"), "Martin McDonagh");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("$12.99").unwrap(), 12.99);
        assert_eq!(parse_price("").unwrap(), 0.0);
        assert_eq!(parse_price("0").unwrap(), 0.0);
        assert_eq!(parse_price("null").unwrap(), 0.0);
        assert_eq!(parse_price("price: null USD").unwrap(), 0.0);
        assert_eq!(parse_price("From $3.99 to $5.99").unwrap(), 3.99);
    }

    #[test]
    fn test_parse_price_rejects_text_without_amount() {
        assert!(matches!(
            parse_price("abc"),
            Err(ParseError::InvalidPrice(text)) if text == "abc"
        ));
        assert!(parse_price("$12").is_err());
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(9.98), "$9.98");
        assert_eq!(format_money(9.98 / 3.0), "$3.33");
        assert_eq!(format_money(0.0), "$0.00");
    }
}
