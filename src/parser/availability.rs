//! Availability document parser
//!
//! The availability endpoint answers with a JSON document whose `best.stream`
//! and `best.rent` arrays each hold `{name, format, price}` items.

use serde_json::Value;

use crate::models::{Film, PriceEntry, PriceType};
use crate::utils::error::ParseError;
use crate::utils::parse_price;

/// JSON pointer to the streaming offers
pub const STREAM_PATH: &str = "/best/stream";

/// JSON pointer to the rental offers
pub const RENT_PATH: &str = "/best/rent";

/// Convert an availability document into price entries for `film`
///
/// Streaming entries come first, then rentals, each in document order. A
/// missing or null path contributes no entries.
///
/// # Errors
///
/// Returns `ParseError::MalformedDocument` when a path holds something other
/// than an array, and `ParseError::InvalidPrice` when an item's price text
/// has no amount in it.
pub fn parse_availability(document: &Value, film: &Film) -> Result<Vec<PriceEntry>, ParseError> {
    let mut entries = offers(document, STREAM_PATH, film, PriceType::Streaming)?;
    entries.extend(offers(document, RENT_PATH, film, PriceType::Rent)?);
    Ok(entries)
}

fn offers(
    document: &Value,
    path: &str,
    film: &Film,
    price_type: PriceType,
) -> Result<Vec<PriceEntry>, ParseError> {
    let items = match document.pointer(path) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(ParseError::MalformedDocument(format!(
                "{path} is not an array: {other}"
            )))
        }
    };

    items
        .iter()
        .map(|item| {
            Ok(PriceEntry::for_film(
                film,
                price_type,
                text_field(item, "name"),
                text_field(item, "format"),
                price_field(item)?,
            ))
        })
        .collect()
}

fn text_field(item: &Value, key: &str) -> String {
    match item.get(key) {
        Some(Value::String(s)) => s.clone(),
        None | Some(Value::Null) => String::new(),
        Some(other) => other.to_string(),
    }
}

fn price_field(item: &Value) -> Result<f64, ParseError> {
    match item.get("price") {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => Ok(n.as_f64().unwrap_or(0.0)),
        Some(Value::String(text)) => parse_price(text),
        Some(other) => parse_price(&other.to_string()),
    }
}
