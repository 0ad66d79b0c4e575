// Core data structures for the reelcost pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::{ClassifiedError, Error, ErrorCategory};
use crate::utils::{format_money, parse_price};

/// One film discovered on a director's listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Film {
    /// Stable site identifier, also the cache key
    pub id: String,
    /// Link fragment from the listing (e.g. "/film/the-master/")
    pub slug: String,
    pub url: String,
    /// Availability endpoint for this film
    pub services_url: String,
    pub name: String,
    /// Release year, 0 when the listing omits it
    #[serde(default, deserialize_with = "deserialize_year")]
    pub year: i32,
}

/// Which aggregation bucket a price quotation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceType {
    Streaming,
    Rent,
}

impl PriceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Streaming => "streaming",
            Self::Rent => "rent",
        }
    }
}

impl fmt::Display for PriceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One price quotation for one film from one vendor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceEntry {
    pub service_name: String,
    pub format: String,
    /// Amount in dollars; 0.0 when the vendor quoted no parseable price
    #[serde(default, deserialize_with = "deserialize_price")]
    pub price: f64,
    pub price_type: PriceType,
    pub film_name: String,
    pub film_id: String,
    pub url: String,
    #[serde(default, deserialize_with = "deserialize_year")]
    pub year: i32,
}

impl PriceEntry {
    /// Build an entry carrying a copy of the owning film's identity
    pub fn for_film(
        film: &Film,
        price_type: PriceType,
        service_name: impl Into<String>,
        format: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            format: format.into(),
            price,
            price_type,
            film_name: film.name.clone(),
            film_id: film.id.clone(),
            url: film.services_url.clone(),
            year: film.year,
        }
    }
}

/// Per-film price record
///
/// Built from raw `price_entries` by the fetcher (or decoded from cache);
/// `streaming` and `cheapest_rental` are only filled in once the caller's
/// preferred services are known, and at most one of them is ever populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilmPrices {
    pub film_name: String,
    pub film_details: Film,
    #[serde(default)]
    pub price_entries: Vec<PriceEntry>,
    #[serde(default)]
    pub streaming: Vec<PriceEntry>,
    #[serde(default)]
    pub cheapest_rental: Option<PriceEntry>,
}

impl FilmPrices {
    /// Wrap freshly fetched entries for a film
    pub fn new(film: Film, price_entries: Vec<PriceEntry>) -> Self {
        Self {
            film_name: film.name.clone(),
            film_details: film,
            price_entries,
            streaming: Vec::new(),
            cheapest_rental: None,
        }
    }

    /// Record for a film whose prices could not be resolved
    pub fn unpriced(film: Film) -> Self {
        Self::new(film, Vec::new())
    }

    /// Available on at least one preferred streaming service
    pub fn is_streaming(&self) -> bool {
        !self.streaming.is_empty()
    }

    /// Counts towards `PriceDetails::num_films`
    pub fn has_price(&self) -> bool {
        self.is_streaming()
            || self
                .cheapest_rental
                .as_ref()
                .is_some_and(|r| !r.service_name.is_empty())
    }
}

/// Run-level cost summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PriceDetails {
    /// Films with either streaming availability or a named rental offer
    pub num_films: usize,
    /// Sum of cheapest rentals over films not available on a preferred service
    pub overall_price: f64,
    /// `overall_price / num_films`, absent when no film has a price
    pub price_per_film: Option<f64>,
}

impl PriceDetails {
    pub fn overall_price_display(&self) -> String {
        format_money(self.overall_price)
    }

    pub fn price_per_film_display(&self) -> String {
        self.price_per_film
            .map(format_money)
            .unwrap_or_else(|| "n/a".to_string())
    }
}

impl fmt::Display for PriceDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} films, {} total, {} per film",
            self.num_films,
            self.overall_price_display(),
            self.price_per_film_display()
        )
    }
}

/// A per-film fault collected instead of aborting the request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilmFailure {
    pub film_id: String,
    pub film_name: String,
    pub category: ErrorCategory,
    pub message: String,
}

impl FilmFailure {
    pub fn new(film_id: impl Into<String>, film_name: impl Into<String>, error: &Error) -> Self {
        Self {
            film_id: film_id.into(),
            film_name: film_name.into(),
            category: error.category(),
            message: error.to_string(),
        }
    }

    pub fn for_film(film: &Film, error: &Error) -> Self {
        Self::new(film.id.clone(), film.name.clone(), error)
    }
}

/// Result of pricing one director's filmography
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorReport {
    /// Title-cased director name
    pub director: String,
    /// Films sorted by release year
    pub films: Vec<FilmPrices>,
    pub price_details: PriceDetails,
    pub failures: Vec<FilmFailure>,
    pub generated_at: DateTime<Utc>,
}

impl DirectorReport {
    /// Films available on a preferred streaming service
    pub fn streaming_count(&self) -> usize {
        self.films.iter().filter(|f| f.is_streaming()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

// ============================================================================
// Lenient decoding for cached payloads
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// Accepts a number, formatted price text ("$3.99") or null
fn deserialize_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(NumberOrText::Number(n)) => Ok(n),
        Some(NumberOrText::Text(text)) => parse_price(&text).map_err(serde::de::Error::custom),
    }
}

/// Accepts a number, numeric text, empty text or null
fn deserialize_year<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(0),
        Some(NumberOrText::Number(n)) if n.fract() == 0.0 => Ok(n as i32),
        Some(NumberOrText::Number(n)) => Err(serde::de::Error::custom(format!(
            "year must be an integer, got {n}"
        ))),
        Some(NumberOrText::Text(text)) if text.trim().is_empty() => Ok(0),
        Some(NumberOrText::Text(text)) => text
            .trim()
            .parse::<i32>()
            .map_err(|_| serde::de::Error::custom(format!("invalid year {text:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn film() -> Film {
        Film {
            id: "51568".to_string(),
            slug: "/film/the-master/".to_string(),
            url: "https://letterboxd.com/film/the-master/".to_string(),
            services_url: "https://letterboxd.com/s/film-availability?filmId=51568&locale=USA"
                .to_string(),
            name: "The Master".to_string(),
            year: 2012,
        }
    }

    #[test]
    fn test_price_entry_copies_film_identity() {
        let entry = PriceEntry::for_film(&film(), PriceType::Rent, "iTunes", "HD", 3.99);
        assert_eq!(entry.film_id, "51568");
        assert_eq!(entry.film_name, "The Master");
        assert_eq!(entry.year, 2012);
        assert_eq!(entry.url, film().services_url);
    }

    #[test]
    fn test_film_prices_serializes_camel_case() {
        let prices = FilmPrices::new(
            film(),
            vec![PriceEntry::for_film(&film(), PriceType::Streaming, "Netflix", "HD", 0.0)],
        );
        let json = serde_json::to_value(&prices).unwrap();
        assert_eq!(json["filmName"], "The Master");
        assert_eq!(json["filmDetails"]["servicesUrl"], film().services_url);
        assert_eq!(json["priceEntries"][0]["priceType"], "streaming");
        assert_eq!(json["priceEntries"][0]["serviceName"], "Netflix");
        assert!(json["cheapestRental"].is_null());
    }

    #[test]
    fn test_decode_accepts_formatted_price_and_text_year() {
        let json = r#"{
            "serviceName": "Amazon",
            "format": "SD",
            "price": "$5.99",
            "priceType": "rent",
            "filmName": "The Master",
            "filmId": "51568",
            "url": "u",
            "year": "2012"
        }"#;
        let entry: PriceEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.price, 5.99);
        assert_eq!(entry.year, 2012);
        assert_eq!(entry.price_type, PriceType::Rent);
    }

    #[test]
    fn test_decode_null_price_and_empty_year() {
        let json = r#"{
            "serviceName": "Amazon",
            "format": "SD",
            "price": null,
            "priceType": "rent",
            "filmName": "x",
            "filmId": "1",
            "url": "u",
            "year": ""
        }"#;
        let entry: PriceEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.price, 0.0);
        assert_eq!(entry.year, 0);
    }

    #[test]
    fn test_decode_rejects_bad_price_text() {
        let json = r#"{
            "serviceName": "Amazon", "format": "SD", "price": "abc",
            "priceType": "rent", "filmName": "x", "filmId": "1", "url": "u", "year": 1
        }"#;
        assert!(serde_json::from_str::<PriceEntry>(json).is_err());
    }

    #[test]
    fn test_price_details_display() {
        let details = PriceDetails {
            num_films: 3,
            overall_price: 9.98,
            price_per_film: Some(9.98 / 3.0),
        };
        assert_eq!(details.to_string(), "3 films, $9.98 total, $3.33 per film");

        let empty = PriceDetails::default();
        assert_eq!(empty.price_per_film_display(), "n/a");
    }
}
