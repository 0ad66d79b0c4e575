//! Parser integration tests using fixture files
//!
//! - Director listing HTML → films
//! - Availability JSON → price entries

use reelcost::crawler::url::SiteUrls;
use reelcost::models::{Film, PriceType};
use reelcost::parser::{parse_availability, FilmListParser};
use std::fs;

/// Test fixture paths
const FIXTURES_DIR: &str = "tests/fixtures";

fn load_fixture(filename: &str) -> String {
    let path = format!("{FIXTURES_DIR}/{filename}");
    fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to load fixture: {path}"))
}

fn urls() -> SiteUrls {
    SiteUrls::new("https://letterboxd.com", "USA")
}

// ============================================================================
// Listing Tests
// ============================================================================

#[test]
fn test_listing_elements_in_page_order() {
    let html = load_fixture("director_listing.html");
    let elements = FilmListParser::new().parse_elements(&html);

    let ids: Vec<_> = elements.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["51568", "2386", "47756", "2368", "880001"]);
}

#[test]
fn test_listing_films_have_derived_links() {
    let html = load_fixture("director_listing.html");
    let films: Vec<Film> = FilmListParser::new()
        .parse_elements(&html)
        .into_iter()
        .map(|e| e.into_film(&urls()).unwrap())
        .collect();

    let master = &films[0];
    assert_eq!(master.name, "The Master");
    assert_eq!(master.year, 2012);
    assert_eq!(master.slug, "/film/the-master/");
    assert_eq!(master.url, "https://letterboxd.com/film/the-master/");
    assert_eq!(
        master.services_url,
        "https://letterboxd.com/s/film-availability?filmId=51568&locale=USA"
    );

    // Unreleased film without a year
    assert_eq!(films[4].year, 0);
}

#[test]
fn test_listing_without_posters() {
    let html = "<html><body><p>No films found.</p></body></html>";
    assert!(FilmListParser::new().parse_elements(html).is_empty());
}

// ============================================================================
// Availability Tests
// ============================================================================

#[test]
fn test_availability_fixture() {
    let document: serde_json::Value =
        serde_json::from_str(&load_fixture("availability.json")).unwrap();
    let film = Film {
        id: "51568".into(),
        name: "The Master".into(),
        year: 2012,
        ..Default::default()
    };

    let entries = parse_availability(&document, &film).unwrap();
    assert_eq!(entries.len(), 5);

    let streaming: Vec<_> = entries
        .iter()
        .filter(|e| e.price_type == PriceType::Streaming)
        .map(|e| e.service_name.as_str())
        .collect();
    assert_eq!(streaming, vec!["Netflix", "Kanopy"]);

    let rentals: Vec<_> = entries
        .iter()
        .filter(|e| e.price_type == PriceType::Rent)
        .map(|e| (e.service_name.as_str(), e.format.as_str(), e.price))
        .collect();
    assert_eq!(
        rentals,
        vec![("Apple TV", "4K", 3.99), ("Amazon", "HD", 2.99), ("Vudu", "SD", 2.99)]
    );

    assert!(entries.iter().all(|e| e.film_id == "51568" && e.year == 2012));
}

#[test]
fn test_availability_for_unavailable_film() {
    let document = serde_json::json!({"best": {"stream": [], "rent": null}});
    let entries = parse_availability(&document, &Film::default()).unwrap();
    assert!(entries.is_empty());
}
