//! Common test utilities

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reelcost::cache::{MemoryStore, PriceCache};
use reelcost::error::Result;
use reelcost::models::{Film, FilmPrices, PriceEntry, PriceType};
use reelcost::pricing::PriceSource;
use reelcost::utils::error::FetchError;

/// Create a film with the given id, name and year
pub fn film(id: &str, name: &str, year: i32) -> Film {
    Film {
        id: id.to_string(),
        slug: format!("/film/{id}/"),
        url: format!("https://letterboxd.com/film/{id}/"),
        services_url: format!("https://letterboxd.com/s/film-availability?filmId={id}&locale=USA"),
        name: name.to_string(),
        year,
    }
}

/// Films numbered 0..count, all from the same year
pub fn films(count: usize) -> Vec<Film> {
    (0..count)
        .map(|i| film(&format!("f{i}"), &format!("Film {i}"), 2000))
        .collect()
}

/// Raw price record with the given offers
pub fn film_prices(film: Film, offers: &[(PriceType, &str, f64)]) -> FilmPrices {
    let entries = offers
        .iter()
        .map(|(kind, service, price)| PriceEntry::for_film(&film, *kind, *service, "HD", *price))
        .collect();
    FilmPrices::new(film, entries)
}

pub fn services(names: &[&str]) -> HashSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Cache over a fresh in-process store
pub fn memory_cache() -> Arc<PriceCache> {
    Arc::new(PriceCache::new(
        Arc::new(MemoryStore::new()),
        Duration::from_secs(3600),
        "directors",
    ))
}

/// Listing page with one poster per `(id, name, year, link)`
pub fn listing_html(films: &[(&str, &str, &str, &str)]) -> String {
    let posters: String = films
        .iter()
        .map(|(id, name, year, link)| {
            format!(
                r#"<li class="poster-container"><div class="film-poster" data-film-id="{id}" data-film-name="{name}" data-film-release-year="{year}" data-target-link="{link}"></div></li>"#
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html><html><body><ul class="poster-list">{posters}</ul></body></html>"#
    )
}

/// Availability document in the upstream's shape
pub fn availability_json(stream: &[(&str, &str)], rent: &[(&str, &str, &str)]) -> String {
    let stream: Vec<_> = stream
        .iter()
        .map(|(name, format)| serde_json::json!({"name": name, "format": format, "price": null}))
        .collect();
    let rent: Vec<_> = rent
        .iter()
        .map(|(name, format, price)| serde_json::json!({"name": name, "format": format, "price": price}))
        .collect();

    serde_json::json!({"best": {"stream": stream, "rent": rent}}).to_string()
}

// ============================================================================
// Price sources
// ============================================================================

/// Source that quotes one rental per film and tracks how it is called
#[derive(Default)]
pub struct CountingSource {
    pub calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    /// Simulated upstream latency
    pub delay: Duration,
    /// Film ids that fail with a 503
    pub failing: HashSet<String>,
    /// Film ids that never answer
    pub hanging: HashSet<String>,
}

impl CountingSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for CountingSource {
    async fn fetch_prices(&self, film: &Film) -> Result<Vec<PriceEntry>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if self.hanging.contains(&film.id) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        } else if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&film.id) {
            return Err(FetchError::ServerError(503).into());
        }

        Ok(vec![PriceEntry::for_film(
            film,
            PriceType::Rent,
            "Apple TV",
            "HD",
            2.50,
        )])
    }
}
