//! Best-price selection and cost aggregation
//!
//! Selection depends on the caller's preferred services, so it runs on every
//! request after fan-in and is never cached.

use std::collections::HashSet;

use crate::models::{FilmPrices, PriceDetails, PriceEntry, PriceType};

impl FilmPrices {
    /// Fill in `streaming` or `cheapest_rental` from the raw entries
    ///
    /// Streaming on a preferred service wins; otherwise the lowest-priced
    /// rental (first one on ties) is kept. Any previous selection is
    /// discarded.
    #[must_use]
    pub fn with_best_prices(mut self, preferred: &HashSet<String>) -> Self {
        let streaming: Vec<PriceEntry> = self
            .price_entries
            .iter()
            .filter(|e| e.price_type == PriceType::Streaming && preferred.contains(&e.service_name))
            .cloned()
            .collect();

        let mut rentals: Vec<&PriceEntry> = self
            .price_entries
            .iter()
            .filter(|e| e.price_type == PriceType::Rent)
            .collect();
        rentals.sort_by(|a, b| a.price.total_cmp(&b.price));

        let cheapest_rental = if streaming.is_empty() {
            rentals.first().map(|e| (*e).clone())
        } else {
            None
        };

        self.streaming = streaming;
        self.cheapest_rental = cheapest_rental;
        self
    }
}

/// Collect caller-supplied service names into a lookup set
pub fn preferred_set<S: AsRef<str>>(services: &[S]) -> HashSet<String> {
    services
        .iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Stable sort by release year; equal years keep their relative order
pub fn sort_by_year(films: &mut [FilmPrices]) {
    films.sort_by_key(|f| f.film_details.year);
}

/// Totals over films whose best prices have been selected
pub fn calculate_totals(films: &[FilmPrices]) -> PriceDetails {
    let num_films = films.iter().filter(|f| f.has_price()).count();

    let overall_price: f64 = films
        .iter()
        .filter(|f| !f.is_streaming())
        .filter_map(|f| f.cheapest_rental.as_ref())
        .map(|rental| rental.price)
        .sum();

    let price_per_film = (num_films > 0).then(|| overall_price / num_films as f64);

    PriceDetails {
        num_films,
        overall_price,
        price_per_film,
    }
}

/// Select best prices, order by year and total everything up
pub fn select_and_aggregate(
    resolved: Vec<FilmPrices>,
    preferred: &HashSet<String>,
) -> (Vec<FilmPrices>, PriceDetails) {
    let mut films: Vec<FilmPrices> = resolved
        .into_iter()
        .map(|film| film.with_best_prices(preferred))
        .collect();

    sort_by_year(&mut films);
    let details = calculate_totals(&films);

    (films, details)
}
