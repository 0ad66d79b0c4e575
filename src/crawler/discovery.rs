//! Film discovery from a director's listing page

use std::sync::Arc;

use crate::crawler::fetcher::SiteFetcher;
use crate::crawler::url::SiteUrls;
use crate::error::Error;
use crate::models::{Film, FilmFailure};
use crate::parser::FilmListParser;
use crate::utils::error::FetchError;

/// Films found on a listing page, plus the elements that had to be skipped
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Films in page order
    pub films: Vec<Film>,
    pub failures: Vec<FilmFailure>,
}

/// Turns a director name into the films on their listing page
pub struct FilmDiscovery {
    fetcher: Arc<SiteFetcher>,
    urls: SiteUrls,
    parser: FilmListParser,
}

impl FilmDiscovery {
    #[must_use]
    pub fn new(fetcher: Arc<SiteFetcher>, urls: SiteUrls) -> Self {
        Self {
            fetcher,
            urls,
            parser: FilmListParser::new(),
        }
    }

    pub fn urls(&self) -> &SiteUrls {
        &self.urls
    }

    /// Fetch the director's listing and map every poster to a film
    ///
    /// # Errors
    ///
    /// Returns the `FetchError` when the listing page cannot be retrieved.
    /// Per-element problems never fail the call; they land in
    /// [`Discovery::failures`].
    pub async fn discover_films(&self, director: &str) -> Result<Discovery, FetchError> {
        let url = self.urls.director_url(director);
        tracing::debug!(director, url = %url, "Fetching director listing");

        let html = self.fetcher.fetch_text(&url).await?;
        let discovery = self.films_from_listing(&html);

        tracing::info!(
            director,
            films = discovery.films.len(),
            skipped = discovery.failures.len(),
            "Discovered films"
        );

        Ok(discovery)
    }

    /// Map a listing page to films without touching the network
    pub fn films_from_listing(&self, html: &str) -> Discovery {
        let mut discovery = Discovery::default();

        for element in self.parser.parse_elements(html) {
            let (id, name) = (element.id.clone(), element.name.clone());

            match element.into_film(&self.urls) {
                Ok(film) => discovery.films.push(film),
                Err(e) => {
                    tracing::warn!(film_id = %id, film = %name, error = %e, "Skipping film");
                    discovery
                        .failures
                        .push(FilmFailure::new(id, name, &Error::Parse(e)));
                }
            }
        }

        discovery
    }
}
