//! CSS selectors for the director listing page
//!
//! The listing renders one poster container per film; the film's identity is
//! carried on data attributes of the container's inner `div`.

use lazy_static::lazy_static;
use scraper::Selector;

// Helper macro to parse selectors safely at compile time
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

/// Data attributes read from each poster element
pub mod attrs {
    pub const FILM_ID: &str = "data-film-id";
    pub const FILM_NAME: &str = "data-film-name";
    pub const RELEASE_YEAR: &str = "data-film-release-year";
    pub const TARGET_LINK: &str = "data-target-link";
}

lazy_static! {
    /// Poster elements on a director's filmography page
    static ref FILM_POSTER_SELECTOR: Selector = parse_selector!("li.poster-container > div");
}

/// Selectors used by [`crate::parser::html::FilmListParser`]
#[derive(Debug, Clone)]
pub struct ListingSelectors {
    pub poster: Selector,
}

impl ListingSelectors {
    #[must_use]
    pub fn new() -> Self {
        Self {
            poster: FILM_POSTER_SELECTOR.clone(),
        }
    }
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_poster_selector_matches_inner_div_only() {
        let html = Html::parse_fragment(
            r#"<ul>
                <li class="poster-container"><div data-film-id="1"><div class="inner"></div></div></li>
                <li class="other"><div data-film-id="2"></div></li>
            </ul>"#,
        );
        let selectors = ListingSelectors::new();
        let ids: Vec<_> = html
            .select(&selectors.poster)
            .filter_map(|e| e.value().attr(attrs::FILM_ID))
            .collect();
        assert_eq!(ids, vec!["1"]);
    }
}
