//! Director listing parser
//!
//! Extracts the raw poster attributes from a listing page and turns each one
//! into a [`Film`].

use scraper::{ElementRef, Html};

use crate::crawler::url::SiteUrls;
use crate::models::Film;
use crate::parser::selectors::{attrs, ListingSelectors};
use crate::utils::error::ParseError;

/// Raw attributes of one poster element, before validation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilmElement {
    pub id: String,
    pub name: String,
    pub release_year: String,
    pub target_link: String,
}

impl FilmElement {
    fn from_element(element: ElementRef<'_>) -> Self {
        let attr = |name: &str| element.value().attr(name).unwrap_or_default().trim().to_string();

        Self {
            id: attr(attrs::FILM_ID),
            name: attr(attrs::FILM_NAME),
            release_year: attr(attrs::RELEASE_YEAR),
            target_link: attr(attrs::TARGET_LINK),
        }
    }

    /// Convert into a film, deriving its links from `urls`
    ///
    /// An empty release year maps to 0.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::MissingFilmId` when the element has no id and
    /// `ParseError::InvalidYear` when the year is present but not an integer.
    pub fn into_film(self, urls: &SiteUrls) -> Result<Film, ParseError> {
        if self.id.is_empty() {
            return Err(ParseError::MissingFilmId(self.name));
        }

        let year = if self.release_year.is_empty() {
            0
        } else {
            self.release_year
                .parse::<i32>()
                .map_err(|_| ParseError::InvalidYear {
                    film: self.name.clone(),
                    value: self.release_year.clone(),
                })?
        };

        Ok(Film {
            url: urls.film_url(&self.target_link),
            services_url: urls.availability_url(&self.id),
            slug: self.target_link,
            id: self.id,
            name: self.name,
            year,
        })
    }
}

/// Listing page parser
pub struct FilmListParser {
    selectors: ListingSelectors,
}

impl FilmListParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            selectors: ListingSelectors::new(),
        }
    }

    /// Collect poster elements in page order
    pub fn parse_elements(&self, html: &str) -> Vec<FilmElement> {
        let document = Html::parse_document(html);
        document
            .select(&self.selectors.poster)
            .map(FilmElement::from_element)
            .collect()
    }
}

impl Default for FilmListParser {
    fn default() -> Self {
        Self::new()
    }
}
