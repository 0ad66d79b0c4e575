//! URL construction for the upstream film site
//!
//! Every link the pipeline follows is derived from the configured site root:
//! the director listing, each film's page, and each film's availability
//! endpoint.

use url::form_urlencoded;

use crate::config::ScraperConfig;
use crate::utils::slugify;

/// Builds upstream URLs from a site root and locale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUrls {
    /// Site root without a trailing slash
    base_url: String,
    /// Locale passed to the availability endpoint
    locale: String,
}

impl SiteUrls {
    /// Create a builder for `base_url` (trailing slashes are dropped)
    #[must_use]
    pub fn new(base_url: impl Into<String>, locale: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            locale: locale.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &ScraperConfig) -> Self {
        Self::new(config.base_url.clone(), config.locale.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Listing page for a director
    ///
    /// # Examples
    ///
    /// ```
    /// use reelcost::crawler::url::SiteUrls;
    ///
    /// let urls = SiteUrls::new("https://letterboxd.com", "USA");
    /// assert_eq!(
    ///     urls.director_url("Paul Thomas Anderson"),
    ///     "https://letterboxd.com/director/paul-thomas-anderson/"
    /// );
    /// ```
    pub fn director_url(&self, director: &str) -> String {
        format!("{}/director/{}/", self.base_url, slugify(director))
    }

    /// Absolute film page URL from a listing link fragment
    pub fn film_url(&self, target_link: &str) -> String {
        if target_link.starts_with("http://") || target_link.starts_with("https://") {
            return target_link.to_string();
        }

        if target_link.starts_with('/') {
            format!("{}{target_link}", self.base_url)
        } else {
            format!("{}/{target_link}", self.base_url)
        }
    }

    /// Availability endpoint for a film id
    pub fn availability_url(&self, film_id: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("filmId", film_id)
            .append_pair("locale", &self.locale)
            .finish();

        format!("{}/s/film-availability?{query}", self.base_url)
    }
}
