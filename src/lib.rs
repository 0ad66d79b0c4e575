//! reelcost - what it costs to watch a director's filmography
//!
//! Scrapes a director's listing from a film site, looks up streaming and
//! rental offers for every film, and totals what renting the films not
//! already on the caller's streaming services would cost.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`crawler`] - Listing discovery and the concurrent pricing pipeline
//! - [`parser`] - Listing HTML and availability JSON parsing
//! - [`pricing`] - Price sources and best-price selection
//! - [`cache`] - Redis-backed film price cache and director set
//! - [`server`] - HTTP API
//! - [`metrics`] - Prometheus metrics
//! - [`models`] - Core data structures and types
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use reelcost::config::Config;
//! use reelcost::crawler::DirectorCrawler;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let crawler = DirectorCrawler::new(&config).await?;
//!     let report = crawler
//!         .scrape_director("wes anderson", &config.server.streaming_services)
//!         .await;
//!     println!("{}", report.price_details);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod crawler;
pub mod error;
pub mod metrics;
pub mod models;
pub mod parser;
pub mod pricing;
pub mod server;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::cache::{KeyValueStore, MemoryStore, PriceCache};
    pub use crate::config::Config;
    pub use crate::crawler::DirectorCrawler;
    pub use crate::error::{ClassifiedError, Error, ErrorCategory, Result};
    pub use crate::models::{
        DirectorReport, Film, FilmFailure, FilmPrices, PriceDetails, PriceEntry, PriceType,
    };
    pub use crate::pricing::PriceSource;
}

// Direct re-exports for convenience
pub use models::{DirectorReport, Film, FilmPrices, PriceDetails, PriceEntry};
