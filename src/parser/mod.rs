//! HTML and JSON parsing
//!
//! This module turns the upstream listing page into [`crate::models::Film`]
//! records and availability documents into [`crate::models::PriceEntry`] lists.

pub mod availability;
pub mod html;
pub mod selectors;

pub use availability::parse_availability;
pub use html::{FilmElement, FilmListParser};
pub use selectors::ListingSelectors;
