pub mod price;
pub mod serve;

// Re-export command functions for convenience
pub use price::{directors, price, services};
pub use serve::serve;
