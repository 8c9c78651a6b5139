//! Purchase/sale figures per manufacturer, reshaped for a heatmap dashboard.
//!
//! A warehouse result (manufacturer, year, month, amount bought, amount sold)
//! is normalized into [`types::Record`]s, then pivoted into manufacturer x
//! month grids, ranked into a top-N table and summarized as currency strings.

pub mod config;
pub mod currency;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod loader;
pub mod month;
pub mod normalizer;
pub mod output;
pub mod pivot;
pub mod ranking;
pub mod types;
pub mod util;
