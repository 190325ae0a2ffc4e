//! Aggregates computed over the finished table.
//!
//! - [`compute_summary`]: case counts, date range, age and ADL statistics,
//!   per-category counts
//! - [`Distribution`](crate::types::Distribution): frequency breakdown of a
//!   single column
//! - [`compute_crosstabs`]: two-way frequency tables with margins

pub mod crosstab;
pub mod distribution;
pub mod summary;

pub use crosstab::{AgeGroup, compute_crosstabs};
pub use distribution::value_counts;
pub use summary::compute_summary;
