//! Analysis statistics over lint results.

pub mod aggregator;

pub use aggregator::*;
