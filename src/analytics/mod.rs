//! Dashboard analytics.
//!
//! The aggregation core is a pure function over the fetched collections;
//! all I/O lives in the api module.

pub mod aggregator;

pub use aggregator::*;
