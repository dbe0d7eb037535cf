//! Backend API access.
//!
//! This module owns all network I/O: the aggregation core only ever sees
//! the collections a snapshot delivers.

pub mod client;

pub use client::*;
