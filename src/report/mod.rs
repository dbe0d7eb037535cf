//! Report rendering.
//!
//! Markdown for humans, JSON for downstream tooling.

pub mod generator;

pub use generator::*;
