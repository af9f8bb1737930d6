//! Core domain entities.
//!
//! - [`Record`] - a short code, its target URL and its click counter
//! - [`LinkStats`] - read-only projection returned by the stats endpoint

pub mod record;

pub use record::{LinkStats, Record};
