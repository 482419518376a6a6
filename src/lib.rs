//! pokefetch library
//!
//! Exposes the cache, API client, field extraction, report and fetch modules for
//! use by the binary and integration tests.

pub mod cache;
pub mod cli;
pub mod data;
pub mod fetch;
pub mod fields;
pub mod logging;
pub mod progress;
pub mod report;
