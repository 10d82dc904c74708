//! Core domain concepts shared across all subdomains.
//!
//! - [`error::ConfigurationError`]: setup-time validation failures
//! - [`string`]: small text helpers used when reporting reasoning

pub mod error;
pub mod string;
