//! Shared outcome codes, configuration, and error handling for Convos
//!
//! This crate provides common functionality used across the Convos application:
//! - The internal outcome taxonomy and its HTTP status map
//! - Configuration management following 12-factor principles
//! - Fault types and handling
//! - Custom header names and request extractors

pub mod config;
pub mod error;
pub mod extractors;
pub mod headers;
pub mod outcome;

pub use config::{CacheConfig, Config, PagingConfig};
pub use error::{Error, Result};
pub use extractors::{ValidatedJson, ValidatedPath};
pub use outcome::{http_status_for, Outcome, ResultCode};
