//! # Configuration
//!
//! Client configuration: where the Relay API lives, how to log, and where the
//! session is kept between runs.

pub mod client;

pub use client::{Config, ConfigError, ConfigFormat, LogFormat};
