//! Zero Common - Shared utilities and configuration for the Zero ecosystem.
//!
//! This crate provides:
//! - Configuration types and loading
//! - Configuration validation
//! - Logging setup and structured logging helpers

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod logging;
pub mod validation;

pub use config::{Config, ObservabilityConfig, ScreenerConfig};
pub use validation::{Validate, ValidationError, ValidationResult};
