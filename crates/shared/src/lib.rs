//! Shared errors and configuration for Strata.
//!
//! This crate provides common pieces used across all other crates:
//! - Application-wide error taxonomy with stable API error codes
//! - Configuration management

pub mod config;
pub mod error;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
