//! Shared types, errors, and configuration for the deferral report.
//!
//! This crate provides common types used across all other crates:
//! - Typed integer IDs for journals, accounts, and analytic accounts
//! - Currency codes and display formatting for decimal amounts
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
