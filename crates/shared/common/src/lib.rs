//! Common utilities shared by the marketplace crates.
//!
//! This crate provides:
//! - Unified application error with HTTP conversion
//! - Configuration structures

pub mod config;
pub mod error;

pub use config::*;
pub use error::{AppError, AppResult, OptionExt};
