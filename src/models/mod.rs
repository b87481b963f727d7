// src/models/mod.rs

//! Domain models for the scraper application.

mod config;
mod question;

// Re-export all public types
pub use config::{Config, LoggingConfig, OutputConfig, ScraperConfig};
pub use question::Question;
