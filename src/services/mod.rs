//! Service layer for the scraper application.
//!
//! This module contains the network-facing logic for:
//! - Question fetching (`QuestionFetcher`)
//! - Image downloading (`ImageDownloader`)

mod images;
mod questions;

pub use images::{ImageDownloader, ImageReport};
pub use questions::QuestionFetcher;
