//! Pipeline entry points for scraper operations.
//!
//! - `ScrapePipeline`: concurrent fetch of the configured question range
//! - `run_scraper`: prepare storage, run the pipeline, download images

mod image_set;
pub mod run;
pub mod scrape;
pub mod shutdown;
pub mod sinks;

pub use image_set::ImageSet;
pub use run::{RunReport, run_scraper};
pub use scrape::{PipelineReport, ScrapePipeline};
pub use shutdown::{Phase, ShutdownState};
pub use sinks::FailureReport;
