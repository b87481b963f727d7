// src/pipeline/run.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::Client;

use crate::error::{FailureKind, Result};
use crate::models::Config;
use crate::services::{ImageDownloader, ImageReport};
use crate::storage::QuestionStorage;
use crate::utils::log;

use super::scrape::{PipelineReport, ScrapePipeline};

/// Summary of a full scraper run.
#[derive(Debug)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub pipeline: PipelineReport,
    /// `None` when the image pass was skipped
    pub images: Option<ImageReport>,
    pub combined_location: Option<String>,
}

impl RunReport {
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Run the full scrape: prepare storage, fetch questions, download images.
///
/// Per-question and per-image failures are logged and reported; only setup,
/// combined output and task failures abort the run.
pub async fn run_scraper(
    config: &Config,
    storage: Arc<dyn QuestionStorage>,
    client: &Client,
) -> Result<RunReport> {
    let started_at = Utc::now();
    let show_progress = config.logging.show_progress;
    let download_images = config.output.download_images;
    let total_steps = if download_images { 3 } else { 2 };

    if show_progress {
        log::header("Question Scraper");
        log::step(1, total_steps, "Prepare - Clearing output directory");
    }
    storage.prepare().await?;

    if show_progress {
        log::step(2, total_steps, "Questions - Fetching question range");
        log::sub_item(&format!(
            "Questions {}..={} with {} workers from {}",
            config.scraper.range_start,
            config.scraper.range_end,
            config.scraper.worker_count,
            config.scraper.base_url
        ));
    }
    let pipeline = ScrapePipeline::new(config.scraper.clone(), client.clone(), Arc::clone(&storage))?
        .retain_questions(config.output.combined_file.is_some());
    let mut report = pipeline.run().await?;

    let combined_location = match &config.output.combined_file {
        Some(file_name) => {
            let mut questions = std::mem::take(&mut report.retained);
            questions.sort_by_key(|q| q.question_id);
            let location = storage.write_combined(file_name, &questions).await?;
            ::log::info!("Wrote {} questions to {}", questions.len(), location);
            Some(location)
        }
        None => None,
    };

    let images = if download_images {
        if show_progress {
            log::step(3, total_steps, "Images - Downloading referenced images");
        }
        let downloader = ImageDownloader::new(client.clone(), config.scraper.base_url()?);
        Some(downloader.download_all(&report.images, storage.as_ref()).await)
    } else {
        None
    };

    let run = RunReport {
        started_at,
        finished_at: Utc::now(),
        pipeline: report,
        images,
        combined_location,
    };

    if show_progress {
        log::summary("Scrape complete", &summary_items(&run));
    }
    Ok(run)
}

fn summary_items(run: &RunReport) -> Vec<(&'static str, String)> {
    let pipeline = &run.pipeline;
    let failures = &pipeline.failures;
    let mut items = vec![
        ("Submitted", pipeline.submitted.to_string()),
        ("Persisted", pipeline.persisted.len().to_string()),
        ("Write failures", pipeline.write_failures.len().to_string()),
        (
            "Fetch failures",
            format!(
                "{} (transport {}, status {}, decode {})",
                failures.total(),
                failures.count(FailureKind::Transport),
                failures.count(FailureKind::BadStatus),
                failures.count(FailureKind::Decode)
            ),
        ),
        ("Distinct images", pipeline.images.len().to_string()),
    ];
    match &run.images {
        Some(images) => items.push((
            "Images downloaded",
            format!("{}/{}", images.downloaded.len(), images.total),
        )),
        None => items.push(("Images downloaded", "skipped".to_string())),
    }
    if let Some(location) = &run.combined_location {
        items.push(("Combined file", location.clone()));
    }
    items.push((
        "Duration",
        format!("{:.1}s", run.duration().num_milliseconds() as f64 / 1000.0),
    ));
    items
}
