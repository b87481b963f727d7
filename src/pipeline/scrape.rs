// src/pipeline/scrape.rs

//! Concurrent question fetch pipeline.
//!
//! ```text
//!              ┌─► worker 0 ─┐          ┌─► result sink ─► storage
//! id source ───┼─► worker 1 ─┼─ fan-in ─┤
//!   (ids)      └─► worker N ─┘          └─► error sink ──► log
//! ```
//!
//! All three channels have capacity 1, so a worker waits until the matching
//! sink takes its output before pulling the next identifier.

use std::sync::Arc;

use futures::future::join_all;
use reqwest::Client;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use crate::error::{AppError, FetchFailure, Result};
use crate::models::{Question, ScraperConfig};
use crate::pipeline::ImageSet;
use crate::pipeline::shutdown::{Phase, ShutdownState};
use crate::pipeline::sinks::{self, FailureReport, Fetched, SinkReport};
use crate::services::QuestionFetcher;
use crate::storage::QuestionStorage;

/// Capacity of every pipeline channel.
const HANDOFF_CAPACITY: usize = 1;

/// Identifier source shared by all workers.
type IdSource = Arc<Mutex<mpsc::Receiver<u32>>>;

/// Outcome of one pipeline run.
#[derive(Debug, Default)]
pub struct PipelineReport {
    /// Identifiers handed to the worker pool
    pub submitted: usize,
    /// Identifiers each worker processed, indexed by worker
    pub per_worker: Vec<usize>,
    /// Identifiers whose question reached storage
    pub persisted: Vec<u32>,
    /// Identifiers fetched but not written
    pub write_failures: Vec<u32>,
    /// Identifiers that failed to fetch
    pub failures: FailureReport,
    /// Distinct image references, sorted
    pub images: Vec<String>,
    /// Questions kept for combined output
    pub retained: Vec<Question>,
    /// Shutdown phases visited, in order
    pub phases: Vec<Phase>,
}

impl PipelineReport {
    /// Identifiers that produced a fetched question (persisted or not).
    pub fn fetched(&self) -> usize {
        self.persisted.len() + self.write_failures.len()
    }
}

/// Fixed-size worker pool feeding a result sink and an error sink.
pub struct ScrapePipeline {
    config: ScraperConfig,
    fetcher: QuestionFetcher,
    storage: Arc<dyn QuestionStorage>,
    images: Arc<ImageSet>,
    retain: bool,
}

impl ScrapePipeline {
    /// Build a pipeline for the configured range, writing through `storage`.
    pub fn new(
        config: ScraperConfig,
        client: Client,
        storage: Arc<dyn QuestionStorage>,
    ) -> Result<Self> {
        if config.worker_count == 0 {
            return Err(AppError::validation("worker_count must be > 0"));
        }
        let images = Arc::new(ImageSet::new());
        let fetcher = QuestionFetcher::new(client, config.base_url()?, Arc::clone(&images));

        Ok(Self {
            config,
            fetcher,
            storage,
            images,
            retain: false,
        })
    }

    /// Keep every fetched question in the report (for combined output).
    pub fn retain_questions(mut self, retain: bool) -> Self {
        self.retain = retain;
        self
    }

    /// The image set populated by this pipeline.
    pub fn images(&self) -> Arc<ImageSet> {
        Arc::clone(&self.images)
    }

    /// Run every identifier in the range through the pool.
    ///
    /// Returns only after all workers and both sinks have finished.
    pub async fn run(&self) -> Result<PipelineReport> {
        let mut state = ShutdownState::new();

        let (id_tx, id_rx) = mpsc::channel::<u32>(HANDOFF_CAPACITY);
        let (result_tx, result_rx) = mpsc::channel::<Fetched>(HANDOFF_CAPACITY);
        let (error_tx, error_rx) = mpsc::channel::<FetchFailure>(HANDOFF_CAPACITY);
        let id_source: IdSource = Arc::new(Mutex::new(id_rx));

        let result_sink = tokio::spawn(sinks::drain_results(
            result_rx,
            Arc::clone(&self.storage),
            Arc::clone(&self.images),
            self.retain,
        ));
        let error_sink = tokio::spawn(sinks::drain_failures(error_rx));

        let workers: Vec<JoinHandle<usize>> = (0..self.config.worker_count)
            .map(|worker| {
                tokio::spawn(run_worker(
                    worker,
                    Arc::clone(&id_source),
                    self.fetcher.clone(),
                    result_tx.clone(),
                    error_tx.clone(),
                ))
            })
            .collect();
        drop(id_source);

        log::debug!(
            "Started {} workers for questions {}..={}",
            workers.len(),
            self.config.range_start,
            self.config.range_end
        );

        // Filling
        let mut submitted = 0;
        for id in self.config.range_start..=self.config.range_end {
            if id_tx.send(id).await.is_err() {
                log::error!("All workers stopped before question {} was submitted", id);
                break;
            }
            submitted += 1;
        }
        drop(id_tx);
        state.advance(Phase::Draining)?;

        let mut task_error = None;
        let mut per_worker = Vec::with_capacity(workers.len());
        for (worker, joined) in join_all(workers).await.into_iter().enumerate() {
            match joined {
                Ok(count) => per_worker.push(count),
                Err(e) => {
                    log::error!("Worker {} did not finish: {}", worker, e);
                    per_worker.push(0);
                    task_error.get_or_insert(AppError::task(format!("worker {worker}"), e));
                }
            }
        }
        state.advance(Phase::WorkersJoined)?;

        // Workers have returned, so these are the last senders.
        drop(result_tx);
        drop(error_tx);
        state.advance(Phase::SinksClosing)?;

        let (results, failures) = tokio::join!(result_sink, error_sink);
        let results = results.unwrap_or_else(|e| {
            log::error!("Result sink did not finish: {}", e);
            task_error.get_or_insert(AppError::task("result sink", &e));
            SinkReport::default()
        });
        let failures = failures.unwrap_or_else(|e| {
            log::error!("Error sink did not finish: {}", e);
            task_error.get_or_insert(AppError::task("error sink", &e));
            FailureReport::default()
        });
        state.advance(Phase::SinksJoined)?;

        if let Some(e) = task_error {
            return Err(e);
        }
        if submitted < self.config.id_count() {
            return Err(AppError::task(
                "id source",
                format!(
                    "only {} of {} questions were submitted",
                    submitted,
                    self.config.id_count()
                ),
            ));
        }

        Ok(PipelineReport {
            submitted,
            per_worker,
            persisted: results.persisted,
            write_failures: results.write_failures,
            failures,
            images: self.images.snapshot(),
            retained: results.retained,
            phases: state.into_history(),
        })
    }
}

/// Pull identifiers until the source is closed and drained.
///
/// Returns the number of identifiers this worker processed.
async fn run_worker(
    worker: usize,
    ids: IdSource,
    fetcher: QuestionFetcher,
    results: mpsc::Sender<Fetched>,
    errors: mpsc::Sender<FetchFailure>,
) -> usize {
    let mut processed = 0;

    loop {
        // The guard is released before the fetch starts.
        let next = ids.lock().await.recv().await;
        let Some(id) = next else {
            break;
        };
        processed += 1;

        let delivered = match fetcher.fetch(id).await {
            Ok(question) => {
                log::debug!("Worker {} fetched question {}", worker, id);
                results.send(Fetched { id, question }).await.is_ok()
            }
            Err(failure) => errors.send(failure).await.is_ok(),
        };

        if !delivered {
            log::error!(
                "Worker {} lost question {}: sink is no longer running",
                worker,
                id
            );
            break;
        }
    }

    log::debug!("Worker {} finished after {} questions", worker, processed);
    processed
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::storage::LocalStorage;

    #[test]
    fn test_rejects_zero_workers() {
        let tmp = TempDir::new().unwrap();
        let storage: Arc<dyn QuestionStorage> =
            Arc::new(LocalStorage::new(tmp.path(), "images"));
        let config = ScraperConfig {
            worker_count: 0,
            ..ScraperConfig::default()
        };

        assert!(ScrapePipeline::new(config, Client::new(), storage).is_err());
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let tmp = TempDir::new().unwrap();
        let storage: Arc<dyn QuestionStorage> =
            Arc::new(LocalStorage::new(tmp.path(), "images"));
        let config = ScraperConfig {
            base_url: "::not-a-url".to_string(),
            ..ScraperConfig::default()
        };

        assert!(ScrapePipeline::new(config, Client::new(), storage).is_err());
    }

    #[test]
    fn test_report_fetched_counts_write_failures() {
        let report = PipelineReport {
            persisted: vec![1, 2],
            write_failures: vec![3],
            ..PipelineReport::default()
        };
        assert_eq!(report.fetched(), 3);
    }
}
