//! Single-consumer sinks draining the worker pool's outputs.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::{FailureKind, FetchFailure};
use crate::models::Question;
use crate::pipeline::ImageSet;
use crate::storage::QuestionStorage;

/// A fetched question on its way to storage.
#[derive(Debug)]
pub struct Fetched {
    pub id: u32,
    pub question: Question,
}

/// Outcome of the result sink.
#[derive(Debug, Default)]
pub struct SinkReport {
    /// Identifiers written to storage
    pub persisted: Vec<u32>,
    /// Identifiers fetched but not written
    pub write_failures: Vec<u32>,
    /// Every received question, when retention was requested
    pub retained: Vec<Question>,
}

/// Outcome of the error sink.
#[derive(Debug, Default, Clone)]
pub struct FailureReport {
    /// Failed identifiers with their failure kind, in arrival order
    pub failures: Vec<(u32, FailureKind)>,
}

impl FailureReport {
    pub fn total(&self) -> usize {
        self.failures.len()
    }

    pub fn count(&self, kind: FailureKind) -> usize {
        self.failures.iter().filter(|(_, k)| *k == kind).count()
    }

    pub fn by_kind(&self) -> HashMap<FailureKind, usize> {
        let mut counts = HashMap::new();
        for (_, kind) in &self.failures {
            *counts.entry(*kind).or_insert(0) += 1;
        }
        counts
    }

    pub fn ids(&self) -> Vec<u32> {
        self.failures.iter().map(|(id, _)| *id).collect()
    }
}

/// Persist every question received until the channel is closed and drained.
///
/// A write failure is logged and counted; it never stops the sink.
pub async fn drain_results(
    mut rx: mpsc::Receiver<Fetched>,
    storage: Arc<dyn QuestionStorage>,
    images: Arc<ImageSet>,
    retain: bool,
) -> SinkReport {
    let mut report = SinkReport::default();

    while let Some(Fetched { id, question }) = rx.recv().await {
        if let Some(image) = question.image_ref() {
            images.insert(image);
        }

        match storage.write_question(id, &question).await {
            Ok(location) => {
                log::debug!("Saved question {} to {}", id, location);
                report.persisted.push(id);
            }
            Err(e) => {
                log::error!("Failed to save question {}: {}", id, e);
                report.write_failures.push(id);
            }
        }

        if retain {
            report.retained.push(question);
        }
    }

    report
}

/// Log every failure received until the channel is closed and drained.
pub async fn drain_failures(mut rx: mpsc::Receiver<FetchFailure>) -> FailureReport {
    let mut report = FailureReport::default();

    while let Some(failure) = rx.recv().await {
        log::warn!("[{}] {}", failure.kind(), failure);
        report.failures.push((failure.id, failure.kind()));
    }

    report
}
