// src/services/questions.rs

//! Question fetcher service.
//!
//! Retrieves a single question from `/api/question/{id}` and decodes it.

use std::sync::Arc;

use reqwest::{Client, StatusCode};
use url::Url;

use crate::error::{FetchError, FetchFailure};
use crate::models::Question;
use crate::pipeline::ImageSet;
use crate::utils::http::endpoint;

/// Service for fetching individual questions.
#[derive(Debug, Clone)]
pub struct QuestionFetcher {
    client: Client,
    base_url: Url,
    images: Arc<ImageSet>,
}

impl QuestionFetcher {
    /// Create a fetcher that registers image references into `images`.
    pub fn new(client: Client, base_url: Url, images: Arc<ImageSet>) -> Self {
        Self {
            client,
            base_url,
            images,
        }
    }

    /// URL of the question with the given identifier.
    pub fn question_url(&self, id: u32) -> Url {
        let id = id.to_string();
        endpoint(&self.base_url, &["api", "question", id.as_str()])
    }

    /// Fetch and decode one question.
    ///
    /// Produces exactly one of a question or a failure. On success, the
    /// question's image reference (if any) has been registered.
    pub async fn fetch(&self, id: u32) -> Result<Question, FetchFailure> {
        let question = self
            .fetch_question(id)
            .await
            .map_err(|error| FetchFailure::new(id, error))?;

        if let Some(image) = question.image_ref() {
            self.images.insert(image);
        }
        Ok(question)
    }

    async fn fetch_question(&self, id: u32) -> Result<Question, FetchError> {
        let response = self
            .client
            .get(self.question_url(id))
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::BadStatus(status));
        }

        let body = response.bytes().await.map_err(FetchError::Transport)?;
        let question: Question = serde_json::from_slice(&body).map_err(FetchError::Decode)?;

        if !question.matches(id) {
            return Err(FetchError::IdMismatch {
                expected: id,
                found: question.question_id,
            });
        }
        Ok(question)
    }
}
