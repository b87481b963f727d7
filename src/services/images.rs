// src/services/images.rs

//! Image downloader service.
//!
//! Runs after the question pipeline has completed. Images are fetched one at
//! a time; any failure is logged and the image skipped.

use reqwest::{Client, StatusCode};
use url::Url;

use crate::storage::QuestionStorage;
use crate::utils::http::endpoint;
use crate::utils::is_safe_file_name;

/// Summary of an image pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImageReport {
    pub total: usize,
    pub downloaded: Vec<String>,
    pub failed: Vec<String>,
}

/// Service for downloading image assets.
#[derive(Debug, Clone)]
pub struct ImageDownloader {
    client: Client,
    base_url: Url,
}

impl ImageDownloader {
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// URL of the image with the given file name.
    pub fn image_url(&self, name: &str) -> Url {
        endpoint(&self.base_url, &["images", name])
    }

    /// Download every image in order, writing each through `storage`.
    pub async fn download_all(
        &self,
        names: &[String],
        storage: &dyn QuestionStorage,
    ) -> ImageReport {
        let mut report = ImageReport {
            total: names.len(),
            ..ImageReport::default()
        };

        for name in names {
            match self.download(name, storage).await {
                Ok(location) => {
                    log::info!("Wrote image {}", location);
                    report.downloaded.push(name.clone());
                }
                Err(message) => {
                    log::warn!("Failed to download image {}: {}", name, message);
                    report.failed.push(name.clone());
                }
            }
        }
        report
    }

    async fn download(&self, name: &str, storage: &dyn QuestionStorage) -> Result<String, String> {
        if !is_safe_file_name(name) {
            return Err("unsafe file name".to_string());
        }

        let response = self
            .client
            .get(self.image_url(name))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(format!("status {}", status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(|e| e.to_string())?;
        storage
            .write_image(name, &bytes)
            .await
            .map_err(|e| e.to_string())
    }
}
