//! Local filesystem storage implementation.
//!
//! Every file is written atomically (temp file, then rename), so a crash
//! mid-run never leaves a truncated question behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{OutputConfig, Question};
use crate::storage::QuestionStorage;
use crate::utils::is_safe_file_name;

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    images_dir: String,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>, images_dir: impl Into<String>) -> Self {
        Self {
            root_dir: root_dir.into(),
            images_dir: images_dir.into(),
        }
    }

    /// Create a LocalStorage from the output configuration.
    pub fn from_config(output: &OutputConfig) -> Self {
        Self::new(&output.data_dir, &output.images_dir)
    }

    /// Root output directory.
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Directory holding downloaded images.
    pub fn images_path(&self) -> PathBuf {
        self.root_dir.join(&self.images_dir)
    }

    /// Path of the file holding one question.
    pub fn question_path(&self, id: u32) -> PathBuf {
        self.root_dir.join(format!("{id}.json"))
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let tmp = path.with_extension(match path.extension() {
            Some(ext) => format!("{}.tmp", ext.to_string_lossy()),
            None => "tmp".to_string(),
        });
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(path, &bytes).await
    }
}

#[async_trait]
impl QuestionStorage for LocalStorage {
    async fn prepare(&self) -> Result<()> {
        match tokio::fs::remove_dir_all(&self.root_dir).await {
            Ok(()) => log::debug!("Cleared previous output at {}", self.root_dir.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(AppError::Io(e)),
        }

        tokio::fs::create_dir_all(self.images_path()).await?;
        log::debug!("Prepared output directory {}", self.root_dir.display());
        Ok(())
    }

    async fn write_question(&self, id: u32, question: &Question) -> Result<String> {
        let path = self.question_path(id);
        self.write_json(&path, question).await?;
        Ok(path.display().to_string())
    }

    async fn write_image(&self, name: &str, bytes: &[u8]) -> Result<String> {
        if !is_safe_file_name(name) {
            return Err(AppError::validation(format!(
                "refusing to write image with unsafe name {name:?}"
            )));
        }
        let path = self.images_path().join(name);
        self.write_bytes(&path, bytes).await?;
        Ok(path.display().to_string())
    }

    async fn write_combined(&self, file_name: &str, questions: &[Question]) -> Result<String> {
        let path = self.root_dir.join(file_name);
        self.write_json(&path, questions).await?;
        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage_in(tmp: &TempDir) -> LocalStorage {
        LocalStorage::new(tmp.path().join("data"), "images")
    }

    fn sample_question(id: i64) -> Question {
        Question {
            answer: "Answer".to_string(),
            question: "Question?".to_string(),
            question_id: id,
            ..Question::default()
        }
    }

    #[tokio::test]
    async fn test_prepare_creates_layout() {
        let tmp = TempDir::new().unwrap();
        let storage = storage_in(&tmp);

        storage.prepare().await.unwrap();

        assert!(storage.root_dir().is_dir());
        assert!(storage.images_path().is_dir());
    }

    #[tokio::test]
    async fn test_prepare_clears_previous_run() {
        let tmp = TempDir::new().unwrap();
        let storage = storage_in(&tmp);

        storage.prepare().await.unwrap();
        storage
            .write_question(1000, &sample_question(1000))
            .await
            .unwrap();
        storage.write_image("a.jpg", b"old").await.unwrap();

        storage.prepare().await.unwrap();

        assert!(!storage.question_path(1000).exists());
        assert!(!storage.images_path().join("a.jpg").exists());
        assert!(storage.images_path().is_dir());
    }

    #[tokio::test]
    async fn test_write_question_round_trip() {
        let tmp = TempDir::new().unwrap();
        let storage = storage_in(&tmp);
        storage.prepare().await.unwrap();

        let location = storage
            .write_question(1001, &sample_question(1001))
            .await
            .unwrap();
        assert!(location.ends_with("1001.json"));

        let content = std::fs::read_to_string(storage.question_path(1001)).unwrap();
        let loaded: Question = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded, sample_question(1001));
        assert!(!storage.root_dir().join("1001.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_write_image_bytes_verbatim() {
        let tmp = TempDir::new().unwrap();
        let storage = storage_in(&tmp);
        storage.prepare().await.unwrap();

        let bytes = [0u8, 159, 146, 150, 255];
        storage.write_image("a.jpg", &bytes).await.unwrap();

        let written = std::fs::read(storage.images_path().join("a.jpg")).unwrap();
        assert_eq!(written, bytes);
    }

    #[tokio::test]
    async fn test_write_image_rejects_traversal() {
        let tmp = TempDir::new().unwrap();
        let storage = storage_in(&tmp);
        storage.prepare().await.unwrap();

        assert!(storage.write_image("../escape.jpg", b"x").await.is_err());
        assert!(!tmp.path().join("data/escape.jpg").exists());
    }

    #[tokio::test]
    async fn test_write_question_without_prepare_fails() {
        let tmp = TempDir::new().unwrap();
        let storage = storage_in(&tmp);

        assert!(
            storage
                .write_question(1, &sample_question(1))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_write_combined() {
        let tmp = TempDir::new().unwrap();
        let storage = storage_in(&tmp);
        storage.prepare().await.unwrap();

        let questions = vec![sample_question(1000), sample_question(1001)];
        storage
            .write_combined("questions.json", &questions)
            .await
            .unwrap();

        let content = std::fs::read_to_string(storage.root_dir().join("questions.json")).unwrap();
        let loaded: Vec<Question> = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded, questions);
    }
}
