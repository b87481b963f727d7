//! Storage abstractions for question persistence.
//!
//! ## Directory Structure
//!
//! ```text
//! data/
//! ├── 1000.json             # One file per question
//! ├── 1001.json
//! ├── questions.json        # Optional combined output
//! └── images/
//!     └── a.jpg
//! ```

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Question;

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for question storage backends.
///
/// Implementations are shared between the result sink and the image pass,
/// so every method takes `&self`.
#[async_trait]
pub trait QuestionStorage: Send + Sync {
    /// Clear any previous output and create an empty layout.
    async fn prepare(&self) -> Result<()>;

    /// Persist one question under its identifier. Returns where it went.
    async fn write_question(&self, id: u32, question: &Question) -> Result<String>;

    /// Persist image bytes under the image's file name. Returns where it went.
    async fn write_image(&self, name: &str, bytes: &[u8]) -> Result<String>;

    /// Persist every question as a single array. Returns where it went.
    async fn write_combined(&self, file_name: &str, questions: &[Question]) -> Result<String>;
}
