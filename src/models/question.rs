//! Question data structure.

use serde::{Deserialize, Serialize};

/// A single exam question as served by `/api/question/{id}`.
///
/// Fields missing from the payload decode to their empty value. The same
/// shape is written back to disk, one file per question.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Question {
    /// Answer text
    pub answer: String,

    /// Certificate the question belongs to
    pub certificate: String,

    /// Creation timestamp
    pub created_date: i64,

    /// Associated image file name, if any
    pub image_file: Option<String>,

    /// Question text
    pub question: String,

    /// Remote identifier
    pub question_id: i64,

    /// Question type
    #[serde(rename = "type")]
    pub kind: String,
}

impl Question {
    /// Image reference to download, if the question has one.
    ///
    /// Empty names are treated as absent.
    pub fn image_ref(&self) -> Option<&str> {
        self.image_file.as_deref().filter(|name| !name.is_empty())
    }

    /// Whether this record describes the given identifier.
    pub fn matches(&self, id: u32) -> bool {
        self.question_id == i64::from(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_wire_payload() {
        let json = r#"{
            "answer": "Use a fire extinguisher",
            "certificate": "safety",
            "createdDate": 1700000000,
            "imageFile": "a.jpg",
            "question": "What do you do?",
            "questionId": 1000,
            "type": "oral"
        }"#;

        let question: Question = serde_json::from_str(json).unwrap();
        assert_eq!(question.question_id, 1000);
        assert_eq!(question.kind, "oral");
        assert_eq!(question.image_ref(), Some("a.jpg"));
        assert!(question.matches(1000));
        assert!(!question.matches(1001));
    }

    #[test]
    fn test_null_and_missing_image() {
        let with_null: Question =
            serde_json::from_str(r#"{"questionId": 1, "imageFile": null}"#).unwrap();
        let missing: Question = serde_json::from_str(r#"{"questionId": 1}"#).unwrap();
        let empty: Question =
            serde_json::from_str(r#"{"questionId": 1, "imageFile": ""}"#).unwrap();

        assert_eq!(with_null.image_ref(), None);
        assert_eq!(missing.image_ref(), None);
        assert_eq!(empty.image_ref(), None);
        assert_eq!(missing.answer, "");
    }

    #[test]
    fn test_serializes_wire_field_names() {
        let question = Question {
            question_id: 1001,
            kind: "written".to_string(),
            ..Question::default()
        };

        let value = serde_json::to_value(&question).unwrap();
        assert_eq!(value["questionId"], 1001);
        assert_eq!(value["type"], "written");
        assert!(value["imageFile"].is_null());
        assert!(value.get("createdDate").is_some());
    }
}
