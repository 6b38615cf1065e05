use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Largest reveal timestamp accepted, the same ceiling the spreadsheet path has.
pub const MAX_REVEAL_TIMESTAMP: f64 = u32::MAX as f64;

/// One quiz question tied to a moment in a video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizItem {
    pub title: String,
    pub options: Vec<String>,
    pub correct_option: String,
    pub video_id: String,
    /// Seconds into the video at which playback stops until the question is answered.
    pub reveal_timestamp: f64,
    /// Unset until the question is answered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
    /// Columns from the source table that the quiz does not interpret.
    #[serde(flatten, default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

/// A quiz item that breaks one of its invariants.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// `correct_option` does not match any entry of `options`.
    CorrectOptionNotInOptions { correct_option: String },
    /// The item has no options to choose from.
    NoOptions,
    /// The reveal timestamp is negative, NaN, infinite or beyond
    /// [`MAX_REVEAL_TIMESTAMP`].
    InvalidRevealTimestamp(f64),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::CorrectOptionNotInOptions { correct_option } => {
                write!(f, "correct option {:?} is not one of the options", correct_option)
            }
            ValidationError::NoOptions => write!(f, "question has no options"),
            ValidationError::InvalidRevealTimestamp(ts) => {
                write!(f, "reveal timestamp {} is out of range", ts)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl QuizItem {
    /// Check the invariants a loaded item must hold before it can be played.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.options.is_empty() {
            return Err(ValidationError::NoOptions);
        }

        if !(0.0..=MAX_REVEAL_TIMESTAMP).contains(&self.reveal_timestamp) {
            return Err(ValidationError::InvalidRevealTimestamp(self.reveal_timestamp));
        }

        if !self.options.iter().any(|o| *o == self.correct_option) {
            return Err(ValidationError::CorrectOptionNotInOptions {
                correct_option: self.correct_option.clone(),
            });
        }

        Ok(())
    }

    /// Position of the correct option (first match if the value repeats).
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| *o == self.correct_option)
    }

    pub fn is_correct_answer(&self, option: &str) -> bool {
        option == self.correct_option
    }
}

#[cfg(test)]
pub(crate) fn sample_item(title: &str, options: &[&str], correct: &str, reveal: f64) -> QuizItem {
    QuizItem {
        title: title.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_option: correct.to_string(),
        video_id: "xyz123".to_string(),
        reveal_timestamp: reveal,
        is_correct: None,
        extra: BTreeMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(sample_item("Q", &["A", "B"], "B", 10.0).validate().is_ok());

        assert_eq!(
            sample_item("Q", &["A", "B"], "C", 10.0).validate(),
            Err(ValidationError::CorrectOptionNotInOptions {
                correct_option: "C".to_string()
            })
        );
        assert_eq!(
            sample_item("Q", &[], "C", 10.0).validate(),
            Err(ValidationError::NoOptions)
        );
        assert!(matches!(
            sample_item("Q", &["A"], "A", -1.0).validate(),
            Err(ValidationError::InvalidRevealTimestamp(_))
        ));
        assert!(matches!(
            sample_item("Q", &["A"], "A", 1e20).validate(),
            Err(ValidationError::InvalidRevealTimestamp(_))
        ));
        assert!(matches!(
            sample_item("Q", &["A"], "A", f64::NAN).validate(),
            Err(ValidationError::InvalidRevealTimestamp(_))
        ));
        assert!(sample_item("Q", &["A"], "A", MAX_REVEAL_TIMESTAMP).validate().is_ok());
    }

    #[test]
    fn test_correct_index() {
        assert_eq!(sample_item("Q", &["A", "B", "B"], "B", 1.0).correct_index(), Some(1));
        assert_eq!(sample_item("Q", &["A"], "C", 1.0).correct_index(), None);
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{
            "title": "Q1",
            "options": ["A", "B"],
            "correctOption": "B",
            "videoId": "xyz123",
            "revealTimestamp": 42,
            "speaker": "Lee"
        }"#;
        let item: QuizItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.correct_option, "B");
        assert_eq!(item.reveal_timestamp, 42.0);
        assert_eq!(item.is_correct, None);
        assert_eq!(item.extra.get("speaker").map(String::as_str), Some("Lee"));

        let out = serde_json::to_string(&item).unwrap();
        assert!(out.contains("\"videoId\":\"xyz123\""));
        assert!(out.contains("\"speaker\":\"Lee\""));
        assert!(!out.contains("isCorrect"));
    }
}
