use crate::dto::quiz_dto::QuestionPayload;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "MCQ")]
    Mcq,
    #[serde(rename = "SAQ")]
    Saq,
}

impl QuestionType {
    /// Exact, case-sensitive match on the wire tag.
    pub fn from_wire(tag: &str) -> Option<Self> {
        match tag {
            "MCQ" => Some(Self::Mcq),
            "SAQ" => Some(Self::Saq),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub question: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl Question {
    pub fn is_mcq(&self) -> bool {
        self.question_type == QuestionType::Mcq
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

impl TryFrom<QuestionPayload> for Question {
    type Error = Error;

    fn try_from(payload: QuestionPayload) -> Result<Self> {
        let question_type = QuestionType::from_wire(&payload.question_type).ok_or_else(|| {
            Error::MalformedQuestion {
                id: payload.id.clone(),
                reason: format!("unknown question type {:?}", payload.question_type),
            }
        })?;

        payload.validate().map_err(|e| Error::MalformedQuestion {
            id: payload.id.clone(),
            reason: e.to_string(),
        })?;

        // options carried on an SAQ are ignored
        let options = match question_type {
            QuestionType::Mcq => payload.options,
            QuestionType::Saq => Vec::new(),
        };

        Ok(Question {
            id: payload.id,
            question_type,
            question: payload.question,
            options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_mcq_and_saq() {
        let q = Question::try_from(QuestionPayload::mcq("q1", "2+2?", &["3", "4"])).unwrap();
        assert_eq!(q.question_type, QuestionType::Mcq);
        assert!(q.has_option("4"));
        assert!(!q.has_option("5"));

        let mut saq = QuestionPayload::saq("q2", "Explain X");
        saq.options = vec!["stray".into()];
        let q = Question::try_from(saq).unwrap();
        assert_eq!(q.question_type, QuestionType::Saq);
        assert!(q.options.is_empty());
    }

    #[test]
    fn rejects_unknown_and_lowercase_types() {
        for tag in ["TF", "mcq", ""] {
            let mut payload = QuestionPayload::saq("q9", "?");
            payload.question_type = tag.to_string();
            let err = Question::try_from(payload).unwrap_err();
            assert!(matches!(err, Error::MalformedQuestion { ref id, .. } if id == "q9"));
        }
    }

    #[test]
    fn rejects_mcq_without_options() {
        let err = Question::try_from(QuestionPayload::mcq("q1", "2+2?", &[])).unwrap_err();
        assert!(matches!(err, Error::MalformedQuestion { .. }));
    }
}
