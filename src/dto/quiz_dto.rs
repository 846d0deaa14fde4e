use crate::models::answer::AnswerMap;
use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};
use validator::{Validate, ValidationError};

fn deserialize_id_flexible<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrInt {
        String(String),
        Int(i64),
        Null,
    }

    match StringOrInt::deserialize(deserializer)? {
        StringOrInt::String(s) => Ok(s.trim().to_string()),
        StringOrInt::Int(i) => Ok(i.to_string()),
        StringOrInt::Null => Ok(String::new()),
    }
}

fn deserialize_text_flexible<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_options_flexible<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OptionsShape {
        List(Vec<String>),
        // {"A": "...", "B": "..."}, ordered by key
        Keyed(BTreeMap<String, String>),
    }

    match Option::<OptionsShape>::deserialize(deserializer)? {
        Some(OptionsShape::List(options)) => Ok(options),
        Some(OptionsShape::Keyed(options)) => Ok(options.into_values().collect()),
        None => Ok(Vec::new()),
    }
}

fn validate_question_options(payload: &QuestionPayload) -> Result<(), ValidationError> {
    if payload.question_type != "MCQ" {
        return Ok(());
    }
    if payload.options.is_empty() {
        return Err(ValidationError::new("mcq_without_options"));
    }
    let mut seen = HashSet::new();
    if !payload.options.iter().all(|o| seen.insert(o.as_str())) {
        return Err(ValidationError::new("duplicate_option"));
    }
    Ok(())
}

/// One question as the service sends it, before partitioning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_question_options"))]
pub struct QuestionPayload {
    #[serde(default, deserialize_with = "deserialize_id_flexible")]
    #[validate(length(min = 1))]
    pub id: String,
    #[serde(rename = "type", default)]
    pub question_type: String,
    #[serde(default, deserialize_with = "deserialize_text_flexible")]
    #[validate(length(min = 1))]
    pub question: String,
    #[serde(default, deserialize_with = "deserialize_options_flexible")]
    pub options: Vec<String>,
}

impl QuestionPayload {
    pub fn mcq(id: &str, question: &str, options: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            question_type: "MCQ".to_string(),
            question: question.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }

    pub fn saq(id: &str, question: &str) -> Self {
        Self {
            id: id.to_string(),
            question_type: "SAQ".to_string(),
            question: question.to_string(),
            options: Vec::new(),
        }
    }
}

/// One entry of the `quiz` array. Entries are decoded independently so an
/// unreadable one is kept aside instead of failing the whole response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuizItem {
    Question(QuestionPayload),
    Unreadable(serde_json::Value),
}

impl QuizItem {
    /// Id if the entry carries one, for logging.
    pub fn type_tag(&self) -> Option<&str> {
        match self {
            QuizItem::Question(payload) => Some(payload.question_type.as_str()),
            QuizItem::Unreadable(value) => value.get("type").and_then(|t| t.as_str()),
        }
    }

    pub fn id(&self) -> String {
        match self {
            QuizItem::Question(payload) => payload.id.clone(),
            QuizItem::Unreadable(value) => match value.get("id") {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(serde_json::Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            },
        }
    }
}

impl From<QuestionPayload> for QuizItem {
    fn from(payload: QuestionPayload) -> Self {
        QuizItem::Question(payload)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadQuizResponse {
    pub quiz: Vec<QuizItem>,
    #[serde(default)]
    pub total_questions: Option<usize>,
    #[serde(default)]
    pub mcq_count: Option<usize>,
    #[serde(default)]
    pub saq_count: Option<usize>,
}

impl UploadQuizResponse {
    /// Counts reported by the service that disagree with the received
    /// entries, as `(label, reported, received)`.
    pub fn count_mismatches(&self) -> Vec<(&'static str, usize, usize)> {
        let tagged = |tag: &str| self.quiz.iter().filter(|q| q.type_tag() == Some(tag)).count();
        [
            ("total", self.total_questions, self.quiz.len()),
            ("MCQ", self.mcq_count, tagged("MCQ")),
            ("SAQ", self.saq_count, tagged("SAQ")),
        ]
        .into_iter()
        .filter_map(|(label, reported, received)| match reported {
            Some(reported) if reported != received => Some((label, reported, received)),
            _ => None,
        })
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SubmitQuizPayload {
    #[validate(length(min = 1))]
    pub pdf_names: Vec<String>,
    pub mcq_answers: AnswerMap,
    pub saq_answers: AnswerMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmitQuizResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub mcq_score: Option<u32>,
    #[serde(default)]
    pub mcq_total: Option<u32>,
    #[serde(default)]
    pub saq_pending: Option<u32>,
}

/// A document selected for upload, already read into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadDocument {
    pub file_name: String,
    pub content_type: String,
    pub content: Bytes,
}

impl UploadDocument {
    pub fn new(file_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        let content_type = crate::utils::documents::content_type_for(&file_name).to_string();
        Self {
            file_name,
            content_type,
            content: content.into(),
        }
    }
}
