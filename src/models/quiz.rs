use crate::dto::quiz_dto::{QuestionPayload, QuizItem};
use crate::error::Error;
use crate::models::question::{Question, QuestionType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizData {
    pub mcq: Vec<Question>,
    pub saq: Vec<Question>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub quiz: QuizData,
    pub dropped: usize,
}

impl QuizData {
    /// Splits raw questions by their `type` tag. Entries that are unreadable,
    /// malformed or reuse an id already seen are dropped and counted.
    pub fn partition<T>(raw: Vec<T>) -> Partition
    where
        T: Into<QuizItem>,
    {
        let mut quiz = QuizData::default();
        let mut seen: HashSet<String> = HashSet::new();
        let mut dropped = 0;

        for (idx, item) in raw.into_iter().enumerate() {
            let item: QuizItem = item.into();
            let mut payload = match item {
                QuizItem::Question(payload) => payload,
                QuizItem::Unreadable(value) => {
                    let reason = serde_json::from_value::<QuestionPayload>(value.clone())
                        .err()
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| "unreadable entry".to_string());
                    let err = Error::MalformedQuestion {
                        id: QuizItem::Unreadable(value).id(),
                        reason,
                    };
                    warn!(error = %err, "Dropping malformed question");
                    dropped += 1;
                    continue;
                }
            };
            if payload.id.is_empty() {
                payload.id = format!("q_{}", idx);
            }

            let question = match Question::try_from(payload) {
                Ok(q) => q,
                Err(e) => {
                    warn!(error = %e, "Dropping malformed question");
                    dropped += 1;
                    continue;
                }
            };

            if !seen.insert(question.id.clone()) {
                warn!(question_id = %question.id, "Dropping question with duplicate id");
                dropped += 1;
                continue;
            }

            match question.question_type {
                QuestionType::Mcq => quiz.mcq.push(question),
                QuestionType::Saq => quiz.saq.push(question),
            }
        }

        Partition { quiz, dropped }
    }

    pub fn questions(&self, question_type: QuestionType) -> &[Question] {
        match question_type {
            QuestionType::Mcq => &self.mcq,
            QuestionType::Saq => &self.saq,
        }
    }

    pub fn find(&self, id: &str) -> Option<&Question> {
        self.mcq.iter().chain(self.saq.iter()).find(|q| q.id == id)
    }

    pub fn contains(&self, question_type: QuestionType, id: &str) -> bool {
        self.questions(question_type).iter().any(|q| q.id == id)
    }

    pub fn len(&self) -> usize {
        self.mcq.len() + self.saq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mcq.is_empty() && self.saq.is_empty()
    }
}
