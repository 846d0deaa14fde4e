use crate::models::answer::AnswerMap;
use crate::models::quiz::QuizData;
use crate::models::stage::Stage;
use serde::{Deserialize, Serialize};

/// Everything a quiz session knows. `Default` is the initial shape: `UPLOAD`
/// stage with no quiz, no answers and no file names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub stage: Stage,
    pub quiz: QuizData,
    pub mcq_answers: AnswerMap,
    pub saq_answers: AnswerMap,
    pub uploaded_file_names: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.answered >= self.total
    }
}
