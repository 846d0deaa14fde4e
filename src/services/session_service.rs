use crate::dto::quiz_dto::{QuizItem, SubmitQuizPayload};
use crate::error::{Error, Result};
use crate::models::question::{Question, QuestionType};
use crate::models::quiz::{Partition, QuizData};
use crate::models::session::{Progress, SessionState};
use crate::models::stage::{advance, SessionEvent, Stage};
use tracing::{debug, info, warn};

/// Sole owner and mutator of a quiz session's state.
#[derive(Debug, Default)]
pub struct SessionService {
    state: SessionState,
    generation: u64,
}

impl SessionService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn stage(&self) -> Stage {
        self.state.stage
    }

    pub fn quiz(&self) -> &QuizData {
        &self.state.quiz
    }

    /// Bumped on every stage change and reset.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn mcq_answer(&self, id: &str) -> Option<&str> {
        self.state.mcq_answers.get(id)
    }

    pub fn saq_answer(&self, id: &str) -> Option<&str> {
        self.state.saq_answers.get(id)
    }

    /// Questions of the stage currently being answered.
    pub fn current_questions(&self) -> &[Question] {
        match self.state.stage {
            Stage::Mcq => &self.state.quiz.mcq,
            Stage::Saq => &self.state.quiz.saq,
            Stage::Upload | Stage::Submit => &[],
        }
    }

    pub fn progress(&self) -> Progress {
        let (question_type, answers) = match self.state.stage {
            Stage::Mcq => (QuestionType::Mcq, &self.state.mcq_answers),
            Stage::Saq => (QuestionType::Saq, &self.state.saq_answers),
            Stage::Upload | Stage::Submit => return Progress::default(),
        };
        let questions = self.state.quiz.questions(question_type);
        Progress {
            answered: questions.iter().filter(|q| answers.contains(&q.id)).count(),
            total: questions.len(),
        }
    }

    pub fn load_quiz<T>(&mut self, raw: Vec<T>, file_names: Vec<String>) -> Result<Stage>
    where
        T: Into<QuizItem>,
    {
        // reject out-of-stage loads before touching anything
        advance(self.state.stage, SessionEvent::UploadSucceeded)?;

        if raw.is_empty() {
            return Err(Error::EmptyInput(
                "the service returned no questions".to_string(),
            ));
        }

        let received = raw.len();
        let Partition { quiz, dropped } = QuizData::partition(raw);
        if quiz.is_empty() {
            return Err(Error::EmptyInput(format!(
                "none of the {} returned questions could be used",
                received
            )));
        }
        if dropped > 0 {
            warn!(dropped, received, "Some questions were dropped while loading the quiz");
        }

        info!(
            mcq = quiz.mcq.len(),
            saq = quiz.saq.len(),
            files = file_names.len(),
            "Quiz loaded"
        );

        self.state.quiz = quiz;
        self.state.mcq_answers.clear();
        self.state.saq_answers.clear();
        self.state.uploaded_file_names = file_names;

        self.fire(SessionEvent::UploadSucceeded)?;
        self.skip_empty_stages()
    }

    /// Upserts the selected option for `id`. The caller is trusted to pass
    /// ids and options taken from the loaded quiz; anything else is stored
    /// anyway and only logged.
    pub fn record_mcq_answer(&mut self, id: impl Into<String>, option: impl Into<String>) -> Option<String> {
        let id = id.into();
        let option = option.into();
        match self.state.quiz.find(&id).filter(|q| q.is_mcq()) {
            Some(question) if !question.has_option(&option) => {
                warn!(question_id = %id, option = %option, "Answer is not one of the question's options");
            }
            None => warn!(question_id = %id, "Answer recorded for an id outside the MCQ set"),
            Some(_) => debug!(question_id = %id, "Recording MCQ answer"),
        }
        self.state.mcq_answers.record(id, option)
    }

    pub fn record_saq_answer(&mut self, id: impl Into<String>, text: impl Into<String>) -> Option<String> {
        let id = id.into();
        debug!(question_id = %id, "Recording SAQ answer");
        self.state.saq_answers.record(id, text)
    }

    pub fn finish_stage(&mut self) -> Result<Stage> {
        let event = match self.state.stage {
            Stage::Upload | Stage::Mcq => SessionEvent::FinishMcq,
            Stage::Saq | Stage::Submit => SessionEvent::FinishSaq,
        };
        self.fire(event)?;
        self.skip_empty_stages()
    }

    pub fn build_submission(&self) -> SubmitQuizPayload {
        let quiz = &self.state.quiz;
        let payload = SubmitQuizPayload {
            pdf_names: self.state.uploaded_file_names.clone(),
            mcq_answers: self
                .state
                .mcq_answers
                .filtered(|id| quiz.contains(QuestionType::Mcq, id)),
            saq_answers: self
                .state
                .saq_answers
                .filtered(|id| quiz.contains(QuestionType::Saq, id)),
        };

        let ignored = self.state.mcq_answers.len() + self.state.saq_answers.len()
            - payload.mcq_answers.len()
            - payload.saq_answers.len();
        if ignored > 0 {
            debug!(ignored, "Answers for unknown question ids left out of submission");
        }
        payload
    }

    pub fn complete_submission(&mut self) -> Result<Stage> {
        self.fire(SessionEvent::SubmitSucceeded)?;
        self.state = SessionState::default();
        Ok(self.state.stage)
    }

    /// Drops the current quiz without submitting it.
    pub fn reset(&mut self) {
        info!(from = %self.state.stage, "Session reset");
        self.state = SessionState::default();
        self.generation += 1;
    }

    fn fire(&mut self, event: SessionEvent) -> Result<Stage> {
        let from = self.state.stage;
        let to = advance(from, event).map_err(|e| {
            warn!(stage = %from, event = %event, "Rejected stage transition");
            e
        })?;
        info!(from = %from, to = %to, event = %event, "Stage transition");
        self.state.stage = to;
        self.generation += 1;
        Ok(to)
    }

    fn skip_empty_stages(&mut self) -> Result<Stage> {
        if self.state.stage == Stage::Mcq && self.state.quiz.mcq.is_empty() {
            self.fire(SessionEvent::FinishMcq)?;
        }
        if self.state.stage == Stage::Saq && self.state.quiz.saq.is_empty() {
            self.fire(SessionEvent::FinishSaq)?;
        }
        Ok(self.state.stage)
    }
}
