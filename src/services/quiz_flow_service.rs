use crate::dto::quiz_dto::{SubmitQuizResponse, UploadDocument};
use crate::error::{Error, Result};
use crate::models::session::{Progress, SessionState};
use crate::models::stage::{Operation, SessionEvent, Stage};
use crate::services::gateway::QuizGateway;
use crate::services::session_service::SessionService;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool, operation: Operation) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::OperationInFlight(operation))?;
        Ok(Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// One user's quiz session wired to a gateway. Cloning yields another handle
/// to the same session.
#[derive(Clone)]
pub struct QuizFlowService {
    session_id: Uuid,
    gateway: Arc<dyn QuizGateway>,
    session: Arc<Mutex<SessionService>>,
    uploading: Arc<AtomicBool>,
    submitting: Arc<AtomicBool>,
}

impl QuizFlowService {
    pub fn new(gateway: Arc<dyn QuizGateway>) -> Self {
        let session_id = Uuid::new_v4();
        info!(%session_id, "Quiz session created");
        Self {
            session_id,
            gateway,
            session: Arc::new(Mutex::new(SessionService::new())),
            uploading: Arc::new(AtomicBool::new(false)),
            submitting: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    // The lock is only ever held for one synchronous mutation, so a poisoned
    // lock still guards a consistent state.
    fn session(&self) -> MutexGuard<'_, SessionService> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> SessionState {
        self.session().state().clone()
    }

    pub fn stage(&self) -> Stage {
        self.session().stage()
    }

    pub fn progress(&self) -> Progress {
        self.session().progress()
    }

    pub fn is_in_flight(&self, operation: Operation) -> bool {
        match operation {
            Operation::Upload => self.uploading.load(Ordering::Acquire),
            Operation::Submit => self.submitting.load(Ordering::Acquire),
        }
    }

    pub async fn upload(&self, documents: Vec<UploadDocument>) -> Result<Stage> {
        if documents.is_empty() {
            return Err(Error::EmptyInput(
                "select at least one document to upload".to_string(),
            ));
        }
        let _guard = InFlightGuard::acquire(&self.uploading, Operation::Upload)?;

        let generation = {
            let session = self.session();
            if session.stage() != Stage::Upload {
                return Err(Error::InvalidTransition {
                    stage: session.stage(),
                    event: SessionEvent::UploadSucceeded,
                });
            }
            session.generation()
        };
        let file_names: Vec<String> = documents.iter().map(|d| d.file_name.clone()).collect();

        info!(session_id = %self.session_id, files = ?file_names, "Requesting quiz generation");
        let response = self.gateway.upload_documents(documents).await.map_err(|e| {
            warn!(session_id = %self.session_id, error = %e, "Upload failed");
            e
        })?;

        let mut session = self.session();
        if session.generation() != generation {
            warn!(session_id = %self.session_id, "Session changed during upload, discarding questions");
            return Err(Error::StaleResponse(Operation::Upload));
        }
        session.load_quiz(response.quiz, file_names)
    }

    pub fn record_mcq_answer(&self, id: &str, option: &str) -> Option<String> {
        self.session().record_mcq_answer(id, option)
    }

    pub fn record_saq_answer(&self, id: &str, text: &str) -> Option<String> {
        self.session().record_saq_answer(id, text)
    }

    pub fn finish_stage(&self) -> Result<Stage> {
        self.session().finish_stage()
    }

    pub fn reset(&self) {
        self.session().reset();
    }

    /// Sends the collected answers. On failure the session stays in
    /// `SUBMIT` with every answer intact, so calling this again retries
    /// the same payload.
    ///
    /// If the session was reset while the request was out, the service has
    /// still recorded the submission: the ack is returned and the session
    /// is left as the reset made it.
    pub async fn submit(&self) -> Result<SubmitQuizResponse> {
        let _guard = InFlightGuard::acquire(&self.submitting, Operation::Submit)?;

        let (generation, payload) = {
            let session = self.session();
            if session.stage() != Stage::Submit {
                return Err(Error::InvalidTransition {
                    stage: session.stage(),
                    event: SessionEvent::SubmitSucceeded,
                });
            }
            (session.generation(), session.build_submission())
        };
        payload.validate()?;

        let ack = self.gateway.submit_answers(&payload).await.map_err(|e| {
            warn!(session_id = %self.session_id, error = %e, "Submit failed, answers kept for retry");
            e
        })?;

        let mut session = self.session();
        if session.generation() != generation {
            warn!(session_id = %self.session_id, "Session changed during submit, ack returned without resetting");
            return Ok(ack);
        }
        session.complete_submission()?;
        info!(session_id = %self.session_id, "Quiz submitted");
        Ok(ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::quiz_dto::{QuestionPayload, UploadQuizResponse};
    use crate::services::gateway::MockQuizGateway;
    use tokio_test::{assert_err, assert_ok};

    fn docs() -> Vec<UploadDocument> {
        vec![UploadDocument::new("notes.pdf", b"%PDF-1.4".to_vec())]
    }

    fn quiz_response() -> UploadQuizResponse {
        UploadQuizResponse {
            quiz: vec![
                QuestionPayload::mcq("q1", "2+2?", &["3", "4"]).into(),
                QuestionPayload::saq("q2", "Explain X").into(),
            ],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn upload_with_no_documents_never_calls_gateway() {
        let mut gateway = MockQuizGateway::new();
        gateway.expect_upload_documents().never();
        let flow = QuizFlowService::new(Arc::new(gateway));

        let err = flow.upload(Vec::new()).await.unwrap_err();
        assert!(matches!(err, Error::EmptyInput(_)));
        assert_eq!(flow.stage(), Stage::Upload);
    }

    #[tokio::test]
    async fn upload_loads_quiz_and_records_file_names() {
        let mut gateway = MockQuizGateway::new();
        gateway
            .expect_upload_documents()
            .times(1)
            .withf(|docs| docs.len() == 1 && docs[0].file_name == "notes.pdf")
            .returning(|_| Ok(quiz_response()));
        let flow = QuizFlowService::new(Arc::new(gateway));

        assert_eq!(flow.upload(docs()).await.unwrap(), Stage::Mcq);
        let state = flow.snapshot();
        assert_eq!(state.quiz.mcq[0].id, "q1");
        assert_eq!(state.quiz.saq[0].id, "q2");
        assert_eq!(state.uploaded_file_names, vec!["notes.pdf"]);
        assert!(!flow.is_in_flight(Operation::Upload));
    }

    #[tokio::test]
    async fn upload_failure_holds_upload_stage() {
        let mut gateway = MockQuizGateway::new();
        gateway
            .expect_upload_documents()
            .returning(|_| Err(Error::Transport("connection reset".into())));
        let flow = QuizFlowService::new(Arc::new(gateway));

        let err = flow.upload(docs()).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(flow.snapshot(), SessionState::default());
        assert!(!flow.is_in_flight(Operation::Upload));
    }

    #[tokio::test]
    async fn zero_questions_from_service_is_empty_input() {
        let mut gateway = MockQuizGateway::new();
        gateway
            .expect_upload_documents()
            .returning(|_| Ok(UploadQuizResponse::default()));
        let flow = QuizFlowService::new(Arc::new(gateway));

        assert!(matches!(flow.upload(docs()).await, Err(Error::EmptyInput(_))));
        assert_eq!(flow.stage(), Stage::Upload);
    }

    #[tokio::test]
    async fn submit_failure_keeps_answers_and_allows_retry() {
        let mut gateway = MockQuizGateway::new();
        gateway
            .expect_upload_documents()
            .returning(|_| Ok(quiz_response()));
        let mut seq = mockall::Sequence::new();
        gateway
            .expect_submit_answers()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(Error::Transport("502 bad gateway".into())));
        gateway
            .expect_submit_answers()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|p| p.mcq_answers.get("q1") == Some("4") && p.saq_answers.get("q2") == Some(""))
            .returning(|_| {
                Ok(SubmitQuizResponse {
                    message: Some("Quiz submitted successfully".into()),
                    mcq_score: Some(1),
                    mcq_total: Some(1),
                    saq_pending: Some(1),
                })
            });
        let flow = QuizFlowService::new(Arc::new(gateway));

        assert_ok!(flow.upload(docs()).await);
        flow.record_mcq_answer("q1", "4");
        assert_ok!(flow.finish_stage());
        flow.record_saq_answer("q2", "");
        assert_eq!(flow.finish_stage().unwrap(), Stage::Submit);

        let before = flow.snapshot();
        assert_err!(flow.submit().await);
        assert_eq!(flow.snapshot(), before);
        assert_eq!(flow.stage(), Stage::Submit);

        let ack = flow.submit().await.unwrap();
        assert_eq!(ack.mcq_score, Some(1));
        assert_eq!(flow.snapshot(), SessionState::default());
    }

    #[tokio::test]
    async fn submit_outside_submit_stage_is_rejected() {
        let mut gateway = MockQuizGateway::new();
        gateway.expect_submit_answers().never();
        let flow = QuizFlowService::new(Arc::new(gateway));

        assert!(matches!(
            flow.submit().await,
            Err(Error::InvalidTransition { stage: Stage::Upload, .. })
        ));
    }

    #[test]
    fn guard_blocks_second_acquire_until_dropped() {
        let flag = AtomicBool::new(false);
        let first = InFlightGuard::acquire(&flag, Operation::Submit).unwrap();
        assert!(matches!(
            InFlightGuard::acquire(&flag, Operation::Submit),
            Err(Error::OperationInFlight(Operation::Submit))
        ));
        drop(first);
        assert!(InFlightGuard::acquire(&flag, Operation::Submit).is_ok());
    }
}
