use crate::dto::quiz_dto::{SubmitQuizPayload, SubmitQuizResponse, UploadDocument, UploadQuizResponse};
use crate::error::Result;
use async_trait::async_trait;

/// Network side of a quiz session: turns documents into questions and
/// delivers collected answers. Implementations report any failure as
/// `Error::Transport`; callers only look at success or failure.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizGateway: Send + Sync {
    async fn upload_documents(&self, documents: Vec<UploadDocument>) -> Result<UploadQuizResponse>;

    async fn submit_answers(&self, payload: &SubmitQuizPayload) -> Result<SubmitQuizResponse>;
}
