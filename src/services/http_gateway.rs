use crate::config::Config;
use crate::dto::quiz_dto::{SubmitQuizPayload, SubmitQuizResponse, UploadDocument, UploadQuizResponse};
use crate::error::{Error, Result};
use crate::services::gateway::QuizGateway;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

const UPLOAD_PATH: &str = "upload_pdfs/";
const SUBMIT_PATH: &str = "submit_quiz/";
const UPLOAD_FIELD: &str = "files";

#[derive(Clone)]
pub struct HttpQuizGateway {
    client: Client,
    base_url: Url,
}

impl HttpQuizGateway {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.api_base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Config(format!("Invalid endpoint {}: {}", path, e)))
    }

    async fn read_json<T: DeserializeOwned>(what: &str, resp: Response) -> Result<T> {
        let status = resp.status();
        let txt = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            warn!(status = status.as_u16(), "{} request rejected", what);
            return Err(Error::Transport(format!(
                "{} status {}: {}",
                what,
                status.as_u16(),
                txt
            )));
        }
        serde_json::from_str(&txt)
            .map_err(|e| Error::Transport(format!("{} response parse failed: {}", what, e)))
    }
}

#[async_trait]
impl QuizGateway for HttpQuizGateway {
    async fn upload_documents(&self, documents: Vec<UploadDocument>) -> Result<UploadQuizResponse> {
        let url = self.endpoint(UPLOAD_PATH)?;
        info!(url = %url, count = documents.len(), "Uploading documents");

        let mut form = Form::new();
        for doc in documents {
            let part = Part::bytes(doc.content.to_vec())
                .file_name(doc.file_name)
                .mime_str(&doc.content_type)?;
            form = form.part(UPLOAD_FIELD, part);
        }

        let resp = self.client.post(url).multipart(form).send().await?;
        let parsed: UploadQuizResponse = Self::read_json("upload", resp).await?;

        for (label, reported, received) in parsed.count_mismatches() {
            warn!(
                count = label,
                reported,
                received,
                "Question count in upload response does not match quiz"
            );
        }
        Ok(parsed)
    }

    async fn submit_answers(&self, payload: &SubmitQuizPayload) -> Result<SubmitQuizResponse> {
        let url = self.endpoint(SUBMIT_PATH)?;
        info!(
            url = %url,
            mcq = payload.mcq_answers.len(),
            saq = payload.saq_answers.len(),
            "Submitting answers"
        );

        let resp = self
            .client
            .post(url)
            .header("Accept", "application/json")
            .json(payload)
            .send()
            .await?;
        Self::read_json("submit", resp).await
    }
}
