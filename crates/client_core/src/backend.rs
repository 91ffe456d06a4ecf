use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use shared::protocol::{AnswerReply, AnswerRequest, StartResponse};
use tracing::debug;
use url::Url;

use crate::error::BackendError;

/// The remote question engine. Only its wire contract is known here.
#[async_trait]
pub trait GenieBackend: Send + Sync {
    async fn start_session(&self) -> Result<StartResponse, BackendError>;
    async fn submit_answer(&self, request: &AnswerRequest) -> Result<AnswerReply, BackendError>;
}

pub struct HttpGenieBackend {
    http: Client,
    base_url: Url,
}

impl HttpGenieBackend {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, BackendError> {
        let mut base_url = Url::parse(base_url).map_err(|source| BackendError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = Client::builder().timeout(request_timeout).build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|source| BackendError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                source,
            })
    }
}

async fn read_body(res: Response) -> Result<Vec<u8>, BackendError> {
    let status = res.status();
    if !status.is_success() {
        return Err(BackendError::Status { status });
    }
    Ok(res.bytes().await?.to_vec())
}

#[async_trait]
impl GenieBackend for HttpGenieBackend {
    async fn start_session(&self) -> Result<StartResponse, BackendError> {
        let url = self.endpoint("start")?;
        debug!(%url, "requesting new session");
        let res = self.http.get(url).send().await?;
        let body = read_body(res).await?;
        serde_json::from_slice(&body).map_err(|err| BackendError::Malformed(err.to_string()))
    }

    async fn submit_answer(&self, request: &AnswerRequest) -> Result<AnswerReply, BackendError> {
        let url = self.endpoint("answer")?;
        debug!(%url, answer = %request.answer, feature = %request.feature, "submitting answer");
        let res = self.http.post(url).json(request).send().await?;
        let body = read_body(res).await?;
        let value: Value = serde_json::from_slice(&body)
            .map_err(|err| BackendError::Malformed(err.to_string()))?;
        Ok(AnswerReply::from_json(value))
    }
}

#[cfg(test)]
#[path = "tests/backend_tests.rs"]
mod tests;
