use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{AnswerMap, AttemptOutcome, AttemptSummary, LatestAttempt, Quiz, QuizId, User};

/// Error type for platform API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}")]
    Status { status: u16 },
}

impl ApiError {
    /// Whether one automatic retry is worth attempting: connection-level
    /// failures and server errors, never client errors like 401 or 404.
    fn is_transient(&self) -> bool {
        match self {
            ApiError::Http(err) => err.is_connect() || err.is_timeout() || err.is_request(),
            ApiError::Status { status } => *status >= 500,
        }
    }

    fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status } => Some(*status),
            ApiError::Http(_) => None,
        }
    }
}

/// Every platform response wraps its payload in a `data` envelope.
#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Serialize)]
struct AttemptPayload<'a> {
    answers: &'a AnswerMap,
}

/// Typed client over the platform's REST API. Reads get one automatic retry
/// on transient failure before the error surfaces; writes never retry.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// The quiz definition with its embedded question sequence.
    pub async fn fetch_quiz(&self, quiz_id: QuizId) -> Result<Quiz, ApiError> {
        let envelope: Envelope<Quiz> = self
            .get(&format!("/quizzes/{quiz_id}?with_questions=1"))
            .await?;
        Ok(envelope.data)
    }

    /// The current identity, or `None` when the session is unauthenticated.
    pub async fn fetch_current_user(&self) -> Result<Option<User>, ApiError> {
        match self.get::<Envelope<User>>("/user").await {
            Ok(envelope) => Ok(Some(envelope.data)),
            Err(err) if err.status() == Some(401) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Submit the answer set on the registered path.
    pub async fn submit_registered_attempt(
        &self,
        quiz_id: QuizId,
        answers: &AnswerMap,
    ) -> Result<AttemptOutcome, ApiError> {
        let envelope: Envelope<AttemptOutcome> = self
            .post(
                &format!("/quizzes/{quiz_id}/attempts"),
                &AttemptPayload { answers },
            )
            .await?;
        Ok(envelope.data)
    }

    /// Submit the answer set on the guest path.
    pub async fn submit_guest_attempt(
        &self,
        quiz_id: QuizId,
        answers: &AnswerMap,
    ) -> Result<AttemptSummary, ApiError> {
        let envelope: Envelope<AttemptSummary> = self
            .post(
                &format!("/quizzes/{quiz_id}/guest-attempt"),
                &AttemptPayload { answers },
            )
            .await?;
        Ok(envelope.data)
    }

    /// The caller's most recent attempt with the quiz definitions needed for
    /// the breakdown. Unauthorized or no attempt yet reads as `None`.
    pub async fn fetch_latest_attempt(
        &self,
        quiz_id: QuizId,
    ) -> Result<Option<LatestAttempt>, ApiError> {
        match self
            .get::<Envelope<LatestAttempt>>(&format!("/quizzes/{quiz_id}/my-latest-attempt"))
            .await
        {
            Ok(envelope) => Ok(Some(envelope.data)),
            Err(err) if matches!(err.status(), Some(401) | Some(404)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        match self.get_once(path).await {
            Err(err) if err.is_transient() => {
                debug!("GET {path} failed ({err}), retrying once");
                self.get_once(path).await
            }
            result => result,
        }
    }

    async fn get_once<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.http.get(format!("{}{path}", self.base_url));
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
            });
        }
        Ok(response.json().await?)
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.http.post(format!("{}{path}", self.base_url)).json(body);
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
            });
        }
        Ok(response.json().await?)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}
