//! Routes a completed answer set to the registered or guest endpoint.

use crate::api::{ApiClient, ApiError};
use crate::models::{AnswerMap, AttemptOutcome, AttemptSummary, QuizId, User};
use crate::store::SessionStore;

/// Authentication state observed immediately before dispatch. Passed in
/// explicitly so the routing decision never races a stale cached identity.
#[derive(Debug, Clone)]
pub enum AuthStatus {
    Authenticated(User),
    Guest,
}

impl AuthStatus {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthStatus::Authenticated(_))
    }
}

/// What a successful submission produced.
#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    /// Persisted server-side; retrievable later via the latest-attempt query.
    Registered(AttemptOutcome),
    /// Ephemeral; the summary was stashed in the session store.
    Guest(AttemptSummary),
}

impl SubmissionOutcome {
    pub fn summary(&self) -> AttemptSummary {
        match self {
            SubmissionOutcome::Registered(outcome) => outcome.summary(),
            SubmissionOutcome::Guest(summary) => summary.clone(),
        }
    }
}

/// The two submission operations the router dispatches to. A seam so the
/// routing logic is testable without a server.
pub trait SubmitApi {
    async fn submit_registered(
        &self,
        quiz_id: QuizId,
        answers: &AnswerMap,
    ) -> Result<AttemptOutcome, ApiError>;

    async fn submit_guest(
        &self,
        quiz_id: QuizId,
        answers: &AnswerMap,
    ) -> Result<AttemptSummary, ApiError>;
}

impl SubmitApi for ApiClient {
    async fn submit_registered(
        &self,
        quiz_id: QuizId,
        answers: &AnswerMap,
    ) -> Result<AttemptOutcome, ApiError> {
        self.submit_registered_attempt(quiz_id, answers).await
    }

    async fn submit_guest(
        &self,
        quiz_id: QuizId,
        answers: &AnswerMap,
    ) -> Result<AttemptSummary, ApiError> {
        self.submit_guest_attempt(quiz_id, answers).await
    }
}

/// Send the full answer map to the endpoint matching `auth`.
///
/// The guest path stashes the returned summary in session storage, since no
/// server-side record will exist to query afterwards. On failure nothing is
/// recorded anywhere and the error surfaces as retryable; the caller keeps
/// the in-memory answers intact.
pub async fn submit_attempt<A: SubmitApi>(
    api: &A,
    session: &SessionStore,
    quiz_id: QuizId,
    answers: &AnswerMap,
    auth: &AuthStatus,
) -> Result<SubmissionOutcome, ApiError> {
    match auth {
        AuthStatus::Authenticated(_) => {
            let outcome = api.submit_registered(quiz_id, answers).await?;
            Ok(SubmissionOutcome::Registered(outcome))
        }
        AuthStatus::Guest => {
            let summary = api.submit_guest(quiz_id, answers).await?;
            session.store_guest_result(quiz_id, &summary);
            Ok(SubmissionOutcome::Guest(summary))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::models::AnswerValue;
    use crate::store::MemoryBackend;

    #[derive(Default)]
    struct ScriptedApi {
        registered_calls: AtomicUsize,
        guest_calls: AtomicUsize,
        fail: bool,
    }

    impl SubmitApi for ScriptedApi {
        async fn submit_registered(
            &self,
            _quiz_id: QuizId,
            _answers: &AnswerMap,
        ) -> Result<AttemptOutcome, ApiError> {
            self.registered_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ApiError::Status { status: 500 });
            }
            Ok(AttemptOutcome {
                score: 4,
                max: 5,
                passed: true,
                attempt_id: Some(77),
            })
        }

        async fn submit_guest(
            &self,
            _quiz_id: QuizId,
            _answers: &AnswerMap,
        ) -> Result<AttemptSummary, ApiError> {
            self.guest_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ApiError::Status { status: 500 });
            }
            Ok(AttemptSummary {
                score: 3,
                max: 5,
                passed: false,
            })
        }
    }

    fn answers() -> AnswerMap {
        let mut map = AnswerMap::new();
        map.set(1, AnswerValue::from("A"));
        map
    }

    fn user() -> User {
        User {
            id: 9,
            name: None,
            email: None,
            role: Some("student".into()),
            roles: None,
        }
    }

    #[tokio::test]
    async fn authenticated_submission_takes_the_registered_path() {
        let api = ScriptedApi::default();
        let session = SessionStore::new(Arc::new(MemoryBackend::new()));

        let outcome = submit_attempt(
            &api,
            &session,
            42,
            &answers(),
            &AuthStatus::Authenticated(user()),
        )
        .await
        .unwrap();

        assert_eq!(api.registered_calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.guest_calls.load(Ordering::SeqCst), 0);
        assert!(matches!(
            outcome,
            SubmissionOutcome::Registered(AttemptOutcome {
                attempt_id: Some(77),
                ..
            })
        ));
        // Registered attempts are retrievable from the server; nothing is
        // stashed locally.
        assert_eq!(session.guest_result(42), None);
    }

    #[tokio::test]
    async fn guest_submission_stashes_the_summary() {
        let api = ScriptedApi::default();
        let session = SessionStore::new(Arc::new(MemoryBackend::new()));

        let outcome = submit_attempt(&api, &session, 42, &answers(), &AuthStatus::Guest)
            .await
            .unwrap();

        assert_eq!(api.guest_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            outcome.summary(),
            AttemptSummary {
                score: 3,
                max: 5,
                passed: false
            }
        );
        assert_eq!(
            session.guest_result(42),
            Some(AttemptSummary {
                score: 3,
                max: 5,
                passed: false
            })
        );
    }

    #[tokio::test]
    async fn failed_submission_records_nothing() {
        let api = ScriptedApi {
            fail: true,
            ..ScriptedApi::default()
        };
        let session = SessionStore::new(Arc::new(MemoryBackend::new()));

        let result = submit_attempt(&api, &session, 42, &answers(), &AuthStatus::Guest).await;
        assert!(result.is_err());
        assert_eq!(session.guest_result(42), None);
    }
}
