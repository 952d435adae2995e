use std::path::PathBuf;
use std::sync::Arc;

use log::debug;

use crate::models::{AttemptSummary, QuizId};

use super::backend::{FileBackend, StorageBackend};
use super::result_key;

/// Session-scoped store for guest result summaries.
///
/// Guest attempts leave no server-side record, so the summary returned by the
/// guest-attempt endpoint is stashed here under `quiz:{id}:result` and read
/// back by the result view. Lives only as long as the login session.
pub struct SessionStore {
    backend: Arc<dyn StorageBackend>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Store backed by files under `dir`. The stash must outlive the
    /// process (a guest submits in one invocation and reads the result in
    /// the next) but not the login session, so callers point this at a
    /// runtime or temp directory the OS clears for them.
    pub fn file_backed(dir: PathBuf) -> Self {
        Self::new(Arc::new(FileBackend::new(dir)))
    }

    /// Best-effort write; a storage failure never surfaces.
    pub fn store_guest_result(&self, quiz_id: QuizId, summary: &AttemptSummary) {
        let key = result_key(quiz_id);
        match serde_json::to_string(summary) {
            Ok(payload) => {
                if let Err(err) = self.backend.write(&key, &payload) {
                    debug!("failed to stash guest result under {key}: {err}");
                }
            }
            Err(err) => debug!("failed to encode guest result for {key}: {err}"),
        }
    }

    /// The stashed summary for this quiz, if any. Malformed payloads read
    /// back as absent.
    pub fn guest_result(&self, quiz_id: QuizId) -> Option<AttemptSummary> {
        let payload = self.backend.read(&result_key(quiz_id))?;
        match serde_json::from_str(&payload) {
            Ok(summary) => Some(summary),
            Err(err) => {
                debug!("discarding malformed guest result for quiz {quiz_id}: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::backend::MemoryBackend;
    use super::*;

    #[test]
    fn stores_summary_under_the_result_key() {
        let backend = Arc::new(MemoryBackend::new());
        let store = SessionStore::new(Arc::clone(&backend) as Arc<dyn StorageBackend>);

        store.store_guest_result(
            42,
            &AttemptSummary {
                score: 3,
                max: 5,
                passed: false,
            },
        );

        let raw = backend.read("quiz:42:result").unwrap();
        let decoded: AttemptSummary = serde_json::from_str(&raw).unwrap();
        assert_eq!(decoded.score, 3);
        assert_eq!(decoded.max, 5);
        assert!(!decoded.passed);

        assert_eq!(store.guest_result(42).unwrap(), decoded);
        assert_eq!(store.guest_result(43), None);
    }

    #[test]
    fn malformed_summary_reads_back_as_absent() {
        let backend = Arc::new(MemoryBackend::new());
        backend.write("quiz:8:result", "{oops").unwrap();

        let store = SessionStore::new(backend);
        assert_eq!(store.guest_result(8), None);
    }
}
