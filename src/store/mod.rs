//! Device-scoped persistence for in-progress answers and guest results.
//!
//! Storage is best-effort throughout: a failed write is logged and swallowed,
//! and a malformed saved payload reads back as absent. Nothing in here may
//! interrupt the in-memory session.

mod answers;
mod backend;
mod session;

pub use answers::AnswerStore;
pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use session::SessionStore;

use crate::models::QuizId;

/// Key for the durable per-quiz answer map.
pub fn answers_key(quiz_id: QuizId) -> String {
    format!("quiz:{quiz_id}:answers")
}

/// Key for the session-scoped guest result summary.
pub fn result_key(quiz_id: QuizId) -> String {
    format!("quiz:{quiz_id}:result")
}
