//! Wire and domain types for the quiz attempt flow.

mod answer;
mod attempt;
mod question;
mod user;

pub use answer::{AnswerMap, AnswerValue};
pub use attempt::{AttemptOutcome, AttemptRecord, AttemptSummary, LatestAttempt};
pub use question::{Question, QuestionId, Quiz, QuizId, QuizKind};
pub use user::{resolve_role, Role, User};
