use serde::{Deserialize, Serialize};

use super::answer::AnswerMap;
use super::question::Quiz;

/// What a submission endpoint returns: the aggregate verdict, plus the
/// persisted attempt id on the registered path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptOutcome {
    pub score: i64,
    pub max: i64,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempt_id: Option<u64>,
}

impl AttemptOutcome {
    pub fn summary(&self) -> AttemptSummary {
        AttemptSummary {
            score: self.score,
            max: self.max,
            passed: self.passed,
        }
    }
}

/// Lightweight guest result. No server-side record exists for it, so the
/// client stashes this in session-scoped storage after a guest submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptSummary {
    pub score: i64,
    pub max: i64,
    pub passed: bool,
}

/// A persisted attempt as returned by the latest-attempt query, including the
/// submitted answers keyed by question id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub id: u64,
    pub score: i64,
    pub max: i64,
    pub passed: bool,
    #[serde(default)]
    pub answers: AnswerMap,
}

impl AttemptRecord {
    pub fn summary(&self) -> AttemptSummary {
        AttemptSummary {
            score: self.score,
            max: self.max,
            passed: self.passed,
        }
    }
}

/// Payload of the latest-attempt query: the attempt together with the quiz
/// definitions (including correct-answer encodings) needed for the breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestAttempt {
    pub attempt: AttemptRecord,
    pub quiz: Quiz,
}
