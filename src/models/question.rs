use serde::{Deserialize, Serialize};

/// Server-assigned quiz identifier.
pub type QuizId = u64;

/// Server-assigned question identifier.
pub type QuestionId = u64;

/// How the quiz content was authored on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizKind {
    File,
    Inline,
}

/// A quiz definition with its ordered question sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: QuizId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: QuizKind,
    pub pass_score: i64,
    #[serde(default)]
    pub allow_guest: bool,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Quiz {
    /// Sum of question point weights.
    pub fn total_points(&self) -> i64 {
        self.questions.iter().map(Question::points).sum()
    }
}

/// A single question. `choices` absent means free text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub quiz_id: QuizId,
    pub question_text: String,
    #[serde(default)]
    pub choices: Option<Vec<String>>,
    #[serde(default)]
    pub points: Option<i64>,
    #[serde(default)]
    pub audio_path: Option<String>,
    /// Correct-answer encoding: a plain scalar or a JSON-encoded list.
    /// Only present on payloads the server sends to the result view.
    #[serde(default)]
    pub correct_answer: Option<String>,
}

impl Question {
    /// Point weight, defaulting to 1 when the server omits it.
    pub fn points(&self) -> i64 {
        self.points.unwrap_or(1)
    }

    /// Whether this question renders as a choice list.
    pub fn has_choices(&self) -> bool {
        self.choices.as_ref().is_some_and(|c| !c.is_empty())
    }
}
