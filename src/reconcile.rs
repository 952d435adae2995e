//! Read-side correctness reconciliation for the result breakdown.
//!
//! Advisory only: the headline verdict always comes from the server-provided
//! score/max/passed aggregate, and nothing here mutates the attempt or
//! recomputes that score.

use serde_json::Value;

use crate::models::{AnswerMap, AnswerValue, Question, QuestionId};

/// Per-question verdict for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub question_id: QuestionId,
    pub correct: bool,
}

/// Compare every question's given answer against its correct-answer encoding.
/// Questions without an encoding are marked incorrect rather than skipped,
/// matching how an absent answer reads in the breakdown.
pub fn reconcile(questions: &[Question], answers: &AnswerMap) -> Vec<Verdict> {
    questions
        .iter()
        .map(|q| Verdict {
            question_id: q.id,
            correct: q
                .correct_answer
                .as_deref()
                .is_some_and(|encoding| is_correct(answers.get(q.id), encoding)),
        })
        .collect()
}

/// Verdict for a single question.
///
/// The encoding is tried as JSON first: a decoded list means a multi-select
/// comparison, anything else (including a parse failure, the common case for
/// plain scalars) falls back to exact string equality against the raw
/// encoding.
pub fn is_correct(given: Option<&AnswerValue>, encoding: &str) -> bool {
    if let Ok(Value::Array(expected)) = serde_json::from_str::<Value>(encoding) {
        let given_items = given.map(AnswerValue::as_list).unwrap_or_default();
        let expected_items: Vec<String> = expected.iter().map(value_string_form).collect();
        return comparison_key(given_items) == comparison_key(expected_items);
    }

    match given {
        Some(value) => value.string_form() == encoding,
        None => false,
    }
}

/// Order-independent multiset key: string forms, sorted, `|`-joined.
fn comparison_key(mut items: Vec<String>) -> String {
    items.sort();
    items.join("|")
}

/// Human-readable form of the encoding for the breakdown: decoded lists are
/// joined with `, `, everything else shown verbatim.
pub fn display_correct_answer(encoding: &str) -> String {
    match serde_json::from_str::<Value>(encoding) {
        Ok(Value::Array(items)) => items
            .iter()
            .map(value_string_form)
            .collect::<Vec<_>>()
            .join(", "),
        _ => encoding.to_string(),
    }
}

fn value_string_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
