use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::question::{Question, QuestionId};

/// A recorded answer for one question.
///
/// Mirrors the platform's wire shape: a bare scalar for free-text and
/// single-choice answers, a list of choice strings for multi-select.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    Many(Vec<String>),
}

impl AnswerValue {
    /// Collapse a selection list into its stored form: empty list becomes the
    /// empty string, a single element becomes a bare scalar, anything longer
    /// stays a list. The "is answered" check relies on this shape.
    pub fn from_selection(mut choices: Vec<String>) -> Self {
        match choices.len() {
            0 => AnswerValue::Text(String::new()),
            1 => AnswerValue::Text(choices.remove(0)),
            _ => AnswerValue::Many(choices),
        }
    }

    /// True for the empty-string scalar, the shape an emptied selection
    /// collapses to.
    pub fn is_empty(&self) -> bool {
        matches!(self, AnswerValue::Text(s) if s.is_empty())
    }

    /// Canonical string form used for scalar comparison.
    pub fn string_form(&self) -> String {
        match self {
            AnswerValue::Bool(b) => b.to_string(),
            AnswerValue::Number(n) => n.to_string(),
            AnswerValue::Text(s) => s.clone(),
            AnswerValue::Many(items) => items.join(","),
        }
    }

    /// Human-readable form for the result breakdown.
    pub fn display_form(&self) -> String {
        match self {
            AnswerValue::Many(items) => items.join(", "),
            other => other.string_form(),
        }
    }

    /// Normalize to a list of strings: lists stay as-is, scalars wrap into a
    /// singleton.
    pub fn as_list(&self) -> Vec<String> {
        match self {
            AnswerValue::Many(items) => items.clone(),
            scalar => vec![scalar.string_form()],
        }
    }

    /// Whether `choice` is part of the current selection.
    pub fn is_selected(&self, choice: &str) -> bool {
        match self {
            AnswerValue::Many(items) => items.iter().any(|c| c == choice),
            AnswerValue::Text(s) => s == choice,
            _ => false,
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(s: &str) -> Self {
        AnswerValue::Text(s.to_string())
    }
}

/// In-progress answers for one quiz, keyed by question id.
///
/// Mutations are pure; persistence is scheduled separately by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerMap(BTreeMap<QuestionId, AnswerValue>);

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: QuestionId) -> Option<&AnswerValue> {
        self.0.get(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Replace the answer for a free-text or single-choice question.
    pub fn set(&mut self, id: QuestionId, value: AnswerValue) {
        self.0.insert(id, value);
    }

    /// Add or remove one choice of a multi-select question, then collapse the
    /// resulting list per `AnswerValue::from_selection`.
    pub fn toggle_choice(&mut self, id: QuestionId, choice: &str, selected: bool) {
        let mut list = match self.0.get(&id) {
            Some(AnswerValue::Many(items)) => items.clone(),
            Some(value) if !value.is_empty() => vec![value.string_form()],
            _ => Vec::new(),
        };

        if selected {
            if !list.iter().any(|c| c == choice) {
                list.push(choice.to_string());
            }
        } else {
            list.retain(|c| c != choice);
        }

        self.0.insert(id, AnswerValue::from_selection(list));
    }

    /// Whether the question has a defined, non-empty answer.
    pub fn is_answered(&self, id: QuestionId) -> bool {
        self.0.get(&id).is_some_and(|v| !v.is_empty())
    }

    /// Whether every question in the sequence is answered. This, not the
    /// cursor position, gates submission.
    pub fn all_answered(&self, questions: &[Question]) -> bool {
        questions.iter().all(|q| self.is_answered(q.id))
    }
}
