//! Cursor over a quiz's ordered question sequence.

use crate::models::{AnswerMap, Question};

/// Single cursor for one quiz render. The index stays in `[0, len - 1]`;
/// the last index doubles as the terminal/review position, so there is no
/// separate finished state.
#[derive(Debug, Clone, Copy)]
pub struct Navigator {
    index: usize,
    len: usize,
}

impl Navigator {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.len
    }

    /// Forward progress requires a non-empty answer on the current question.
    pub fn can_advance(&self, questions: &[Question], answers: &AnswerMap) -> bool {
        questions
            .get(self.index)
            .is_some_and(|q| answers.is_answered(q.id))
    }

    /// Move forward one question; no-op at the last index or while the
    /// current question is unanswered.
    pub fn next(&mut self, questions: &[Question], answers: &AnswerMap) {
        if !self.is_last() && self.can_advance(questions, answers) {
            self.index += 1;
        }
    }

    /// Move back one question. Never gated by answer completeness.
    pub fn prev(&mut self) {
        self.index = self.index.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnswerValue, Question};

    fn questions(n: u64) -> Vec<Question> {
        (1..=n)
            .map(|id| Question {
                id,
                quiz_id: 1,
                question_text: format!("q{id}"),
                choices: None,
                points: None,
                audio_path: None,
                correct_answer: None,
            })
            .collect()
    }

    #[test]
    fn next_is_gated_on_the_current_answer() {
        let qs = questions(3);
        let mut answers = AnswerMap::new();
        let mut nav = Navigator::new(qs.len());

        nav.next(&qs, &answers);
        assert_eq!(nav.index(), 0);

        answers.set(1, AnswerValue::from("A"));
        nav.next(&qs, &answers);
        assert_eq!(nav.index(), 1);
    }

    #[test]
    fn empty_string_answer_does_not_unlock_next() {
        let qs = questions(2);
        let mut answers = AnswerMap::new();
        answers.set(1, AnswerValue::from(""));

        let mut nav = Navigator::new(qs.len());
        nav.next(&qs, &answers);
        assert_eq!(nav.index(), 0);
    }

    #[test]
    fn index_never_leaves_bounds() {
        let qs = questions(2);
        let mut answers = AnswerMap::new();
        answers.set(1, AnswerValue::from("A"));
        answers.set(2, AnswerValue::from("B"));

        let mut nav = Navigator::new(qs.len());
        nav.prev();
        assert_eq!(nav.index(), 0);

        nav.next(&qs, &answers);
        assert!(nav.is_last());
        nav.next(&qs, &answers);
        assert_eq!(nav.index(), 1);
    }

    #[test]
    fn prev_is_never_gated() {
        let qs = questions(2);
        let mut answers = AnswerMap::new();
        answers.set(1, AnswerValue::from("A"));

        let mut nav = Navigator::new(qs.len());
        nav.next(&qs, &answers);
        // Going back is allowed even though question 2 is unanswered.
        nav.prev();
        assert!(nav.is_first());
    }

    #[test]
    fn two_question_walkthrough() {
        // Q1 single choice, Q2 free text.
        let mut qs = questions(2);
        qs[0].choices = Some(vec!["A".into(), "B".into()]);

        let mut answers = AnswerMap::new();
        let mut nav = Navigator::new(qs.len());

        answers.set(1, AnswerValue::from("A"));
        assert!(nav.can_advance(&qs, &answers));
        nav.next(&qs, &answers);
        assert_eq!(nav.index(), 1);

        assert!(!answers.all_answered(&qs));

        answers.set(2, AnswerValue::from("hello"));
        assert!(answers.all_answered(&qs));
    }
}
