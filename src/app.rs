//! Application state for the attempt and result flows.

use crate::models::{
    resolve_role, AnswerMap, AnswerValue, AttemptSummary, LatestAttempt, Question, Quiz, QuizId,
    Role, User,
};
use crate::navigator::Navigator;
use crate::reconcile::{reconcile, Verdict};
use crate::submit::SubmissionOutcome;

/// Current screen of the client.
#[derive(Debug)]
pub enum Screen {
    /// Fetching the quiz (attempt flow) or the latest attempt (result flow).
    Loading,

    /// Walking through the question sequence.
    Attempt,

    /// A submission is in flight. Entering this screen is the idempotency
    /// gate: a second submit while here is suppressed.
    Submitting,

    /// Viewing the outcome.
    Result(ResultView),

    /// A fetch failed past its retry; nothing to show but a notice.
    Failed { message: String },
}

/// What the result screen has to work with.
#[derive(Debug)]
pub enum ResultView {
    /// Headline only: server-provided aggregate, no per-question data.
    /// This is all a guest ever gets.
    Summary(AttemptSummary),

    /// Aggregate plus the reconciled per-question breakdown. The verdicts
    /// are advisory display state; the headline still comes from the
    /// server-side score.
    Detailed {
        summary: AttemptSummary,
        quiz: Quiz,
        answers: AnswerMap,
        verdicts: Vec<Verdict>,
    },
}

impl ResultView {
    pub fn detailed(latest: LatestAttempt) -> Self {
        let verdicts = reconcile(&latest.quiz.questions, &latest.attempt.answers);
        ResultView::Detailed {
            summary: latest.attempt.summary(),
            answers: latest.attempt.answers.clone(),
            quiz: latest.quiz,
            verdicts,
        }
    }

    pub fn summary(&self) -> &AttemptSummary {
        match self {
            ResultView::Summary(summary) => summary,
            ResultView::Detailed { summary, .. } => summary,
        }
    }
}

/// Shared application state, mutated by the input loop and by network tasks.
pub struct App {
    pub quiz_id: QuizId,
    pub screen: Screen,
    pub quiz: Option<Quiz>,
    pub answers: AnswerMap,
    pub navigator: Navigator,
    /// Highlighted row in the current choice list.
    pub cursor: usize,
    /// Identity from the last probe; drives the guest notice and the
    /// dashboard link.
    pub role: Role,
    /// Retryable submission error, shown inline on the attempt screen.
    pub submit_error: Option<String>,
    pub result_scroll: usize,
    pub should_quit: bool,
}

impl App {
    pub fn new(quiz_id: QuizId) -> Self {
        Self {
            quiz_id,
            screen: Screen::Loading,
            quiz: None,
            answers: AnswerMap::new(),
            navigator: Navigator::new(0),
            cursor: 0,
            role: Role::Guest,
            submit_error: None,
            result_scroll: 0,
            should_quit: false,
        }
    }

    pub fn questions(&self) -> &[Question] {
        self.quiz.as_ref().map(|q| q.questions.as_slice()).unwrap_or(&[])
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions().get(self.navigator.index())
    }

    /// Install a fetched quiz along with previously autosaved answers.
    /// Discarded unless still loading.
    pub fn quiz_loaded(&mut self, quiz: Quiz, saved: AnswerMap) {
        if !matches!(self.screen, Screen::Loading) {
            return;
        }
        self.navigator = Navigator::new(quiz.questions.len());
        self.answers = saved;
        self.quiz = Some(quiz);
        self.screen = Screen::Attempt;
    }

    /// Mark the initial fetch as failed. Discarded unless still loading.
    pub fn load_failed(&mut self, message: String) {
        if matches!(self.screen, Screen::Loading) {
            self.screen = Screen::Failed { message };
        }
    }

    pub fn identity_resolved(&mut self, user: Option<&User>) {
        self.role = resolve_role(user);
    }

    /// Append a character to the current free-text answer. Returns whether
    /// the answer map changed (the caller schedules a save when it did).
    pub fn type_char(&mut self, c: char) -> bool {
        let Some(question) = self.current_question() else {
            return false;
        };
        if question.has_choices() {
            return false;
        }
        let id = question.id;
        let mut text = match self.answers.get(id) {
            Some(AnswerValue::Text(s)) => s.clone(),
            Some(other) => other.string_form(),
            None => String::new(),
        };
        text.push(c);
        self.answers.set(id, AnswerValue::Text(text));
        true
    }

    /// Delete the last character of the current free-text answer.
    pub fn backspace(&mut self) -> bool {
        let Some(question) = self.current_question() else {
            return false;
        };
        if question.has_choices() {
            return false;
        }
        let id = question.id;
        let mut text = match self.answers.get(id) {
            Some(AnswerValue::Text(s)) => s.clone(),
            Some(other) => other.string_form(),
            None => String::new(),
        };
        if text.pop().is_none() {
            return false;
        }
        self.answers.set(id, AnswerValue::Text(text));
        true
    }

    /// Toggle the highlighted choice of the current question.
    pub fn toggle_highlighted_choice(&mut self) -> bool {
        let Some(question) = self.current_question() else {
            return false;
        };
        let Some(choices) = question.choices.as_ref() else {
            return false;
        };
        let Some(choice) = choices.get(self.cursor).cloned() else {
            return false;
        };
        let id = question.id;
        let selected = self
            .answers
            .get(id)
            .is_some_and(|v| v.is_selected(&choice));
        self.answers.toggle_choice(id, &choice, !selected);
        true
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        let max = self
            .current_question()
            .and_then(|q| q.choices.as_ref())
            .map(|c| c.len().saturating_sub(1))
            .unwrap_or(0);
        self.cursor = (self.cursor + 1).min(max);
    }

    pub fn next_question(&mut self) {
        let before = self.navigator.index();
        let questions = self.questions().to_vec();
        self.navigator.next(&questions, &self.answers);
        if self.navigator.index() != before {
            self.cursor = 0;
        }
    }

    pub fn prev_question(&mut self) {
        if !self.navigator.is_first() {
            self.navigator.prev();
            self.cursor = 0;
        }
    }

    /// Whether the submit action is currently available: on the attempt
    /// screen, at the last question, with every question answered.
    pub fn can_submit(&self) -> bool {
        matches!(self.screen, Screen::Attempt)
            && self.navigator.is_last()
            && self.answers.all_answered(self.questions())
    }

    /// Move to the submitting screen. Returns false (and does nothing) when
    /// submission is unavailable or already in flight.
    pub fn begin_submit(&mut self) -> bool {
        if !self.can_submit() {
            return false;
        }
        self.submit_error = None;
        self.screen = Screen::Submitting;
        true
    }

    /// Apply a finished submission. Discarded unless a submission is in
    /// flight (the screen may have been left before the response landed).
    pub fn submit_finished(&mut self, result: Result<SubmissionOutcome, String>) {
        if !matches!(self.screen, Screen::Submitting) {
            return;
        }
        match result {
            Ok(outcome) => {
                self.screen = Screen::Result(ResultView::Summary(outcome.summary()));
            }
            Err(message) => {
                // Answers stay intact; the user can resubmit as-is.
                self.submit_error = Some(message);
                self.screen = Screen::Attempt;
            }
        }
    }

    /// Replace or install the result view (e.g. upgrading a headline summary
    /// to the detailed breakdown once the latest attempt arrives).
    pub fn show_result(&mut self, view: ResultView) {
        self.result_scroll = 0;
        self.screen = Screen::Result(view);
    }

    pub fn scroll_result_down(&mut self) {
        let max = match &self.screen {
            Screen::Result(ResultView::Detailed { verdicts, .. }) => {
                verdicts.len().saturating_sub(1)
            }
            _ => 0,
        };
        self.result_scroll = (self.result_scroll + 1).min(max);
    }

    pub fn scroll_result_up(&mut self) {
        self.result_scroll = self.result_scroll.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttemptOutcome, QuizKind};

    fn quiz() -> Quiz {
        Quiz {
            id: 1,
            title: Some("Basics".into()),
            description: None,
            kind: QuizKind::Inline,
            pass_score: 2,
            allow_guest: true,
            questions: vec![
                Question {
                    id: 1,
                    quiz_id: 1,
                    question_text: "Pick".into(),
                    choices: Some(vec!["A".into(), "B".into()]),
                    points: None,
                    audio_path: None,
                    correct_answer: None,
                },
                Question {
                    id: 2,
                    quiz_id: 1,
                    question_text: "Type".into(),
                    choices: None,
                    points: None,
                    audio_path: None,
                    correct_answer: None,
                },
            ],
        }
    }

    fn loaded_app() -> App {
        let mut app = App::new(1);
        app.quiz_loaded(quiz(), AnswerMap::new());
        app
    }

    #[test]
    fn attempt_walkthrough_gates_navigation_and_submit() {
        let mut app = loaded_app();
        assert!(matches!(app.screen, Screen::Attempt));

        // Unanswered: next is a no-op, submit unavailable.
        app.next_question();
        assert_eq!(app.navigator.index(), 0);
        assert!(!app.begin_submit());

        // Answer Q1 by toggling the highlighted choice.
        assert!(app.toggle_highlighted_choice());
        assert_eq!(app.answers.get(1), Some(&AnswerValue::Text("A".into())));
        app.next_question();
        assert_eq!(app.navigator.index(), 1);

        // Q2 still empty: submit stays unavailable even on the last index.
        assert!(app.navigator.is_last());
        assert!(!app.can_submit());

        for c in "hello".chars() {
            assert!(app.type_char(c));
        }
        assert!(app.can_submit());
        assert!(app.begin_submit());
        assert!(matches!(app.screen, Screen::Submitting));
    }

    #[test]
    fn second_submit_is_suppressed_while_one_is_pending() {
        let mut app = loaded_app();
        app.toggle_highlighted_choice();
        app.next_question();
        app.type_char('x');

        assert!(app.begin_submit());
        assert!(!app.begin_submit());
    }

    #[test]
    fn failed_submission_returns_to_attempt_with_answers_intact() {
        let mut app = loaded_app();
        app.toggle_highlighted_choice();
        app.next_question();
        app.type_char('x');
        app.begin_submit();

        app.submit_finished(Err("network down".into()));
        assert!(matches!(app.screen, Screen::Attempt));
        assert_eq!(app.submit_error.as_deref(), Some("network down"));
        assert!(app.answers.all_answered(app.questions()));

        // Retry without re-entering anything.
        assert!(app.begin_submit());
    }

    #[test]
    fn successful_submission_shows_the_server_summary() {
        let mut app = loaded_app();
        app.toggle_highlighted_choice();
        app.next_question();
        app.type_char('x');
        app.begin_submit();

        app.submit_finished(Ok(SubmissionOutcome::Registered(AttemptOutcome {
            score: 2,
            max: 2,
            passed: true,
            attempt_id: Some(5),
        })));
        match &app.screen {
            Screen::Result(view) => assert!(view.summary().passed),
            other => panic!("unexpected screen {other:?}"),
        }
    }

    #[test]
    fn late_responses_after_leaving_the_screen_are_discarded() {
        let mut app = loaded_app();
        // Not submitting: a stray response must not change the screen.
        app.submit_finished(Err("late".into()));
        assert!(matches!(app.screen, Screen::Attempt));
        assert_eq!(app.submit_error, None);

        // Not loading anymore: a second quiz payload is ignored.
        let mut replacement = quiz();
        replacement.title = Some("Other".into());
        app.quiz_loaded(replacement, AnswerMap::new());
        assert_eq!(app.quiz.as_ref().unwrap().title.as_deref(), Some("Basics"));
    }

    #[test]
    fn typing_into_a_choice_question_is_ignored() {
        let mut app = loaded_app();
        assert!(!app.type_char('z'));
        assert_eq!(app.answers.get(1), None);
    }

    #[test]
    fn free_text_backspace_edits_the_stored_answer() {
        let mut app = loaded_app();
        app.toggle_highlighted_choice();
        app.next_question();
        app.type_char('h');
        app.type_char('i');
        assert!(app.backspace());
        assert_eq!(app.answers.get(2), Some(&AnswerValue::Text("h".into())));
    }
}
