//! Drivers for the attempt and result flows.
//!
//! One shared `App` behind a mutex, a crossterm poll loop for input, and
//! spawned tokio tasks for every network call. A task whose response lands
//! after the relevant screen has been left finds its state-application method
//! refusing the update, which is all the cancellation these flows need.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use log::{debug, info};
use tokio::sync::Mutex;

use crate::api::ApiClient;
use crate::app::{App, ResultView, Screen};
use crate::models::QuizId;
use crate::store::{AnswerStore, FileBackend, SessionStore, StorageBackend};
use crate::submit::{submit_attempt, AuthStatus, SubmissionOutcome};
use crate::terminal;
use crate::Error;

/// Everything a flow needs to talk to the platform and the local disk.
pub struct SessionConfig {
    pub api_url: String,
    pub token: Option<String>,
    pub data_dir: PathBuf,
    pub quiz_id: QuizId,
}

type SharedApp = Arc<Mutex<App>>;

const TICK: Duration = Duration::from_millis(50);

/// Where guest result summaries live between invocations. The runtime
/// directory is cleared by the OS when the login session ends, which is the
/// lifetime these stashes want; hosts without one fall back to the temp dir.
fn session_dir() -> PathBuf {
    dirs::runtime_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("lingua-quiz-session")
}

/// Both flows build the guest store the same way, over the same directory,
/// so a summary stashed while taking a quiz is still there when the result
/// subcommand runs later.
fn guest_session_store(dir: PathBuf) -> Arc<SessionStore> {
    Arc::new(SessionStore::file_backed(dir))
}

/// Run the attempt flow: fetch the quiz, walk the questions, submit, and
/// show the result.
pub async fn run_take(config: SessionConfig) -> Result<(), Error> {
    let quiz_id = config.quiz_id;
    let api = Arc::new(ApiClient::new(config.api_url, config.token));
    let backend: Arc<dyn StorageBackend> = Arc::new(FileBackend::new(config.data_dir));
    let store = AnswerStore::new(backend, quiz_id);
    let session = guest_session_store(session_dir());
    let app: SharedApp = Arc::new(Mutex::new(App::new(quiz_id)));

    // Autosaved answers from a previous visit to this quiz.
    let saved = store.load();
    if !saved.is_empty() {
        info!("restored {} autosaved answer(s) for quiz {quiz_id}", saved.len());
    }

    {
        let api = Arc::clone(&api);
        let app = Arc::clone(&app);
        tokio::spawn(async move {
            let user = api.fetch_current_user().await.ok().flatten();
            match api.fetch_quiz(quiz_id).await {
                Ok(quiz) => {
                    let mut app = app.lock().await;
                    app.identity_resolved(user.as_ref());
                    app.quiz_loaded(quiz, saved);
                }
                Err(err) => {
                    app.lock().await.load_failed(format!("failed to load quiz: {err}"));
                }
            }
        });
    }

    let mut term = terminal::init()?;
    let outcome = take_loop(&mut term, &app, &api, &session, &store).await;
    let restored = terminal::restore().map_err(Error::from);
    finish_take(store, outcome.and(restored)).await
}

async fn take_loop(
    term: &mut terminal::SessionTerminal,
    app: &SharedApp,
    api: &Arc<ApiClient>,
    session: &Arc<SessionStore>,
    store: &AnswerStore,
) -> Result<(), Error> {
    loop {
        {
            let app = app.lock().await;
            if app.should_quit {
                return Ok(());
            }
            term.draw(|frame| crate::ui::render(frame, &app))?;
        }

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                handle_take_key(app, api, session, store, key.code, key.modifiers).await;
            }
        }
    }
}

/// Land the final autosave snapshot no matter how the loop ended. The loop's
/// error (or the terminal's) is only reported after the flush has run.
async fn finish_take(store: AnswerStore, outcome: Result<(), Error>) -> Result<(), Error> {
    store.flush().await;
    outcome
}

/// Run the standalone result flow for a quiz.
pub async fn run_result(config: SessionConfig) -> Result<(), Error> {
    let quiz_id = config.quiz_id;
    let api = Arc::new(ApiClient::new(config.api_url, config.token));
    let session = guest_session_store(session_dir());
    let app: SharedApp = Arc::new(Mutex::new(App::new(quiz_id)));

    {
        let api = Arc::clone(&api);
        let session = Arc::clone(&session);
        let app = Arc::clone(&app);
        tokio::spawn(async move {
            let view = resolve_result_view(&api, &session, quiz_id).await;
            let mut app = app.lock().await;
            match view {
                Ok(Some(view)) => app.show_result(view),
                Ok(None) => app.load_failed("no attempt found for this quiz".into()),
                Err(message) => app.load_failed(message),
            }
        });
    }

    let mut term = terminal::init()?;
    let outcome = result_loop(&mut term, &app).await;
    let restored = terminal::restore().map_err(Error::from);
    outcome.and(restored)
}

async fn result_loop(term: &mut terminal::SessionTerminal, app: &SharedApp) -> Result<(), Error> {
    loop {
        {
            let app = app.lock().await;
            if app.should_quit {
                return Ok(());
            }
            term.draw(|frame| crate::ui::render(frame, &app))?;
        }

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let mut app = app.lock().await;
                handle_result_key(&mut app, key.code, key.modifiers);
            }
        }
    }
}

/// Decide what the result screen can show.
///
/// Identity is probed first: a guest reads the session-stashed summary and
/// never asks the server for attempt details. An authenticated caller gets
/// the detailed breakdown from the latest-attempt query.
async fn resolve_result_view(
    api: &ApiClient,
    session: &SessionStore,
    quiz_id: QuizId,
) -> Result<Option<ResultView>, String> {
    let user = match api.fetch_current_user().await {
        Ok(user) => user,
        Err(err) => {
            debug!("identity probe failed ({err}); treating session as guest");
            None
        }
    };

    if user.is_none() {
        return Ok(session.guest_result(quiz_id).map(ResultView::Summary));
    }

    match api.fetch_latest_attempt(quiz_id).await {
        Ok(Some(latest)) => Ok(Some(ResultView::detailed(latest))),
        Ok(None) => Ok(session.guest_result(quiz_id).map(ResultView::Summary)),
        Err(err) => Err(format!("failed to load attempt: {err}")),
    }
}

async fn handle_take_key(
    app: &SharedApp,
    api: &Arc<ApiClient>,
    session: &Arc<SessionStore>,
    store: &AnswerStore,
    key: KeyCode,
    mods: KeyModifiers,
) {
    let mut guard = app.lock().await;

    if key == KeyCode::Char('c') && mods.contains(KeyModifiers::CONTROL) {
        guard.should_quit = true;
        return;
    }

    match &guard.screen {
        Screen::Loading | Screen::Submitting => {
            if key == KeyCode::Esc {
                guard.should_quit = true;
            }
        }
        Screen::Failed { .. } => {
            if matches!(key, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                guard.should_quit = true;
            }
        }
        Screen::Result(_) => handle_result_key(&mut guard, key, mods),
        Screen::Attempt => {
            let mut changed = false;
            match key {
                KeyCode::Esc => {
                    guard.should_quit = true;
                }
                KeyCode::Left => guard.prev_question(),
                KeyCode::Right => guard.next_question(),
                KeyCode::Up => guard.cursor_up(),
                KeyCode::Down => guard.cursor_down(),
                KeyCode::Enter => {
                    if guard.can_submit() {
                        if guard.begin_submit() {
                            spawn_submit(app, api, session, &guard);
                        }
                    } else {
                        guard.next_question();
                    }
                }
                KeyCode::Backspace => changed = guard.backspace(),
                KeyCode::Char(' ') => {
                    if guard.current_question().is_some_and(|q| q.has_choices()) {
                        changed = guard.toggle_highlighted_choice();
                    } else {
                        changed = guard.type_char(' ');
                    }
                }
                KeyCode::Char(c) => {
                    if guard.current_question().is_some_and(|q| q.has_choices()) {
                        // Choice lists reuse the j/k motions.
                        match c {
                            'j' => guard.cursor_down(),
                            'k' => guard.cursor_up(),
                            'q' => guard.should_quit = true,
                            _ => {}
                        }
                    } else {
                        changed = guard.type_char(c);
                    }
                }
                _ => {}
            }
            if changed {
                store.schedule_save(&guard.answers);
            }
        }
    }
}

fn handle_result_key(app: &mut App, key: KeyCode, _mods: KeyModifiers) {
    match key {
        KeyCode::Down | KeyCode::Char('j') => app.scroll_result_down(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_result_up(),
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}

/// Kick off the in-flight submission task. The auth status is resolved fresh
/// here, immediately before dispatch, so a session change mid-attempt routes
/// correctly.
fn spawn_submit(app: &SharedApp, api: &Arc<ApiClient>, session: &Arc<SessionStore>, guard: &App) {
    let quiz_id = guard.quiz_id;
    let answers = guard.answers.clone();
    let api = Arc::clone(api);
    let session = Arc::clone(session);
    let app = Arc::clone(app);

    tokio::spawn(async move {
        // A failed or absent identity probe means the attempt is a guest one.
        let auth = match api.fetch_current_user().await {
            Ok(Some(user)) => AuthStatus::Authenticated(user),
            Ok(None) => AuthStatus::Guest,
            Err(err) => {
                debug!("identity probe failed at submit time ({err}); routing as guest");
                AuthStatus::Guest
            }
        };

        let result = submit_attempt(api.as_ref(), &session, quiz_id, &answers, &auth).await;
        let registered = matches!(&result, Ok(SubmissionOutcome::Registered(_)));
        {
            let mut app = app.lock().await;
            app.submit_finished(result.map_err(|err| format!("submission failed: {err}")));
        }

        // Registered attempts can be upgraded to the detailed breakdown.
        if registered {
            if let Ok(Some(latest)) = api.fetch_latest_attempt(quiz_id).await {
                let mut app = app.lock().await;
                if matches!(app.screen, Screen::Result(_)) {
                    app.show_result(ResultView::detailed(latest));
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnswerMap, AnswerValue, AttemptSummary};
    use crate::store::MemoryBackend;

    #[test]
    fn guest_summary_stashed_by_one_flow_is_readable_by_the_next() {
        let dir = tempfile::tempdir().unwrap();
        let summary = AttemptSummary {
            score: 3,
            max: 5,
            passed: false,
        };

        // Built the way run_take builds its store, then dropped, as if the
        // process taking the quiz had exited.
        let take_side = guest_session_store(dir.path().to_path_buf());
        take_side.store_guest_result(42, &summary);
        drop(take_side);

        // A later result invocation builds its own store over the same dir.
        let result_side = guest_session_store(dir.path().to_path_buf());
        assert_eq!(result_side.guest_result(42), Some(summary));
        assert_eq!(result_side.guest_result(43), None);
    }

    #[tokio::test]
    async fn pending_autosave_lands_even_when_the_loop_fails() {
        let backend = Arc::new(MemoryBackend::new());
        let store = AnswerStore::new(Arc::clone(&backend) as Arc<dyn StorageBackend>, 7);

        let mut answers = AnswerMap::new();
        answers.set(1, AnswerValue::from("hola"));
        store.schedule_save(&answers);

        let outcome = finish_take(store, Err(Error::NoDataDir)).await;

        assert!(outcome.is_err());
        let stored: AnswerMap =
            serde_json::from_str(&backend.read("quiz:7:answers").unwrap()).unwrap();
        assert_eq!(stored, answers);
    }
}
