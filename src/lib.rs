//! # lingua-quiz
//!
//! Terminal client for the language-learning platform's quiz attempt flow:
//! fetch a quiz, walk through its questions with autosaved answers, submit
//! as a registered user or guest, and review the result with a per-question
//! breakdown.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lingua_quiz::{run_take, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), lingua_quiz::Error> {
//!     run_take(SessionConfig {
//!         api_url: "http://localhost:8000/api".into(),
//!         token: None,
//!         data_dir: "/tmp/lingua-quiz".into(),
//!         quiz_id: 42,
//!     })
//!     .await
//! }
//! ```

mod app;
mod navigator;
mod reconcile;
mod session;
mod submit;
mod ui;

pub mod api;
pub mod models;
pub mod store;
pub mod terminal;

use std::io;

use thiserror::Error as ThisError;

pub use app::{App, ResultView, Screen};
pub use navigator::Navigator;
pub use reconcile::{is_correct, reconcile, Verdict};
pub use session::{run_result, run_take, SessionConfig};
pub use submit::{submit_attempt, AuthStatus, SubmissionOutcome, SubmitApi};

/// Error type for running a flow end to end.
///
/// Network and storage problems never surface here: they become in-app
/// notices or are swallowed by the stores. What remains is terminal IO and
/// environment setup.
#[derive(Debug, ThisError)]
pub enum Error {
    /// No platform data directory could be resolved for autosaved answers.
    #[error("no data directory available on this platform")]
    NoDataDir,

    /// Terminal IO error during a flow.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
