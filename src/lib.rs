//! # video-quiz
//!
//! Multiple-choice questions synchronized with video playback, plus a small
//! proxy that serves the questions out of a spreadsheet.
//!
//! Each question is tied to a moment in a video (its reveal timestamp). While
//! a question is unanswered the video is paused at that moment; once answered
//! it plays on so the answer can be watched.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use video_quiz::{Quiz, QuizError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), QuizError> {
//!     // Load questions from a JSON file
//!     let quiz = Quiz::from_json("quiz.json")?;
//!
//!     // Run the quiz in the terminal
//!     quiz.run().await?;
//!
//!     Ok(())
//! }
//! ```

mod app;
pub mod data;
mod models;
pub mod player;
pub mod proxy;
pub mod quiz;
pub mod terminal;
mod ui;

use std::io;
use std::path::Path;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind};
use futures_util::StreamExt;

pub use app::App;
pub use data::{fetch_quiz, load_quiz_from_json, load_quiz_from_sheet_file, LoadError, RowPolicy};
pub use models::{AppState, QuizItem, ValidationError};
pub use player::{Player, PlayerBackend, SimulatedBackend};

/// Title shown on the welcome screen unless another one is given.
pub const DEFAULT_TITLE: &str = "Video Quiz";

const REDRAW_INTERVAL: Duration = Duration::from_millis(100);

/// Error type for quiz operations.
#[derive(Debug)]
pub enum QuizError {
    /// Error loading questions.
    Load(LoadError),
    /// IO error during quiz execution.
    Io(io::Error),
}

impl std::fmt::Display for QuizError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuizError::Load(e) => write!(f, "Failed to load questions: {}", e),
            QuizError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for QuizError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QuizError::Load(e) => Some(e),
            QuizError::Io(e) => Some(e),
        }
    }
}

impl From<LoadError> for QuizError {
    fn from(err: LoadError) -> Self {
        QuizError::Load(err)
    }
}

impl From<io::Error> for QuizError {
    fn from(err: io::Error) -> Self {
        QuizError::Io(err)
    }
}

/// A quiz instance that can be run in the terminal.
pub struct Quiz<B: PlayerBackend = SimulatedBackend> {
    app: App<B>,
}

impl Quiz {
    /// Create a new quiz from already validated items, played on simulated video.
    pub fn new(items: Vec<QuizItem>) -> Self {
        Self::with_backend(DEFAULT_TITLE, items, SimulatedBackend::default())
    }

    /// Load a quiz from a JSON array of quiz items.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use video_quiz::Quiz;
    ///
    /// let quiz = Quiz::from_json("quiz.json").expect("Failed to load quiz");
    /// ```
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self, QuizError> {
        let items = load_quiz_from_json(path)?;
        Ok(Self::new(items))
    }

    /// Load a quiz from a saved spreadsheet `values` response.
    pub fn from_sheet_file<P: AsRef<Path>>(path: P, policy: RowPolicy) -> Result<Self, QuizError> {
        let items = load_quiz_from_sheet_file(path, policy)?;
        Ok(Self::new(items))
    }

    /// Fetch a quiz from a running quiz proxy.
    pub async fn from_url(url: &str) -> Result<Self, QuizError> {
        let items = fetch_quiz(url).await?;
        Ok(Self::new(items))
    }
}

impl<B: PlayerBackend> Quiz<B> {
    pub fn with_backend(title: impl Into<String>, items: Vec<QuizItem>, backend: B) -> Self {
        Self {
            app: App::new(title, items, backend),
        }
    }

    /// Replace the welcome-screen title.
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.app.set_title(title);
        self
    }

    /// Run the quiz in the terminal.
    ///
    /// This will take over the terminal, display the quiz UI, and return
    /// when the user quits.
    pub async fn run(mut self) -> Result<(), QuizError> {
        let mut guard = terminal::init()?;
        run_event_loop(guard.terminal(), &mut self.app).await
    }

    /// Get a reference to the underlying app for custom handling.
    pub fn app(&self) -> &App<B> {
        &self.app
    }

    /// Get a mutable reference to the underlying app for custom handling.
    pub fn app_mut(&mut self) -> &mut App<B> {
        &mut self.app
    }
}

async fn run_event_loop<B: PlayerBackend>(
    terminal: &mut terminal::AppTerminal,
    app: &mut App<B>,
) -> Result<(), QuizError> {
    let mut events = EventStream::new();
    let mut redraw = tokio::time::interval(REDRAW_INTERVAL);

    loop {
        app.tick();
        terminal.draw(|frame| ui::render(frame, app))?;

        tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    if handle_input(app, key.code) {
                        break;
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
            signal = app.next_signal() => app.handle_signal(signal),
            _ = redraw.tick() => {}
        }
    }

    Ok(())
}

/// Returns true if the app should exit.
fn handle_input<B: PlayerBackend>(app: &mut App<B>, key: KeyCode) -> bool {
    match app.state {
        AppState::Welcome => handle_welcome_input(app, key),
        AppState::Quiz => handle_quiz_input(app, key),
        AppState::Result => handle_result_input(app, key),
    }
}

fn handle_welcome_input<B: PlayerBackend>(app: &mut App<B>, key: KeyCode) -> bool {
    match key {
        KeyCode::Enter => {
            app.start_quiz();
            false
        }
        KeyCode::Char('q') | KeyCode::Char('Q') => true,
        _ => false,
    }
}

fn handle_quiz_input<B: PlayerBackend>(app: &mut App<B>, key: KeyCode) -> bool {
    match key {
        KeyCode::Up | KeyCode::Char('k') => {
            app.select_previous_option();
            false
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.select_next_option();
            false
        }
        KeyCode::Enter | KeyCode::Char(' ') if !app.is_answered() => {
            app.submit_answer();
            false
        }
        KeyCode::Enter | KeyCode::Char('n') | KeyCode::Right => {
            app.next_question();
            false
        }
        KeyCode::Char('p') => {
            app.toggle_playback();
            false
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            app.faster();
            false
        }
        KeyCode::Char('-') => {
            app.slower();
            false
        }
        KeyCode::Char('q') | KeyCode::Char('Q') => true,
        _ => false,
    }
}

fn handle_result_input<B: PlayerBackend>(app: &mut App<B>, key: KeyCode) -> bool {
    match key {
        KeyCode::Down | KeyCode::Char('j') => {
            app.scroll_results_down();
            false
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.scroll_results_up();
            false
        }
        KeyCode::Char('r') | KeyCode::Char('R') => {
            app.restart();
            false
        }
        KeyCode::Char('q') | KeyCode::Char('Q') => true,
        _ => false,
    }
}
