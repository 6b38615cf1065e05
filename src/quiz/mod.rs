//! Quiz progression: one question at a time, each synchronized with its video.

mod controller;
mod question;
mod session;

pub use controller::{QuizController, QuizStatus};
pub use question::{
    DeferredPause, QuestionController, QuestionEvent, QuestionState, SelectionState, Signal,
    REVEAL_EPSILON,
};
pub use session::QuizSession;
