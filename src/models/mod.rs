mod quiz_item;
mod state;

pub use quiz_item::{QuizItem, ValidationError};
pub use state::AppState;

#[cfg(test)]
pub(crate) use quiz_item::sample_item;
