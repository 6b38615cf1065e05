use crate::models::QuizItem;

/// The questions of one run through the quiz and how far along it is.
#[derive(Debug, Clone)]
pub struct QuizSession {
    items: Vec<QuizItem>,
    current_index: usize,
}

impl QuizSession {
    /// Start a fresh session. Answers left on the items are cleared.
    pub fn new(mut items: Vec<QuizItem>) -> Self {
        for item in &mut items {
            item.is_correct = None;
        }
        Self {
            items,
            current_index: 0,
        }
    }

    pub fn items(&self) -> &[QuizItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// `None` once every question has been played.
    pub fn current(&self) -> Option<&QuizItem> {
        self.items.get(self.current_index)
    }

    pub fn is_finished(&self) -> bool {
        self.current_index >= self.items.len()
    }

    /// Store the outcome of the current question.
    pub fn record_answer(&mut self, is_correct: bool) {
        if let Some(item) = self.items.get_mut(self.current_index) {
            item.is_correct = Some(is_correct);
        }
    }

    /// Move to the next question. Returns true when the session is finished.
    pub fn advance(&mut self) -> bool {
        if self.current_index < self.items.len() {
            self.current_index += 1;
        }
        self.is_finished()
    }

    pub fn score(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.is_correct == Some(true))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_item;

    #[test]
    fn test_progression_and_score() {
        let mut answered = sample_item("Q0", &["A"], "A", 1.0);
        answered.is_correct = Some(true);
        let mut session = QuizSession::new(vec![
            answered,
            sample_item("Q1", &["A"], "A", 1.0),
            sample_item("Q2", &["A"], "A", 1.0),
        ]);
        assert_eq!(session.score(), 0);

        session.record_answer(true);
        assert!(!session.advance());
        session.record_answer(false);
        assert!(!session.advance());
        assert_eq!(session.current().map(|i| i.title.as_str()), Some("Q2"));
        assert!(session.advance());

        assert_eq!(session.current_index(), 3);
        assert!(session.current().is_none());
        assert_eq!(session.score(), 1);

        // Past the end nothing moves.
        session.record_answer(true);
        assert!(session.advance());
        assert_eq!(session.current_index(), 3);
        assert_eq!(session.score(), 1);
    }
}
