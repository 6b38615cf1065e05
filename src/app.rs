use crate::models::{AppState, QuizItem};
use crate::player::{Player, PlayerBackend};
use crate::quiz::{QuestionController, QuestionState, QuizController, Signal};

const PLAYBACK_RATES: [f64; 6] = [0.25, 0.5, 1.0, 1.25, 1.5, 2.0];
const DEFAULT_RATE_INDEX: usize = 2;

/// Screen-level state of the terminal front-end.
pub struct App<B: PlayerBackend> {
    pub state: AppState,
    title: String,
    quiz: QuizController<B>,
    cursor: usize,
    rate_index: usize,
    result_scroll: usize,
}

impl<B: PlayerBackend> App<B> {
    pub fn new(title: impl Into<String>, items: Vec<QuizItem>, backend: B) -> Self {
        Self {
            state: AppState::Welcome,
            title: title.into(),
            quiz: QuizController::new(items, backend),
            cursor: 0,
            rate_index: DEFAULT_RATE_INDEX,
            result_scroll: 0,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn quiz(&self) -> &QuizController<B> {
        &self.quiz
    }

    pub fn current_question(&self) -> Option<&QuestionController<B::Player>> {
        self.quiz.question()
    }

    pub fn current_question_number(&self) -> usize {
        self.quiz.current_index() + 1
    }

    pub fn total_questions(&self) -> usize {
        self.quiz.len()
    }

    /// Option the cursor is on.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn result_scroll(&self) -> usize {
        self.result_scroll
    }

    pub fn is_answered(&self) -> bool {
        self.current_question()
            .is_some_and(|q| q.state() != QuestionState::Unanswered)
    }

    pub fn start_quiz(&mut self) {
        self.state = AppState::Quiz;
        self.quiz.start();
        self.sync_state();
    }

    pub fn select_next_option(&mut self) {
        let count = self.option_count();
        if count > 0 && !self.is_answered() {
            self.cursor = (self.cursor + 1) % count;
        }
    }

    pub fn select_previous_option(&mut self) {
        let count = self.option_count();
        if count > 0 && !self.is_answered() {
            self.cursor = (self.cursor + count - 1) % count;
        }
    }

    /// Lock in the option under the cursor. Ignored once answered.
    pub fn submit_answer(&mut self) {
        self.quiz.select_option(self.cursor);
    }

    /// The "Next" action.
    pub fn next_question(&mut self) {
        if self.quiz.advance() {
            self.cursor = 0;
            self.sync_state();
        }
    }

    pub fn toggle_playback(&mut self) {
        if let Some(question) = self.quiz.question_mut() {
            question.toggle_playback();
        }
    }

    pub fn faster(&mut self) {
        self.rate_index = (self.rate_index + 1).min(PLAYBACK_RATES.len() - 1);
        self.apply_rate();
    }

    pub fn slower(&mut self) {
        self.rate_index = self.rate_index.saturating_sub(1);
        self.apply_rate();
    }

    pub fn scroll_results_down(&mut self) {
        let max_scroll = self.total_questions().saturating_sub(1);
        self.result_scroll = (self.result_scroll + 1).min(max_scroll);
    }

    pub fn scroll_results_up(&mut self) {
        self.result_scroll = self.result_scroll.saturating_sub(1);
    }

    /// Start over with a fresh session, straight into the first question.
    pub fn restart(&mut self) {
        self.quiz.restart();
        self.cursor = 0;
        self.result_scroll = 0;
        self.apply_rate();
        self.state = AppState::Quiz;
        self.sync_state();
    }

    pub async fn next_signal(&mut self) -> Signal {
        self.quiz.next_signal().await
    }

    pub fn handle_signal(&mut self, signal: Signal) {
        self.quiz.handle_signal(signal);
    }

    pub fn tick(&mut self) {
        self.quiz.tick();
    }

    pub fn calculate_score(&self) -> usize {
        self.quiz
            .items()
            .iter()
            .filter(|item| item.is_correct == Some(true))
            .count()
    }

    fn option_count(&self) -> usize {
        self.current_question()
            .map_or(0, |q| q.item().options.len())
    }

    fn apply_rate(&mut self) {
        let rate = PLAYBACK_RATES[self.rate_index];
        if let Some(question) = self.quiz.question_mut() {
            if question.player().is_some_and(|p| p.playback_rate() != rate) {
                question.set_playback_rate(rate);
            }
        }
    }

    fn sync_state(&mut self) {
        if self.quiz.is_finished() {
            self.state = AppState::Result;
        } else {
            self.apply_rate();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_item;
    use crate::player::SimulatedBackend;

    fn app() -> App<SimulatedBackend> {
        App::new(
            "Test",
            vec![
                sample_item("Q0", &["A", "B", "C"], "C", 10.0),
                sample_item("Q1", &["Yes", "No"], "Yes", 20.0),
            ],
            SimulatedBackend::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_run() {
        let mut app = app();
        assert_eq!(app.state, AppState::Welcome);

        app.start_quiz();
        assert_eq!(app.state, AppState::Quiz);

        // Next is not available before answering.
        app.next_question();
        assert_eq!(app.current_question_number(), 1);

        app.select_previous_option();
        assert_eq!(app.cursor(), 2);
        app.submit_answer();
        assert!(app.is_answered());

        // The cursor is frozen once answered.
        app.select_next_option();
        assert_eq!(app.cursor(), 2);

        app.next_question();
        assert_eq!(app.current_question_number(), 2);
        assert_eq!(app.cursor(), 0);
        app.select_next_option();
        app.submit_answer();
        app.next_question();

        assert_eq!(app.state, AppState::Result);
        assert_eq!(app.calculate_score(), 1);
        assert_eq!(app.quiz().score(), Some(1));

        app.restart();
        assert_eq!(app.state, AppState::Quiz);
        assert_eq!(app.current_question_number(), 1);
        assert_eq!(app.calculate_score(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_playback_rate() {
        let mut app = app();
        app.start_quiz();

        app.faster();
        app.faster();
        let rate = app
            .current_question()
            .and_then(|q| q.player())
            .map(|p| p.playback_rate());
        assert_eq!(rate, Some(1.5));

        for _ in 0..10 {
            app.slower();
        }
        let rate = app
            .current_question()
            .and_then(|q| q.player())
            .map(|p| p.playback_rate());
        assert_eq!(rate, Some(0.25));
    }
}
