use log::{info, warn};

use crate::models::QuizItem;
use crate::player::{PlayerBackend, PlayerOptions};

use super::question::{QuestionController, QuestionEvent, Signal};
use super::session::QuizSession;

/// Overall progress of a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizStatus {
    InProgress,
    Finished { score: usize, total: usize },
}

/// Runs the questions of a quiz one at a time.
pub struct QuizController<B: PlayerBackend> {
    /// Pristine items, used to build a fresh session on restart.
    source: Vec<QuizItem>,
    session: QuizSession,
    backend: B,
    player_options: PlayerOptions,
    question: Option<QuestionController<B::Player>>,
    status: QuizStatus,
}

impl<B: PlayerBackend> QuizController<B> {
    pub fn new(items: Vec<QuizItem>, backend: B) -> Self {
        Self::with_player_options(items, backend, PlayerOptions::default())
    }

    pub fn with_player_options(items: Vec<QuizItem>, backend: B, player_options: PlayerOptions) -> Self {
        let session = QuizSession::new(items);
        Self {
            source: session.items().to_vec(),
            session,
            backend,
            player_options,
            question: None,
            status: QuizStatus::InProgress,
        }
    }

    /// Show the first question.
    pub fn start(&mut self) {
        if self.question.is_some() || self.is_finished() {
            return;
        }
        if self.session.is_finished() {
            self.finish();
        } else {
            self.show_question();
        }
    }

    /// Throw the current run away and start over with unanswered questions.
    pub fn restart(&mut self) {
        self.discard_question();
        self.session = QuizSession::new(self.source.clone());
        self.status = QuizStatus::InProgress;
        self.start();
    }

    pub fn status(&self) -> QuizStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status, QuizStatus::Finished { .. })
    }

    /// Final score, once finished.
    pub fn score(&self) -> Option<usize> {
        match self.status {
            QuizStatus::Finished { score, .. } => Some(score),
            QuizStatus::InProgress => None,
        }
    }

    pub fn len(&self) -> usize {
        self.session.len()
    }

    pub fn is_empty(&self) -> bool {
        self.session.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.session.current_index()
    }

    pub fn items(&self) -> &[QuizItem] {
        self.session.items()
    }

    pub fn question(&self) -> Option<&QuestionController<B::Player>> {
        self.question.as_ref()
    }

    pub fn question_mut(&mut self) -> Option<&mut QuestionController<B::Player>> {
        self.question.as_mut()
    }

    /// Answer the current question. Returns whether the answer was correct,
    /// or `None` if the selection was not accepted.
    pub fn select_option(&mut self, index: usize) -> Option<bool> {
        let event = self.question.as_mut()?.select(index)?;
        self.dispatch(event);
        match event {
            QuestionEvent::AnswerSelected { is_correct } => Some(is_correct),
            QuestionEvent::Finished => None,
        }
    }

    /// The "Next" action. Returns false if the current question is not ready
    /// to move on.
    pub fn advance(&mut self) -> bool {
        let Some(event) = self.question.as_mut().and_then(QuestionController::advance) else {
            return false;
        };
        self.dispatch(event);
        true
    }

    pub fn on_answer_selected(&mut self, is_correct: bool) {
        if self.is_finished() {
            return;
        }
        self.session.record_answer(is_correct);
    }

    pub fn on_question_finished(&mut self) {
        if self.is_finished() {
            return;
        }

        self.discard_question();
        if self.session.advance() {
            self.finish();
        } else {
            self.show_question();
        }
    }

    /// Wait for something the current question must react to.
    pub async fn next_signal(&mut self) -> Signal {
        match self.question.as_mut() {
            Some(question) => question.next_signal().await,
            None => std::future::pending().await,
        }
    }

    pub fn handle_signal(&mut self, signal: Signal) {
        if let Some(question) = self.question.as_mut() {
            question.handle_signal(signal);
        }
    }

    pub fn tick(&mut self) {
        if let Some(question) = self.question.as_mut() {
            question.tick();
        }
    }

    fn dispatch(&mut self, event: QuestionEvent) {
        match event {
            QuestionEvent::AnswerSelected { is_correct } => self.on_answer_selected(is_correct),
            QuestionEvent::Finished => self.on_question_finished(),
        }
    }

    fn show_question(&mut self) {
        let Some(item) = self.session.current().cloned() else {
            return;
        };

        let player = self.backend.load(&item.video_id, &self.player_options);
        if let Err(e) = &player {
            warn!("Question {} will run without video: {}", self.current_index() + 1, e);
        }
        self.question = Some(QuestionController::new(
            item,
            player,
            self.player_options.autoplay,
        ));
    }

    fn discard_question(&mut self) {
        if let Some(mut question) = self.question.take() {
            question.teardown();
        }
    }

    fn finish(&mut self) {
        let score = self.session.score();
        let total = self.session.len();
        self.status = QuizStatus::Finished { score, total };
        info!("You got {} out of {} questions correct!", score, total);
    }
}
