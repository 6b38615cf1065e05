//! Lifecycle of a single question.
//!
//! A question starts `Unanswered`, accepts exactly one option selection and
//! then waits in `Answered` until its owner advances it to `Revealed`. While
//! unanswered, the attached video is never allowed to play past the item's
//! reveal timestamp.

use std::time::Duration;

use log::{debug, info, warn};
use tokio::time::Instant;

use crate::models::QuizItem;
use crate::player::{Player, PlayerInitError, PlayerState, Subscription};

/// Slack absorbed from the player's time reporting before pausing immediately.
pub const REVEAL_EPSILON: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionState {
    Unanswered,
    Answered,
    Revealed,
}

/// Reported to the owner of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionEvent {
    AnswerSelected { is_correct: bool },
    Finished,
}

/// Something a question has to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// State-change notification from the player.
    Player(PlayerState),
    /// The deferred pause is due.
    PauseDue,
    /// The player dropped the subscription.
    PlayerClosed,
}

/// Write-once record of the chosen option.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: Option<(usize, String)>,
}

impl SelectionState {
    pub fn selected_answer(&self) -> Option<&str> {
        self.selected.as_ref().map(|(_, answer)| answer.as_str())
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected.as_ref().map(|(index, _)| *index)
    }

    pub fn is_locked(&self) -> bool {
        self.selected.is_some()
    }

    /// Returns false if a selection was already made.
    fn lock(&mut self, index: usize, answer: String) -> bool {
        if self.selected.is_some() {
            return false;
        }
        self.selected = Some((index, answer));
        true
    }
}

/// A scheduled pause. Dropping it cancels it.
#[derive(Debug, Clone, Copy)]
pub struct DeferredPause {
    deadline: Instant,
    delay: Duration,
}

impl DeferredPause {
    /// `None` if the deadline cannot be represented.
    fn after(delay: Duration) -> Option<Self> {
        let deadline = Instant::now().checked_add(delay)?;
        Some(Self { deadline, delay })
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Delay requested when the pause was scheduled.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}

pub struct QuestionController<P: Player> {
    item: QuizItem,
    state: QuestionState,
    selection: SelectionState,
    is_correct: Option<bool>,
    player: Option<P>,
    player_error: Option<PlayerInitError>,
    subscription: Option<Subscription>,
    player_state: PlayerState,
    pending_pause: Option<DeferredPause>,
}

impl<P: Player> QuestionController<P> {
    /// Attach a question to its player. A player that failed to load leaves
    /// the question answerable without video.
    pub fn new(item: QuizItem, player: Result<P, PlayerInitError>, autoplay: bool) -> Self {
        let mut question = Self {
            item,
            state: QuestionState::Unanswered,
            selection: SelectionState::default(),
            is_correct: None,
            player: None,
            player_error: None,
            subscription: None,
            player_state: PlayerState::Unstarted,
            pending_pause: None,
        };

        match player {
            Ok(mut player) => {
                question.subscription = Some(player.subscribe());
                question.player_state = player.state();
                question.player = Some(player);

                if question.player_state == PlayerState::Playing {
                    question.sync_to_reveal();
                } else if autoplay {
                    if let Some(player) = question.player.as_mut() {
                        player.play();
                    }
                }
            }
            Err(e) => {
                warn!("Video unavailable for {:?}: {}", question.item.title, e);
                question.player_error = Some(e);
            }
        }

        question
    }

    pub fn item(&self) -> &QuizItem {
        &self.item
    }

    pub fn state(&self) -> QuestionState {
        self.state
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn is_correct(&self) -> Option<bool> {
        self.is_correct
    }

    pub fn player(&self) -> Option<&P> {
        self.player.as_ref()
    }

    pub fn player_error(&self) -> Option<&PlayerInitError> {
        self.player_error.as_ref()
    }

    /// Last state reported by the player.
    pub fn player_state(&self) -> PlayerState {
        self.player_state
    }

    pub fn pending_pause(&self) -> Option<&DeferredPause> {
        self.pending_pause.as_ref()
    }

    /// Lock in the option at `index`. Only the first valid selection counts.
    pub fn select(&mut self, index: usize) -> Option<QuestionEvent> {
        if self.state != QuestionState::Unanswered {
            debug!("Ignoring selection on answered question {:?}", self.item.title);
            return None;
        }

        let option = self.item.options.get(index)?.clone();
        let is_correct = self.item.is_correct_answer(&option);
        if !self.selection.lock(index, option) {
            return None;
        }

        self.is_correct = Some(is_correct);
        self.state = QuestionState::Answered;
        self.pending_pause = None;

        if let Some(player) = self.player.as_mut() {
            if player.state() == PlayerState::Paused {
                player.play();
            }
        }

        info!(
            "Answered {:?}: {}",
            self.item.title,
            if is_correct { "correct" } else { "incorrect" }
        );
        Some(QuestionEvent::AnswerSelected { is_correct })
    }

    /// Move on from an answered question.
    pub fn advance(&mut self) -> Option<QuestionEvent> {
        if self.state != QuestionState::Answered {
            return None;
        }

        self.state = QuestionState::Revealed;
        self.teardown();
        Some(QuestionEvent::Finished)
    }

    pub fn toggle_playback(&mut self) {
        if let Some(player) = self.player.as_mut() {
            if player.state() == PlayerState::Playing {
                player.pause();
            } else {
                player.play();
            }
        }
    }

    pub fn set_playback_rate(&mut self, rate: f64) {
        if let Some(player) = self.player.as_mut() {
            player.set_playback_rate(rate);
        }
    }

    /// Advance the player's clock and handle whatever it reported.
    pub fn tick(&mut self) {
        if let Some(player) = self.player.as_mut() {
            player.tick();
        }
        self.drain_signals();
    }

    /// Wait for the next player notification or the deferred pause, whichever
    /// comes first. Never resolves if there is nothing to wait for.
    pub async fn next_signal(&mut self) -> Signal {
        let deadline = self.pending_pause.map(|pause| pause.deadline);
        let pause_due = async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        match self.subscription.as_mut() {
            Some(subscription) => tokio::select! {
                biased;
                state = subscription.recv() => state.map_or(Signal::PlayerClosed, Signal::Player),
                _ = pause_due => Signal::PauseDue,
            },
            None => {
                pause_due.await;
                Signal::PauseDue
            }
        }
    }

    pub fn handle_signal(&mut self, signal: Signal) {
        match signal {
            Signal::Player(state) => {
                self.player_state = state;
                if state == PlayerState::Playing {
                    self.sync_to_reveal();
                }
            }
            Signal::PauseDue => {
                self.pending_pause = None;
                if self.state == QuestionState::Unanswered {
                    if let Some(player) = self.player.as_mut() {
                        player.pause();
                    }
                }
            }
            Signal::PlayerClosed => {
                debug!("Player closed for {:?}", self.item.title);
                self.subscription = None;
            }
        }
    }

    /// Handle every notification that is already queued.
    pub fn drain_signals(&mut self) {
        while let Some(state) = self.subscription.as_mut().and_then(Subscription::try_recv) {
            self.handle_signal(Signal::Player(state));
        }
    }

    /// Stop listening to the player and cancel anything scheduled.
    pub fn teardown(&mut self) {
        self.pending_pause = None;
        if let Some(player) = self.player.as_mut() {
            if let Some(subscription) = self.subscription.take() {
                player.unsubscribe(subscription.id());
            }
            player.pause();
        }
    }

    /// Called on every `Playing` notification.
    fn sync_to_reveal(&mut self) {
        self.pending_pause = None;
        if self.state != QuestionState::Unanswered {
            return;
        }
        let Some(player) = self.player.as_ref() else {
            return;
        };

        let rate = match player.playback_rate() {
            rate if rate > 0.0 && rate.is_finite() => rate,
            _ => 1.0,
        };
        let remaining = (self.item.reveal_timestamp - player.current_time()) / rate;

        if remaining > REVEAL_EPSILON {
            debug!("Pausing {:?} in {:.2}s", self.item.title, remaining);
            self.pending_pause = Duration::try_from_secs_f64(remaining)
                .ok()
                .and_then(DeferredPause::after);
            if self.pending_pause.is_none() {
                warn!("Reveal point of {:?} is out of reach", self.item.title);
            }
        } else {
            self.hold_at_reveal();
        }
    }

    fn hold_at_reveal(&mut self) {
        if let Some(player) = self.player.as_mut() {
            player.pause();
            player.seek_to(self.item.reveal_timestamp);
        }
    }
}

impl<P: Player> Drop for QuestionController<P> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_item;
    use crate::player::{PlayerBackend, PlayerOptions, SimulatedBackend, SimulatedPlayer};

    fn question_at(start: f64, reveal: f64) -> QuestionController<SimulatedPlayer> {
        let options = PlayerOptions {
            start,
            ..Default::default()
        };
        let player = SimulatedBackend::new(60.0).load("xyz123", &options);
        QuestionController::new(sample_item("Q", &["A", "B", "C"], "B", reveal), player, true)
    }

    async fn step(question: &mut QuestionController<SimulatedPlayer>) -> Signal {
        let signal = question.next_signal().await;
        question.handle_signal(signal);
        signal
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedules_pause_before_reveal() {
        let mut question = question_at(9.5, 10.0);

        assert_eq!(step(&mut question).await, Signal::Player(PlayerState::Playing));
        let pause = question.pending_pause().expect("pause scheduled");
        assert_eq!(pause.delay(), Duration::from_millis(500));

        let started = Instant::now();
        assert_eq!(step(&mut question).await, Signal::PauseDue);
        let waited = started.elapsed();
        assert!(waited >= Duration::from_millis(500) && waited < Duration::from_millis(505));

        let player = question.player().unwrap();
        assert_eq!(player.state(), PlayerState::Paused);
        assert!(close(player.current_time(), 10.0));
        assert!(question.pending_pause().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_user_pause_keeps_position() {
        let mut question = question_at(0.0, 10.0);
        step(&mut question).await;

        tokio::time::advance(Duration::from_secs(3)).await;
        question.toggle_playback();
        assert_eq!(step(&mut question).await, Signal::Player(PlayerState::Paused));
        assert_eq!(question.player_state(), PlayerState::Paused);

        // The deadline still fires, but must not jump ahead to the reveal point.
        assert_eq!(step(&mut question).await, Signal::PauseDue);
        let player = question.player().unwrap();
        assert_eq!(player.state(), PlayerState::Paused);
        assert!(close(player.current_time(), 3.0));

        question.toggle_playback();
        assert_eq!(step(&mut question).await, Signal::Player(PlayerState::Playing));
        assert_eq!(question.pending_pause().unwrap().delay(), Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_buffering_keeps_pending_pause() {
        let mut question = question_at(0.0, 10.0);
        step(&mut question).await;
        let deadline = question.pending_pause().unwrap().deadline();

        tokio::time::advance(Duration::from_secs(2)).await;
        question.handle_signal(Signal::Player(PlayerState::Buffering));
        assert_eq!(question.player_state(), PlayerState::Buffering);
        assert_eq!(question.pending_pause().unwrap().deadline(), deadline);

        // Firing during the stall only pauses; the clock stays where it was.
        question.handle_signal(Signal::PauseDue);
        let player = question.player().unwrap();
        assert_eq!(player.state(), PlayerState::Paused);
        assert!(close(player.current_time(), 2.0));
        assert!(question.pending_pause().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_reveal_point() {
        let player = SimulatedBackend::new(60.0).load("xyz123", &PlayerOptions::default());
        let mut question =
            QuestionController::new(sample_item("Q", &["A", "B"], "B", 1e20), player, true);

        assert_eq!(step(&mut question).await, Signal::Player(PlayerState::Playing));
        assert!(question.pending_pause().is_none());
        assert_eq!(question.player().unwrap().state(), PlayerState::Playing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pauses_immediately_inside_epsilon() {
        let mut question = question_at(9.8, 10.0);

        step(&mut question).await;
        assert!(question.pending_pause().is_none());
        let player = question.player().unwrap();
        assert_eq!(player.state(), PlayerState::Paused);
        assert!(close(player.current_time(), 10.0));

        // Trying to play on is refused while unanswered.
        question.toggle_playback();
        step(&mut question).await;
        step(&mut question).await;
        assert_eq!(question.player().unwrap().state(), PlayerState::Paused);
        assert!(close(question.player().unwrap().current_time(), 10.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_change_reschedules() {
        let mut question = question_at(0.0, 10.0);
        step(&mut question).await;
        assert_eq!(question.pending_pause().unwrap().delay(), Duration::from_secs(10));

        tokio::time::advance(Duration::from_secs(2)).await;
        question.set_playback_rate(2.0);
        step(&mut question).await;
        assert_eq!(question.pending_pause().unwrap().delay(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_answered_question_plays_past_reveal() {
        let mut question = question_at(9.5, 10.0);
        assert_eq!(
            question.select(1),
            Some(QuestionEvent::AnswerSelected { is_correct: true })
        );

        step(&mut question).await;
        assert!(question.pending_pause().is_none());

        tokio::time::advance(Duration::from_secs(5)).await;
        let player = question.player().unwrap();
        assert_eq!(player.state(), PlayerState::Playing);
        assert!(close(player.current_time(), 14.5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_answer_cancels_pause_and_resumes() {
        let mut question = question_at(9.8, 10.0);
        step(&mut question).await;
        assert_eq!(question.player().unwrap().state(), PlayerState::Paused);

        question.select(0);
        assert_eq!(question.player().unwrap().state(), PlayerState::Playing);
        assert!(question.pending_pause().is_none());

        let mut scheduled = question_at(0.0, 10.0);
        step(&mut scheduled).await;
        assert!(scheduled.pending_pause().is_some());
        scheduled.select(2);
        assert!(scheduled.pending_pause().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_selection_is_ignored() {
        let mut question = question_at(0.0, 10.0);

        assert_eq!(
            question.select(0),
            Some(QuestionEvent::AnswerSelected { is_correct: false })
        );
        assert_eq!(question.select(1), None);
        assert_eq!(question.selection().selected_answer(), Some("A"));
        assert_eq!(question.selection().selected_index(), Some(0));
        assert_eq!(question.is_correct(), Some(false));
        assert_eq!(question.state(), QuestionState::Answered);
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_range_selection() {
        let mut question = question_at(0.0, 10.0);
        assert_eq!(question.select(7), None);
        assert_eq!(question.state(), QuestionState::Unanswered);
        assert!(!question.selection().is_locked());
    }

    #[tokio::test(start_paused = true)]
    async fn test_advance_requires_answer() {
        let mut question = question_at(0.0, 10.0);
        assert_eq!(question.advance(), None);

        question.select(1);
        assert_eq!(question.advance(), Some(QuestionEvent::Finished));
        assert_eq!(question.state(), QuestionState::Revealed);
        assert_eq!(question.advance(), None);
        assert_eq!(question.player().unwrap().state(), PlayerState::Paused);
    }

    #[tokio::test(start_paused = true)]
    async fn test_answerable_without_player() {
        let player = SimulatedBackend::unavailable("offline").load("xyz123", &PlayerOptions::default());
        let mut question =
            QuestionController::new(sample_item("Q", &["A", "B"], "B", 10.0), player, true);

        assert!(question.player().is_none());
        assert!(matches!(
            question.player_error(),
            Some(PlayerInitError::Unavailable(_))
        ));
        assert_eq!(
            question.select(1),
            Some(QuestionEvent::AnswerSelected { is_correct: true })
        );
        assert_eq!(question.advance(), Some(QuestionEvent::Finished));
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_unsubscribes() {
        let mut question = question_at(0.0, 10.0);
        step(&mut question).await;
        question.teardown();

        let next = tokio::time::timeout(Duration::from_secs(60), question.next_signal()).await;
        assert!(next.is_err(), "no signal after teardown");
        assert!(question.pending_pause().is_none());
    }
}
