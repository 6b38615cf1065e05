//! A player without pixels.
//!
//! `SimulatedPlayer` keeps a virtual playback clock and reports state changes
//! exactly like an embedded web player would, which is all the quiz needs from
//! it. The terminal front-end shows its clock instead of video frames.

use tokio::sync::mpsc;
use tokio::time::Instant;

use super::{
    Player, PlayerBackend, PlayerInitError, PlayerOptions, PlayerState, Subscription,
    SubscriptionId,
};

const MAX_VIDEO_ID_LENGTH: usize = 64;
const DEFAULT_DURATION: f64 = 600.0;

/// Hands out [`SimulatedPlayer`]s.
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    duration: f64,
    unavailable: Option<String>,
}

impl SimulatedBackend {
    /// Every loaded video lasts `duration` seconds.
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            unavailable: None,
        }
    }

    /// A backend whose players never come up.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            duration: DEFAULT_DURATION,
            unavailable: Some(reason.into()),
        }
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION)
    }
}

impl PlayerBackend for SimulatedBackend {
    type Player = SimulatedPlayer;

    fn load(
        &mut self,
        video_id: &str,
        options: &PlayerOptions,
    ) -> Result<SimulatedPlayer, PlayerInitError> {
        if let Some(reason) = &self.unavailable {
            return Err(PlayerInitError::Unavailable(reason.clone()));
        }
        validate_video_id(video_id)?;
        Ok(SimulatedPlayer::new(video_id, self.duration, options))
    }
}

fn validate_video_id(video_id: &str) -> Result<(), PlayerInitError> {
    let valid = !video_id.is_empty()
        && video_id.len() <= MAX_VIDEO_ID_LENGTH
        && video_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(PlayerInitError::InvalidVideoId(video_id.to_string()))
    }
}

/// Player driven by a virtual clock.
#[derive(Debug)]
pub struct SimulatedPlayer {
    video_id: String,
    state: PlayerState,
    /// Playback position at `anchor`, or the frozen position when not playing.
    position: f64,
    /// Set while playing.
    anchor: Option<Instant>,
    rate: f64,
    start: f64,
    limit: f64,
    listeners: Vec<(SubscriptionId, mpsc::UnboundedSender<PlayerState>)>,
    next_subscription: u64,
}

impl SimulatedPlayer {
    fn new(video_id: &str, duration: f64, options: &PlayerOptions) -> Self {
        let limit = options.end.map_or(duration, |end| end.min(duration));
        let rate = if options.playback_rate > 0.0 && options.playback_rate.is_finite() {
            options.playback_rate
        } else {
            1.0
        };

        Self {
            video_id: video_id.to_string(),
            state: PlayerState::Cued,
            position: options.start.clamp(0.0, limit),
            anchor: None,
            rate,
            start: options.start.clamp(0.0, limit),
            limit,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Seconds of video available to play.
    pub fn duration(&self) -> f64 {
        self.limit
    }

    /// Pin the position at the current clock reading.
    fn freeze(&mut self) {
        self.position = self.current_time();
        if self.anchor.is_some() {
            self.anchor = Some(Instant::now());
        }
    }

    fn set_state(&mut self, state: PlayerState) {
        self.state = state;
        self.notify(state);
    }

    fn notify(&mut self, state: PlayerState) {
        self.listeners
            .retain(|(_, sender)| sender.send(state).is_ok());
    }
}

impl Player for SimulatedPlayer {
    fn video_id(&self) -> &str {
        &self.video_id
    }

    fn play(&mut self) {
        if self.state == PlayerState::Playing {
            return;
        }
        if self.state == PlayerState::Ended {
            self.position = self.start;
        }
        self.anchor = Some(Instant::now());
        self.set_state(PlayerState::Playing);
    }

    fn pause(&mut self) {
        if matches!(self.state, PlayerState::Paused | PlayerState::Ended) {
            return;
        }
        self.freeze();
        self.anchor = None;
        self.set_state(PlayerState::Paused);
    }

    fn seek_to(&mut self, seconds: f64) {
        if !seconds.is_finite() {
            return;
        }
        self.position = seconds.clamp(0.0, self.limit);
        if self.state == PlayerState::Playing {
            self.anchor = Some(Instant::now());
            self.notify(PlayerState::Buffering);
            self.notify(PlayerState::Playing);
        } else if self.state == PlayerState::Ended {
            self.state = PlayerState::Paused;
            self.notify(PlayerState::Paused);
        }
    }

    fn set_playback_rate(&mut self, rate: f64) {
        if !(rate > 0.0 && rate.is_finite()) || rate == self.rate {
            return;
        }
        self.freeze();
        self.rate = rate;
        if self.state == PlayerState::Playing {
            self.notify(PlayerState::Playing);
        }
    }

    fn current_time(&self) -> f64 {
        match self.anchor {
            Some(anchor) => {
                let elapsed = anchor.elapsed().as_secs_f64() * self.rate;
                (self.position + elapsed).min(self.limit)
            }
            None => self.position,
        }
    }

    fn playback_rate(&self) -> f64 {
        self.rate
    }

    fn state(&self) -> PlayerState {
        self.state
    }

    fn subscribe(&mut self) -> Subscription {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;

        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners.push((id, tx));
        Subscription::new(id, rx)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.retain(|(listener, _)| *listener != id);
    }

    fn tick(&mut self) {
        if self.state == PlayerState::Playing && self.current_time() >= self.limit {
            self.position = self.limit;
            self.anchor = None;
            self.set_state(PlayerState::Ended);
        }
    }
}
