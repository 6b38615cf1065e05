//! Remote video player abstraction.
//!
//! The quiz drives an embeddable player it does not own: commands go out as
//! plain method calls, and the only way to learn about their effect is a
//! state-change notification delivered through a [`Subscription`].

mod simulated;

use tokio::sync::mpsc;

pub use simulated::{SimulatedBackend, SimulatedPlayer};

/// Playback state as reported by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Unstarted,
    Cued,
    Playing,
    Paused,
    Buffering,
    Ended,
    Invalid,
}

impl PlayerState {
    /// Numeric code used by embeddable web players.
    pub fn code(self) -> i32 {
        match self {
            PlayerState::Unstarted => -1,
            PlayerState::Ended => 0,
            PlayerState::Playing => 1,
            PlayerState::Paused => 2,
            PlayerState::Buffering => 3,
            PlayerState::Cued => 5,
            PlayerState::Invalid => i32::MIN,
        }
    }

    /// Unknown codes map to [`PlayerState::Invalid`].
    pub fn from_code(code: i32) -> Self {
        match code {
            -1 => PlayerState::Unstarted,
            0 => PlayerState::Ended,
            1 => PlayerState::Playing,
            2 => PlayerState::Paused,
            3 => PlayerState::Buffering,
            5 => PlayerState::Cued,
            _ => PlayerState::Invalid,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PlayerState::Unstarted => "unstarted",
            PlayerState::Cued => "cued",
            PlayerState::Playing => "playing",
            PlayerState::Paused => "paused",
            PlayerState::Buffering => "buffering",
            PlayerState::Ended => "ended",
            PlayerState::Invalid => "invalid",
        }
    }
}

/// How a player should be set up when it is loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerOptions {
    /// Start playing as soon as the player is ready.
    pub autoplay: bool,
    /// Seconds to start from.
    pub start: f64,
    /// Seconds at which playback ends, if earlier than the end of the video.
    pub end: Option<f64>,
    pub playback_rate: f64,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            autoplay: true,
            start: 0.0,
            end: None,
            playback_rate: 1.0,
        }
    }
}

/// Error returned when a player cannot be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerInitError {
    /// The media reference is empty or malformed.
    InvalidVideoId(String),
    /// The player itself could not be brought up.
    Unavailable(String),
}

impl std::fmt::Display for PlayerInitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerInitError::InvalidVideoId(id) => write!(f, "invalid video id: {:?}", id),
            PlayerInitError::Unavailable(reason) => write!(f, "player unavailable: {}", reason),
        }
    }
}

impl std::error::Error for PlayerInitError {}

/// Identifies one registered listener on a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Receiving end of a player's state-change notifications.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    receiver: mpsc::UnboundedReceiver<PlayerState>,
}

impl Subscription {
    pub fn new(id: SubscriptionId, receiver: mpsc::UnboundedReceiver<PlayerState>) -> Self {
        Self { id, receiver }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Wait for the next notification. `None` once the player has dropped the listener.
    pub async fn recv(&mut self) -> Option<PlayerState> {
        self.receiver.recv().await
    }

    /// Next notification if one is already queued.
    pub fn try_recv(&mut self) -> Option<PlayerState> {
        self.receiver.try_recv().ok()
    }
}

/// Commands and queries a question needs from a video player.
///
/// Commands return nothing: their effect shows up later as a notification.
pub trait Player {
    fn video_id(&self) -> &str;

    fn play(&mut self);

    fn pause(&mut self);

    fn seek_to(&mut self, seconds: f64);

    fn set_playback_rate(&mut self, rate: f64);

    fn current_time(&self) -> f64;

    fn playback_rate(&self) -> f64;

    fn state(&self) -> PlayerState;

    /// Register for state-change notifications.
    fn subscribe(&mut self) -> Subscription;

    /// Stop delivering notifications to `id`.
    fn unsubscribe(&mut self, id: SubscriptionId);

    /// Give the player a chance to report transitions driven by its own clock.
    fn tick(&mut self) {}
}

/// Creates players bound to a rendering surface.
pub trait PlayerBackend {
    type Player: Player;

    fn load(
        &mut self,
        video_id: &str,
        options: &PlayerOptions,
    ) -> Result<Self::Player, PlayerInitError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_codes() {
        for state in [
            PlayerState::Unstarted,
            PlayerState::Cued,
            PlayerState::Playing,
            PlayerState::Paused,
            PlayerState::Buffering,
            PlayerState::Ended,
        ] {
            assert_eq!(PlayerState::from_code(state.code()), state);
        }
        assert_eq!(PlayerState::from_code(42), PlayerState::Invalid);
    }
}
