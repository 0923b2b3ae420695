//! Notifications emitted by the simulation
//!
//! Each tick returns the events it produced. `Callbacks` is an optional
//! convenience for wiring them to UI handlers; since it lives outside the
//! session, a handler may stop the session without re-entering the tick.

use serde::{Deserialize, Serialize};

/// Why a session stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    TimeExpired,
    LivesDepleted,
    StageCleared,
    /// Player left mid-run; no end-of-session notification
    ReturnToMenu,
}

/// Something the UI may want to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ScoreChanged { score: u64, level: u32 },
    /// Lives-bearing modes only
    LivesChanged { lives: u8, has_shield: bool },
    /// Timed mode only, whole seconds rounded up
    TimeChanged { seconds_remaining: u32 },
    /// Lives-bearing modes only
    MissStreakChanged { count: u32 },
    /// Staged mode only; replaces `SessionEnded` for that stop
    StageCleared { stage: u32 },
    SessionEnded { final_score: u64, final_level: u32 },
}

type ScoreHandler = Box<dyn FnMut(u64, u32)>;
type LivesHandler = Box<dyn FnMut(u8, bool)>;
type CountHandler = Box<dyn FnMut(u32)>;

/// Independently settable event handlers
#[derive(Default)]
pub struct Callbacks {
    on_score_changed: Option<ScoreHandler>,
    on_lives_changed: Option<LivesHandler>,
    on_time_changed: Option<CountHandler>,
    on_miss_streak_changed: Option<CountHandler>,
    on_stage_cleared: Option<CountHandler>,
    on_session_ended: Option<ScoreHandler>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_score_changed(&mut self, handler: impl FnMut(u64, u32) + 'static) {
        self.on_score_changed = Some(Box::new(handler));
    }

    pub fn set_lives_changed(&mut self, handler: impl FnMut(u8, bool) + 'static) {
        self.on_lives_changed = Some(Box::new(handler));
    }

    pub fn set_time_changed(&mut self, handler: impl FnMut(u32) + 'static) {
        self.on_time_changed = Some(Box::new(handler));
    }

    pub fn set_miss_streak_changed(&mut self, handler: impl FnMut(u32) + 'static) {
        self.on_miss_streak_changed = Some(Box::new(handler));
    }

    pub fn set_stage_cleared(&mut self, handler: impl FnMut(u32) + 'static) {
        self.on_stage_cleared = Some(Box::new(handler));
    }

    pub fn set_session_ended(&mut self, handler: impl FnMut(u64, u32) + 'static) {
        self.on_session_ended = Some(Box::new(handler));
    }

    /// Forward events to whichever handlers are set, in order
    pub fn dispatch(&mut self, events: &[GameEvent]) {
        for event in events {
            match *event {
                GameEvent::ScoreChanged { score, level } => {
                    if let Some(handler) = self.on_score_changed.as_mut() {
                        handler(score, level);
                    }
                }
                GameEvent::LivesChanged { lives, has_shield } => {
                    if let Some(handler) = self.on_lives_changed.as_mut() {
                        handler(lives, has_shield);
                    }
                }
                GameEvent::TimeChanged { seconds_remaining } => {
                    if let Some(handler) = self.on_time_changed.as_mut() {
                        handler(seconds_remaining);
                    }
                }
                GameEvent::MissStreakChanged { count } => {
                    if let Some(handler) = self.on_miss_streak_changed.as_mut() {
                        handler(count);
                    }
                }
                GameEvent::StageCleared { stage } => {
                    if let Some(handler) = self.on_stage_cleared.as_mut() {
                        handler(stage);
                    }
                }
                GameEvent::SessionEnded {
                    final_score,
                    final_level,
                } => {
                    if let Some(handler) = self.on_session_ended.as_mut() {
                        handler(final_score, final_level);
                    }
                }
            }
        }
    }
}
