use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Mode;

/// Every state change of the session engine produces an Event.
/// The driver logs them; the effects dispatcher reacts to some of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: Mode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: Mode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: Mode,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    ModeChanged {
        from: Mode,
        to: Mode,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    /// One second elapsed with no threshold crossed.
    Ticked {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    /// A focus cycle reached one of its motivational thresholds.
    MilestoneReached {
        minutes_elapsed: u32,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    /// The countdown hit zero while running. Counters are already final.
    SessionCompleted {
        mode: Mode,
        pomodoros_completed: u32,
        sessions_completed: u32,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Short machine-readable name, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::TimerStarted { .. } => "timer_started",
            Event::TimerPaused { .. } => "timer_paused",
            Event::TimerReset { .. } => "timer_reset",
            Event::ModeChanged { .. } => "mode_changed",
            Event::Ticked { .. } => "ticked",
            Event::MilestoneReached { .. } => "milestone_reached",
            Event::SessionCompleted { .. } => "session_completed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let event = Event::SessionCompleted {
            mode: Mode::ShortBreak,
            pomodoros_completed: 2,
            sessions_completed: 5,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "SessionCompleted");
        assert_eq!(json["mode"], "short_break");
        assert_eq!(json["sessions_completed"], 5);
    }

    #[test]
    fn kind_matches_variant() {
        let event = Event::Ticked {
            remaining_secs: 10,
            at: Utc::now(),
        };
        assert_eq!(event.kind(), "ticked");
    }
}
