use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The three timer phases. Durations are fixed for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Focus, Mode::ShortBreak, Mode::LongBreak];

    /// Get mode duration in seconds.
    pub const fn duration_secs(self) -> u32 {
        match self {
            Mode::Focus => 25 * 60,
            Mode::ShortBreak => 5 * 60,
            Mode::LongBreak => 15 * 60,
        }
    }

    /// Get mode duration in whole minutes.
    pub const fn duration_min(self) -> u32 {
        self.duration_secs() / 60
    }

    /// Label shown on the mode selector.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Focus => "Pomodoro",
            Mode::ShortBreak => "Short Break",
            Mode::LongBreak => "Long Break",
        }
    }

    /// Caption shown under the countdown.
    pub fn caption(self) -> &'static str {
        match self {
            Mode::Focus => "Focus Time",
            Mode::ShortBreak => "Break Time",
            Mode::LongBreak => "Long Break",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Mode::Focus => "🍓",
            Mode::ShortBreak => "☕",
            Mode::LongBreak => "✨",
        }
    }

    /// Stable key used in config, logs and the command line.
    pub fn key(self) -> &'static str {
        match self {
            Mode::Focus => "focus",
            Mode::ShortBreak => "short_break",
            Mode::LongBreak => "long_break",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Mode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "focus" | "pomodoro" => Ok(Mode::Focus),
            "short_break" | "short-break" | "short" | "break" => Ok(Mode::ShortBreak),
            "long_break" | "long-break" | "long" => Ok(Mode::LongBreak),
            _ => Err(CoreError::InvalidMode(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_durations() {
        assert_eq!(Mode::Focus.duration_secs(), 1500);
        assert_eq!(Mode::ShortBreak.duration_secs(), 300);
        assert_eq!(Mode::LongBreak.duration_secs(), 900);
    }

    #[test]
    fn parses_keys_and_aliases() {
        assert_eq!("focus".parse::<Mode>().unwrap(), Mode::Focus);
        assert_eq!("Pomodoro".parse::<Mode>().unwrap(), Mode::Focus);
        assert_eq!("short_break".parse::<Mode>().unwrap(), Mode::ShortBreak);
        assert_eq!(" long ".parse::<Mode>().unwrap(), Mode::LongBreak);
    }

    #[test]
    fn rejects_unknown_key() {
        let err = "siesta".parse::<Mode>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidMode(ref k) if k == "siesta"));
    }

    #[test]
    fn key_roundtrips_through_parse() {
        for mode in Mode::ALL {
            assert_eq!(mode.key().parse::<Mode>().unwrap(), mode);
        }
    }
}
