//! Terminal view of a session snapshot.
//!
//! [`render`] is a pure projection: the same state and options always give
//! the same frame. The whole frame is rebuilt after every transition.

use std::fmt::Write;

use crate::timer::{Mode, SessionState};

const BAR_WIDTH: usize = 30;
const COMPACT_BAR_WIDTH: usize = 20;
const RESET_STYLE: &str = "\x1b[0m";

/// Presentation-only options owned by the front end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewOptions {
    pub compact: bool,
    pub always_on_top: bool,
    /// Emit ANSI colors.
    pub color: bool,
}

/// Accent applied to the progress bar. Derived from `is_running`, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualCue {
    Active,
    Idle,
}

impl VisualCue {
    pub fn of(state: &SessionState) -> Self {
        if state.is_running() {
            VisualCue::Active
        } else {
            VisualCue::Idle
        }
    }

    /// 24-bit foreground color escape.
    pub fn ansi(self) -> &'static str {
        match self {
            // #bd9570
            VisualCue::Active => "\x1b[38;2;189;149;112m",
            // royal orange
            VisualCue::Idle => "\x1b[38;2;249;146;69m",
        }
    }
}

/// `MM:SS`; minutes are not wrapped at an hour.
pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

fn progress_bar(fraction: f64, width: usize, cue: VisualCue, color: bool) -> String {
    let fraction = fraction.clamp(0.0, 1.0);
    let filled = (fraction * width as f64).round() as usize;
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(width - filled));
    if color {
        format!("{}{bar}{RESET_STYLE}", cue.ansi())
    } else {
        bar
    }
}

fn mode_selector(active: Mode) -> String {
    Mode::ALL
        .iter()
        .map(|&mode| {
            if mode == active {
                format!("[{} {}]", mode.emoji(), mode.label())
            } else {
                format!(" {} {} ", mode.emoji(), mode.label())
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn controls(options: &ViewOptions, state: &SessionState) -> String {
    let pin = if options.always_on_top { "📌" } else { "📍" };
    let play = if state.is_running() { "⏸ pause" } else { "▶ start" };
    format!("{play}   ↻ reset   {pin} pin")
}

/// Project a snapshot to a terminal frame.
pub fn render(state: &SessionState, options: &ViewOptions) -> String {
    let cue = VisualCue::of(state);
    let progress = state.progress();
    let mode = state.mode();
    let mut out = String::new();

    if options.compact {
        let _ = writeln!(out, "🌸 {}", controls(options, state));
        let _ = writeln!(
            out,
            "{} {}  {}",
            mode.emoji(),
            format_time(state.time_left_secs()),
            mode.caption()
        );
        let _ = writeln!(
            out,
            "{} {:>3.0}%",
            progress_bar(progress, COMPACT_BAR_WIDTH, cue, options.color),
            progress * 100.0
        );
        let _ = writeln!(
            out,
            "❤️ {} Pomodoros  ⭐ {} Sessions",
            state.pomodoros_completed(),
            state.sessions_completed()
        );
        return out;
    }

    let _ = writeln!(out, "🏵  Pomobloom");
    let _ = writeln!(out, "Focused!");
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", mode_selector(mode));
    let _ = writeln!(out);
    let _ = writeln!(out, "    {}", mode.emoji());
    let _ = writeln!(out, "    {}", format_time(state.time_left_secs()));
    let _ = writeln!(out, "    {}", mode.caption());
    let _ = writeln!(
        out,
        "{} {:>3.0}%",
        progress_bar(progress, BAR_WIDTH, cue, options.color),
        progress * 100.0
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", controls(options, state));
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "❤️ {} Pomodoros    ⭐ {} Sessions",
        state.pomodoros_completed(),
        state.sessions_completed()
    );
    let _ = writeln!(out);
    let durations = Mode::ALL
        .iter()
        .map(|m| format!("{}m", m.duration_min()))
        .collect::<Vec<_>>()
        .join(" • ");
    let _ = writeln!(out, "🍥 {durations} 🍥");
    let _ = writeln!(
        out,
        "keys: [s] start/pause  [r] reset  [1/2/3] mode  [p] pin  [m] minimize  [c] compact  [q] quit"
    );
    out
}
