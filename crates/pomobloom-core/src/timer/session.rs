//! Session engine implementation.
//!
//! The session engine is a tick-driven state machine. It owns exactly one
//! clock subscription while running and none while idle.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Active --pause--> Idle
//! Active --tick(0)--> Idle        (natural completion)
//! any --reset | change_mode--> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = SessionEngine::new(clock);
//! engine.start();
//! // For every tick delivered by the clock:
//! engine.tick(tick); // Returns Some(Event) when the tick was applied
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::clock::{ClockSource, Tick};
use super::mode::Mode;
use crate::error::Result;
use crate::events::Event;

/// Remaining-seconds values in a focus cycle that trigger a motivational
/// notification, with the elapsed minutes they stand for.
const FOCUS_MILESTONES: [(u32, u32); 2] = [(900, 10), (300, 20)];

/// The single mutable entity of the timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    mode: Mode,
    time_left_secs: u32,
    is_running: bool,
    pomodoros_completed: u32,
    sessions_completed: u32,
    notified_at_10_min: bool,
    notified_at_20_min: bool,
}

impl SessionState {
    /// Start-up state: idle focus cycle, full duration, zero counters.
    pub fn new() -> Self {
        Self {
            mode: Mode::Focus,
            time_left_secs: Mode::Focus.duration_secs(),
            is_running: false,
            pomodoros_completed: 0,
            sessions_completed: 0,
            notified_at_10_min: false,
            notified_at_20_min: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn time_left_secs(&self) -> u32 {
        self.time_left_secs
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn pomodoros_completed(&self) -> u32 {
        self.pomodoros_completed
    }

    pub fn sessions_completed(&self) -> u32 {
        self.sessions_completed
    }

    pub fn notified_at_10_min(&self) -> bool {
        self.notified_at_10_min
    }

    pub fn notified_at_20_min(&self) -> bool {
        self.notified_at_20_min
    }

    /// 0.0 .. 1.0 progress within the current cycle.
    pub fn progress(&self) -> f64 {
        let total = self.mode.duration_secs();
        if total == 0 {
            return 0.0;
        }
        let elapsed = total.saturating_sub(self.time_left_secs);
        f64::from(elapsed) / f64::from(total)
    }

    fn clear_milestones(&mut self) {
        self.notified_at_10_min = false;
        self.notified_at_20_min = false;
    }

    fn milestone_flag(&mut self, minutes: u32) -> Option<&mut bool> {
        match minutes {
            10 => Some(&mut self.notified_at_10_min),
            20 => Some(&mut self.notified_at_20_min),
            _ => None,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Core session engine.
///
/// Every transition that leaves the engine idle cancels the clock
/// subscription and bumps the epoch, so ticks already queued by the old
/// subscription are rejected by [`SessionEngine::tick`].
#[derive(Debug)]
pub struct SessionEngine<C: ClockSource> {
    state: SessionState,
    clock: C,
    subscription: Option<C::Handle>,
    epoch: u64,
}

impl<C: ClockSource> SessionEngine<C> {
    pub fn new(clock: C) -> Self {
        Self {
            state: SessionState::new(),
            clock,
            subscription: None,
            epoch: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Owned copy of the state for readers outside the engine.
    pub fn snapshot(&self) -> SessionState {
        self.state.clone()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.state.is_running {
            return None;
        }
        if self.state.time_left_secs == 0 {
            // Finished cycle: begin a fresh one instead of completing again.
            self.state.time_left_secs = self.state.mode.duration_secs();
            self.state.clear_milestones();
        }
        self.stop_clock();
        self.subscription = Some(self.clock.subscribe(self.epoch));
        self.state.is_running = true;
        debug!(mode = %self.state.mode, epoch = self.epoch, "timer started");
        Some(Event::TimerStarted {
            mode: self.state.mode,
            remaining_secs: self.state.time_left_secs,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.state.is_running {
            return None;
        }
        self.stop_clock();
        self.state.is_running = false;
        debug!(remaining = self.state.time_left_secs, "timer paused");
        Some(Event::TimerPaused {
            mode: self.state.mode,
            remaining_secs: self.state.time_left_secs,
            at: Utc::now(),
        })
    }

    /// Start when idle, pause when running.
    pub fn toggle(&mut self) -> Option<Event> {
        if self.state.is_running {
            self.pause()
        } else {
            self.start()
        }
    }

    pub fn reset(&mut self) -> Event {
        self.stop_clock();
        self.state.is_running = false;
        self.state.time_left_secs = self.state.mode.duration_secs();
        self.state.clear_milestones();
        debug!(mode = %self.state.mode, "timer reset");
        Event::TimerReset {
            mode: self.state.mode,
            duration_secs: self.state.time_left_secs,
            at: Utc::now(),
        }
    }

    pub fn change_mode(&mut self, mode: Mode) -> Event {
        let from = self.state.mode;
        self.stop_clock();
        self.state.mode = mode;
        self.state.is_running = false;
        self.state.time_left_secs = mode.duration_secs();
        self.state.clear_milestones();
        debug!(%from, to = %mode, "mode changed");
        Event::ModeChanged {
            from,
            to: mode,
            duration_secs: self.state.time_left_secs,
            at: Utc::now(),
        }
    }

    /// Change mode by its key. An unknown key is a caller bug and is
    /// rejected before any state is touched.
    pub fn change_mode_by_key(&mut self, key: &str) -> Result<Event> {
        let mode = key.parse::<Mode>()?;
        Ok(self.change_mode(mode))
    }

    /// Apply one clock tick. Returns `None` for ticks of a cancelled
    /// subscription or ticks arriving while idle.
    pub fn tick(&mut self, tick: Tick) -> Option<Event> {
        if !self.state.is_running || tick.epoch != self.epoch {
            return None;
        }
        if self.state.time_left_secs == 0 {
            return Some(self.complete());
        }

        self.state.time_left_secs -= 1;
        let remaining = self.state.time_left_secs;

        if self.state.mode == Mode::Focus {
            for (at_remaining, minutes) in FOCUS_MILESTONES {
                if remaining != at_remaining {
                    continue;
                }
                if let Some(flag) = self.state.milestone_flag(minutes) {
                    if !*flag {
                        *flag = true;
                        debug!(minutes, "focus milestone reached");
                        return Some(Event::MilestoneReached {
                            minutes_elapsed: minutes,
                            remaining_secs: remaining,
                            at: Utc::now(),
                        });
                    }
                }
            }
        }

        Some(Event::Ticked {
            remaining_secs: remaining,
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete(&mut self) -> Event {
        self.stop_clock();
        self.state.is_running = false;
        if self.state.mode == Mode::Focus {
            self.state.pomodoros_completed += 1;
        }
        self.state.sessions_completed += 1;
        self.state.clear_milestones();
        info!(
            mode = %self.state.mode,
            pomodoros = self.state.pomodoros_completed,
            sessions = self.state.sessions_completed,
            "session completed"
        );
        Event::SessionCompleted {
            mode: self.state.mode,
            pomodoros_completed: self.state.pomodoros_completed,
            sessions_completed: self.state.sessions_completed,
            at: Utc::now(),
        }
    }

    fn stop_clock(&mut self) {
        if let Some(handle) = self.subscription.take() {
            self.clock.unsubscribe(handle);
        }
        self.epoch += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::clock::ManualClock;

    fn engine() -> SessionEngine<ManualClock> {
        SessionEngine::new(ManualClock::new())
    }

    fn advance(engine: &mut SessionEngine<ManualClock>, ticks: u32) -> Vec<Event> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            let tick = engine.clock().tick().expect("clock should be subscribed");
            events.extend(engine.tick(tick));
        }
        events
    }

    #[test]
    fn initial_state() {
        let engine = engine();
        let state = engine.state();
        assert_eq!(state.mode(), Mode::Focus);
        assert_eq!(state.time_left_secs(), 1500);
        assert!(!state.is_running());
        assert_eq!(state.pomodoros_completed(), 0);
        assert_eq!(state.sessions_completed(), 0);
    }

    #[test]
    fn start_pause_toggle() {
        let mut engine = engine();
        assert!(matches!(engine.start(), Some(Event::TimerStarted { .. })));
        assert!(engine.state().is_running());
        assert_eq!(engine.clock().active_count(), 1);

        assert!(engine.start().is_none());
        assert_eq!(engine.clock().active_count(), 1);
        assert_eq!(engine.clock().subscribe_count(), 1);

        assert!(matches!(engine.toggle(), Some(Event::TimerPaused { .. })));
        assert!(!engine.state().is_running());
        assert_eq!(engine.clock().active_count(), 0);

        assert!(matches!(engine.toggle(), Some(Event::TimerStarted { .. })));
    }

    #[test]
    fn tick_decrements_by_one() {
        let mut engine = engine();
        engine.start();
        let events = advance(&mut engine, 3);
        assert_eq!(engine.state().time_left_secs(), 1497);
        assert!(events.iter().all(|e| matches!(e, Event::Ticked { .. })));
        assert_eq!(engine.state().sessions_completed(), 0);
    }

    #[test]
    fn pause_when_idle_is_noop() {
        let mut engine = engine();
        let before = engine.snapshot();
        assert!(engine.pause().is_none());
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn stale_tick_is_ignored() {
        let mut engine = engine();
        engine.start();
        let stale = engine.clock().tick().unwrap();
        engine.pause();
        engine.start();

        assert!(engine.tick(stale).is_none());
        assert_eq!(engine.state().time_left_secs(), 1500);
    }

    #[test]
    fn tick_while_idle_is_ignored() {
        let mut engine = engine();
        let tick = Tick {
            epoch: engine.epoch(),
        };
        assert!(engine.tick(tick).is_none());
        assert_eq!(engine.state().time_left_secs(), 1500);
    }

    #[test]
    fn milestones_fire_once_each() {
        let mut engine = engine();
        engine.start();

        let events = advance(&mut engine, 600);
        assert!(engine.state().notified_at_10_min());
        assert!(!engine.state().notified_at_20_min());
        let milestones: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, Event::MilestoneReached { .. }))
            .collect();
        assert_eq!(milestones.len(), 1);

        let events = advance(&mut engine, 600);
        assert!(engine.state().notified_at_20_min());
        assert!(matches!(
            events.last(),
            Some(Event::MilestoneReached {
                minutes_elapsed: 20,
                remaining_secs: 300,
                ..
            })
        ));

        let events = advance(&mut engine, 300);
        assert!(events
            .iter()
            .all(|e| !matches!(e, Event::MilestoneReached { .. })));
        assert_eq!(engine.state().time_left_secs(), 0);
    }

    #[test]
    fn breaks_have_no_milestones() {
        let mut engine = engine();
        engine.change_mode(Mode::LongBreak);
        engine.start();
        let events = advance(&mut engine, 600);
        assert!(events
            .iter()
            .all(|e| matches!(e, Event::Ticked { .. })));
        assert!(!engine.state().notified_at_10_min());
    }

    #[test]
    fn focus_completion_increments_both_counters() {
        let mut engine = engine();
        engine.start();
        advance(&mut engine, 1500);
        assert_eq!(engine.state().time_left_secs(), 0);
        assert!(engine.state().is_running());

        let events = advance(&mut engine, 1);
        assert!(matches!(
            events.as_slice(),
            [Event::SessionCompleted {
                mode: Mode::Focus,
                pomodoros_completed: 1,
                sessions_completed: 1,
                ..
            }]
        ));
        let state = engine.state();
        assert!(!state.is_running());
        assert!(!state.notified_at_10_min());
        assert!(!state.notified_at_20_min());
        assert_eq!(engine.clock().active_count(), 0);
    }

    #[test]
    fn break_completion_only_counts_sessions() {
        let mut engine = engine();
        engine.change_mode(Mode::ShortBreak);
        engine.start();
        advance(&mut engine, 301);
        assert_eq!(engine.state().pomodoros_completed(), 0);
        assert_eq!(engine.state().sessions_completed(), 1);
    }

    #[test]
    fn restart_after_completion_begins_new_cycle() {
        let mut engine = engine();
        engine.change_mode(Mode::ShortBreak);
        engine.start();
        advance(&mut engine, 301);
        assert_eq!(engine.state().time_left_secs(), 0);

        engine.start();
        assert_eq!(engine.state().time_left_secs(), 300);
        advance(&mut engine, 1);
        assert_eq!(engine.state().sessions_completed(), 1);
    }

    #[test]
    fn reset_restores_duration_and_keeps_counters() {
        let mut engine = engine();
        engine.change_mode(Mode::ShortBreak);
        engine.start();
        advance(&mut engine, 301);
        engine.change_mode(Mode::Focus);
        engine.start();
        advance(&mut engine, 700);
        assert!(engine.state().notified_at_10_min());

        engine.reset();
        let state = engine.state();
        assert_eq!(state.time_left_secs(), 1500);
        assert!(!state.is_running());
        assert!(!state.notified_at_10_min());
        assert!(!state.notified_at_20_min());
        assert_eq!(state.sessions_completed(), 1);
        assert_eq!(state.progress(), 0.0);
    }

    #[test]
    fn change_mode_while_running_cancels_clock() {
        let mut engine = engine();
        engine.start();
        advance(&mut engine, 5);
        let in_flight = engine.clock().tick().unwrap();

        engine.change_mode(Mode::LongBreak);
        assert_eq!(engine.clock().active_count(), 0);
        assert!(engine.tick(in_flight).is_none());
        assert_eq!(engine.state().time_left_secs(), 900);
        assert!(!engine.state().is_running());
    }

    #[test]
    fn change_mode_by_key_rejects_unknown() {
        let mut engine = engine();
        engine.start();
        let before = engine.snapshot();
        assert!(engine.change_mode_by_key("nap").is_err());
        assert_eq!(engine.snapshot(), before);

        assert!(engine.change_mode_by_key("long_break").is_ok());
        assert_eq!(engine.state().mode(), Mode::LongBreak);
    }

    #[test]
    fn one_second_left_scenario() {
        let mut engine = engine();
        engine.start();
        advance(&mut engine, 1499);
        assert_eq!(engine.state().time_left_secs(), 1);

        advance(&mut engine, 1);
        assert_eq!(engine.state().time_left_secs(), 0);
        advance(&mut engine, 1);

        let state = engine.state();
        assert_eq!(state.pomodoros_completed(), 1);
        assert_eq!(state.sessions_completed(), 1);
        assert!(!state.is_running());
    }

    #[test]
    fn progress_grows_while_running() {
        let mut engine = engine();
        engine.change_mode(Mode::ShortBreak);
        engine.start();
        let mut last = engine.state().progress();
        for _ in 0..300 {
            advance(&mut engine, 1);
            let now = engine.state().progress();
            assert!(now >= last);
            last = now;
        }
        assert_eq!(last, 1.0);
    }
}
