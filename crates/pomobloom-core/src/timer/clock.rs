//! Tick sources for the session engine.
//!
//! A subscription is tagged with the engine's epoch at the time it was
//! created; every tick carries that epoch back so the engine can discard
//! ticks that were already in flight when the subscription was cancelled.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// One period of a clock subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub epoch: u64,
}

/// A periodic, cancelable tick primitive.
pub trait ClockSource {
    type Handle;

    fn subscribe(&mut self, epoch: u64) -> Self::Handle;

    fn unsubscribe(&mut self, handle: Self::Handle);
}

/// Interval-backed clock. Each subscription is a task that pushes ticks into
/// a channel owned by the driver.
///
/// Drift is tolerated, not corrected: a late tick delays the next one.
#[derive(Debug, Clone)]
pub struct TokioClock {
    ticks: mpsc::UnboundedSender<Tick>,
    period: Duration,
}

impl TokioClock {
    pub const DEFAULT_PERIOD: Duration = Duration::from_secs(1);

    /// Create a clock and the receiving end of its tick channel.
    pub fn new(period: Duration) -> (Self, mpsc::UnboundedReceiver<Tick>) {
        let (ticks, rx) = mpsc::unbounded_channel();
        (Self { ticks, period }, rx)
    }
}

impl ClockSource for TokioClock {
    type Handle = JoinHandle<()>;

    /// Must be called from within a tokio runtime.
    fn subscribe(&mut self, epoch: u64) -> Self::Handle {
        let ticks = self.ticks.clone();
        let period = self.period;
        tokio::spawn(async move {
            // interval() fires immediately; the first tick belongs one period out.
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if ticks.send(Tick { epoch }).is_err() {
                    break;
                }
            }
        })
    }

    fn unsubscribe(&mut self, handle: Self::Handle) {
        handle.abort();
    }
}

/// Handle of a [`ManualClock`] subscription.
#[derive(Debug, PartialEq, Eq)]
pub struct ManualSubscription {
    id: u64,
}

/// Clock driven by the caller. Keeps track of live subscriptions so tests
/// can observe that no more than one is ever active.
#[derive(Debug, Default)]
pub struct ManualClock {
    next_id: u64,
    active: Vec<(u64, u64)>,
    subscribe_count: usize,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn subscribe_count(&self) -> usize {
        self.subscribe_count
    }

    /// Epoch of the most recent live subscription.
    pub fn active_epoch(&self) -> Option<u64> {
        self.active.last().map(|&(_, epoch)| epoch)
    }

    /// Produce the tick the live subscription would deliver, if any.
    pub fn tick(&self) -> Option<Tick> {
        self.active_epoch().map(|epoch| Tick { epoch })
    }
}

impl ClockSource for ManualClock {
    type Handle = ManualSubscription;

    fn subscribe(&mut self, epoch: u64) -> Self::Handle {
        self.next_id += 1;
        self.subscribe_count += 1;
        self.active.push((self.next_id, epoch));
        ManualSubscription { id: self.next_id }
    }

    fn unsubscribe(&mut self, handle: Self::Handle) {
        self.active.retain(|&(id, _)| id != handle.id);
    }
}
