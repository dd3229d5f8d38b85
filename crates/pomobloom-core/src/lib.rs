//! # Pomobloom Core Library
//!
//! Core logic for the Pomobloom Pomodoro timer. The terminal front end in
//! `pomobloom-cli` is a thin shell over this crate.
//!
//! ## Architecture
//!
//! - **Session Engine**: a tick-driven state machine over three fixed modes.
//!   The engine owns its clock subscription; ticks from a cancelled
//!   subscription are ignored.
//! - **Effects**: completion sound and desktop notifications, dispatched
//!   without ever blocking or failing a transition.
//! - **View**: a pure projection from a state snapshot to terminal markup.
//! - **Runtime**: the single-task driver that serializes commands and ticks.
//!
//! ## Key Components
//!
//! - [`SessionEngine`]: Core timer state machine
//! - [`EffectsDispatcher`]: Sound and notification requests
//! - [`SessionDriver`]: Cooperative event loop
//! - [`Config`]: Application configuration management

pub mod effects;
pub mod error;
pub mod events;
pub mod runtime;
pub mod storage;
pub mod timer;
pub mod view;
pub mod window;

pub use effects::{
    AudioSink, CommandPlayer, DesktopNotifier, EffectsDispatcher, NotificationSink, SoundSettings,
};
pub use error::{ConfigError, CoreError, EffectError};
pub use events::Event;
pub use runtime::{Command, SessionDriver};
pub use storage::Config;
pub use timer::{ClockSource, ManualClock, Mode, SessionEngine, SessionState, Tick, TokioClock};
pub use view::{ViewOptions, VisualCue};
pub use window::{HeadlessShell, WindowShell};
