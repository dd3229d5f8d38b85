//! Side effects of session events: completion sound and notifications.
//!
//! The dispatcher only reads events; it never touches session state.
//! Every failure is logged and swallowed here.

mod audio;
mod notify;

pub use audio::CommandPlayer;
pub use notify::{DesktopNotifier, Permission};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::EffectError;
use crate::events::Event;
use crate::storage::Config;
use crate::timer::Mode;

/// Auto-dismiss delay of the motivational notifications.
pub const MOTIVATIONAL_DISMISS: Duration = Duration::from_secs(4);

/// Default hard stop for the completion sound.
pub const DEFAULT_PLAYBACK_CAP: Duration = Duration::from_secs(10);

/// Desktop notification display.
///
/// Both requests are fire-and-forget: implementations must return
/// promptly and do the actual display work elsewhere.
pub trait NotificationSink: Send + Sync + 'static {
    /// Show a notification that disappears on its own.
    fn request_transient(
        &self,
        title: &str,
        body: &str,
        auto_dismiss: Duration,
    ) -> Result<(), EffectError>;

    /// Show a notification that stays until the user dismisses it.
    fn request_persistent(&self, title: &str, body: &str) -> Result<(), EffectError>;
}

/// Sound playback.
pub trait AudioSink: Send + Sync + 'static {
    type Playback: Send + 'static;

    fn play(&self, clip: &Path, volume: f32) -> Result<Self::Playback, EffectError>;

    /// Stop a playback. Must be safe on a playback that already ended.
    fn stop(&self, playback: Self::Playback) -> Result<(), EffectError>;
}

/// Sound settings the dispatcher applies to every completion.
#[derive(Debug, Clone)]
pub struct SoundSettings {
    pub enabled: bool,
    pub clip: PathBuf,
    pub volume: f32,
    pub playback_cap: Duration,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            clip: PathBuf::new(),
            volume: 0.7,
            playback_cap: DEFAULT_PLAYBACK_CAP,
        }
    }
}

impl SoundSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            enabled: config.sound.enabled,
            clip: PathBuf::from(&config.sound.clip),
            volume: config.sound.gain(),
            playback_cap: config.sound.playback_cap(),
        }
    }
}

/// Translates session events into sound and notification requests.
pub struct EffectsDispatcher<N: NotificationSink, A: AudioSink> {
    notifier: N,
    audio: Arc<A>,
    sound: SoundSettings,
    motivational: bool,
}

impl<N: NotificationSink, A: AudioSink> EffectsDispatcher<N, A> {
    pub fn new(notifier: N, audio: A, sound: SoundSettings) -> Self {
        Self {
            notifier,
            audio: Arc::new(audio),
            sound,
            motivational: true,
        }
    }

    pub fn with_motivational(mut self, enabled: bool) -> Self {
        self.motivational = enabled;
        self
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    /// React to one engine event. Never fails and never blocks.
    ///
    /// Completion playback is capped by a timer task, so this must run
    /// inside a tokio runtime.
    pub fn dispatch(&self, event: &Event) {
        match event {
            Event::MilestoneReached {
                minutes_elapsed, ..
            } => self.motivate(*minutes_elapsed),
            Event::SessionCompleted { mode, .. } => self.complete(*mode),
            _ => {}
        }
    }

    fn motivate(&self, minutes_elapsed: u32) {
        if !self.motivational {
            return;
        }
        debug!(minutes_elapsed, "requesting motivational notification");
        let result = self.notifier.request_transient(
            "Keep going! 🔋",
            "Nice, keep it up, you're getting there!",
            MOTIVATIONAL_DISMISS,
        );
        log_failure("motivational notification", result);
    }

    fn complete(&self, mode: Mode) {
        // Sound and notification are independent; neither gates the other.
        self.play_completion_sound();

        let (title, body) = completion_message(mode);
        let result = self.notifier.request_persistent(title, body);
        log_failure("completion notification", result);
    }

    fn play_completion_sound(&self) {
        if !self.sound.enabled {
            debug!("completion sound disabled");
            return;
        }
        let playback = match self.audio.play(&self.sound.clip, self.sound.volume) {
            Ok(playback) => playback,
            Err(e) => {
                log_failure::<()>("completion sound", Err(e));
                return;
            }
        };

        let audio = Arc::clone(&self.audio);
        let cap = self.sound.playback_cap;
        tokio::spawn(async move {
            tokio::time::sleep(cap).await;
            if let Err(e) = audio.stop(playback) {
                warn!(error = %e, "failed to stop completion sound");
            } else {
                debug!(cap_secs = cap.as_secs(), "completion sound stopped");
            }
        });
    }
}

fn completion_message(mode: Mode) -> (&'static str, &'static str) {
    match mode {
        Mode::Focus => (
            "Pomodoro complete! 🎆",
            "Great work! You finished the Pomodoro.",
        ),
        Mode::ShortBreak | Mode::LongBreak => (
            "Break over ⏰",
            "Break finished. Ready for the next Pomodoro?",
        ),
    }
}

fn log_failure<T>(what: &str, result: Result<T, EffectError>) {
    match result {
        Ok(_) => {}
        Err(EffectError::PermissionDenied) => {
            debug!("{what} skipped: notifications not permitted");
        }
        Err(e) => warn!(error = %e, "{what} failed"),
    }
}
