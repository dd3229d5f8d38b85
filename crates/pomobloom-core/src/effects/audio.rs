use std::path::Path;
use std::process::Stdio;

use tokio::process::{Child, Command};
use tracing::debug;

use super::AudioSink;
use crate::error::EffectError;

/// Plays clips by spawning a command-line player.
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    program: String,
}

impl CommandPlayer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// `afplay` on macOS, PulseAudio's `paplay` elsewhere.
    pub fn platform_default() -> Self {
        if cfg!(target_os = "macos") {
            Self::new("afplay")
        } else {
            Self::new("paplay")
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Player-specific arguments for `volume` in `0.0..=1.0`.
    fn volume_args(&self, volume: f32) -> Vec<String> {
        let volume = volume.clamp(0.0, 1.0);
        let name = Path::new(&self.program)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.program);
        match name {
            // paplay volume is linear, 65536 = 100%.
            "paplay" => vec![format!("--volume={}", (volume * 65536.0).round() as u32)],
            "afplay" => vec!["-v".into(), format!("{volume:.2}")],
            "ffplay" => vec![
                "-nodisp".into(),
                "-autoexit".into(),
                "-volume".into(),
                format!("{}", (volume * 100.0).round() as u32),
            ],
            _ => Vec::new(),
        }
    }
}

impl Default for CommandPlayer {
    fn default() -> Self {
        Self::platform_default()
    }
}

impl AudioSink for CommandPlayer {
    type Playback = Child;

    fn play(&self, clip: &Path, volume: f32) -> Result<Child, EffectError> {
        if !clip.exists() {
            return Err(EffectError::Playback(format!(
                "clip not found: {}",
                clip.display()
            )));
        }
        let child = Command::new(&self.program)
            .args(self.volume_args(volume))
            .arg(clip)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EffectError::Playback(format!("{}: {e}", self.program)))?;
        debug!(program = %self.program, clip = %clip.display(), "playback started");
        Ok(child)
    }

    fn stop(&self, mut playback: Child) -> Result<(), EffectError> {
        if playback.try_wait()?.is_some() {
            return Ok(());
        }
        playback.start_kill()?;
        Ok(())
    }
}
