//! Window shell for a terminal host.

use std::io::Write;
use std::process::{Command, Stdio};

use pomobloom_core::WindowShell;
use tracing::{debug, warn};

/// XTWINOPS "iconify window".
const ICONIFY: &str = "\x1b[2t";

/// Drives the terminal emulator window the session runs in.
///
/// Always-on-top goes through `wmctrl` on X11/EWMH desktops; minimize uses
/// the xterm window-manipulation escape. Hosts that support neither just
/// ignore the request.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalShell;

impl WindowShell for TerminalShell {
    fn set_always_on_top(&self, flag: bool) {
        let action = if flag { "add,above" } else { "remove,above" };
        let spawned = Command::new("wmctrl")
            .args(["-r", ":ACTIVE:", "-b", action])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(mut child) => {
                // Reap in the background; the request is fire-and-forget.
                std::thread::spawn(move || child.wait());
                debug!(flag, "always-on-top requested");
            }
            Err(e) => warn!(error = %e, "always-on-top unavailable"),
        }
    }

    fn minimize(&self) {
        let mut stdout = std::io::stdout();
        if let Err(e) = stdout.write_all(ICONIFY.as_bytes()).and_then(|_| stdout.flush()) {
            warn!(error = %e, "minimize request failed");
        }
    }
}
