use std::io::{BufRead, IsTerminal, Write};

use clap::Args;
use pomobloom_core::{
    Command, CommandPlayer, Config, DesktopNotifier, EffectsDispatcher, HeadlessShell,
    SessionDriver, SoundSettings, ViewOptions, WindowShell,
};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::input::parse_command;
use crate::shell::TerminalShell;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Start in the compact layout
    #[arg(long)]
    pub compact: bool,
    /// Keep the window on top
    #[arg(long)]
    pub pin: bool,
    /// Do not play the completion sound
    #[arg(long)]
    pub mute: bool,
    /// Do not show desktop notifications
    #[arg(long)]
    pub no_notify: bool,
}

/// Read commands from stdin on a plain thread; `Quit` is sent on EOF.
fn spawn_input_reader(tx: mpsc::Sender<Command>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match parse_command(&line) {
                Ok(command) => {
                    if tx.blocking_send(command).is_err() || command == Command::Quit {
                        return;
                    }
                }
                Err(e) => eprintln!("{e}"),
            }
        }
        let _ = tx.blocking_send(Command::Quit);
    });
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let interactive = std::io::stdout().is_terminal();

    let notifier =
        DesktopNotifier::request_permission(config.notifications.enabled && !args.no_notify);
    let player = match config.sound.player.as_deref() {
        Some(program) => CommandPlayer::new(program),
        None => CommandPlayer::platform_default(),
    };
    let mut sound = SoundSettings::from_config(&config);
    sound.enabled &= !args.mute;
    let dispatcher = EffectsDispatcher::new(notifier, player, sound)
        .with_motivational(config.notifications.motivational);

    let shell: Box<dyn WindowShell + Send> = if interactive {
        Box::new(TerminalShell)
    } else {
        Box::new(HeadlessShell)
    };
    let view = ViewOptions {
        compact: config.window.compact || args.compact,
        always_on_top: config.window.always_on_top || args.pin,
        color: interactive,
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let state = runtime.block_on(async move {
        let (tx, rx) = mpsc::channel(32);
        spawn_input_reader(tx);

        let driver = SessionDriver::new(dispatcher, shell, view);
        driver
            .run(rx, |frame| {
                let mut stdout = std::io::stdout().lock();
                let result = if interactive {
                    write!(stdout, "{CLEAR_SCREEN}{frame}")
                } else {
                    writeln!(stdout, "{frame}")
                };
                if let Err(e) = result.and_then(|_| stdout.flush()) {
                    warn!(error = %e, "failed to draw frame");
                }
            })
            .await
    });

    info!(
        pomodoros = state.pomodoros_completed(),
        sessions = state.sessions_completed(),
        "session ended"
    );
    println!(
        "{} pomodoros, {} sessions completed",
        state.pomodoros_completed(),
        state.sessions_completed()
    );
    Ok(())
}
