//! Keyboard commands typed on stdin, one per line.

use pomobloom_core::{Command, Mode};

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    // A bare Enter or space toggles, like the play button.
    if line.is_empty() {
        return Ok(Command::Toggle);
    }

    let mut words = line.split_whitespace();
    let head = words.next().unwrap_or_default().to_ascii_lowercase();
    let command = match head.as_str() {
        "s" | "space" | "toggle" => Command::Toggle,
        "start" => Command::Start,
        "pause" => Command::Pause,
        "r" | "reset" => Command::Reset,
        "1" => Command::ChangeMode(Mode::Focus),
        "2" => Command::ChangeMode(Mode::ShortBreak),
        "3" => Command::ChangeMode(Mode::LongBreak),
        "mode" => {
            let key = words.next().ok_or("usage: mode <focus|short_break|long_break>")?;
            let mode = key.parse::<Mode>().map_err(|e| e.to_string())?;
            Command::ChangeMode(mode)
        }
        "p" | "pin" => Command::ToggleAlwaysOnTop,
        "m" | "min" | "minimize" => Command::Minimize,
        "c" | "compact" => Command::ToggleCompact,
        "q" | "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command: {other}")),
    };
    Ok(command)
}
