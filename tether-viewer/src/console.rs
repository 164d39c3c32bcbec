//! Operator commands typed into the viewer's terminal.
//!
//! The console stands in for window events: pointer commands take
//! coordinates in the drawable area, not on the host screen.

use std::path::PathBuf;

use tether_core::protocol::MouseButton;

use crate::input::LocalEvent;

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Push a local file to the host.
    Send(PathBuf),
    /// Ask the host operator for a file.
    Receive,
    /// Change the drawable area size.
    Resize { width: u32, height: u32 },
    /// Forward an input event.
    Input(LocalEvent),
    /// Key down followed by key up.
    KeyTap(u32),
    Stats,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  send <path>                 push a file to the host
  receive                     ask the host for a file
  resize <w> <h>              resize the drawable area
  move <x> <y>                pointer motion
  drag <x> <y> [button]       pointer motion with a button held
  press <x> <y> [button]      button down
  release <x> <y> [button]    button up
  click <x> <y> [button]      button down and up
  enter <x> <y> | exit <x> <y>
  key <code>                  key down and up
  keydown <code> | keyup <code>
  stats                       stream statistics
  quit";

/// Parse one line. Blank lines parse to `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<ConsoleCommand>, String> {
    let line = line.trim();
    let Some((word, rest)) = split_word(line) else {
        return Ok(None);
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    let verb = word.to_ascii_lowercase();

    let command = match verb.as_str() {
        "send" | "push" => {
            if rest.is_empty() {
                return Err("usage: send <path>".into());
            }
            ConsoleCommand::Send(PathBuf::from(rest))
        }
        "receive" | "pull" => ConsoleCommand::Receive,
        "resize" => {
            let [w, h] = args[..] else {
                return Err("usage: resize <w> <h>".into());
            };
            ConsoleCommand::Resize {
                width: number(w)?,
                height: number(h)?,
            }
        }
        "move" => {
            let (x, y) = point(&args, false)?.0;
            ConsoleCommand::Input(LocalEvent::Move { x, y })
        }
        "enter" => {
            let (x, y) = point(&args, false)?.0;
            ConsoleCommand::Input(LocalEvent::Enter { x, y })
        }
        "exit" => {
            let (x, y) = point(&args, false)?.0;
            ConsoleCommand::Input(LocalEvent::Exit { x, y })
        }
        "drag" | "press" | "release" | "click" => {
            let ((x, y), button) = point(&args, true)?;
            let event = match verb.as_str() {
                "drag" => LocalEvent::Drag { x, y, button },
                "press" => LocalEvent::Press { x, y, button },
                "release" => LocalEvent::Release { x, y, button },
                _ => LocalEvent::Click { x, y, button },
            };
            ConsoleCommand::Input(event)
        }
        "key" => {
            let [code] = args[..] else {
                return Err("usage: key <code>".into());
            };
            ConsoleCommand::KeyTap(number(code)?)
        }
        "keydown" | "keyup" => {
            let [code] = args[..] else {
                return Err(format!("usage: {verb} <code>"));
            };
            let code = number(code)?;
            ConsoleCommand::Input(if verb == "keydown" {
                LocalEvent::KeyDown(code)
            } else {
                LocalEvent::KeyUp(code)
            })
        }
        "stats" => ConsoleCommand::Stats,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "q" => ConsoleCommand::Quit,
        other => return Err(format!("unknown command `{other}`; try `help`")),
    };
    Ok(Some(command))
}

fn split_word(line: &str) -> Option<(&str, &str)> {
    if line.is_empty() {
        return None;
    }
    Some(match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    })
}

fn number<T: std::str::FromStr>(text: &str) -> Result<T, String> {
    text.parse().map_err(|_| format!("not a number: `{text}`"))
}

fn point(args: &[&str], with_button: bool) -> Result<((i32, i32), MouseButton), String> {
    match (args, with_button) {
        ([x, y], _) => Ok(((number(x)?, number(y)?), MouseButton::Left)),
        ([x, y, b], true) => Ok(((number(x)?, number(y)?), button(b)?)),
        _ if with_button => Err("usage: <x> <y> [left|middle|right|<n>]".into()),
        _ => Err("usage: <x> <y>".into()),
    }
}

fn button(text: &str) -> Result<MouseButton, String> {
    Ok(match text.to_ascii_lowercase().as_str() {
        "left" | "l" => MouseButton::Left,
        "middle" | "m" => MouseButton::Middle,
        "right" | "r" => MouseButton::Right,
        n => MouseButton::Other(number(n)?),
    })
}
