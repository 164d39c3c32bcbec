//! Operator file selection for pull requests.

use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Asks the host operator which file to hand over.
///
/// Blocking: called from the blocking pool. `None` means the operator
/// cancelled.
pub trait FilePicker: Send + Sync {
    fn pick(&self) -> Option<PathBuf>;
}

/// Prompts on the terminal. An empty line or end of input cancels.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPicker;

impl FilePicker for TerminalPicker {
    fn pick(&self) -> Option<PathBuf> {
        print!("Viewer requested a file. Path to send (empty to cancel): ");
        std::io::stdout().flush().ok()?;

        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line).ok()?;
        parse_selection(&line)
    }
}

fn parse_selection(line: &str) -> Option<PathBuf> {
    let trimmed = line.trim();
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}

/// Always answers with the same selection.
#[derive(Debug, Default, Clone)]
pub struct FixedPicker(pub Option<PathBuf>);

impl FilePicker for FixedPicker {
    fn pick(&self) -> Option<PathBuf> {
        self.0.clone()
    }
}
