//! Terminal built-in commands
//!
//! Built-ins match the whole trimmed line exactly; anything else is a
//! command for the dispatcher.

use crate::core::error::Result;
use crate::services::LocalFileManager;
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use std::io::Write;

/// Commands handled by the shell itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Help,
    Clear,
    Pwd,
    List,
    History,
    Log,
    Status,
    Repeat,
    Quit,
}

impl Builtin {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "help" => Some(Self::Help),
            "clear" => Some(Self::Clear),
            "pwd" => Some(Self::Pwd),
            "ls" | "dir" => Some(Self::List),
            "history" => Some(Self::History),
            "log" => Some(Self::Log),
            "status" => Some(Self::Status),
            "!!" => Some(Self::Repeat),
            "quit" | "exit" | "q" => Some(Self::Quit),
            _ => None,
        }
    }
}

pub const HELP_TEXT: &str = "\
Built-in commands:
  help            - Show this help message
  clear           - Clear the screen
  ls, dir         - List the current directory
  pwd             - Show the current directory
  history         - Show recent commands and their outcomes
  log             - Show this session's activity log
  status          - Show task counters
  !!              - Repeat the previous command
  quit, exit      - Leave the shell

Anything else is interpreted, for example:
  list files                  weather in Paris
  search rust ownership       check internet connectivity
  system status               show running processes
  system health check";

/// Clear the terminal and home the cursor
pub fn clear_screen<W: Write>(out: &mut W) -> Result<()> {
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    Ok(())
}

/// Plain name-per-line listing of the working directory
pub fn list_current_directory() -> Result<String> {
    let listing = LocalFileManager::new()?.list(None)?;
    let mut out = String::new();
    for item in &listing.items {
        out.push_str(&item.name);
        if item.is_directory {
            out.push('/');
        }
        out.push('\n');
    }
    Ok(out)
}

pub fn current_directory() -> Result<String> {
    Ok(std::env::current_dir()?.display().to_string())
}
