mod calendar;
mod config_cmd;
mod customer;
mod reset;
mod stats;
mod training;

pub use calendar::CalendarCommand;
pub use config_cmd::ConfigCommand;
pub use customer::CustomerCommand;
pub use reset::ResetCommand;
pub use stats::StatsCommand;
pub use training::TrainingCommand;

use clap::ValueEnum;
use ptrainer_core::{Entity, Resource};
use std::io::{self, BufRead, Write};

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Asks a yes/no question on stdin; anything but `y` means no.
pub fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    read_confirmation(&mut io::stdin().lock())
}

fn read_confirmation<R: BufRead>(input: &mut R) -> io::Result<bool> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().eq_ignore_ascii_case("y"))
}

/// Identifier shown in lists; `update` and `delete` accept it back.
pub fn display_id<T: Resource>(entity: &Entity<T>) -> String {
    match entity.server_id() {
        Some(id) => id.to_string(),
        None => entity.self_href().unwrap_or("-").to_string(),
    }
}

/// Shortens `s` to at most `max` characters, marking the cut with `...`.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        s.to_string()
    }
}
