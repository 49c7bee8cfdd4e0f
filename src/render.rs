//! Terminal rendering of the shows list.
//!
//! `TerminalList` is a `ShowsContainer` that collects colored lines using
//! owo_colors instead of markup.

use owo_colors::OwoColorize;
use showlist_core::DisplayRow;
use showlist_core::render::{MessageKind, ShowsContainer};

#[derive(Default)]
pub struct TerminalList {
    lines: Vec<String>,
}

impl TerminalList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl ShowsContainer for TerminalList {
    fn clear(&mut self) {
        self.lines.clear();
    }

    fn append_row(&mut self, row: &DisplayRow) {
        let date = format!("{:<9}", row.date);
        let time = format!("{:>7}", row.time);
        let mut line = format!("  {} {}  {}", date.bold(), time.dimmed(), row.venue);
        if let Some(url) = &row.link {
            line.push_str(&format!("  {}", url.cyan()));
        }
        self.lines.push(line);
    }

    fn append_message(&mut self, kind: MessageKind) {
        let line = match kind {
            MessageKind::NoEvents => kind.text().dimmed().to_string(),
            MessageKind::Unavailable => kind.text().red().to_string(),
        };
        self.lines.push(line);
    }
}
