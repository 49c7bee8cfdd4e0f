pub mod config;
pub mod contact;
pub mod render;
pub mod shows;

use anyhow::Result;
use showlist_core::render::render_outcome;
use showlist_core::{DisplayRow, HtmlContainer, ShowListResult};

use crate::Format;
use crate::render::TerminalList;

/// Print a pipeline outcome in the requested format.
///
/// HTML and text show the "unable to load" state on failure, as the page
/// does. JSON has no such state and returns the error instead.
pub fn print_outcome(outcome: ShowListResult<Vec<DisplayRow>>, format: Format) -> Result<()> {
    match format {
        Format::Html => {
            let mut container = HtmlContainer::new();
            render_outcome(&mut container, outcome);
            println!("{}", container.outer_html());
        }
        Format::Text => {
            let mut list = TerminalList::new();
            render_outcome(&mut list, outcome);
            println!("{}", list.render());
        }
        Format::Json => {
            let rows = outcome?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }
    Ok(())
}
