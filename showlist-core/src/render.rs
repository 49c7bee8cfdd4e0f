//! Rendering shows onto a display container.
//!
//! The container is the only thing the pipeline mutates. `HtmlContainer`
//! produces the markup of the page's shows list; other front ends implement
//! `ShowsContainer` themselves.

use crate::extract::DisplayRow;

pub const NO_EVENTS_MESSAGE: &str = "No upcoming shows scheduled. Check back soon!";
pub const UNAVAILABLE_MESSAGE: &str = "Unable to load shows right now. Please check back later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    NoEvents,
    Unavailable,
}

impl MessageKind {
    pub fn text(self) -> &'static str {
        match self {
            MessageKind::NoEvents => NO_EVENTS_MESSAGE,
            MessageKind::Unavailable => UNAVAILABLE_MESSAGE,
        }
    }
}

/// A surface the shows list can be drawn on.
pub trait ShowsContainer {
    /// Remove everything currently displayed.
    fn clear(&mut self);
    fn append_row(&mut self, row: &DisplayRow);
    fn append_message(&mut self, kind: MessageKind);
}

/// Replace the container contents with `rows`, or the "no events" message
/// when there are none.
pub fn render_rows<C: ShowsContainer + ?Sized>(container: &mut C, rows: &[DisplayRow]) {
    container.clear();
    if rows.is_empty() {
        container.append_message(MessageKind::NoEvents);
        return;
    }
    for row in rows {
        container.append_row(row);
    }
}

/// Replace the container contents with the "unable to load" message.
pub fn render_unavailable<C: ShowsContainer + ?Sized>(container: &mut C) {
    container.clear();
    container.append_message(MessageKind::Unavailable);
}

/// Render a pipeline outcome. Any error shows the fallback message and
/// never partial rows.
pub fn render_outcome<C, E>(container: &mut C, outcome: Result<Vec<DisplayRow>, E>)
where
    C: ShowsContainer + ?Sized,
    E: std::fmt::Display,
{
    match outcome {
        Ok(rows) => render_rows(container, &rows),
        Err(e) => {
            log::error!("Error loading shows: {}", e);
            render_unavailable(container);
        }
    }
}

/// Child element of the HTML shows list.
#[derive(Debug, Clone, PartialEq)]
pub enum HtmlElement {
    Row(DisplayRow),
    Message(MessageKind),
}

impl HtmlElement {
    pub fn to_html(&self) -> String {
        match self {
            HtmlElement::Row(row) => row_html(row),
            HtmlElement::Message(kind) => {
                let class = match kind {
                    MessageKind::NoEvents => "no-shows",
                    MessageKind::Unavailable => "shows-error",
                };
                format!("<p class=\"{}\">{}</p>", class, html_escape(kind.text()))
            }
        }
    }
}

/// In-memory model of the `.shows-list` element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HtmlContainer {
    children: Vec<HtmlElement>,
}

impl HtmlContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn children(&self) -> &[HtmlElement] {
        &self.children
    }

    pub fn row_count(&self) -> usize {
        self.children
            .iter()
            .filter(|c| matches!(c, HtmlElement::Row(_)))
            .count()
    }

    pub fn inner_html(&self) -> String {
        self.children
            .iter()
            .map(HtmlElement::to_html)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The container element including its own tag.
    pub fn outer_html(&self) -> String {
        let inner = self.inner_html();
        if inner.is_empty() {
            return "<div class=\"shows-list\"></div>".to_string();
        }
        format!("<div class=\"shows-list\">\n{}\n</div>", inner)
    }
}

impl ShowsContainer for HtmlContainer {
    fn clear(&mut self) {
        self.children.clear();
    }

    fn append_row(&mut self, row: &DisplayRow) {
        self.children.push(HtmlElement::Row(row.clone()));
    }

    fn append_message(&mut self, kind: MessageKind) {
        self.children.push(HtmlElement::Message(kind));
    }
}

fn row_html(row: &DisplayRow) -> String {
    let link = match &row.link {
        Some(url) => format!(
            "<a class=\"show-link\" href=\"{}\" target=\"_blank\" rel=\"noopener\">INFO</a>",
            html_escape(url)
        ),
        // Empty cell keeps the grid aligned
        None => "<span class=\"show-link\"></span>".to_string(),
    };
    format!(
        "<div class=\"show-item\"><div class=\"show-date\">{}</div><div class=\"show-venue\">{}</div><div class=\"show-time\">{}</div>{}</div>",
        html_escape(&row.date),
        html_escape(&row.venue),
        html_escape(&row.time),
        link
    )
}

fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
