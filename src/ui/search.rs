//! Search widget rendering.
//!
//! Displays the search input bar.

use crate::app::{App, UiMode};
use crate::catalog::CatalogSource;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Render the search widget.
///
/// # Arguments
/// * `app` - Application state
/// * `area` - Area to render in
/// * `buf` - Buffer to render to
///
/// # Details
/// Displays a search input bar with the current query.
/// Highlights when in search mode and marks a request still in flight.
pub fn render_search<S: CatalogSource>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let is_active = app.mode == UiMode::Search;
    let prompt = if is_active {
        "Search: "
    } else {
        "Search (press '/'): "
    };

    let mut spans = vec![
        Span::styled(prompt, Style::default().fg(Color::Yellow)),
        Span::styled(
            app.search_query.as_str(),
            Style::default().fg(if is_active { Color::White } else { Color::Gray }),
        ),
        Span::styled(
            if is_active { "_" } else { "" },
            Style::default().fg(Color::Yellow),
        ),
    ];
    if app.store.is_pending() {
        spans.push(Span::styled("  (fetching...)", Style::default().fg(Color::DarkGray)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title("Search trees")
            .borders(Borders::ALL)
            .style(if is_active {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            }),
    );

    Widget::render(paragraph, area, buf);
}
