//! Sort options widget rendering.
//!
//! Displays the "Options" toggle and, when open, the sort options menu.

use crate::app::{App, SortOption};
use crate::catalog::CatalogSource;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

/// Render the options toggle button.
///
/// # Arguments
/// * `app` - Application state
/// * `area` - Area to render in
/// * `buf` - Buffer to render to
pub fn render_sort_toggle<S: CatalogSource>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let is_open = app.sort_menu.open;
    let line = Line::from(vec![
        Span::raw("Options "),
        Span::styled(
            if is_open { "▴" } else { "▾" },
            Style::default().fg(Color::Cyan),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .title("'o'")
            .borders(Borders::ALL)
            .style(if is_open {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            }),
    );

    Widget::render(paragraph, area, buf);
}

/// Render the sort options menu over `anchor`'s top-right corner.
///
/// # Arguments
/// * `app` - Application state
/// * `anchor` - Area the menu drops down into (the list area)
/// * `buf` - Buffer to render to
///
/// # Details
/// Renders nothing while the menu is closed. Entries are labels only.
pub fn render_sort_menu<S: CatalogSource>(app: &App<S>, anchor: Rect, buf: &mut Buffer) {
    if !app.sort_menu.open {
        return;
    }

    let width = 24.min(anchor.width);
    let height = (SortOption::ALL.len() as u16 + 2).min(anchor.height);
    let area = Rect::new(anchor.right().saturating_sub(width), anchor.y, width, height);

    let lines: Vec<Line> = SortOption::ALL
        .iter()
        .enumerate()
        .map(|(idx, option)| {
            let style = if idx == app.sort_menu.highlighted {
                Style::default()
                    .fg(Color::Yellow)
                    .bg(Color::Blue)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(Span::styled(option.label(), style))
        })
        .collect();

    Widget::render(Clear, area, buf);
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title("Sort by")
            .borders(Borders::ALL)
            .style(Style::default().fg(Color::Yellow)),
    );
    Widget::render(paragraph, area, buf);
}
