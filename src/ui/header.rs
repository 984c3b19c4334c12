//! Header widget rendering.
//!
//! Displays the page breadcrumb and who is signed in.

use crate::app::{App, UiMode};
use crate::catalog::CatalogSource;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Render the header widget.
///
/// # Arguments
/// * `app` - Application state
/// * `area` - Area to render in
/// * `buf` - Buffer to render to
///
/// # Details
/// Shows "Home / Trees" (or "Home / News" on the article page) on the left
/// and the session on the right.
pub fn render_header<S: CatalogSource>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let page = if app.mode == UiMode::Article {
        "News"
    } else {
        "Trees"
    };

    let crumbs = Line::from(vec![
        Span::styled("Home", Style::default().fg(Color::Gray)),
        Span::styled(" / ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            page,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
    ]);

    let session_style = if app.session.is_logged_in() {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Gray)
    };
    let session = Line::from(Span::styled(app.session.describe(), session_style))
        .alignment(Alignment::Right);

    let block = Block::default().title("Tree Sponsorship").borders(Borders::ALL);
    let inner = block.inner(area);
    Widget::render(block, area, buf);
    Widget::render(Paragraph::new(crumbs), inner, buf);
    Widget::render(Paragraph::new(session), inner, buf);
}
