//! Article page rendering.

use crate::article::{ArticleView, render_rich_text};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

/// Render the article page.
///
/// # Arguments
/// * `view` - Article page state
/// * `area` - Area to render in
/// * `buf` - Buffer to render to
///
/// # Details
/// Non-ready states render their message alone. A ready article shows the
/// title, image reference, byline, and the sanitized body.
pub fn render_article(view: &ArticleView, area: Rect, buf: &mut Buffer) {
    let mut lines: Vec<Line> = Vec::new();

    let title = match view {
        ArticleView::Ready(article) => {
            lines.push(Line::from(Span::styled(
                article.title.as_str(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                format!("Image: {}", article.image_url),
                Style::default().fg(Color::Gray),
            )));
            let writer = article
                .writer
                .as_ref()
                .map(|w| w.full_name())
                .unwrap_or_default();
            lines.push(Line::from(vec![
                Span::raw("By "),
                Span::styled(writer, Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" on "),
                Span::styled(
                    article.format_date(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]));
            lines.push(Line::default());
            lines.extend(render_rich_text(&article.content).into_iter().map(Line::from));
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                "← Go Back (Esc)",
                Style::default().fg(Color::Yellow),
            )));
            article.title.clone()
        }
        other => {
            let color = match other {
                ArticleView::Failed(_) => Color::Red,
                _ => Color::Gray,
            };
            lines.push(Line::from(Span::styled(
                other.message().unwrap_or_default().to_string(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
            "Article".to_string()
        }
    };

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().title(title).borders(Borders::ALL));
    Widget::render(paragraph, area, buf);
}
