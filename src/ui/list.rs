//! Tree card list widget rendering.
//!
//! Displays a scrollable list of catalog cards with selection highlighting,
//! or the loading / empty / failed placeholder.

use crate::app::App;
use crate::catalog::{CatalogItem, CatalogSource};
use crate::store::ListStatus;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Widget},
};

/// Lines taken by one card (4 content + 1 separator).
pub const LINES_PER_CARD: u16 = 5;

/// Render the tree list widget.
///
/// # Arguments
/// * `app` - Application state
/// * `area` - Area to render in
/// * `buf` - Buffer to render to
///
/// # Details
/// Each card spans several lines:
/// - Line 1: Tree name (bold)
/// - Line 2: Price with currency symbol
/// - Line 3: Image reference
/// - Line 4: Detail route ("view more")
///
/// Loading, empty and failed states each get their own placeholder.
pub fn render_list<S: CatalogSource>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let items = match app.store.status() {
        ListStatus::Ready(items) => items,
        ListStatus::Loading => {
            render_placeholder("Loading trees...", Color::Yellow, area, buf);
            return;
        }
        ListStatus::Empty => {
            render_placeholder("No trees match your search", Color::Gray, area, buf);
            return;
        }
        ListStatus::Failed(message) => {
            render_placeholder(message, Color::Red, area, buf);
            return;
        }
    };

    let selected_index = app.selected_index.min(items.len().saturating_sub(1));
    let separator_line = "─".repeat(area.width.saturating_sub(2).max(10) as usize);

    let visible_cards = visible_cards(area);
    let scroll_offset = scroll_offset(selected_index, items.len(), area);

    let cards: Vec<ListItem> = items
        .iter()
        .enumerate()
        .skip(scroll_offset)
        .take(visible_cards)
        .map(|(idx, item)| {
            render_card(
                item,
                idx == selected_index,
                &app.currency_symbol,
                &separator_line,
            )
        })
        .collect();

    let relative_selected = selected_index
        .checked_sub(scroll_offset)
        .filter(|rel| *rel < cards.len());
    let mut list_state = ListState::default();
    list_state.select(relative_selected);

    let title = format!("Trees ({})", items.len());
    let list = List::new(cards)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        );

    StatefulWidget::render(list, area, buf, &mut list_state);
}

/// Number of whole cards that fit inside `area`'s borders.
fn visible_cards(area: Rect) -> usize {
    (area.height.saturating_sub(2) / LINES_PER_CARD).max(1) as usize
}

/// Index of the first card shown, keeping the selection roughly centered.
///
/// # Arguments
/// * `selected_index` - Selected card
/// * `len` - Number of cards
/// * `area` - List area including borders
pub fn scroll_offset(selected_index: usize, len: usize, area: Rect) -> usize {
    let visible = visible_cards(area);
    selected_index
        .saturating_sub(visible / 2)
        .min(len.saturating_sub(visible))
}

/// Build the card for one tree.
fn render_card<'a>(
    item: &'a CatalogItem,
    is_selected: bool,
    currency_symbol: &str,
    separator_line: &str,
) -> ListItem<'a> {
    let name_style = Style::default()
        .fg(if is_selected {
            Color::Yellow
        } else {
            Color::White
        })
        .add_modifier(Modifier::BOLD);

    let name = Line::from(Span::styled(item.name.as_str(), name_style));
    let price = Line::from(Span::styled(
        item.format_price(currency_symbol),
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    ));
    let image = Line::from(Span::styled(
        format!("Image: {}", item.image_url),
        Style::default().fg(Color::Gray),
    ));
    let link = Line::from(Span::styled(
        format!("View more: {}", item.detail_route()),
        Style::default().fg(Color::Cyan),
    ));
    let separator = Line::from(Span::styled(
        separator_line.to_string(),
        Style::default().fg(if is_selected {
            Color::Blue
        } else {
            Color::DarkGray
        }),
    ));

    ListItem::new(vec![name, price, image, link, separator])
}

fn render_placeholder(message: &str, color: Color, area: Rect, buf: &mut Buffer) {
    let paragraph = Paragraph::new(Line::from(Span::styled(
        message.to_string(),
        Style::default().fg(color),
    )))
    .block(Block::default().title("Trees").borders(Borders::ALL));
    Widget::render(paragraph, area, buf);
}
