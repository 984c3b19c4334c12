//! UI components module.
//!
//! Contains ratatui widgets for displaying the application interface.

pub mod article;
pub mod header;
pub mod list;
pub mod search;
pub mod sort_menu;

pub use article::render_article;
pub use header::render_header;
pub use list::{LINES_PER_CARD, render_list, scroll_offset};
pub use search::render_search;
pub use sort_menu::{render_sort_menu, render_sort_toggle};
