//! Tree sponsorship TUI - browse and search the sponsorable tree catalog.
//!
//! Main entry point and event loop for the application.

mod app;
mod article;
mod browser;
mod catalog;
mod config;
mod requests;
mod session;
mod store;
mod ui;

use anyhow::Context;
use app::{App, UiMode};
use article::ArticleView;
use browser::open_in_browser;
use catalog::{Article, CatalogClient, FetchError};
use clap::Parser;
use config::Config;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::Line,
    widgets::{Block, Borders, Paragraph},
};
use requests::RequestRunner;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

type ArticleReceiver = oneshot::Receiver<Result<Option<Article>, FetchError>>;

/// Browse and search the tree sponsorship catalog from the terminal.
#[derive(Parser)]
#[command(name = "sponsor-tui", version, about)]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/sponsor-tui/config.jsonc)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Open a news article by ID instead of starting on the catalog
    #[arg(long)]
    article: Option<String>,

    /// Write a config file with default settings and exit
    #[arg(long)]
    init_config: bool,
}

/// Main application entry point.
///
/// # Returns
/// * `Result<()>` - Success or error
///
/// # Details
/// Loads configuration, starts logging, issues the initial catalog load, and
/// runs the event loop until the user quits.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.init_config {
        let path = match cli.config {
            Some(path) => path,
            None => Config::default_config_path()?,
        };
        Config::default().save(Some(&path))?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref())?;
    init_logging(&config)?;
    info!(base_url = %config.base_url, user = ?config.session.current_user(), "Starting");

    let client = CatalogClient::new(&config)?;
    let runner = RequestRunner::new(Arc::new(client.clone()), config.search_debounce());
    let mut app = App::new(runner, config.currency_symbol.clone(), config.session.clone());

    app.initialize();

    let article_rx = cli.article.map(|id| {
        app.open_article();
        let (tx, rx) = oneshot::channel();
        let client = client.clone();
        tokio::spawn(async move {
            let _ = tx.send(client.fetch_article(&id).await);
        });
        rx
    });

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &config, article_rx).await;

    // Restore terminal
    app.runner.shutdown();
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        error!(error = %e, "Exited with error");
    }
    result
}

/// Send `tracing` output to the log file.
///
/// # Details
/// The terminal belongs to the UI, so nothing is logged to stdout or stderr.
/// Verbosity follows `RUST_LOG`, defaulting to `sponsor_tui=info`.
fn init_logging(config: &Config) -> anyhow::Result<()> {
    let log_path = config.log_file_path()?;
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sponsor_tui=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

/// Screen regions for one frame.
struct Regions {
    header: Rect,
    search: Rect,
    toggle: Rect,
    body: Rect,
    status: Rect,
}

fn layout(area: Rect) -> Regions {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Search bar + options toggle
            Constraint::Min(0),    // Tree list / article
            Constraint::Length(3), // Status bar
        ])
        .split(area);
    let search_row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(14)])
        .split(rows[1]);

    Regions {
        header: rows[0],
        search: search_row[0],
        toggle: search_row[1],
        body: rows[2],
        status: rows[3],
    }
}

/// Render the complete UI.
///
/// # Arguments
/// * `f` - Frame to render to
/// * `app` - Application state
///
/// # Returns
/// * `Rect` - Area of the tree list, for mouse hit testing
fn render_ui(f: &mut Frame, app: &App<CatalogClient>) -> Rect {
    let regions = layout(f.area());
    let buf = f.buffer_mut();

    ui::render_header(app, regions.header, buf);

    if let (UiMode::Article, Some(view)) = (app.mode, app.article.as_ref()) {
        let body = Rect {
            y: regions.search.y,
            height: regions.search.height + regions.body.height,
            ..regions.body
        };
        ui::render_article(view, body, buf);
    } else {
        ui::render_search(app, regions.search, buf);
        ui::render_sort_toggle(app, regions.toggle, buf);
        ui::render_list(app, regions.body, buf);
        ui::render_sort_menu(app, regions.body, buf);
    }

    let status_text = app.status_message.as_deref().unwrap_or(
        "'q' quit, '/' search, 'c' clear search, 'o' options, 'r' reload, Enter view more",
    );
    let status = Paragraph::new(Line::from(status_text))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(status, regions.status);

    regions.body
}

/// Main event loop.
///
/// # Arguments
/// * `terminal` - Terminal instance
/// * `app` - Application state
/// * `config` - Configuration
/// * `article_rx` - Pending article fetch, if one was requested
///
/// # Returns
/// * `Result<()>` - Success or error
///
/// # Details
/// Applies finished fetches, redraws, then handles keyboard and mouse events.
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<CatalogClient>,
    config: &Config,
    mut article_rx: Option<ArticleReceiver>,
) -> anyhow::Result<()> {
    let mut list_area = Rect::default();

    loop {
        app.drain_outcomes();
        poll_article(app, &mut article_rx);

        terminal.draw(|f| {
            list_area = render_ui(f, app);
        })?;

        // Short poll keeps fetch results flowing onto the screen
        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) => {
                if key.kind == KeyEventKind::Press && handle_key(key, app, config) {
                    break;
                }
            }
            Event::Mouse(mouse) => handle_mouse_event(mouse, app, config, list_area),
            _ => {}
        }
    }

    Ok(())
}

/// Move a finished article fetch into the article page.
fn poll_article(app: &mut App<CatalogClient>, article_rx: &mut Option<ArticleReceiver>) {
    let Some(rx) = article_rx.as_mut() else {
        return;
    };
    let view = match rx.try_recv() {
        Ok(result) => ArticleView::from_result(result),
        Err(oneshot::error::TryRecvError::Empty) => return,
        Err(oneshot::error::TryRecvError::Closed) => {
            ArticleView::Failed("Error fetching article".to_string())
        }
    };
    *article_rx = None;
    // The reader may already have gone back to the catalog
    if app.mode == UiMode::Article {
        app.article = Some(view);
    }
}

/// Handle one key press.
///
/// # Returns
/// * `bool` - True if the application should quit
fn handle_key(key: KeyEvent, app: &mut App<CatalogClient>, config: &Config) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    match app.mode {
        UiMode::List => match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return true,
            KeyCode::Up | KeyCode::Char('k') => app.move_up(),
            KeyCode::Down | KeyCode::Char('j') => app.move_down(),
            KeyCode::Enter => open_selected(app, config),
            KeyCode::Char('/') => app.mode = UiMode::Search,
            KeyCode::Char('c') => app.clear_search(),
            KeyCode::Char('o') => app.toggle_sort_menu(),
            KeyCode::Char('r') => {
                app.set_status("Reloading trees...".to_string());
                app.initialize();
            }
            _ => {}
        },
        UiMode::Search => match key.code {
            KeyCode::Enter | KeyCode::Esc => app.mode = UiMode::List,
            KeyCode::Backspace => app.remove_search_char(),
            KeyCode::Char(c) => app.add_search_char(c),
            _ => {}
        },
        UiMode::SortMenu => match key.code {
            KeyCode::Up | KeyCode::Char('k') => app.move_sort_highlight(false),
            KeyCode::Down | KeyCode::Char('j') => app.move_sort_highlight(true),
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('o') => app.toggle_sort_menu(),
            _ => {}
        },
        UiMode::Article => match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => return true,
            KeyCode::Esc | KeyCode::Backspace => app.close_article(),
            _ => {}
        },
    }
    false
}

/// Open the selected tree's detail page in the browser.
fn open_selected(app: &mut App<CatalogClient>, config: &Config) {
    let Some(item) = app.selected_item() else {
        return;
    };
    let url = config.site_link(&item.detail_route());
    let name = item.name.clone();
    match open_in_browser(&url) {
        Ok(()) => app.set_status(format!("Opened: {}", name)),
        Err(e) => {
            error!(error = %e, "Failed to open detail page");
            app.set_status(format!("Failed to open detail page: {}", e));
        }
    }
}

/// Handle mouse events (scroll and click).
///
/// # Arguments
/// * `mouse` - Mouse event
/// * `app` - Application state
/// * `config` - Configuration
/// * `list_area` - Area of the tree list widget
///
/// # Details
/// Scrolling moves the selection; a left click selects the card under the
/// pointer and opens its detail page.
fn handle_mouse_event(
    mouse: MouseEvent,
    app: &mut App<CatalogClient>,
    config: &Config,
    list_area: Rect,
) {
    if app.mode != UiMode::List {
        return;
    }
    match mouse.kind {
        MouseEventKind::ScrollUp => app.move_up(),
        MouseEventKind::ScrollDown => app.move_down(),
        MouseEventKind::Down(MouseButton::Left) => {
            // Skip the top border row
            if mouse.column < list_area.x
                || mouse.column >= list_area.right()
                || mouse.row <= list_area.y
                || mouse.row >= list_area.bottom()
            {
                return;
            }
            let len = app.store.items().len();
            let first = ui::scroll_offset(app.selected_index, len, list_area);
            let card = first + ((mouse.row - list_area.y - 1) / ui::LINES_PER_CARD) as usize;
            if card < len {
                app.selected_index = card;
                open_selected(app, config);
            }
        }
        _ => {}
    }
}
