//! Displayed-list state management.
//!
//! The store is the only owner of the list of trees on screen. Every write is
//! tagged with the ticket of the request that produced it, and only the most
//! recently issued ticket may write.

use crate::catalog::{CatalogItem, FetchError};
use tracing::{debug, info, warn};

/// The two kinds of request that can replace the displayed list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Full catalog listing
    Load,
    /// Filtered search
    Search,
}

impl RequestKind {
    /// Message shown when a request of this kind fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            RequestKind::Load => "Failed to load tree data",
            RequestKind::Search => "Failed to search trees",
        }
    }
}

/// Proof that a request was issued, and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    pub kind: RequestKind,
    pub seq: u64,
}

/// What the list area should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayState {
    /// Nothing has arrived yet
    Loading,
    /// Latest accepted result
    Loaded(Vec<CatalogItem>),
    /// Latest accepted request failed
    Failed(String),
}

/// Borrowed view of the display state with "empty" split out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStatus<'a> {
    Loading,
    Empty,
    Failed(&'a str),
    Ready(&'a [CatalogItem]),
}

/// Single source of truth for the displayed catalog list.
#[derive(Debug)]
pub struct CatalogStore {
    state: DisplayState,
    /// Sequence number of the most recently issued request
    latest_seq: u64,
    /// Whether the latest issued request has not resolved yet
    pending: bool,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore {
    pub fn new() -> Self {
        Self {
            state: DisplayState::Loading,
            latest_seq: 0,
            pending: false,
        }
    }

    /// Issue a ticket for a new request.
    ///
    /// # Details
    /// Every ticket issued earlier, of either kind, becomes stale.
    pub fn begin(&mut self, kind: RequestKind) -> RequestTicket {
        self.latest_seq += 1;
        self.pending = true;
        let ticket = RequestTicket {
            kind,
            seq: self.latest_seq,
        };
        debug!(kind = ?kind, seq = ticket.seq, "Issued request");
        ticket
    }

    /// Whether `ticket` belongs to the most recently issued request.
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.seq == self.latest_seq
    }

    /// Whether the most recently issued request is still in flight.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Replace the displayed list.
    ///
    /// # Arguments
    /// * `ticket` - Ticket of the request that produced `items`
    /// * `items` - New list, taken as-is
    ///
    /// # Returns
    /// * `bool` - True if written, false if the ticket was stale
    pub fn set_displayed_items(&mut self, ticket: RequestTicket, items: Vec<CatalogItem>) -> bool {
        if !self.is_current(ticket) {
            debug!(
                kind = ?ticket.kind,
                seq = ticket.seq,
                latest = self.latest_seq,
                "Dropping stale result"
            );
            return false;
        }
        info!(kind = ?ticket.kind, count = items.len(), "Displaying catalog items");
        self.state = DisplayState::Loaded(items);
        self.pending = false;
        true
    }

    /// Record a failed request.
    ///
    /// # Returns
    /// * `bool` - True if written, false if the ticket was stale
    pub fn set_failed(&mut self, ticket: RequestTicket, error: &FetchError) -> bool {
        if !self.is_current(ticket) {
            debug!(kind = ?ticket.kind, seq = ticket.seq, %error, "Dropping stale failure");
            return false;
        }
        warn!(kind = ?ticket.kind, %error, "Catalog request failed");
        self.state = DisplayState::Failed(ticket.kind.failure_message().to_string());
        self.pending = false;
        true
    }

    /// Apply a completed request.
    ///
    /// # Returns
    /// * `bool` - True if the outcome changed what is displayed
    pub fn apply(
        &mut self,
        ticket: RequestTicket,
        result: Result<Vec<CatalogItem>, FetchError>,
    ) -> bool {
        match result {
            Ok(items) => self.set_displayed_items(ticket, items),
            Err(error) => self.set_failed(ticket, &error),
        }
    }

    /// Current list status, with "loaded but empty" separated from the rest.
    pub fn status(&self) -> ListStatus<'_> {
        match &self.state {
            DisplayState::Loading => ListStatus::Loading,
            DisplayState::Failed(message) => ListStatus::Failed(message),
            DisplayState::Loaded(items) if items.is_empty() => ListStatus::Empty,
            DisplayState::Loaded(items) => ListStatus::Ready(items),
        }
    }

    /// Currently displayed items (empty unless loaded).
    pub fn items(&self) -> &[CatalogItem] {
        match &self.state {
            DisplayState::Loaded(items) => items,
            _ => &[],
        }
    }
}
