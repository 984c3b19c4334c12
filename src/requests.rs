//! Background request execution.
//!
//! Each fetch runs as its own tokio task and reports back over a channel; the
//! event loop applies outcomes to the store, so state is never touched from a
//! task.

use crate::catalog::{CatalogItem, CatalogSource, FetchError};
use crate::store::{RequestKind, RequestTicket};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::debug;

/// A finished request, waiting to be applied.
#[derive(Debug)]
pub struct FetchOutcome {
    pub ticket: RequestTicket,
    pub result: Result<Vec<CatalogItem>, FetchError>,
}

/// Spawns catalog fetches and collects their outcomes.
///
/// Keeps one task handle per request kind. Spawning a request aborts the
/// in-flight task of the same kind; load and search never cancel each other.
pub struct RequestRunner<S: CatalogSource> {
    source: Arc<S>,
    tx: UnboundedSender<FetchOutcome>,
    rx: UnboundedReceiver<FetchOutcome>,
    in_flight: HashMap<RequestKind, JoinHandle<()>>,
    /// Delay before a search is sent; zero sends on every keystroke
    search_debounce: Duration,
}

impl<S: CatalogSource> RequestRunner<S> {
    /// Create a runner fetching from `source`.
    ///
    /// # Arguments
    /// * `source` - Catalog backend
    /// * `search_debounce` - Delay applied before each search request
    pub fn new(source: Arc<S>, search_debounce: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            source,
            tx,
            rx,
            in_flight: HashMap::new(),
            search_debounce,
        }
    }

    /// Start a full-catalog fetch.
    pub fn spawn_load(&mut self, ticket: RequestTicket) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            let result = source.list_items().await;
            // Receiver only goes away on shutdown
            let _ = tx.send(FetchOutcome { ticket, result });
        });
        self.track(RequestKind::Load, handle);
    }

    /// Start a catalog search.
    ///
    /// # Arguments
    /// * `ticket` - Ticket issued for this search
    /// * `query` - Query text, sent as-is
    pub fn spawn_search(&mut self, ticket: RequestTicket, query: String) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let debounce = self.search_debounce;
        let handle = tokio::spawn(async move {
            if !debounce.is_zero() {
                tokio::time::sleep(debounce).await;
            }
            let result = source.search_items(&query).await;
            let _ = tx.send(FetchOutcome { ticket, result });
        });
        self.track(RequestKind::Search, handle);
    }

    /// Remember `handle` as the in-flight task of `kind`, aborting its predecessor.
    fn track(&mut self, kind: RequestKind, handle: JoinHandle<()>) {
        if let Some(previous) = self.in_flight.insert(kind, handle)
            && !previous.is_finished()
        {
            debug!(kind = ?kind, "Aborting superseded request");
            previous.abort();
        }
    }

    /// Take a finished outcome without waiting.
    pub fn try_next(&mut self) -> Option<FetchOutcome> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next finished outcome.
    #[cfg(test)]
    pub async fn next(&mut self) -> Option<FetchOutcome> {
        self.rx.recv().await
    }

    /// Abort every in-flight request.
    pub fn shutdown(&mut self) {
        for (_, handle) in self.in_flight.drain() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::{FakeCatalog, item};
    use crate::store::CatalogStore;

    #[tokio::test]
    async fn test_load_outcome_is_delivered() {
        let fake = Arc::new(FakeCatalog::with_catalog(vec![item("a1", "Oak", "12.50")]));
        let mut runner = RequestRunner::new(Arc::clone(&fake), Duration::ZERO);
        let mut store = CatalogStore::new();

        let ticket = store.begin(RequestKind::Load);
        runner.spawn_load(ticket);

        let outcome = runner.next().await.unwrap();
        assert_eq!(outcome.ticket, ticket);
        assert_eq!(outcome.result.unwrap().len(), 1);
        assert_eq!(fake.calls(), 1);
    }

    #[tokio::test]
    async fn test_superseded_search_is_aborted() {
        let fake = Arc::new(
            FakeCatalog::default()
                .search_result("o", Ok(vec![item("1", "Olive", "1")]))
                .search_result("oa", Ok(vec![item("2", "Oak", "2")])),
        );
        let mut runner = RequestRunner::new(Arc::clone(&fake), Duration::from_millis(100));
        let mut store = CatalogStore::new();

        let first = store.begin(RequestKind::Search);
        runner.spawn_search(first, "o".to_string());
        let second = store.begin(RequestKind::Search);
        runner.spawn_search(second, "oa".to_string());

        let outcome = runner.next().await.unwrap();
        assert_eq!(outcome.ticket, second);
        assert_eq!(outcome.result.unwrap()[0].name, "Oak");
        assert_eq!(fake.calls(), 1);
        assert!(runner.try_next().is_none());
    }

    #[tokio::test]
    async fn test_search_does_not_cancel_load() {
        let fake = Arc::new(
            FakeCatalog::with_catalog(vec![item("a", "Ash", "1")])
                .search_result("x", Ok(Vec::new())),
        );
        let mut runner = RequestRunner::new(Arc::clone(&fake), Duration::ZERO);
        let mut store = CatalogStore::new();

        let load = store.begin(RequestKind::Load);
        runner.spawn_load(load);
        let search = store.begin(RequestKind::Search);
        runner.spawn_search(search, "x".to_string());

        let mut seen = vec![runner.next().await.unwrap().ticket];
        seen.push(runner.next().await.unwrap().ticket);
        assert!(seen.contains(&load));
        assert!(seen.contains(&search));
    }
}
