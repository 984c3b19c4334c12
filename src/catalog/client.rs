//! Catalog backend client implementation.
//!
//! Handles the full-catalog listing, catalog search, and news article fetches.

use crate::catalog::CatalogSource;
use crate::catalog::error::FetchError;
use crate::catalog::models::{ApiArticle, ApiCatalogItem, Article, CatalogItem};
use crate::config::Config;
use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use std::time::Duration;
use tracing::{debug, warn};

/// Path segments of the full-catalog listing.
const CATALOG_PATH: &[&str] = &["catalog"];
/// Path segments of the catalog search endpoint.
const SEARCH_PATH: &[&str] = &["catalog", "search"];
/// Path segments under which news articles live.
const ARTICLE_PATH: &[&str] = &["api", "newsArticle"];

/// Catalog backend HTTP client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    /// HTTP client for API requests
    client: Client,
    /// Backend base URL
    base_url: Url,
    /// Session bearer token (if logged in)
    token: Option<String>,
}

impl CatalogClient {
    /// Create a new catalog client from configuration.
    ///
    /// # Arguments
    /// * `config` - Application configuration
    ///
    /// # Returns
    /// * `Result<CatalogClient>` - New client or error
    ///
    /// # Details
    /// Requires a base URL. The session token is optional and, when present,
    /// is sent as a bearer token on every request.
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = config.base_url.trim();
        if base_url.is_empty() {
            return Err(anyhow::anyhow!(
                "Backend base URL is required. Please set base_url in config.jsonc"
            ));
        }
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid backend base URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow::anyhow!(
                "Backend base URL must be hierarchical: {}",
                base_url
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url,
            token: config.session.token.clone(),
        })
    }

    /// Backend URL for `segments`, each percent-encoded as one path segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in new(): the base URL is hierarchical
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Build a GET request for a backend path.
    fn get(&self, segments: &[&str]) -> RequestBuilder {
        let request = self.client.get(self.endpoint(segments));
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Fetch the full catalog.
    ///
    /// # Returns
    /// * `Result<Vec<CatalogItem>, FetchError>` - All catalog items or error
    pub async fn fetch_catalog(&self) -> Result<Vec<CatalogItem>, FetchError> {
        self.fetch_items(self.get(CATALOG_PATH)).await
    }

    /// Search the catalog.
    ///
    /// # Arguments
    /// * `query` - Free-text query, sent as-is (empty is allowed)
    ///
    /// # Returns
    /// * `Result<Vec<CatalogItem>, FetchError>` - Matching items or error
    pub async fn search_catalog(&self, query: &str) -> Result<Vec<CatalogItem>, FetchError> {
        self.fetch_items(self.get(SEARCH_PATH).query(&[("q", query)]))
            .await
    }

    /// Send a catalog request and decode the item list.
    ///
    /// # Details
    /// Items whose price cannot be parsed are skipped and logged; the rest of
    /// the response is kept.
    async fn fetch_items(&self, request: RequestBuilder) -> Result<Vec<CatalogItem>, FetchError> {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %error_text, "Catalog backend error");
            return Err(FetchError::Status(status.as_u16()));
        }

        let api_items: Vec<ApiCatalogItem> = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        let mut items = Vec::with_capacity(api_items.len());
        for api_item in api_items {
            let id = api_item.id.clone();
            match CatalogItem::try_from(api_item) {
                Ok(item) => items.push(item),
                Err(e) => warn!(id = %id, error = %e, "Skipping catalog item"),
            }
        }

        debug!(count = items.len(), "Decoded catalog items");
        Ok(items)
    }

    /// Fetch one news article.
    ///
    /// # Arguments
    /// * `id` - Article ID
    ///
    /// # Returns
    /// * `Result<Option<Article>, FetchError>` - Article, `None` when the
    ///   backend has no such article, or error
    ///
    /// # Details
    /// The ID is sent as a single path segment. IDs that can't name one
    /// (empty, `.` or `..`) have no article.
    pub async fn fetch_article(&self, id: &str) -> Result<Option<Article>, FetchError> {
        if matches!(id, "" | "." | "..") {
            warn!(article = id, "Ignoring article ID that is not a path segment");
            return Ok(None);
        }
        let mut segments = ARTICLE_PATH.to_vec();
        segments.push(id);
        let response = self.get(&segments).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            warn!(status = status.as_u16(), article = id, "Article backend error");
            return Err(FetchError::Status(status.as_u16()));
        }

        let article: Option<ApiArticle> = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        Ok(article.map(Article::from))
    }
}

impl CatalogSource for CatalogClient {
    async fn list_items(&self) -> Result<Vec<CatalogItem>, FetchError> {
        self.fetch_catalog().await
    }

    async fn search_items(&self, query: &str) -> Result<Vec<CatalogItem>, FetchError> {
        self.search_catalog(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::session::Session;
    use axum::extract::{Path, Query};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use std::collections::HashMap;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client_for(base_url: &str) -> CatalogClient {
        let config = Config {
            base_url: base_url.to_string(),
            ..Config::default()
        };
        CatalogClient::new(&config).unwrap()
    }

    #[test]
    fn test_client_new_requires_base_url() {
        let config = Config {
            base_url: "  ".to_string(),
            ..Config::default()
        };
        assert!(CatalogClient::new(&config).is_err());

        let config = Config {
            base_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(CatalogClient::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_fetch_catalog_decodes_items() {
        let router = Router::new().route(
            "/catalog",
            get(|| async {
                Json(json!([
                    {"id": "a1", "name": "Oak", "imageUrl": "/oak.png", "price": "12.50"},
                    {"_id": "b2", "name": "Birch", "image": "/birch.png", "price": {"$numberDecimal": "8"}}
                ]))
            }),
        );
        let base = serve(router).await;

        let items = client_for(&base).fetch_catalog().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].format_price("€"), "€12.50");
        assert_eq!(items[1].id, "b2");
        assert_eq!(items[1].format_price("€"), "€8.00");
    }

    #[tokio::test]
    async fn test_fetch_catalog_skips_unparseable_price() {
        let router = Router::new().route(
            "/catalog",
            get(|| async {
                Json(json!([
                    {"id": "a1", "name": "Oak", "imageUrl": "/oak.png", "price": "free"},
                    {"id": "a2", "name": "Elm", "imageUrl": "/elm.png", "price": "3.10"}
                ]))
            }),
        );
        let base = serve(router).await;

        let items = client_for(&base).fetch_catalog().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Elm");
    }

    #[tokio::test]
    async fn test_search_sends_query_parameter() {
        let router = Router::new().route(
            "/catalog/search",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                let q = params.get("q").cloned().unwrap_or_default();
                Json(json!([{"id": "s1", "name": q, "imageUrl": "", "price": "1"}]))
            }),
        );
        let base = serve(router).await;

        let items = client_for(&base).search_catalog("oak tree").await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "oak tree");
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let router = Router::new().route(
            "/catalog",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = serve(router).await;

        let err = client_for(&base).fetch_catalog().await.unwrap_err();
        assert!(matches!(err, FetchError::Status(500)));
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let router = Router::new().route("/catalog", get(|| async { "not json" }));
        let base = serve(router).await;

        let err = client_for(&base).fetch_catalog().await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(&format!("http://{}", addr))
            .fetch_catalog()
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }

    #[tokio::test]
    async fn test_session_token_sent_as_bearer() {
        let router = Router::new().route(
            "/catalog",
            get(|headers: HeaderMap| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("")
                    .to_string();
                Json(json!([{"id": "1", "name": auth, "imageUrl": "", "price": "1"}]))
            }),
        );
        let base = serve(router).await;

        let config = Config {
            base_url: base,
            session: Session {
                user: Some("ada".to_string()),
                token: Some("secret".to_string()),
            },
            ..Config::default()
        };
        let items = CatalogClient::new(&config).unwrap().fetch_catalog().await.unwrap();
        assert_eq!(items[0].name, "Bearer secret");
    }

    #[tokio::test]
    async fn test_fetch_article_found_missing_and_null() {
        let router = Router::new()
            .route(
                "/api/newsArticle/n1",
                get(|| async {
                    Json(json!({
                        "title": "Planting day",
                        "imageUrl": "/news.png",
                        "content": "<p>Hi</p>",
                        "dateCreated": "2024-01-15T10:00:00Z",
                        "writer": {"firstName": "Ada", "lastName": "Lovelace"}
                    }))
                }),
            )
            .route("/api/newsArticle/empty", get(|| async { Json(Value::Null) }));
        let base = serve(router).await;
        let client = client_for(&base);

        let article = client.fetch_article("n1").await.unwrap().unwrap();
        assert_eq!(article.title, "Planting day");
        assert!(client.fetch_article("missing").await.unwrap().is_none());
        assert!(client.fetch_article("empty").await.unwrap().is_none());
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = client_for("http://trees.local:5000/backend/");
        assert_eq!(
            client.endpoint(SEARCH_PATH).as_str(),
            "http://trees.local:5000/backend/catalog/search"
        );
    }

    #[tokio::test]
    async fn test_article_id_stays_one_path_segment() {
        let router = Router::new()
            .route(
                "/api/newsArticle/{id}",
                get(|Path(id): Path<String>| async move {
                    Json(json!({"title": id, "imageUrl": "", "content": ""}))
                }),
            )
            .route("/catalog", get(|| async { Json(json!([])) }));
        let base = serve(router).await;
        let client = client_for(&base);

        let article = client.fetch_article("../catalog").await.unwrap().unwrap();
        assert_eq!(article.title, "../catalog");
        assert!(client.fetch_article("..").await.unwrap().is_none());
    }
}
