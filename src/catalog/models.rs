//! Catalog API models and data structures.
//!
//! Contains the sponsorable tree record, the news article record, and the raw
//! API shapes they are decoded from.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

/// Represents one sponsorable tree in the catalog.
///
/// Instances are immutable once decoded and replaced wholesale on every fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    /// Opaque backend identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Image asset reference
    pub image_url: String,
    /// Sponsorship price
    pub price: Decimal,
}

impl CatalogItem {
    /// Create a new CatalogItem instance.
    ///
    /// # Arguments
    /// * `id` - Backend identifier
    /// * `name` - Display name
    /// * `image_url` - Image asset reference
    /// * `price` - Sponsorship price
    ///
    /// # Returns
    /// * `CatalogItem` - New item
    pub fn new(id: String, name: String, image_url: String, price: Decimal) -> Self {
        Self {
            id,
            name,
            image_url,
            price,
        }
    }

    /// Format price with a currency prefix and exactly two decimals.
    ///
    /// # Arguments
    /// * `currency_symbol` - Symbol placed before the amount (e.g. "€")
    ///
    /// # Returns
    /// * `String` - Formatted price (e.g. "€12.50")
    pub fn format_price(&self, currency_symbol: &str) -> String {
        let mut amount = self.price.round_dp(2);
        amount.rescale(2);
        format!("{}{}", currency_symbol, amount)
    }

    /// Detail route for this item.
    pub fn detail_route(&self) -> String {
        format!("/trees/{}", self.id)
    }
}

/// Catalog item as returned by `/catalog` and `/catalog/search`.
#[derive(Debug, Deserialize)]
pub struct ApiCatalogItem {
    /// Item ID (`_id` on the Mongo-backed site)
    #[serde(alias = "_id")]
    pub id: String,
    /// Item name
    pub name: String,
    /// Image reference
    #[serde(rename = "imageUrl", alias = "image", default)]
    pub image_url: String,
    /// Price in any of the accepted wire shapes
    pub price: ApiPrice,
}

/// Price field as it arrives on the wire.
///
/// Numbers are kept in their textual form so they never pass through `f64`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ApiPrice {
    /// `{"$numberDecimal": "12.50"}`
    Extended {
        #[serde(rename = "$numberDecimal")]
        number_decimal: String,
    },
    /// `"12.50"`
    Text(String),
    /// `12.5`, kept as written (serde_json `arbitrary_precision`)
    Number(serde_json::Number),
}

impl ApiPrice {
    /// Parse the wire value into a decimal.
    ///
    /// # Returns
    /// * `Result<Decimal>` - Parsed price or error
    pub fn to_decimal(&self) -> anyhow::Result<Decimal> {
        let text = match self {
            ApiPrice::Extended { number_decimal } => number_decimal.clone(),
            ApiPrice::Text(text) => text.clone(),
            ApiPrice::Number(number) => number.to_string(),
        };
        Decimal::from_str(text.trim())
            .or_else(|_| Decimal::from_scientific(text.trim()))
            .map_err(|e| anyhow::anyhow!("Invalid price {:?}: {}", text, e))
    }
}

impl TryFrom<ApiCatalogItem> for CatalogItem {
    type Error = anyhow::Error;

    /// Convert API catalog item to CatalogItem.
    ///
    /// # Details
    /// Fails when the price is not a decimal value.
    fn try_from(item: ApiCatalogItem) -> Result<Self, Self::Error> {
        let price = item.price.to_decimal()?;
        Ok(CatalogItem::new(item.id, item.name, item.image_url, price))
    }
}

/// News article shown on the article page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// Article title
    pub title: String,
    /// Header image reference
    pub image_url: String,
    /// Server-supplied HTML body (unsanitized)
    pub content: String,
    /// Creation date
    pub date_created: Option<DateTime<Utc>>,
    /// Article author, absent on some records
    pub writer: Option<Writer>,
}

impl Article {
    /// Format creation date like a browser's `Date.toDateString()`.
    ///
    /// # Returns
    /// * `String` - Formatted date (e.g. "Mon Jan 15 2024"), empty when unknown
    pub fn format_date(&self) -> String {
        self.date_created
            .map(|d| d.format("%a %b %d %Y").to_string())
            .unwrap_or_default()
    }
}

/// Article author.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Writer {
    #[serde(rename = "firstName", default)]
    pub first_name: String,
    #[serde(rename = "lastName", default)]
    pub last_name: String,
}

impl Writer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Article as returned by `/api/newsArticle/<id>`.
#[derive(Debug, Deserialize)]
pub struct ApiArticle {
    pub title: String,
    #[serde(rename = "imageUrl", default)]
    pub image_url: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "dateCreated", default)]
    pub date_created: Option<String>,
    #[serde(default)]
    pub writer: Option<Writer>,
}

impl From<ApiArticle> for Article {
    fn from(item: ApiArticle) -> Self {
        // Unparseable dates render as blank rather than rejecting the article
        let date_created = item
            .date_created
            .and_then(|d| DateTime::parse_from_rfc3339(&d).ok())
            .map(|d| d.with_timezone(&Utc));

        Article {
            title: item.title,
            image_url: item.image_url,
            content: item.content,
            date_created,
            writer: item.writer,
        }
    }
}
