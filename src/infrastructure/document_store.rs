//! Document-store client (source A)
//!
//! Reads the product database through its cursor-paginated query endpoint,
//! normalizes the property bags into canonical records, renders page content
//! as plain text for description comparison, and writes storefront
//! identifiers back onto the source records to establish links.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::product::{CanonicalProduct, ProductStatus};
use crate::domain::services::catalog_services::DocumentCatalog;
use crate::infrastructure::config::{DocumentStoreConfig, SyncTuningConfig};
use crate::infrastructure::http_client::{HttpClient, HttpClientConfig, HttpError};
use crate::infrastructure::sync_error::SyncError;

/// Property names of the product database schema.
mod properties {
    pub const TITLE: &str = "Title";
    pub const PRICE: &str = "Price";
    pub const INVENTORY: &str = "Inventory";
    pub const SKU: &str = "SKU";
    pub const IMAGE_URL: &str = "Image URL";
    pub const EXTERNAL_ID: &str = "External ID";
    pub const STATUS: &str = "Status";
    pub const CATEGORY: &str = "Category";
    pub const TAGS: &str = "Tags";
    pub const VENDOR: &str = "Vendor";
    pub const SHIPPING_WEIGHT: &str = "Shipping Weight";
}

const CATALOG: &str = "document store";

/// Block types whose rich text contributes to the rendered description.
/// Images and other embeds carry no text.
const TEXT_BLOCK_TYPES: [&str; 8] = [
    "paragraph",
    "heading_1",
    "heading_2",
    "heading_3",
    "bulleted_list_item",
    "numbered_list_item",
    "quote",
    "code",
];

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<DocumentPage>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DocumentPage {
    id: String,
    #[serde(default)]
    properties: HashMap<String, PropertyValue>,
}

/// One property slot. The schema stores each value under a type-specific
/// key; absent keys simply deserialize to `None`.
#[derive(Debug, Default, Deserialize)]
struct PropertyValue {
    #[serde(default)]
    title: Option<Vec<RichTextFragment>>,
    #[serde(default)]
    rich_text: Option<Vec<RichTextFragment>>,
    #[serde(default)]
    number: Option<f64>,
    #[serde(default)]
    select: Option<SelectValue>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RichTextFragment {
    #[serde(default)]
    plain_text: String,
}

#[derive(Debug, Deserialize)]
struct SelectValue {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct BlockListResponse {
    #[serde(default)]
    results: Vec<Block>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Block {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(flatten)]
    content: HashMap<String, serde_json::Value>,
}

/// HTTP client for the document database.
pub struct DocumentStoreClient {
    http: HttpClient,
    api_base: String,
    database_id: String,
    max_pages: u32,
}

impl DocumentStoreClient {
    pub fn new(
        config: &DocumentStoreConfig,
        tuning: &SyncTuningConfig,
        api_key: &str,
    ) -> anyhow::Result<Self> {
        use anyhow::Context;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}")).context("Invalid API key")?,
        );

        let http_config = HttpClientConfig {
            timeout_seconds: tuning.request_timeout_seconds,
            max_requests_per_second: tuning.max_requests_per_second,
            ..HttpClientConfig::default()
        };

        Ok(Self {
            http: HttpClient::new(&http_config, headers)?,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            database_id: config.database_id.clone(),
            max_pages: tuning.max_catalog_pages,
        })
    }

    fn classify(&self, operation: &'static str, id: &str, error: HttpError) -> SyncError {
        if error.is_rate_limited() {
            SyncError::RateLimited {
                catalog: CATALOG,
                retry_after_seconds: error.retry_after_seconds(),
            }
        } else if error.is_not_found() {
            SyncError::TargetMissing { id: id.to_string() }
        } else {
            SyncError::write(operation, error.to_string())
        }
    }

    fn normalize(&self, page: DocumentPage) -> CanonicalProduct {
        let props = &page.properties;

        // The link field is the one place where absence is meaningful:
        // an empty value stays None instead of collapsing to "".
        let external_id = match text_property(props, properties::EXTERNAL_ID) {
            value if value.is_empty() => None,
            value => Some(value),
        };

        CanonicalProduct {
            source_id: page.id,
            external_id,
            title: text_property(props, properties::TITLE),
            price: number_property(props, properties::PRICE),
            inventory: number_property(props, properties::INVENTORY) as i64,
            sku: text_property(props, properties::SKU),
            status: props
                .get(properties::STATUS)
                .and_then(|value| value.select.as_ref())
                .map(|select| ProductStatus::from_document_str(&select.name))
                .unwrap_or_default(),
            category: text_property(props, properties::CATEGORY),
            vendor: text_property(props, properties::VENDOR),
            tags: text_property(props, properties::TAGS),
            image_url: props
                .get(properties::IMAGE_URL)
                .and_then(|value| value.url.clone())
                .unwrap_or_default(),
            shipping_weight: number_property(props, properties::SHIPPING_WEIGHT),
            description: String::new(),
        }
    }
}

#[async_trait]
impl DocumentCatalog for DocumentStoreClient {
    async fn read_all(&self) -> Result<Vec<CanonicalProduct>, SyncError> {
        info!("📖 Reading products from the document store...");

        let url = format!("{}/databases/{}/query", self.api_base, self.database_id);
        let mut products = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page_count = 0u32;

        loop {
            page_count += 1;
            if page_count > self.max_pages {
                return Err(SyncError::fetch(
                    CATALOG,
                    format!("pagination exceeded the {}-page cap", self.max_pages),
                ));
            }

            let mut body = serde_json::Map::new();
            if let Some(cursor) = &cursor {
                body.insert("start_cursor".to_string(), serde_json::Value::String(cursor.clone()));
            }

            let response: QueryResponse = self
                .http
                .post_json(&url, &serde_json::Value::Object(body))
                .await
                .map_err(|error| SyncError::fetch(CATALOG, error.to_string()))?;

            debug!("📄 Page {}: {} records", page_count, response.results.len());
            products.extend(response.results.into_iter().map(|page| self.normalize(page)));

            if !response.has_more {
                break;
            }
            cursor = response.next_cursor;
        }

        info!("✅ Found {} total products in the document store", products.len());
        Ok(products)
    }

    async fn render_content(&self, document_id: &str) -> Result<String, SyncError> {
        debug!("📄 Rendering content for: {}", document_id);

        let mut lines: Vec<String> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page_count = 0u32;

        loop {
            page_count += 1;
            if page_count > self.max_pages {
                return Err(SyncError::write(
                    "content render",
                    format!("block pagination exceeded the {}-page cap", self.max_pages),
                ));
            }

            let url = match &cursor {
                Some(cursor) => format!(
                    "{}/blocks/{}/children?start_cursor={}",
                    self.api_base, document_id, cursor
                ),
                None => format!("{}/blocks/{}/children", self.api_base, document_id),
            };

            let response: BlockListResponse = self
                .http
                .get_json(&url)
                .await
                .map_err(|error| self.classify("content render", document_id, error))?;

            lines.extend(response.results.iter().filter_map(render_block));

            if !response.has_more {
                break;
            }
            cursor = response.next_cursor;
        }

        Ok(lines.join("\n").trim().to_string())
    }

    async fn write_link(&self, source_id: &str, external_id: &str) -> Result<(), SyncError> {
        debug!("🔗 Linking '{}' to storefront record '{}'", source_id, external_id);

        let url = format!("{}/pages/{}", self.api_base, source_id);
        let body = serde_json::json!({
            "properties": {
                properties::EXTERNAL_ID: {
                    "rich_text": [{ "text": { "content": external_id } }]
                }
            }
        });

        self.http
            .patch_json(&url, &body)
            .await
            .map_err(|error| self.classify("link write-back", source_id, error))
    }
}

fn text_property(props: &HashMap<String, PropertyValue>, name: &str) -> String {
    let Some(value) = props.get(name) else {
        return String::new();
    };
    let fragments = value.title.as_deref().or(value.rich_text.as_deref());
    fragments
        .map(|fragments| {
            fragments
                .iter()
                .map(|fragment| fragment.plain_text.as_str())
                .collect()
        })
        .unwrap_or_default()
}

fn number_property(props: &HashMap<String, PropertyValue>, name: &str) -> f64 {
    props
        .get(name)
        .and_then(|value| value.number)
        .unwrap_or_default()
}

fn render_block(block: &Block) -> Option<String> {
    if !TEXT_BLOCK_TYPES.contains(&block.block_type.as_str()) {
        return None;
    }
    let fragments = block
        .content
        .get(&block.block_type)?
        .get("rich_text")?
        .as_array()?;
    let text: String = fragments
        .iter()
        .filter_map(|fragment| fragment.get("plain_text").and_then(|value| value.as_str()))
        .collect();
    if text.is_empty() { None } else { Some(text) }
}
