//! Storefront client (source B)
//!
//! Reads the commerce catalog through its Link-header-paginated listing
//! endpoint and applies mutations. Price, sku, inventory and weight live on
//! a nested variant sub-resource, so an update may issue two mutations; the
//! pair is logically one update but not transactional, and a failure after
//! the first call is surfaced as a partial write.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::product::{CanonicalProduct, ProductStatus};
use crate::domain::services::catalog_services::{CommerceCatalog, ProductPatch};
use crate::infrastructure::config::{StorefrontConfig, SyncTuningConfig};
use crate::infrastructure::credentials::Credential;
use crate::infrastructure::http_client::{next_page_url, HttpClient, HttpClientConfig, HttpError};
use crate::infrastructure::markup::strip_markup;
use crate::infrastructure::sync_error::SyncError;

const CATALOG: &str = "storefront";
const ACCESS_TOKEN_HEADER: &str = "X-Access-Token";

/// Vendor recorded on created records when the source record has none.
const FALLBACK_VENDOR: &str = "Catalog Sync";

#[derive(Debug, Deserialize)]
struct ProductsResponse {
    #[serde(default)]
    products: Vec<StorefrontProduct>,
}

#[derive(Debug, Deserialize)]
struct ProductResponse {
    product: StorefrontProduct,
}

#[derive(Debug, Deserialize)]
struct StorefrontProduct {
    id: i64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    body_html: Option<String>,
    #[serde(default)]
    product_type: Option<String>,
    #[serde(default)]
    vendor: Option<String>,
    #[serde(default)]
    tags: Option<String>,
    #[serde(default)]
    variants: Vec<StorefrontVariant>,
    #[serde(default)]
    image: Option<StorefrontImage>,
}

#[derive(Debug, Deserialize)]
struct StorefrontVariant {
    id: i64,
    #[serde(default)]
    price: String,
    #[serde(default)]
    sku: Option<String>,
    #[serde(default)]
    inventory_quantity: Option<i64>,
    #[serde(default)]
    weight: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct StorefrontImage {
    #[serde(default)]
    src: String,
}

/// HTTP client for the commerce storefront admin API.
pub struct StorefrontClient {
    http: HttpClient,
    api_base: String,
    page_size: u32,
    max_pages: u32,
}

impl StorefrontClient {
    /// Client for a connected account. The admin API base is derived from
    /// the credential's shop domain.
    pub fn new(
        config: &StorefrontConfig,
        tuning: &SyncTuningConfig,
        credential: &Credential,
    ) -> anyhow::Result<Self> {
        Self::with_api_base(
            config.api_base_for(&credential.shop_domain),
            config,
            tuning,
            &credential.access_token,
        )
    }

    /// Client against an explicit API base (tests, self-hosted installs).
    pub fn with_api_base(
        api_base: String,
        config: &StorefrontConfig,
        tuning: &SyncTuningConfig,
        access_token: &str,
    ) -> anyhow::Result<Self> {
        use anyhow::Context;

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCESS_TOKEN_HEADER,
            HeaderValue::from_str(access_token).context("Invalid access token")?,
        );

        let http_config = HttpClientConfig {
            timeout_seconds: tuning.request_timeout_seconds,
            max_requests_per_second: tuning.max_requests_per_second,
            ..HttpClientConfig::default()
        };

        Ok(Self {
            http: HttpClient::new(&http_config, headers)?,
            api_base: api_base.trim_end_matches('/').to_string(),
            page_size: config.page_size,
            max_pages: tuning.max_catalog_pages,
        })
    }

    fn classify(&self, operation: &'static str, id: &str, error: HttpError) -> SyncError {
        if error.is_unauthorized() {
            SyncError::Unauthenticated { catalog: CATALOG }
        } else if error.is_rate_limited() {
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

    /// Resolve the variant carrying the numeric fields of a product.
    async fn first_variant_id(&self, external_id: &str) -> Result<i64, SyncError> {
        let url = format!("{}/products/{}.json", self.api_base, external_id);
        let response: ProductResponse = self
            .http
            .get_json(&url)
            .await
            .map_err(|error| self.classify("variant lookup", external_id, error))?;

        response
            .product
            .variants
            .first()
            .map(|variant| variant.id)
            .ok_or_else(|| {
                SyncError::write(
                    "variant lookup",
                    format!("storefront record '{external_id}' has no variants"),
                )
            })
    }

    fn variant_payload(patch: &ProductPatch) -> serde_json::Value {
        let mut variant = serde_json::Map::new();
        if let Some(price) = patch.price {
            variant.insert("price".into(), serde_json::Value::String(price.to_string()));
        }
        if let Some(sku) = &patch.sku {
            variant.insert("sku".into(), serde_json::Value::String(sku.clone()));
        }
        if let Some(inventory) = patch.inventory {
            variant.insert("inventory_quantity".into(), serde_json::Value::from(inventory));
        }
        if let Some(weight) = patch.shipping_weight {
            variant.insert("weight".into(), serde_json::Value::from(weight));
        }
        serde_json::json!({ "variant": variant })
    }

    fn product_payload(patch: &ProductPatch) -> serde_json::Value {
        let mut product = serde_json::Map::new();
        if let Some(title) = &patch.title {
            product.insert("title".into(), serde_json::Value::String(title.clone()));
        }
        if let Some(description) = &patch.description {
            product.insert("body_html".into(), serde_json::Value::String(description.clone()));
        }
        if let Some(category) = &patch.category {
            product.insert("product_type".into(), serde_json::Value::String(category.clone()));
        }
        if let Some(vendor) = &patch.vendor {
            product.insert("vendor".into(), serde_json::Value::String(vendor.clone()));
        }
        if let Some(tags) = &patch.tags {
            product.insert("tags".into(), serde_json::Value::String(tags.clone()));
        }
        if let Some(status) = patch.status {
            product.insert(
                "status".into(),
                serde_json::Value::String(status.as_storefront_str().to_string()),
            );
        }
        serde_json::json!({ "product": product })
    }

    fn normalize(&self, product: StorefrontProduct) -> CanonicalProduct {
        let variant = product.variants.first();
        CanonicalProduct {
            source_id: String::new(),
            external_id: Some(product.id.to_string()),
            title: product.title,
            price: variant
                .map(|variant| variant.price.parse().unwrap_or_default())
                .unwrap_or_default(),
            inventory: variant
                .and_then(|variant| variant.inventory_quantity)
                .unwrap_or_default(),
            sku: variant
                .and_then(|variant| variant.sku.clone())
                .unwrap_or_default(),
            status: ProductStatus::from_storefront_str(&product.status),
            category: product.product_type.unwrap_or_default(),
            vendor: product.vendor.unwrap_or_default(),
            tags: product.tags.unwrap_or_default(),
            image_url: product.image.map(|image| image.src).unwrap_or_default(),
            shipping_weight: variant.and_then(|variant| variant.weight).unwrap_or_default(),
            description: strip_markup(&product.body_html.unwrap_or_default()),
        }
    }
}

#[async_trait]
impl CommerceCatalog for StorefrontClient {
    async fn read_all(&self) -> Result<Vec<CanonicalProduct>, SyncError> {
        info!("📦 Fetching all products from the storefront...");

        let mut products = Vec::new();
        let mut page_count = 0u32;
        let mut url = Some(format!(
            "{}/products.json?limit={}&fields=id,title,status,body_html,product_type,vendor,tags,variants,image",
            self.api_base, self.page_size
        ));

        while let Some(page_url) = url {
            page_count += 1;
            if page_count > self.max_pages {
                return Err(SyncError::fetch(
                    CATALOG,
                    format!("pagination exceeded the {}-page cap", self.max_pages),
                ));
            }

            let response = self
                .http
                .get(&page_url)
                .await
                .map_err(|error| SyncError::fetch(CATALOG, error.to_string()))?;

            url = next_page_url(&response);

            let page: ProductsResponse = response
                .json()
                .await
                .map_err(|error| SyncError::fetch(CATALOG, error.to_string()))?;

            debug!("📄 Page {}: {} products", page_count, page.products.len());
            products.extend(page.products.into_iter().map(|product| self.normalize(product)));
        }

        info!("✅ Found {} total products in the storefront", products.len());
        Ok(products)
    }

    async fn create(
        &self,
        product: &CanonicalProduct,
        description: &str,
    ) -> Result<String, SyncError> {
        debug!("🆕 Creating storefront product: {}", product.title);

        let vendor = if product.vendor.is_empty() {
            FALLBACK_VENDOR
        } else {
            product.vendor.as_str()
        };

        let mut payload = serde_json::json!({
            "product": {
                "title": product.title,
                "body_html": description,
                "vendor": vendor,
                "product_type": product.category,
                "tags": product.tags,
                "status": product.status.as_storefront_str(),
                "variants": [{
                    "price": product.price.to_string(),
                    "sku": product.sku,
                    "inventory_quantity": product.inventory,
                    "weight": product.shipping_weight,
                }],
            }
        });
        if !product.image_url.is_empty() {
            payload["product"]["images"] = serde_json::json!([{ "src": product.image_url }]);
        }

        let url = format!("{}/products.json", self.api_base);
        let response: ProductResponse = self
            .http
            .post_json(&url, &payload)
            .await
            .map_err(|error| self.classify("product create", &product.source_id, error))?;

        Ok(response.product.id.to_string())
    }

    async fn update(&self, external_id: &str, patch: &ProductPatch) -> Result<(), SyncError> {
        debug!("📝 Updating storefront product: {}", external_id);

        let mut variant_applied = false;

        if patch.touches_variant() {
            let variant_id = self.first_variant_id(external_id).await?;
            let url = format!("{}/variants/{}.json", self.api_base, variant_id);
            self.http
                .put_json(&url, &Self::variant_payload(patch))
                .await
                .map_err(|error| self.classify("variant update", external_id, error))?;
            variant_applied = true;
        }

        if patch.touches_product() {
            let url = format!("{}/products/{}.json", self.api_base, external_id);
            let result = self.http.put_json(&url, &Self::product_payload(patch)).await;

            if let Err(error) = result {
                // The variant mutation already landed: report the pair as a
                // partially applied update, not a plain write failure.
                if variant_applied {
                    return Err(SyncError::PartialWrite {
                        external_id: external_id.to_string(),
                        applied: "variant update",
                        failed: "product update",
                        message: error.to_string(),
                    });
                }
                return Err(self.classify("product update", external_id, error));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> StorefrontClient {
        StorefrontClient::with_api_base(
            "http://localhost:9/admin/api/2024-01".to_string(),
            &StorefrontConfig::default(),
            &SyncTuningConfig::default(),
            "token",
        )
        .unwrap()
    }

    #[test]
    fn normalization_reads_the_first_variant() {
        let product: StorefrontProduct = serde_json::from_value(serde_json::json!({
            "id": 42,
            "title": "Cup",
            "status": "active",
            "body_html": "<p>Porcelain&nbsp;cup</p>",
            "product_type": "Kitchen",
            "vendor": "Clayworks",
            "tags": "porcelain",
            "variants": [
                { "id": 7, "price": "9.99", "sku": "CUP-1", "inventory_quantity": 3, "weight": 0.2 },
                { "id": 8, "price": "19.99" }
            ],
            "image": { "src": "https://img.example/cup.png" }
        }))
        .unwrap();

        let canonical = client().normalize(product);
        assert_eq!(canonical.external_id.as_deref(), Some("42"));
        assert_eq!(canonical.price, 9.99);
        assert_eq!(canonical.inventory, 3);
        assert_eq!(canonical.sku, "CUP-1");
        assert_eq!(canonical.status, ProductStatus::Active);
        assert_eq!(canonical.description, "Porcelain cup");
        assert_eq!(canonical.source_id, "");
    }

    #[test]
    fn missing_variant_and_fields_default() {
        let product: StorefrontProduct =
            serde_json::from_value(serde_json::json!({ "id": 43, "title": "Bare" })).unwrap();

        let canonical = client().normalize(product);
        assert_eq!(canonical.price, 0.0);
        assert_eq!(canonical.inventory, 0);
        assert_eq!(canonical.sku, "");
        assert_eq!(canonical.status, ProductStatus::Draft);
        assert_eq!(canonical.description, "");
    }

    #[test]
    fn payloads_contain_only_populated_fields() {
        let patch = ProductPatch {
            price: Some(12.5),
            title: Some("Cup".into()),
            ..ProductPatch::default()
        };

        let variant = StorefrontClient::variant_payload(&patch);
        assert_eq!(variant["variant"]["price"], "12.5");
        assert!(variant["variant"].get("sku").is_none());

        let product = StorefrontClient::product_payload(&patch);
        assert_eq!(product["product"]["title"], "Cup");
        assert!(product["product"].get("status").is_none());
    }
}
