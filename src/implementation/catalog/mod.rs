//! Backend product catalog client
//!
//! The storefront talks to a WooCommerce-style REST backend; the only read
//! this crate performs is `GET {base}/wp-json/wc/v3/products/{id}`, with the
//! session's bearer token attached when one is present. Payload fields that
//! the backend emits as either string or number (`id`, prices) normalize to
//! canonical types on decode.

use std::fmt;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use tracing::debug;

use crate::errors::CartError;
use crate::traits::ProductCatalog;
use crate::types::config::CartConfig;
use crate::types::product::{Currency, Price, ProductId, ProductSnapshot};
use crate::types::session::AuthSession;

/// Image entry in a catalog product payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ImagePayload {
    /// Image URL.
    pub src: String,
}

/// Product representation returned by the catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductPayload {
    /// Product ID (number or string on the wire).
    pub id:             ProductId,
    /// Product name.
    pub name:           String,
    /// Product SKU.
    #[serde(default)]
    pub sku:            Option<String>,
    /// Effective price as a decimal string.
    #[serde(default, deserialize_with = "string_or_number")]
    pub price:          Option<String>,
    /// Pre-sale price as a decimal string.
    #[serde(default, deserialize_with = "string_or_number")]
    pub regular_price:  Option<String>,
    /// Whether the backend tracks stock for this product.
    #[serde(default)]
    pub manage_stock:   bool,
    /// Remaining stock; absent or null when stock is unmanaged.
    #[serde(default)]
    pub stock_quantity: Option<i64>,
    /// Gallery images, first entry is primary.
    #[serde(default)]
    pub images:         Vec<ImagePayload>,
}

impl ProductPayload {
    /// Live stock figure, `None` when the backend does not manage stock.
    #[must_use]
    pub fn stock(&self) -> Option<i64> {
        if self.manage_stock {
            self.stock_quantity
        } else {
            None
        }
    }

    /// Converts the payload into an add-time cart snapshot.
    pub fn into_snapshot(self, currency: &Currency) -> Result<ProductSnapshot, CartError> {
        let price = Price::from_decimal_str(self.price.as_deref().unwrap_or(""), currency.clone())?;

        let regular_price = match self.regular_price.as_deref() {
            Some(raw) if !raw.trim().is_empty() => {
                Some(Price::from_decimal_str(raw, currency.clone())?)
            },
            _ => None,
        };

        let mut snapshot = ProductSnapshot::new(self.id, self.name, price);
        snapshot.sku = self.sku;
        snapshot.image_url = self.images.into_iter().next().map(|image| image.src);
        snapshot.regular_price = regular_price;
        Ok(snapshot)
    }
}

/// HTTP implementation of [`ProductCatalog`].
pub struct HttpProductCatalog {
    client:   reqwest::Client,
    base_url: String,
    currency: Currency,
    session:  Mutex<AuthSession>,
}

impl HttpProductCatalog {
    /// Creates a client for the backend named in `config`, starting signed
    /// out.
    #[must_use]
    pub fn new(config: &CartConfig) -> Self {
        Self {
            client:   reqwest::Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            currency: config.currency.clone(),
            session:  Mutex::new(AuthSession::anonymous()),
        }
    }

    /// Replaces the session whose token outbound requests carry.
    pub fn set_session(&self, session: AuthSession) {
        if let Ok(mut guard) = self.session.lock() {
            *guard = session;
        }
    }

    fn product_url(&self, product_id: &ProductId) -> String {
        format!("{}/wp-json/wc/v3/products/{}", self.base_url, product_id)
    }

    fn current_token(&self) -> Option<String> {
        self.session
            .lock()
            .ok()
            .and_then(|session| session.bearer_token().map(str::to_string))
    }

    /// Fetches the full catalog representation of a product.
    pub async fn fetch_product(&self, product_id: &ProductId) -> Result<ProductPayload, CartError> {
        let url = self.product_url(product_id);
        debug!(product_id = %product_id, url = %url, "fetching catalog product");

        let mut request = self.client.get(&url);
        if let Some(token) = self.current_token() {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CartError::Catalog(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CartError::Catalog(format!(
                "catalog returned {} for product {}",
                response.status(),
                product_id
            )));
        }

        response
            .json::<ProductPayload>()
            .await
            .map_err(|e| CartError::Catalog(e.to_string()))
    }

    /// Fetches a product and converts it straight into a cart snapshot.
    pub async fn fetch_snapshot(&self, product_id: &ProductId) -> Result<ProductSnapshot, CartError> {
        let payload = self.fetch_product(product_id).await?;
        payload.into_snapshot(&self.currency)
    }
}

impl fmt::Debug for HttpProductCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpProductCatalog")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ProductCatalog for HttpProductCatalog {
    async fn fetch_stock(&self, product_id: &ProductId) -> Result<Option<i64>, CartError> {
        let payload = self.fetch_product(product_id).await?;
        Ok(payload.stock())
    }
}

/// Accepts a value the backend may emit as string, integer, float or null.
fn string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    struct RawVisitor;

    impl<'de> Visitor<'de> for RawVisitor {
        type Value = Option<String>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string, a number or null")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2: Deserializer<'de>>(self, deserializer: D2) -> Result<Self::Value, D2::Error> {
            deserializer.deserialize_any(RawVisitor)
        }
    }

    deserializer.deserialize_any(RawVisitor)
}
