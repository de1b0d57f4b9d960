//! Product Lookup Client
//!
//! HTTP client for the product/inventory service. One synchronous lookup per
//! call; the caller's bearer credential is relayed unmodified — this is a
//! pass-through, the order service never authenticates downstream on its
//! own behalf.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

/// Authoritative inventory state for one product at call time
#[derive(Debug, Clone, Deserialize)]
pub struct ProductSnapshot {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub quantity: i64,
}

/// Product lookup failures
///
/// Both kinds abort order creation; they stay distinguishable so the API can
/// report a missing product differently from a dead upstream.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("product {0} not found")]
    NotFound(i64),

    #[error("product service unavailable: {0}")]
    Unavailable(String),
}

/// Seam for the remote lookup, so orchestration is testable without the
/// product service running
#[async_trait]
pub trait ProductLookup: Send + Sync {
    async fn resolve(&self, product_id: i64, bearer: &str) -> Result<ProductSnapshot, LookupError>;
}

/// Production lookup over HTTP
#[derive(Debug, Clone)]
pub struct ProductClient {
    client: Client,
    base_url: String,
}

impl ProductClient {
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ProductLookup for ProductClient {
    async fn resolve(&self, product_id: i64, bearer: &str) -> Result<ProductSnapshot, LookupError> {
        let url = format!(
            "{}/api/products/{}",
            self.base_url.trim_end_matches('/'),
            product_id
        );

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {}", bearer))
            .send()
            .await
            .map_err(|e| LookupError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(LookupError::NotFound(product_id)),
            status if !status.is_success() => Err(LookupError::Unavailable(format!(
                "product service returned {}",
                status
            ))),
            _ => response
                .json()
                .await
                .map_err(|e| LookupError::Unavailable(format!("malformed product payload: {}", e))),
        }
    }
}

#[cfg(test)]
pub mod testing {
    //! In-memory lookup fake for orchestrator and router tests

    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Fake product catalog; records the order of resolve calls and the
    /// bearer tokens it saw
    pub struct StubProducts {
        products: HashMap<i64, ProductSnapshot>,
        pub calls: Mutex<Vec<i64>>,
        pub bearers: Mutex<Vec<String>>,
        down: bool,
    }

    impl StubProducts {
        pub fn new(products: Vec<ProductSnapshot>) -> Self {
            Self {
                products: products.into_iter().map(|p| (p.id, p)).collect(),
                calls: Mutex::new(Vec::new()),
                bearers: Mutex::new(Vec::new()),
                down: false,
            }
        }

        /// A catalog whose every lookup fails as unreachable
        pub fn unreachable() -> Self {
            Self {
                products: HashMap::new(),
                calls: Mutex::new(Vec::new()),
                bearers: Mutex::new(Vec::new()),
                down: true,
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ProductLookup for StubProducts {
        async fn resolve(
            &self,
            product_id: i64,
            bearer: &str,
        ) -> Result<ProductSnapshot, LookupError> {
            self.calls.lock().unwrap().push(product_id);
            self.bearers.lock().unwrap().push(bearer.to_string());

            if self.down {
                return Err(LookupError::Unavailable("connection refused".to_string()));
            }

            self.products
                .get(&product_id)
                .cloned()
                .ok_or(LookupError::NotFound(product_id))
        }
    }

    pub fn snapshot(id: i64, name: &str, price: &str, quantity: i64) -> ProductSnapshot {
        ProductSnapshot {
            id,
            name: name.to_string(),
            price: price.parse().unwrap(),
            quantity,
        }
    }
}
