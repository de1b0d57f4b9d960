use std::sync::Arc;

use crate::auth::JwtVerifier;
use crate::client::{ProductClient, ProductLookup};
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::OrderRepository;
use crate::orders::OrderService;
use crate::utils::AppError;

/// Server state - shared handles for every request
///
/// All fields are stateless, reentrant collaborators; `Clone` is shallow.
///
/// | Field | Description |
/// |-------|-------------|
/// | config | Immutable configuration |
/// | db | SQLite pool |
/// | products | Product lookup client (trait object, swappable in tests) |
/// | verifier | Bearer token verifier |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub products: Arc<dyn ProductLookup>,
    pub verifier: Arc<JwtVerifier>,
}

impl ServerState {
    /// Initialize server state: database (with migrations), product client,
    /// token verifier
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let db = DbService::new(&config.database_path).await?;
        let products: Arc<dyn ProductLookup> = Arc::new(ProductClient::new(
            config.product_service_url.clone(),
            config.request_timeout_ms,
        ));
        let verifier = Arc::new(JwtVerifier::new(config.jwt.clone()));

        Ok(Self {
            config: config.clone(),
            db,
            products,
            verifier,
        })
    }

    /// Order orchestration service over this state's store and client
    pub fn order_service(&self) -> OrderService {
        OrderService::new(
            OrderRepository::new(self.db.pool.clone()),
            self.products.clone(),
        )
    }

    /// State over an in-memory database and a supplied product lookup
    #[cfg(test)]
    pub async fn for_tests(products: Arc<dyn ProductLookup>) -> Self {
        use crate::auth::JwtConfig;

        let jwt = JwtConfig {
            secret: "a-test-secret-that-is-long-enough-0123".to_string(),
            issuer: "http://issuer.test/realms/test".to_string(),
            audience: "account".to_string(),
        };
        let config = Config {
            http_port: 0,
            database_path: ":memory:".to_string(),
            product_service_url: "http://products.test".to_string(),
            request_timeout_ms: 1000,
            cors_origins: vec!["*".to_string()],
            environment: "development".to_string(),
            jwt: jwt.clone(),
        };

        Self {
            config,
            db: DbService::memory().await,
            products,
            verifier: Arc::new(JwtVerifier::new(jwt)),
        }
    }
}
