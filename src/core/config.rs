use crate::auth::JwtConfig;

/// Server configuration
///
/// Built once at startup and passed by reference into each component's
/// constructor; there is no ambient/global configuration lookup.
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | HTTP_PORT | 8082 | HTTP API port |
/// | DATABASE_PATH | orders.db | SQLite database file |
/// | PRODUCT_SERVICE_URL | http://localhost:8081 | Downstream product service |
/// | REQUEST_TIMEOUT_MS | 30000 | Product lookup timeout (ms) |
/// | CORS_ORIGINS | http://localhost:3000 | Comma-separated allowed origins |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | JWT_SECRET / JWT_ISSUER / JWT_AUDIENCE | — | Token verification (see [`JwtConfig`]) |
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API port
    pub http_port: u16,
    /// SQLite database file path
    pub database_path: String,
    /// Base URL of the product/inventory service
    pub product_service_url: String,
    /// Timeout for product lookups (milliseconds)
    pub request_timeout_ms: u64,
    /// Allowed CORS origins ("*" for permissive)
    pub cors_origins: Vec<String>,
    /// Running environment: development | staging | production
    pub environment: String,
    /// Bearer token verification configuration
    pub jwt: JwtConfig,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset variables fall back to development defaults.
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8082),
            database_path: std::env::var("DATABASE_PATH").unwrap_or_else(|_| "orders.db".into()),
            product_service_url: std::env::var("PRODUCT_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8081".into()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            jwt: JwtConfig::default(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
