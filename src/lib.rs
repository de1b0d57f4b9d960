//! Order Server - order management microservice
//!
//! # Module structure
//!
//! ```text
//! src/
//! ├── core/      # config, shared state, HTTP server
//! ├── auth/      # JWT verification, roles, middleware
//! ├── api/       # routes and handlers
//! ├── orders/    # order orchestration service
//! ├── client/    # product service HTTP client
//! ├── db/        # SQLite pool, models, repositories
//! └── utils/     # errors, logging
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod core;
pub mod db;
pub mod orders;
pub mod utils;

pub use auth::{CurrentUser, JwtVerifier};
pub use core::{Config, Server, ServerState, build_router};
pub use orders::OrderService;
pub use utils::{AppError, AppResponse, AppResult};
pub use utils::logger::{init_logger, init_logger_with_level};

// Security logging macro - keyed fields under a dedicated tracing target
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
