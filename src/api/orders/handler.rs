//! Order API Handlers
//!
//! Role matrix (enforced here, computed nowhere else):
//!
//! | Operation | Allowed roles |
//! |-----------|---------------|
//! | POST /api/orders | ADMIN, CLIENT |
//! | GET /api/orders | ADMIN, CLIENT |
//! | GET /api/orders/my-orders | CLIENT |
//! | GET /api/orders/{id} | ADMIN, CLIENT |
//! | PUT /api/orders/{id} | ADMIN, CLIENT |
//! | DELETE /api/orders/{id} | ADMIN, CLIENT |

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::auth::{BearerToken, CurrentUser, ROLE_ADMIN, ROLE_CLIENT};
use crate::core::ServerState;
use crate::db::models::{Order, OrderItemWrite, OrderUpdate};
use crate::orders::ProposedItem;
use crate::utils::{AppError, AppResult};

/// POST /api/orders request body
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<CreateOrderItem>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderItem {
    pub product_id: i64,
    #[validate(range(min = 1, message = "quantity must be positive"))]
    pub quantity: i64,
    /// Accepted for wire compatibility, ignored: unit prices are resolved
    /// from the product service on create
    #[serde(default)]
    pub price: Option<Decimal>,
}

/// PUT /api/orders/{id} request body
///
/// Everything here is trusted caller input on update, including total and
/// item prices.
#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    pub status: String,
    #[serde(default)]
    pub total: Decimal,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<UpdateOrderItem>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderItem {
    #[serde(default)]
    pub id: Option<i64>,
    pub product_id: i64,
    pub quantity: i64,
    pub price: Decimal,
}

impl From<UpdateOrderRequest> for OrderUpdate {
    fn from(req: UpdateOrderRequest) -> Self {
        OrderUpdate {
            status: req.status,
            total: req.total,
            customer_id: req.customer_id,
            items: req.items.map(|items| {
                items
                    .into_iter()
                    .map(|i| OrderItemWrite {
                        id: i.id,
                        product_id: i.product_id,
                        quantity: i.quantity,
                        unit_price: i.price,
                    })
                    .collect()
            }),
        }
    }
}

/// POST /api/orders - create an order owned by the caller
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    bearer: BearerToken,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<Order>> {
    user.require_any_role(&[ROLE_ADMIN, ROLE_CLIENT])?;
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let items: Vec<ProposedItem> = payload
        .items
        .iter()
        .map(|i| ProposedItem {
            product_id: i.product_id,
            quantity: i.quantity,
        })
        .collect();

    let order = state
        .order_service()
        .create_order(&items, &user.username, &bearer.0)
        .await?;
    Ok(Json(order))
}

/// GET /api/orders - list all orders
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    user.require_any_role(&[ROLE_ADMIN, ROLE_CLIENT])?;
    let orders = state.order_service().list_orders().await?;
    Ok(Json(orders))
}

/// GET /api/orders/my-orders - list the caller's own orders
pub async fn list_mine(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    user.require_any_role(&[ROLE_CLIENT])?;
    let orders = state
        .order_service()
        .list_orders_by_customer(&user.username)
        .await?;
    Ok(Json(orders))
}

/// GET /api/orders/{id} - get one order
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    user.require_any_role(&[ROLE_ADMIN, ROLE_CLIENT])?;
    let order = state.order_service().get_order(id).await?;
    Ok(Json(order))
}

/// PUT /api/orders/{id} - overwrite an order and replace its items
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateOrderRequest>,
) -> AppResult<Json<Order>> {
    user.require_any_role(&[ROLE_ADMIN, ROLE_CLIENT])?;
    let order = state.order_service().update_order(id, payload.into()).await?;
    Ok(Json(order))
}

/// DELETE /api/orders/{id} - delete an order with its items
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    user.require_any_role(&[ROLE_ADMIN, ROLE_CLIENT])?;
    state.order_service().delete_order(id).await?;
    Ok(Json(true))
}
