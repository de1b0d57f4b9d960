//! Order Repository
//!
//! Persistence for the order aggregate. The item collection is owned
//! exclusively through `order_item.order_id`; wholesale item replacement on
//! update deletes rows that fell out of the new set (orphan removal).

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::SqlitePool;

use super::{RepoError, RepoResult};
use crate::db::models::{Order, OrderCreate, OrderItem, OrderUpdate};

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    customer_id: String,
    status: String,
    total: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: i64,
    order_id: i64,
    product_id: i64,
    quantity: i64,
    unit_price: String,
}

fn parse_decimal(raw: &str, column: &str) -> RepoResult<Decimal> {
    Decimal::from_str(raw)
        .map_err(|e| RepoError::Database(format!("Corrupt {} value '{}': {}", column, raw, e)))
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> RepoResult<Order> {
        Ok(Order {
            id: self.id,
            customer_id: self.customer_id,
            status: self.status,
            total: parse_decimal(&self.total, "total")?,
            created_at: self.created_at,
            items,
        })
    }
}

impl ItemRow {
    fn into_item(self) -> RepoResult<OrderItem> {
        Ok(OrderItem {
            id: self.id,
            order_id: self.order_id,
            product_id: self.product_id,
            quantity: self.quantity,
            unit_price: parse_decimal(&self.unit_price, "unit_price")?,
        })
    }
}

#[derive(Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a new order with its items in one transaction
    pub async fn create(&self, data: OrderCreate) -> RepoResult<Order> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO orders (customer_id, status, total, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&data.customer_id)
        .bind(&data.status)
        .bind(data.total.to_string())
        .bind(data.created_at)
        .execute(&mut *tx)
        .await?;

        let order_id = result.last_insert_rowid();

        let mut items = Vec::with_capacity(data.items.len());
        for item in &data.items {
            let result = sqlx::query(
                "INSERT INTO order_item (order_id, product_id, quantity, unit_price) \
                 VALUES (?, ?, ?, ?)",
            )
            .bind(order_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price.to_string())
            .execute(&mut *tx)
            .await?;

            items.push(OrderItem {
                id: result.last_insert_rowid(),
                order_id,
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price,
            });
        }

        tx.commit().await?;

        Ok(Order {
            id: order_id,
            customer_id: data.customer_id,
            status: data.status,
            total: data.total,
            created_at: data.created_at,
            items,
        })
    }

    /// Find an order with its items
    pub async fn find_by_id(&self, id: i64) -> RepoResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(
            "SELECT id, customer_id, status, total, created_at FROM orders WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let items = self.load_items(id).await?;
                Ok(Some(row.into_order(items)?))
            }
            None => Ok(None),
        }
    }

    /// All orders, oldest first
    pub async fn find_all(&self) -> RepoResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(
            "SELECT id, customer_id, status, total, created_at FROM orders ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        self.assemble(rows).await
    }

    /// Orders owned by one customer
    pub async fn find_by_customer(&self, customer_id: &str) -> RepoResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(
            "SELECT id, customer_id, status, total, created_at FROM orders \
             WHERE customer_id = ? ORDER BY id",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        self.assemble(rows).await
    }

    /// Overwrite an order and reconcile its item collection
    ///
    /// When `data.items` is present it is the complete replacement set:
    /// every item is re-parented to this order, items carrying a known id
    /// are updated in place, items without one are inserted, and existing
    /// rows absent from the set are deleted.
    pub async fn update(&self, id: i64, data: OrderUpdate) -> RepoResult<Order> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM orders WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(RepoError::NotFound(format!("Order {} not found", id)));
        }

        // created_at deliberately untouched
        sqlx::query(
            "UPDATE orders SET status = ?, total = ?, \
             customer_id = COALESCE(?, customer_id) WHERE id = ?",
        )
        .bind(&data.status)
        .bind(data.total.to_string())
        .bind(&data.customer_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if let Some(items) = &data.items {
            let existing: Vec<i64> =
                sqlx::query_scalar("SELECT id FROM order_item WHERE order_id = ?")
                    .bind(id)
                    .fetch_all(&mut *tx)
                    .await?;

            let kept: HashSet<i64> = items.iter().filter_map(|i| i.id).collect();

            // Orphan removal: rows no longer referenced by the new set
            for orphan in existing.iter().copied().filter(|e| !kept.contains(e)) {
                sqlx::query("DELETE FROM order_item WHERE id = ?")
                    .bind(orphan)
                    .execute(&mut *tx)
                    .await?;
            }

            for item in items {
                match item.id {
                    Some(item_id) => {
                        let result = sqlx::query(
                            "UPDATE order_item SET order_id = ?, product_id = ?, \
                             quantity = ?, unit_price = ? WHERE id = ?",
                        )
                        .bind(id)
                        .bind(item.product_id)
                        .bind(item.quantity)
                        .bind(item.unit_price.to_string())
                        .bind(item_id)
                        .execute(&mut *tx)
                        .await?;

                        if result.rows_affected() == 0 {
                            // Caller-chosen id with no existing row
                            sqlx::query(
                                "INSERT INTO order_item (id, order_id, product_id, quantity, \
                                 unit_price) VALUES (?, ?, ?, ?, ?)",
                            )
                            .bind(item_id)
                            .bind(id)
                            .bind(item.product_id)
                            .bind(item.quantity)
                            .bind(item.unit_price.to_string())
                            .execute(&mut *tx)
                            .await?;
                        }
                    }
                    None => {
                        sqlx::query(
                            "INSERT INTO order_item (order_id, product_id, quantity, unit_price) \
                             VALUES (?, ?, ?, ?)",
                        )
                        .bind(id)
                        .bind(item.product_id)
                        .bind(item.quantity)
                        .bind(item.unit_price.to_string())
                        .execute(&mut *tx)
                        .await?;
                    }
                }
            }
        }

        tx.commit().await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))
    }

    /// Delete an order and its items; returns whether anything was deleted
    pub async fn delete(&self, id: i64) -> RepoResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM order_item WHERE order_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of persisted orders (used by tests to assert nothing leaked)
    pub async fn count(&self) -> RepoResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn load_items(&self, order_id: i64) -> RepoResult<Vec<OrderItem>> {
        let rows: Vec<ItemRow> = sqlx::query_as(
            "SELECT id, order_id, product_id, quantity, unit_price FROM order_item \
             WHERE order_id = ? ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ItemRow::into_item).collect()
    }

    async fn assemble(&self, rows: Vec<OrderRow>) -> RepoResult<Vec<Order>> {
        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let items = self.load_items(row.id).await?;
            orders.push(row.into_order(items)?);
        }
        Ok(orders)
    }
}
