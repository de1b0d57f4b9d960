//! Order orchestration
//!
//! The only component allowed to mutate order state. Create validates and
//! prices every proposed line item against the product service before
//! anything touches the store; update reconciles the item collection and
//! trusts the caller's figures (matching the original behavior — see
//! DESIGN.md on the create/update asymmetry).

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

use crate::client::{LookupError, ProductLookup};
use crate::db::models::{Order, OrderCreate, OrderItemCreate, OrderUpdate, STATUS_CREATED};
use crate::db::repository::OrderRepository;
use crate::utils::{AppError, AppResult};

/// One proposed line item: what the caller wants, before pricing
#[derive(Debug, Clone)]
pub struct ProposedItem {
    pub product_id: i64,
    pub quantity: i64,
}

#[derive(Clone)]
pub struct OrderService {
    repo: OrderRepository,
    products: Arc<dyn ProductLookup>,
}

impl OrderService {
    pub fn new(repo: OrderRepository, products: Arc<dyn ProductLookup>) -> Self {
        Self { repo, products }
    }

    /// Create an order for the verified principal
    ///
    /// Resolves each proposed item against the product service in input
    /// order, sequentially; the first failure aborts the whole operation
    /// with nothing persisted and no further lookups. Unit prices always
    /// come from the resolved snapshot, never from the caller. The store is
    /// only reached after every item has passed, and persists order + items
    /// in one transaction.
    pub async fn create_order(
        &self,
        items: &[ProposedItem],
        customer_id: &str,
        bearer: &str,
    ) -> AppResult<Order> {
        let mut total = Decimal::ZERO;
        let mut priced = Vec::with_capacity(items.len());

        for item in items {
            if item.quantity < 1 {
                return Err(AppError::validation(format!(
                    "Quantity must be positive for product {}",
                    item.product_id
                )));
            }

            let snapshot = self
                .products
                .resolve(item.product_id, bearer)
                .await
                .map_err(|e| match e {
                    LookupError::NotFound(id) => {
                        AppError::not_found(format!("Product {} not found", id))
                    }
                    LookupError::Unavailable(msg) => AppError::product_unavailable(msg),
                })?;

            if snapshot.quantity < item.quantity {
                return Err(AppError::insufficient_stock(snapshot.name));
            }

            total += snapshot.price * Decimal::from(item.quantity);
            priced.push(OrderItemCreate {
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: snapshot.price,
            });
        }

        let order = self
            .repo
            .create(OrderCreate {
                customer_id: customer_id.to_string(),
                status: STATUS_CREATED.to_string(),
                total,
                created_at: Utc::now(),
                items: priced,
            })
            .await?;

        info!(order_id = order.id, customer = %order.customer_id, total = %order.total,
            "Order created");
        Ok(order)
    }

    /// Overwrite an order and wholesale-replace its item collection
    ///
    /// Does not re-validate stock or re-price: status, total, prices and
    /// quantities are trusted caller fields on update.
    pub async fn update_order(&self, id: i64, data: OrderUpdate) -> AppResult<Order> {
        let order = self.repo.update(id, data).await?;
        info!(order_id = id, status = %order.status, "Order updated");
        Ok(order)
    }

    pub async fn get_order(&self, id: i64) -> AppResult<Order> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))
    }

    pub async fn list_orders(&self) -> AppResult<Vec<Order>> {
        Ok(self.repo.find_all().await?)
    }

    pub async fn list_orders_by_customer(&self, customer_id: &str) -> AppResult<Vec<Order>> {
        Ok(self.repo.find_by_customer(customer_id).await?)
    }

    pub async fn delete_order(&self, id: i64) -> AppResult<()> {
        let deleted = self.repo.delete(id).await?;
        if !deleted {
            return Err(AppError::not_found(format!("Order {} not found", id)));
        }
        info!(order_id = id, "Order deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::product::testing::{StubProducts, snapshot};
    use crate::db::DbService;
    use crate::db::models::OrderItemWrite;
    use std::str::FromStr;

    const BEARER: &str = "caller-token";

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn proposed(product_id: i64, quantity: i64) -> ProposedItem {
        ProposedItem {
            product_id,
            quantity,
        }
    }

    async fn service_with(products: Vec<crate::client::ProductSnapshot>) -> (OrderService, Arc<StubProducts>, OrderRepository) {
        let db = DbService::memory().await;
        let repo = OrderRepository::new(db.pool.clone());
        let stub = Arc::new(StubProducts::new(products));
        let service = OrderService::new(repo.clone(), stub.clone());
        (service, stub, repo)
    }

    #[tokio::test]
    async fn create_prices_from_snapshot_and_computes_total() {
        let (service, _, _) = service_with(vec![
            snapshot(1, "Keyboard", "9.99", 5),
            snapshot(2, "Mouse", "3.50", 10),
        ])
        .await;

        let order = service
            .create_order(&[proposed(1, 2), proposed(2, 3)], "alice", BEARER)
            .await
            .unwrap();

        assert_eq!(order.status, STATUS_CREATED);
        assert_eq!(order.customer_id, "alice");
        assert_eq!(order.total, dec("30.48")); // 9.99*2 + 3.50*3
        assert_eq!(order.items[0].unit_price, dec("9.99"));
        assert_eq!(order.items[1].unit_price, dec("3.50"));
    }

    #[tokio::test]
    async fn concrete_scenario_two_units_at_nine_ninety_nine() {
        let (service, _, _) = service_with(vec![snapshot(1, "Keyboard", "9.99", 5)]).await;

        let order = service
            .create_order(&[proposed(1, 2)], "alice", BEARER)
            .await
            .unwrap();

        assert_eq!(order.total, dec("19.98"));
        assert_eq!(order.status, "CREATED");
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].unit_price, dec("9.99"));
    }

    #[tokio::test]
    async fn insufficient_stock_aborts_with_nothing_persisted() {
        let (service, _, repo) = service_with(vec![snapshot(1, "Keyboard", "9.99", 1)]).await;

        let err = service
            .create_order(&[proposed(1, 2)], "alice", BEARER)
            .await
            .unwrap_err();

        match err {
            AppError::InsufficientStock(name) => assert_eq!(name, "Keyboard"),
            other => panic!("expected InsufficientStock, got {:?}", other),
        }
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unreachable_product_service_aborts_with_nothing_persisted() {
        let db = DbService::memory().await;
        let repo = OrderRepository::new(db.pool.clone());
        let stub = Arc::new(StubProducts::unreachable());
        let service = OrderService::new(repo.clone(), stub.clone());

        let err = service
            .create_order(&[proposed(1, 1)], "alice", BEARER)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ProductUnavailable(_)));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let (service, _, repo) = service_with(vec![]).await;

        let err = service
            .create_order(&[proposed(42, 1)], "alice", BEARER)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn failure_on_item_k_stops_lookups_for_later_items() {
        let (service, stub, _) = service_with(vec![
            snapshot(1, "Keyboard", "9.99", 5),
            snapshot(2, "Mouse", "3.50", 0),
            snapshot(3, "Monitor", "120.00", 9),
        ])
        .await;

        let err = service
            .create_order(
                &[proposed(1, 1), proposed(2, 1), proposed(3, 1)],
                "alice",
                BEARER,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InsufficientStock(_)));
        assert_eq!(*stub.calls.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn bearer_credential_is_relayed_on_every_lookup() {
        let (service, stub, _) = service_with(vec![
            snapshot(1, "Keyboard", "9.99", 5),
            snapshot(2, "Mouse", "3.50", 10),
        ])
        .await;

        service
            .create_order(&[proposed(1, 1), proposed(2, 1)], "alice", "tok-123")
            .await
            .unwrap();

        let bearers = stub.bearers.lock().unwrap();
        assert_eq!(bearers.len(), 2);
        assert!(bearers.iter().all(|b| b == "tok-123"));
    }

    #[tokio::test]
    async fn non_positive_quantity_is_rejected_before_any_lookup() {
        let (service, stub, repo) = service_with(vec![snapshot(1, "Keyboard", "9.99", 5)]).await;

        let err = service
            .create_order(&[proposed(1, 0)], "alice", BEARER)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(stub.call_count(), 0);
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn empty_item_list_creates_zero_total_order() {
        let (service, _, _) = service_with(vec![]).await;

        let order = service.create_order(&[], "alice", BEARER).await.unwrap();
        assert_eq!(order.total, Decimal::ZERO);
        assert!(order.items.is_empty());
    }

    #[tokio::test]
    async fn update_trusts_caller_and_never_calls_product_service() {
        let (service, stub, _) = service_with(vec![snapshot(1, "Keyboard", "9.99", 5)]).await;

        let order = service
            .create_order(&[proposed(1, 1)], "alice", BEARER)
            .await
            .unwrap();
        let lookups_after_create = stub.call_count();

        let updated = service
            .update_order(
                order.id,
                OrderUpdate {
                    status: "SHIPPED".to_string(),
                    total: dec("42.00"),
                    customer_id: Some("bob".to_string()),
                    items: Some(vec![OrderItemWrite {
                        id: None,
                        product_id: 1,
                        quantity: 99,
                        unit_price: dec("0.01"),
                    }]),
                },
            )
            .await
            .unwrap();

        // Caller-supplied figures stored verbatim; no re-pricing happened
        assert_eq!(updated.status, "SHIPPED");
        assert_eq!(updated.total, dec("42.00"));
        assert_eq!(updated.customer_id, "bob");
        assert_eq!(updated.items[0].unit_price, dec("0.01"));
        assert_eq!(updated.items[0].quantity, 99);
        assert_eq!(stub.call_count(), lookups_after_create);
    }

    #[tokio::test]
    async fn update_reconciles_items_with_orphan_removal() {
        let (service, _, _) = service_with(vec![
            snapshot(1, "A", "1.00", 10),
            snapshot(2, "B", "2.00", 10),
            snapshot(3, "C", "3.00", 10),
        ])
        .await;

        let order = service
            .create_order(
                &[proposed(1, 1), proposed(2, 1), proposed(3, 1)],
                "alice",
                BEARER,
            )
            .await
            .unwrap();
        let b = order.items[1].clone();

        let updated = service
            .update_order(
                order.id,
                OrderUpdate {
                    status: order.status.clone(),
                    total: dec("6.00"),
                    customer_id: None,
                    items: Some(vec![
                        OrderItemWrite {
                            id: Some(b.id),
                            product_id: b.product_id,
                            quantity: b.quantity,
                            unit_price: b.unit_price,
                        },
                        OrderItemWrite {
                            id: None,
                            product_id: 4,
                            quantity: 1,
                            unit_price: dec("4.00"),
                        },
                    ]),
                },
            )
            .await
            .unwrap();

        // Exactly {B, D}; A and C no longer exist anywhere
        assert_eq!(updated.items.len(), 2);
        assert!(updated.items.iter().any(|i| i.id == b.id && i.product_id == 2));
        assert!(updated.items.iter().any(|i| i.product_id == 4));
        assert!(updated.items.iter().all(|i| i.order_id == order.id));

        let reread = service.get_order(order.id).await.unwrap();
        assert_eq!(reread.items.len(), 2);
        assert!(!reread.items.iter().any(|i| i.product_id == 1 || i.product_id == 3));
    }

    #[tokio::test]
    async fn get_order_is_idempotent() {
        let (service, _, _) = service_with(vec![snapshot(1, "Keyboard", "9.99", 5)]).await;

        let order = service
            .create_order(&[proposed(1, 2)], "alice", BEARER)
            .await
            .unwrap();

        let first = service.get_order(order.id).await.unwrap();
        let second = service.get_order(order.id).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn missing_order_reads_and_deletes_are_not_found() {
        let (service, _, _) = service_with(vec![]).await;

        assert!(matches!(
            service.get_order(404).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            service.delete_order(404).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn owner_comes_from_the_verified_identity() {
        let (service, _, _) = service_with(vec![snapshot(1, "Keyboard", "9.99", 5)]).await;

        let order = service
            .create_order(&[proposed(1, 1)], "carol", BEARER)
            .await
            .unwrap();
        assert_eq!(order.customer_id, "carol");

        let mine = service.list_orders_by_customer("carol").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert!(service
            .list_orders_by_customer("mallory")
            .await
            .unwrap()
            .is_empty());
    }
}
