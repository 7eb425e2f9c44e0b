//! Order Repository
//!
//! Order persistence plus the sequence counter. Sequence numbers come from
//! a dedicated counter record advanced by a single-statement atomic
//! increment — never from a live row count, which races under concurrent
//! creation.

use serde::Deserialize;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Order, OrderStatus};
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

const TABLE: &str = "order";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Atomically advance the order sequence counter and return the new value
    async fn next_sequence(&self) -> RepoResult<i64> {
        #[derive(Debug, Deserialize)]
        struct Counter {
            value: i64,
        }

        let mut result = self
            .base
            .db()
            .query("UPSERT counter:order_sequence SET value += 1 RETURN AFTER")
            .await?;
        let rows: Vec<Counter> = result.take(0)?;
        rows.into_iter()
            .next()
            .map(|c| c.value)
            .ok_or_else(|| RepoError::Database("Failed to advance order sequence".into()))
    }

    /// Allocate the next human-readable sequence id ("ORD" + zero-padded)
    pub async fn next_sequence_id(&self) -> RepoResult<String> {
        let n = self.next_sequence().await?;
        Ok(format!("ORD{n:05}"))
    }

    /// Persist a new order
    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let created: Option<Order> = self.base.db().create(TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".into()))
    }

    /// Find order by id ("order:xyz")
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid order ID: {id}")))?;
        let order: Option<Order> = self.base.db().select(thing).await?;
        Ok(order)
    }

    /// Find order by its public tracking token
    pub async fn find_by_display_code(&self, display_code: &str) -> RepoResult<Option<Order>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM order WHERE display_code = $display_code LIMIT 1")
            .bind(("display_code", display_code.to_string()))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders.into_iter().next())
    }

    /// Persist a status transition and its timestamp. Transition legality
    /// is the ledger's concern; this only writes.
    pub async fn set_status(
        &self,
        id: &RecordId,
        status: OrderStatus,
        now: i64,
    ) -> RepoResult<Order> {
        // The timestamp field depends on the target status, so the
        // statement is picked per-status (field names can't be bound).
        let stmt = match status {
            OrderStatus::Preparing => {
                "UPDATE $thing SET status = $status, timestamps.preparing = $now RETURN AFTER"
            }
            OrderStatus::Ready => {
                "UPDATE $thing SET status = $status, timestamps.ready = $now RETURN AFTER"
            }
            OrderStatus::Completed => {
                "UPDATE $thing SET status = $status, timestamps.completed = $now RETURN AFTER"
            }
            OrderStatus::Cancelled => {
                "UPDATE $thing SET status = $status, timestamps.cancelled = $now RETURN AFTER"
            }
            OrderStatus::Pending => {
                // Orders are created Pending; nothing transitions back into it
                return Err(RepoError::InvalidTransition(
                    "Pending is not a transition target".into(),
                ));
            }
        };

        let mut result = self
            .base
            .db()
            .query(stmt)
            .bind(("thing", id.clone()))
            .bind(("status", status))
            .bind(("now", now))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        orders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::{
        CupSize, FlavorSelection, PaymentStatus, Pricing, StatusTimestamps,
    };

    async fn test_repo() -> OrderRepository {
        let service = DbService::memory().await.unwrap();
        OrderRepository::new(service.db)
    }

    fn sample_order(sequence_id: &str, display_code: &str) -> Order {
        Order {
            id: None,
            sequence_id: sequence_id.to_string(),
            customer_ref: None,
            redeemed_code: "AB12C".to_string(),
            display_code: display_code.to_string(),
            cup_size: CupSize::M,
            flavor: FlavorSelection {
                name: "Mango".to_string(),
                point_cost: 0,
            },
            toppings: vec![],
            special_instructions: None,
            pricing: Pricing {
                base_price: 60,
                size_surcharge: 10,
                toppings_total: 0,
                total: 70,
            },
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            is_free_drink: false,
            timestamps: StatusTimestamps {
                ordered: 1000,
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_sequence_is_monotonic_and_zero_padded() {
        let repo = test_repo().await;
        assert_eq!(repo.next_sequence_id().await.unwrap(), "ORD00001");
        assert_eq!(repo.next_sequence_id().await.unwrap(), "ORD00002");
        assert_eq!(repo.next_sequence_id().await.unwrap(), "ORD00003");
    }

    #[tokio::test]
    async fn test_sequence_unique_under_concurrency() {
        let repo = test_repo().await;
        let mut handles = Vec::new();
        for _ in 0..20 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.next_sequence_id().await.unwrap()
            }));
        }
        let mut ids = std::collections::HashSet::new();
        for handle in handles {
            assert!(ids.insert(handle.await.unwrap()), "duplicate sequence id");
        }
        assert_eq!(ids.len(), 20);
    }

    #[tokio::test]
    async fn test_create_and_find_by_display_code() {
        let repo = test_repo().await;
        let created = repo.create(sample_order("ORD00001", "#ab12c")).await.unwrap();
        assert!(created.id.is_some());

        let found = repo.find_by_display_code("#ab12c").await.unwrap().unwrap();
        assert_eq!(found.sequence_id, "ORD00001");

        let missing = repo.find_by_display_code("#zzzzz").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_set_status_records_timestamp() {
        let repo = test_repo().await;
        let created = repo.create(sample_order("ORD00001", "#ab12c")).await.unwrap();
        let id = created.id.unwrap();

        let updated = repo.set_status(&id, OrderStatus::Preparing, 2000).await.unwrap();
        assert_eq!(updated.status, OrderStatus::Preparing);
        assert_eq!(updated.timestamps.preparing, Some(2000));
        assert_eq!(updated.timestamps.ordered, 1000);
        assert!(updated.timestamps.ready.is_none());
    }
}
