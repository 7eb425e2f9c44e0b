//! Loyalty Account Repository
//!
//! One account per customer, keyed by the opaque customer reference so
//! lookups never need a secondary index.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::LoyaltyAccount;
use crate::utils::time::now_millis;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

const TABLE: &str = "loyalty_account";

#[derive(Clone)]
pub struct LoyaltyRepository {
    base: BaseRepository,
}

impl LoyaltyRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn record_id(customer_ref: &str) -> RecordId {
        RecordId::from_table_key(TABLE, customer_ref)
    }

    /// Fetch the account for a customer, creating an empty one on first use
    pub async fn get_or_create(&self, customer_ref: &str) -> RepoResult<LoyaltyAccount> {
        let id = Self::record_id(customer_ref);
        let existing: Option<LoyaltyAccount> = self.base.db().select(id.clone()).await?;
        if let Some(account) = existing {
            return Ok(account);
        }

        let account = LoyaltyAccount::new(customer_ref, now_millis());
        let created: Option<LoyaltyAccount> =
            self.base.db().create(id).content(account).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create loyalty account".into()))
    }

    /// Persist accrual results and link the new order into the history
    pub async fn save(
        &self,
        account: &LoyaltyAccount,
        order_ref: &RecordId,
        now: i64,
    ) -> RepoResult<LoyaltyAccount> {
        let id = Self::record_id(&account.customer_ref);
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $thing SET \
                 stamp_count = $stamps, \
                 total_free_drinks_earned = $free_drinks, \
                 points_balance = $points, \
                 order_history += $order_ref, \
                 updated_at = $now \
                 RETURN AFTER",
            )
            .bind(("thing", id))
            .bind(("stamps", account.stamp_count))
            .bind(("free_drinks", account.total_free_drinks_earned))
            .bind(("points", account.points_balance))
            .bind(("order_ref", order_ref.clone()))
            .bind(("now", now))
            .await?;
        let accounts: Vec<LoyaltyAccount> = result.take(0)?;
        accounts.into_iter().next().ok_or_else(|| {
            RepoError::NotFound(format!(
                "Loyalty account for {} not found",
                account.customer_ref
            ))
        })
    }
}
