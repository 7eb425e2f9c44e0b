//! Loyalty Account Model
//!
//! 集章卡：每单盖一个章，第 9 个章兑换一杯免费饮品并清零。

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Stamps needed for one free drink
pub const STAMPS_PER_REWARD: i64 = 9;

/// Loyalty account entity, one per customer (record key = customer ref).
///
/// `stamp_count` stays in [0, 8] between accruals — the wrapping stamp is
/// never persisted at 9.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoyaltyAccount {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub customer_ref: String,
    pub stamp_count: i64,
    pub total_free_drinks_earned: i64,
    /// += floor(order total / 10) per created order, from the final total
    pub points_balance: i64,
    #[serde(default, with = "serde_helpers::vec_record_id")]
    pub order_history: Vec<RecordId>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl LoyaltyAccount {
    /// Fresh account for a customer's first order
    pub fn new(customer_ref: impl Into<String>, now: i64) -> Self {
        Self {
            id: None,
            customer_ref: customer_ref.into(),
            stamp_count: 0,
            total_free_drinks_earned: 0,
            points_balance: 0,
            order_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Add one stamp. Returns true when this stamp is the ninth: the count
    /// wraps to 0, the free-drink counter advances, and the order that
    /// caused it must be priced as a free drink.
    ///
    /// Pure state mutation; persistence is the caller's responsibility.
    pub fn add_stamp(&mut self) -> bool {
        self.stamp_count += 1;
        if self.stamp_count >= STAMPS_PER_REWARD {
            self.stamp_count = 0;
            self.total_free_drinks_earned += 1;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nine_stamps_earn_one_free_drink() {
        let mut account = LoyaltyAccount::new("customer:alice", 0);
        for i in 1..=8 {
            assert!(!account.add_stamp(), "stamp {i} must not earn a reward");
            assert_eq!(account.stamp_count, i);
        }
        assert!(account.add_stamp(), "ninth stamp earns the reward");
        assert_eq!(account.stamp_count, 0);
        assert_eq!(account.total_free_drinks_earned, 1);
    }

    #[test]
    fn test_counter_keeps_wrapping() {
        let mut account = LoyaltyAccount::new("customer:bob", 0);
        let mut rewards = 0;
        for _ in 0..27 {
            if account.add_stamp() {
                rewards += 1;
            }
        }
        // 27 = 3 full cycles
        assert_eq!(rewards, 3);
        assert_eq!(account.total_free_drinks_earned, 3);
        assert_eq!(account.stamp_count, 0);
    }

    #[test]
    fn test_count_never_observed_at_nine() {
        let mut account = LoyaltyAccount::new("customer:carol", 0);
        for _ in 0..100 {
            account.add_stamp();
            assert!((0..STAMPS_PER_REWARD).contains(&account.stamp_count));
        }
    }
}
