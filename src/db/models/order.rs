//! Order Model
//!
//! 订单实体与状态机：Pending → Preparing → Ready → Completed，
//! Cancelled 可从任何非终态进入。

use super::redemption_code::CupSize;
use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

// =============================================================================
// Order Status
// =============================================================================

/// Order status enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Completed and Cancelled accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// The single legal forward step, if any
    fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::Ready),
            OrderStatus::Ready => Some(OrderStatus::Completed),
            OrderStatus::Completed | OrderStatus::Cancelled => None,
        }
    }

    /// Whether `target` is a legal transition from this status.
    ///
    /// Same-status updates are accepted (idempotent no-op for PUT retries);
    /// otherwise only the forward chain and Cancelled-from-non-terminal
    /// are legal.
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        if *self == target {
            return true;
        }
        if target == OrderStatus::Cancelled {
            return !self.is_terminal();
        }
        self.next() == Some(target)
    }
}

/// Payment status, tracked independently of the fulfilment status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Refunded,
}

// =============================================================================
// Order (主表)
// =============================================================================

/// Flavor picked for the order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlavorSelection {
    pub name: String,
    pub point_cost: i64,
}

/// A single topping picked for the order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToppingSelection {
    pub name: String,
    pub point_cost: i64,
}

/// Price breakdown, all values in integer points.
///
/// `total` is always recomputable from cup size, topping count and the
/// free-drink flag; a stored total is never trusted across a mutation
/// without recompute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pricing {
    pub base_price: i64,
    pub size_surcharge: i64,
    pub toppings_total: i64,
    pub total: i64,
}

/// Per-transition timestamps (Unix millis)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StatusTimestamps {
    pub ordered: i64,
    pub preparing: Option<i64>,
    pub ready: Option<i64>,
    pub completed: Option<i64>,
    pub cancelled: Option<i64>,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    /// Human-readable "ORD" + zero-padded sequence, allocated atomically
    pub sequence_id: String,
    /// Absent for guest orders
    pub customer_ref: Option<String>,
    /// Value of the consumed redemption code
    pub redeemed_code: String,
    /// Public tracking token ("#" + 5 base36 chars), display only
    pub display_code: String,
    pub cup_size: CupSize,
    pub flavor: FlavorSelection,
    pub toppings: Vec<ToppingSelection>,
    pub special_instructions: Option<String>,
    pub pricing: Pricing,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    /// True iff this order earned the loyalty reward; forces total = 0
    pub is_free_drink: bool,
    pub timestamps: StatusTimestamps,
}

// =============================================================================
// API Request / Response Types
// =============================================================================

/// Create order payload. Cup size is not part of the request, it comes
/// from the redemption code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub code: String,
    pub flavor: FlavorSelection,
    #[serde(default)]
    pub toppings: Vec<ToppingSelection>,
    pub special_instructions: Option<String>,
    pub customer_ref: Option<String>,
}

/// Status update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

/// Create order response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub order: Order,
    pub display_code: String,
    pub earned_free_drink: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_chain() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Preparing));
        assert!(OrderStatus::Preparing.can_transition_to(OrderStatus::Ready));
        assert!(OrderStatus::Ready.can_transition_to(OrderStatus::Completed));
    }

    #[test]
    fn test_no_skipping_forward() {
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Ready));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Completed));
        assert!(!OrderStatus::Preparing.can_transition_to(OrderStatus::Completed));
    }

    #[test]
    fn test_no_going_backward() {
        assert!(!OrderStatus::Ready.can_transition_to(OrderStatus::Preparing));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Ready));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn test_cancel_from_any_non_terminal() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Preparing.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Ready.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_terminal_states_reject_everything_else() {
        for target in [
            OrderStatus::Pending,
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Cancelled,
        ] {
            assert!(!OrderStatus::Completed.can_transition_to(target));
        }
        for target in [
            OrderStatus::Pending,
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Completed,
        ] {
            assert!(!OrderStatus::Cancelled.can_transition_to(target));
        }
    }

    #[test]
    fn test_same_status_is_accepted() {
        // PUT retries are no-ops, including on terminal states
        for status in [
            OrderStatus::Pending,
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert!(status.can_transition_to(status));
        }
    }
}
