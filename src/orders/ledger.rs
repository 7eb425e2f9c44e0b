//! Order Ledger
//!
//! Owns order creation and the status machine. Creation is a saga over
//! three records (code, order, loyalty account), not an ACID transaction:
//! the code is validated before anything is written, the order is created
//! tentatively, and the code redeem decides the outcome. A lost redeem
//! race cancels the tentative order and surfaces a conflict; the loyalty
//! write happens only after the redeem succeeds, so it never needs a
//! rollback.

use rand::Rng;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{
    Order, OrderCreate, OrderStatus, PaymentStatus, PlacedOrder, StatusTimestamps,
};
use crate::db::repository::{
    CodeRepository, LoyaltyRepository, OrderRepository, RepoError, RepoResult,
};
use crate::orders::pricing;
use crate::utils::time::now_millis;

const DISPLAY_CODE_LEN: usize = 5;
const DISPLAY_CODE_CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Clone)]
pub struct OrderLedger {
    codes: CodeRepository,
    orders: OrderRepository,
    loyalty: LoyaltyRepository,
}

impl OrderLedger {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            codes: CodeRepository::new(db.clone()),
            orders: OrderRepository::new(db.clone()),
            loyalty: LoyaltyRepository::new(db),
        }
    }

    /// Public tracking token: "#" + 5 base36 chars. Display only, not a
    /// key; collisions within the active-order window are merely unlikely.
    fn generate_display_code() -> String {
        let mut rng = rand::thread_rng();
        let token: String = (0..DISPLAY_CODE_LEN)
            .map(|_| DISPLAY_CODE_CHARSET[rng.gen_range(0..DISPLAY_CODE_CHARSET.len())] as char)
            .collect();
        format!("#{token}")
    }

    /// Create an order from a redemption code and the customer's selections.
    ///
    /// On a lost redemption race the tentative order is cancelled and the
    /// call fails with a conflict; an order never silently survives on an
    /// unredeemed code.
    pub async fn create_order(&self, req: OrderCreate) -> RepoResult<PlacedOrder> {
        // 1. Non-reserving precheck; the redeem below can still lose a race
        let code_record = self.codes.validate(&req.code).await?;

        // 2. Public tracking token
        let display_code = Self::generate_display_code();

        // 3-4. Loyalty accrual is applied in memory first because the
        // result decides the pricing; the account write is deferred until
        // the code is consumed.
        let mut account = match &req.customer_ref {
            Some(customer_ref) => Some(self.loyalty.get_or_create(customer_ref).await?),
            None => None,
        };
        let earned_free_drink = account
            .as_mut()
            .map(|account| account.add_stamp())
            .unwrap_or(false);
        let pricing = pricing::price_order(
            code_record.cup_size,
            req.toppings.len(),
            earned_free_drink,
        );

        // 5. Tentative order, Pending until the code redeem settles it
        let now = now_millis();
        let sequence_id = self.orders.next_sequence_id().await?;
        let order = Order {
            id: None,
            sequence_id,
            customer_ref: req.customer_ref.clone(),
            redeemed_code: code_record.code.clone(),
            display_code: display_code.clone(),
            cup_size: code_record.cup_size,
            flavor: req.flavor,
            toppings: req.toppings,
            special_instructions: req.special_instructions,
            pricing: pricing.clone(),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            is_free_drink: earned_free_drink,
            timestamps: StatusTimestamps {
                ordered: now,
                ..Default::default()
            },
        };
        let order = self.orders.create(order).await?;
        let order_id = order
            .id
            .clone()
            .ok_or_else(|| RepoError::Database("Created order has no id".into()))?;

        // 6. Consume the code. Losing here means another request redeemed
        // it between our validate and now — compensate and report conflict.
        if let Err(e) = self.codes.redeem(&code_record.code, &order_id).await {
            tracing::warn!(
                code = %code_record.code,
                order = %order_id,
                "Lost redemption race, cancelling tentative order"
            );
            self.orders
                .set_status(&order_id, OrderStatus::Cancelled, now_millis())
                .await?;
            return Err(match e {
                RepoError::NotFound(_) | RepoError::Expired(_) => RepoError::Conflict(format!(
                    "Code {} was redeemed by a concurrent order",
                    code_record.code
                )),
                other => other,
            });
        }

        // 7. Loyalty write, from the final total (a free order adds 0 points)
        if let Some(mut account) = account {
            account.points_balance += pricing::points_earned(pricing.total);
            self.loyalty.save(&account, &order_id, now).await?;
        }

        tracing::info!(
            sequence_id = %order.sequence_id,
            total = pricing.total,
            free_drink = earned_free_drink,
            "Order placed"
        );

        Ok(PlacedOrder {
            order,
            display_code,
            earned_free_drink,
        })
    }

    /// Apply a status transition. Same-status updates are idempotent
    /// no-ops; anything off the forward chain (or cancelling a terminal
    /// order) is rejected.
    pub async fn update_status(&self, id: &str, new_status: OrderStatus) -> RepoResult<Order> {
        let order = self
            .orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))?;

        if order.status == new_status {
            return Ok(order);
        }
        if !order.status.can_transition_to(new_status) {
            return Err(RepoError::InvalidTransition(format!(
                "Cannot move order from {:?} to {:?}",
                order.status, new_status
            )));
        }

        let order_id = order
            .id
            .ok_or_else(|| RepoError::Database("Stored order has no id".into()))?;
        let updated = self
            .orders
            .set_status(&order_id, new_status, now_millis())
            .await?;
        tracing::info!(
            sequence_id = %updated.sequence_id,
            status = ?updated.status,
            "Order status updated"
        );
        Ok(updated)
    }

    /// Read-only lookup by the public tracking token. Accepts the token
    /// with or without its leading '#'.
    pub async fn track_by_display_code(&self, display_code: &str) -> RepoResult<Order> {
        let trimmed = display_code.trim();
        let normalized = if trimmed.starts_with('#') {
            trimmed.to_string()
        } else {
            format!("#{trimmed}")
        };
        self.orders
            .find_by_display_code(&normalized)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Order {normalized} not found")))
    }

    /// Read-only fetch by order id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Order> {
        self.orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))
    }
}
