//! 订单全流程集成测试
//!
//! 覆盖：签发 → 校验 → 下单 → 核销 → 集章闭环，
//! 以及同一兑换码并发下单时的至多一次核销。

use bingsu_server::DbService;
use bingsu_server::db::models::{
    CodeState, CupSize, FlavorSelection, OrderCreate, OrderStatus, ToppingSelection,
};
use bingsu_server::db::repository::{CodeRepository, LoyaltyRepository, RepoError};
use bingsu_server::orders::OrderLedger;

struct TestContext {
    ledger: OrderLedger,
    codes: CodeRepository,
    loyalty: LoyaltyRepository,
    db: surrealdb::Surreal<surrealdb::engine::local::Db>,
}

async fn setup() -> TestContext {
    let service = DbService::memory().await.unwrap();
    TestContext {
        ledger: OrderLedger::new(service.db.clone()),
        codes: CodeRepository::new(service.db.clone()),
        loyalty: LoyaltyRepository::new(service.db.clone()),
        db: service.db,
    }
}

fn order_request(code: &str, customer: Option<&str>, toppings: usize) -> OrderCreate {
    OrderCreate {
        code: code.to_string(),
        flavor: FlavorSelection {
            name: "Taro".to_string(),
            point_cost: 0,
        },
        toppings: (0..toppings)
            .map(|i| ToppingSelection {
                name: format!("Topping {i}"),
                point_cost: 10,
            })
            .collect(),
        special_instructions: None,
        customer_ref: customer.map(str::to_string),
    }
}

#[tokio::test]
async fn test_guest_order_end_to_end() {
    let ctx = setup().await;

    let issued = ctx.codes.issue(CupSize::M, "employee:admin").await.unwrap();
    let placed = ctx
        .ledger
        .create_order(order_request(&issued.code, None, 2))
        .await
        .unwrap();

    // M + 2 toppings → 60 + 10 + 20
    assert_eq!(placed.order.pricing.total, 90);
    assert!(!placed.earned_free_drink);
    assert_eq!(placed.order.sequence_id, "ORD00001");
    assert_eq!(placed.order.status, OrderStatus::Pending);
    assert!(placed.display_code.starts_with('#'));

    // The code is consumed
    let err = ctx.codes.validate(&issued.code).await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));

    // Tracking works with and without the leading '#'
    let tracked = ctx
        .ledger
        .track_by_display_code(&placed.display_code)
        .await
        .unwrap();
    assert_eq!(tracked.sequence_id, "ORD00001");
    let bare = placed.display_code.trim_start_matches('#');
    let tracked = ctx.ledger.track_by_display_code(bare).await.unwrap();
    assert_eq!(tracked.sequence_id, "ORD00001");
}

#[tokio::test]
async fn test_ninth_order_is_a_free_drink() {
    let ctx = setup().await;
    let customer = Some("cust-regular");

    // Eight paid orders build up the stamp card
    for i in 1..=8 {
        let issued = ctx.codes.issue(CupSize::M, "employee:admin").await.unwrap();
        let placed = ctx
            .ledger
            .create_order(order_request(&issued.code, customer, 0))
            .await
            .unwrap();
        assert!(!placed.earned_free_drink, "order {i} must not be free");
        assert_eq!(placed.order.pricing.total, 70);
    }

    let account = ctx.loyalty.get_or_create("cust-regular").await.unwrap();
    assert_eq!(account.stamp_count, 8);
    assert_eq!(account.total_free_drinks_earned, 0);
    // 8 orders × 70 points total → 7 loyalty points each
    assert_eq!(account.points_balance, 56);

    // The ninth order wraps the card and is free
    let issued = ctx.codes.issue(CupSize::L, "employee:admin").await.unwrap();
    let placed = ctx
        .ledger
        .create_order(order_request(&issued.code, customer, 1))
        .await
        .unwrap();

    assert!(placed.earned_free_drink);
    assert!(placed.order.is_free_drink);
    assert_eq!(placed.order.pricing.total, 0);
    assert_eq!(placed.order.cup_size, CupSize::L);

    let account = ctx.loyalty.get_or_create("cust-regular").await.unwrap();
    assert_eq!(account.stamp_count, 0);
    assert_eq!(account.total_free_drinks_earned, 1);
    // A free order earns no points
    assert_eq!(account.points_balance, 56);
    assert_eq!(account.order_history.len(), 9);

    // The consumed code rejects a second order
    let err = ctx
        .ledger
        .create_order(order_request(&issued.code, customer, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[tokio::test]
async fn test_concurrent_orders_redeem_at_most_once() {
    let ctx = setup().await;
    let issued = ctx.codes.issue(CupSize::S, "employee:admin").await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let ledger = ctx.ledger.clone();
        let code = issued.code.clone();
        handles.push(tokio::spawn(async move {
            ledger.create_order(order_request(&code, None, 0)).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(RepoError::NotFound(_)) | Err(RepoError::Conflict(_)) => {}
            Err(other) => panic!("unexpected error kind: {other:?}"),
        }
    }
    assert_eq!(successes, 1, "exactly one order may consume the code");

    // Losers that reached the tentative-order step were compensated to
    // Cancelled; exactly one live order remains.
    let mut result = ctx
        .db
        .query("SELECT * FROM order WHERE status != 'CANCELLED'")
        .await
        .unwrap();
    let live: Vec<bingsu_server::db::models::Order> = result.take(0).unwrap();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].redeemed_code, issued.code);
}

#[tokio::test]
async fn test_status_machine_forward_and_cancel() {
    let ctx = setup().await;
    let issued = ctx.codes.issue(CupSize::M, "employee:admin").await.unwrap();
    let placed = ctx
        .ledger
        .create_order(order_request(&issued.code, None, 0))
        .await
        .unwrap();
    let id = placed.order.id.unwrap().to_string();

    let order = ctx
        .ledger
        .update_status(&id, OrderStatus::Preparing)
        .await
        .unwrap();
    assert!(order.timestamps.preparing.is_some());

    let order = ctx.ledger.update_status(&id, OrderStatus::Ready).await.unwrap();
    assert!(order.timestamps.ready.is_some());

    let order = ctx
        .ledger
        .update_status(&id, OrderStatus::Completed)
        .await
        .unwrap();
    assert!(order.timestamps.completed.is_some());

    // Completed is terminal
    for target in [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Cancelled,
    ] {
        let err = ctx.ledger.update_status(&id, target).await.unwrap_err();
        assert!(matches!(err, RepoError::InvalidTransition(_)));
    }

    // Same-status update is an idempotent no-op
    let order = ctx
        .ledger
        .update_status(&id, OrderStatus::Completed)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Completed);

    // A fresh order can be cancelled straight from Pending
    let issued = ctx.codes.issue(CupSize::M, "employee:admin").await.unwrap();
    let placed = ctx
        .ledger
        .create_order(order_request(&issued.code, None, 0))
        .await
        .unwrap();
    let id = placed.order.id.unwrap().to_string();
    let order = ctx
        .ledger
        .update_status(&id, OrderStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert!(order.timestamps.cancelled.is_some());
}

#[tokio::test]
async fn test_expired_code_never_creates_an_order() {
    let ctx = setup().await;

    // Plant an expired-but-unused code directly
    let now = bingsu_server::utils::time::now_millis();
    ctx.db
        .query(
            "CREATE redemption_code CONTENT {
                code: 'EXP99',
                cup_size: 'M',
                state: 'UNUSED',
                issued_by: 'employee:admin',
                order_ref: NONE,
                used_at: NONE,
                issued_at: $issued,
                expires_at: $expires
            }",
        )
        .bind(("issued", now - 100_000))
        .bind(("expires", now - 1_000))
        .await
        .unwrap();

    let err = ctx
        .ledger
        .create_order(order_request("EXP99", None, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Expired(_)));

    let mut result = ctx.db.query("SELECT * FROM order").await.unwrap();
    let orders: Vec<bingsu_server::db::models::Order> = result.take(0).unwrap();
    assert!(orders.is_empty(), "no order may exist for an expired code");

    // The sweep removes it; a used code would have survived
    let removed = ctx.codes.cleanup_expired().await.unwrap();
    assert_eq!(removed, 1);
}

#[tokio::test]
async fn test_sequence_ids_stay_monotonic_across_orders() {
    let ctx = setup().await;
    for expected in 1..=3 {
        let issued = ctx.codes.issue(CupSize::S, "employee:admin").await.unwrap();
        let placed = ctx
            .ledger
            .create_order(order_request(&issued.code, None, 0))
            .await
            .unwrap();
        assert_eq!(placed.order.sequence_id, format!("ORD{expected:05}"));
    }
}

#[tokio::test]
async fn test_redeemed_code_records_its_order() {
    let ctx = setup().await;
    let issued = ctx.codes.issue(CupSize::M, "employee:admin").await.unwrap();
    let placed = ctx
        .ledger
        .create_order(order_request(&issued.code, None, 0))
        .await
        .unwrap();

    let mut result = ctx
        .db
        .query("SELECT * FROM redemption_code WHERE code = $code")
        .bind(("code", issued.code.clone()))
        .await
        .unwrap();
    let codes: Vec<bingsu_server::db::models::RedemptionCode> = result.take(0).unwrap();
    assert_eq!(codes.len(), 1);
    assert_eq!(codes[0].state, CodeState::Used);
    assert_eq!(codes[0].order_ref, placed.order.id);
    assert!(codes[0].used_at.is_some());
}
