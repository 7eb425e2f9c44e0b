//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::models::{Order, OrderCreate, OrderStatusUpdate, PlacedOrder};
use crate::orders::OrderLedger;
use crate::utils::{AppError, AppResult};
use crate::utils::validation::{
    MAX_INSTRUCTIONS_LEN, MAX_NAME_LEN, MAX_REF_LEN, validate_code_shape, validate_optional_text,
    validate_required_text,
};

/// Sanity cap; nobody orders more toppings than this on one drink
const MAX_TOPPINGS: usize = 10;

fn validate_create(payload: &OrderCreate) -> Result<(), AppError> {
    validate_code_shape(&payload.code)?;
    validate_required_text(&payload.flavor.name, "flavor", MAX_NAME_LEN)?;
    if payload.flavor.point_cost < 0 {
        return Err(AppError::validation("flavor point_cost must not be negative"));
    }
    if payload.toppings.len() > MAX_TOPPINGS {
        return Err(AppError::validation(format!(
            "Too many toppings ({}, max {MAX_TOPPINGS})",
            payload.toppings.len()
        )));
    }
    for topping in &payload.toppings {
        validate_required_text(&topping.name, "topping", MAX_NAME_LEN)?;
        if topping.point_cost < 0 {
            return Err(AppError::validation("topping point_cost must not be negative"));
        }
    }
    validate_optional_text(
        &payload.special_instructions,
        "special_instructions",
        MAX_INSTRUCTIONS_LEN,
    )?;
    validate_optional_text(&payload.customer_ref, "customer_ref", MAX_REF_LEN)?;
    Ok(())
}

/// POST /api/orders - 下单（核销兑换码）
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<PlacedOrder>> {
    validate_create(&payload)?;

    let ledger = OrderLedger::new(state.db.clone());
    let placed = ledger.create_order(payload).await?;
    Ok(Json(placed))
}

/// GET /api/orders/:id - 获取单个订单
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let ledger = OrderLedger::new(state.db.clone());
    let order = ledger.find_by_id(&id).await?;
    Ok(Json(order))
}

/// GET /api/orders/track/:code - 按展示码查询订单（顾客端）
pub async fn track(
    State(state): State<ServerState>,
    Path(code): Path<String>,
) -> AppResult<Json<Order>> {
    let ledger = OrderLedger::new(state.db.clone());
    let order = ledger.track_by_display_code(&code).await?;
    Ok(Json(order))
}

/// PUT /api/orders/:id/status - 订单状态流转
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<OrderStatusUpdate>,
) -> AppResult<Json<Order>> {
    let ledger = OrderLedger::new(state.db.clone());
    let order = ledger.update_status(&id, payload.status).await?;
    Ok(Json(order))
}
