//! Redemption Code API Handlers

use axum::{Json, extract::State};
use serde::Serialize;

use crate::core::ServerState;
use crate::db::models::{CodeIssue, CodeValidate, CodeValidation, RedemptionCode};
use crate::db::repository::CodeRepository;
use crate::utils::AppResult;
use crate::utils::validation::{MAX_REF_LEN, validate_code_shape, validate_required_text};

/// POST /api/codes - 签发兑换码（管理端）
pub async fn issue(
    State(state): State<ServerState>,
    Json(payload): Json<CodeIssue>,
) -> AppResult<Json<RedemptionCode>> {
    validate_required_text(&payload.issued_by, "issued_by", MAX_REF_LEN)?;

    let repo = CodeRepository::new(state.db.clone());
    let code = repo.issue(payload.cup_size, &payload.issued_by).await?;

    tracing::info!(code = %code.code, cup_size = ?code.cup_size, "Redemption code issued");
    Ok(Json(code))
}

/// POST /api/codes/validate - 下单前校验（只读，不核销）
pub async fn validate(
    State(state): State<ServerState>,
    Json(payload): Json<CodeValidate>,
) -> AppResult<Json<CodeValidation>> {
    validate_code_shape(&payload.code)?;

    let repo = CodeRepository::new(state.db.clone());
    let record = repo.validate(&payload.code).await?;

    Ok(Json(CodeValidation {
        valid: true,
        cup_size: record.cup_size,
    }))
}

/// Cleanup sweep response
#[derive(Debug, Serialize)]
pub struct CleanupResult {
    pub removed: u64,
}

/// DELETE /api/codes/expired - 清理过期未用的兑换码
pub async fn cleanup_expired(
    State(state): State<ServerState>,
) -> AppResult<Json<CleanupResult>> {
    let repo = CodeRepository::new(state.db.clone());
    let removed = repo.cleanup_expired().await?;

    tracing::info!(removed, "Expired redemption codes swept");
    Ok(Json(CleanupResult { removed }))
}
