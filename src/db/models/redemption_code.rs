//! Redemption Code Model
//!
//! 一次性下单码：管理端签发，客户下单时核销，24 小时有效。

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Cup size for an order; fixed at issuance time by the admin
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CupSize {
    S,
    M,
    L,
}

/// Redemption code lifecycle state
///
/// Unused→Used happens exactly once, through the conditional redeem update.
/// An expired code keeps reading `Unused` but is never redeemable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CodeState {
    Unused,
    Used,
}

/// Redemption code entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedemptionCode {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    /// 5-char uppercase [A-Z0-9] value, unique among currently-unused codes
    pub code: String,
    pub cup_size: CupSize,
    pub state: CodeState,
    /// Opaque reference to the issuing admin (supplied by the auth layer)
    pub issued_by: String,
    /// Set iff state = Used
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub order_ref: Option<RecordId>,
    /// Set iff state = Used
    pub used_at: Option<i64>,
    pub issued_at: i64,
    pub expires_at: i64,
}

/// Issue code payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeIssue {
    pub cup_size: CupSize,
    pub issued_by: String,
}

/// Validate code payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeValidate {
    pub code: String,
}

/// Validate code response (read-only preview; nothing is reserved)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeValidation {
    pub valid: bool,
    pub cup_size: CupSize,
}
