//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`codes`] - 兑换码接口（签发 / 校验 / 清理）
//! - [`orders`] - 订单接口（下单 / 跟踪 / 状态流转）

pub mod codes;
pub mod health;
pub mod orders;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};
