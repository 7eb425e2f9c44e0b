//! 订单域 - 定价与订单账本
//!
//! - [`pricing`] - 固定价目表和价格计算
//! - [`ledger`] - 下单事务（校验 → 定价 → 集章 → 落库 → 核销）

pub mod ledger;
pub mod pricing;

pub use ledger::OrderLedger;
