//! Bingsu Server - 刨冰/奶茶点单系统核心
//!
//! # 架构概述
//!
//! 本模块提供以下核心功能：
//!
//! - **兑换码注册表** (`db::repository::redemption_code`): 一次性下单码的
//!   签发、校验与原子核销（24 小时有效）
//! - **订单账本** (`orders`): 下单事务、定价、状态机
//! - **集章卡** (`db::models::loyalty`): 每 9 个章兑换一杯免费饮品
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! src/
//! ├── core/          # 配置、状态、服务器
//! ├── api/           # HTTP 路由和处理器
//! ├── orders/        # 订单域（账本、定价）
//! ├── db/            # 数据库层（模型、仓储）
//! └── utils/         # 错误、日志、校验工具
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod orders;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use db::DbService;
pub use orders::OrderLedger;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
    ____  _
   / __ )(_)___  ____ ________  __
  / __  / / __ \/ __ `/ ___/ / / /
 / /_/ / / / / / /_/ (__  ) /_/ /
/_____/_/_/ /_/\__, /____/\__,_/
              /____/
    "#
    );
}
