use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::core::Config;
use crate::db::DbService;

/// 服务器状态 - 持有配置和数据库的共享引用
///
/// 所有 HTTP handler 通过 axum `State` 提取器共享此结构；
/// `Surreal<Db>` 内部已是 Arc，clone 成本极低。
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造，测试场景常用)
    pub fn new(config: Config, db: Surreal<Db>) -> Self {
        Self { config, db }
    }

    /// 初始化服务器状态
    ///
    /// 1. 确保工作目录结构存在
    /// 2. 打开数据库 (work_dir/database)
    ///
    /// # Panics
    ///
    /// 工作目录或数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_service = DbService::open(&config.database_dir())
            .await
            .expect("Failed to initialize database");

        Self::new(config.clone(), db_service.db)
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }
}
