// ==========================================
// 生产订单跟踪系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::api::{DashboardApi, OrderApi, OrderLocks, StageApi};
use crate::config::config_manager::ConfigManager;
use crate::config::OrderConfigReader;
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::order_repo::OrderRepository;
use crate::repository::order_store::OrderStore;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "PRODUCTION_TRACKER_DB";

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 订单API
    pub order_api: Arc<OrderApi>,

    /// 工序API
    pub stage_api: Arc<StageApi>,

    /// 驾驶舱API
    pub dashboard_api: Arc<DashboardApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开共享连接并建表（幂等）
    /// 2. 初始化所有Repository
    /// 3. 创建所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = crate::db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        crate::db::ensure_schema(&conn).map_err(|e| format!("建表失败: {}", e))?;

        let schema_version = crate::db::read_schema_version(&conn)
            .map_err(|e| format!("读取schema_version失败: {}", e))?;
        if let Some(version) = schema_version {
            if version > crate::db::CURRENT_SCHEMA_VERSION {
                return Err(format!(
                    "数据库schema_version={}高于程序支持的版本{}",
                    version,
                    crate::db::CURRENT_SCHEMA_VERSION
                ));
            }
        }
        tracing::info!("数据库schema_version: {:?}", schema_version);

        Self::from_connection(db_path, Arc::new(Mutex::new(conn)))
    }

    /// 从已打开的共享连接组装（连接需已建表）
    pub fn from_connection(db_path: String, conn: Arc<Mutex<Connection>>) -> Result<Self, String> {
        // ==========================================
        // 初始化Repository层
        // ==========================================
        let order_repo = Arc::new(OrderRepository::new(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::new(conn.clone()));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let config_reader: Arc<dyn OrderConfigReader> = config_manager.clone();
        let order_store: Arc<dyn OrderStore> = order_repo.clone();

        // 订单级锁在订单API与工序API之间共享
        let order_locks = Arc::new(OrderLocks::new());

        // ==========================================
        // 初始化API层
        // ==========================================
        let order_api = Arc::new(OrderApi::new(
            order_repo.clone(),
            action_log_repo.clone(),
            config_reader.clone(),
            order_locks.clone(),
        ));
        let stage_api = Arc::new(StageApi::new(
            order_store,
            action_log_repo.clone(),
            order_locks,
        ));
        let dashboard_api = Arc::new(DashboardApi::new(
            order_repo,
            action_log_repo,
            config_reader,
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            order_api,
            stage_api,
            dashboard_api,
            config_manager,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 PRODUCTION_TRACKER_DB → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./production_tracker.db");

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("production-tracker-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("production-tracker");
        }

        // 确保目录存在
        std::fs::create_dir_all(&path).ok();
        path = path.join("production_tracker.db");
    }

    path.to_string_lossy().to_string()
}
