// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 提供API层集成测试的通用辅助函数
// ==========================================

#![allow(dead_code)]

#[path = "../test_helpers.rs"]
mod test_helpers;

use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

use production_tracker::api::{DashboardApi, OrderApi, OrderLocks, StageApi};
use production_tracker::config::config_manager::ConfigManager;
use production_tracker::config::OrderConfigReader;
use production_tracker::domain::order::Order;
use production_tracker::domain::stage::ProductionStage;
use production_tracker::domain::types::{Caller, StageKind};
use production_tracker::repository::{ActionLogRepository, OrderRepository, OrderStore};

use super::test_data_builder::NewOrderBuilder;

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// 包含所有API实例和必要的依赖
pub struct ApiTestEnv {
    pub db_path: String,
    pub order_api: Arc<OrderApi>,
    pub stage_api: Arc<StageApi>,
    pub dashboard_api: Arc<DashboardApi>,

    // Repository层（用于测试数据准备）
    pub order_repo: Arc<OrderRepository>,
    pub action_log_repo: Arc<ActionLogRepository>,
    pub config_manager: Arc<ConfigManager>,
    pub order_locks: Arc<OrderLocks>,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    /// 创建新的API测试环境
    ///
    /// # 说明
    /// - 使用临时数据库文件
    /// - 初始化所有Repository和API
    pub fn new() -> Result<Self, String> {
        let (temp_file, db_path) = test_helpers::create_test_db()
            .map_err(|e| format!("创建测试数据库失败: {}", e))?;

        let conn = test_helpers::open_test_conn(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

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
            order_locks.clone(),
        ));
        let dashboard_api = Arc::new(DashboardApi::new(
            order_repo.clone(),
            action_log_repo.clone(),
            config_reader,
        ));

        Ok(Self {
            db_path,
            order_api,
            stage_api,
            dashboard_api,
            order_repo,
            action_log_repo,
            config_manager,
            order_locks,
            _temp_file: temp_file,
        })
    }

    /// 以 Manager 身份创建订单,返回完整订单（未过滤）
    pub fn create_order(&self, builder: NewOrderBuilder) -> Order {
        let created = self
            .order_api
            .create_order(&manager(), builder.build())
            .expect("创建订单失败");
        self.reload(&created.id)
    }

    /// 从数据库重新读取订单
    pub fn reload(&self, order_id: &str) -> Order {
        self.order_repo
            .find_by_id(order_id)
            .expect("查询订单失败")
            .expect("订单不存在")
    }
}

pub fn manager() -> Caller {
    Caller::manager("manager-1")
}

pub fn employee() -> Caller {
    Caller::employee("employee-1")
}

/// 按工序类型取工序ID
pub fn stage_id(order: &Order, kind: StageKind) -> String {
    order.stage(kind).expect("工序不存在").id.clone()
}

/// 在返回的工序序列中按类型查找
pub fn find_stage(stages: &[ProductionStage], kind: StageKind) -> &ProductionStage {
    stages.iter().find(|s| s.kind == kind).expect("工序不存在")
}
