// ==========================================
// 生产订单跟踪系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 八道工序的生产订单进度跟踪与成本核算
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 业务规则（纯函数）
pub mod engine;

// 数据仓储层 - 数据访问
pub mod repository;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    AccessRole, Caller, MarketType, ProcessingType, StageCategory, StageKind, StageStatus,
};

// 领域实体
pub use domain::{
    default_stages, ActionLog, ActionType, FileInfo, NewOrder, Order, OrderUpdate,
    ProductionStage, StagePatch,
};

// 引擎
pub use engine::{
    CostBreakdown, CostCalculator, DashboardStats, EngineError, OrderProgressCalculator,
    ReadyToShipCalculator, StageProgressionEngine, VisibilityFilter,
};

// API
pub use api::{ApiError, ApiResult, DashboardApi, OrderApi, StageApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "生产订单跟踪系统";
