// ==========================================
// 生产订单跟踪系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod action_log;
pub mod order;
pub mod stage;
pub mod types;

// 重导出核心类型
pub use action_log::{ActionLog, ActionType};
pub use order::{
    FileInfo, NewOrder, Order, OrderUpdate, DEFAULT_MINUTE_RATE_DOMESTIC,
    DEFAULT_MINUTE_RATE_FOREIGN,
};
pub use stage::{default_stages, ProductionStage, StagePatch};
pub use types::{
    AccessRole, Caller, MarketType, ProcessingType, StageCategory, StageKind, StageStatus,
};
