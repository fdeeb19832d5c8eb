// ==========================================
// 生产订单跟踪系统 - API 层
// ==========================================
// 职责: 用例边界,角色校验,错误映射；传输层可直接包装
// ==========================================

pub mod dashboard_api;
pub mod error;
pub mod order_api;
pub mod order_locks;
pub mod stage_api;

// 重导出核心类型
pub use dashboard_api::{DashboardApi, DashboardView, OrderSummary};
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use order_api::OrderApi;
pub use order_locks::OrderLocks;
pub use stage_api::{StageApi, StageUpdateResponse, STAGE_UPDATED_MESSAGE};
