// ==========================================
// 生产订单跟踪系统 - 引擎层
// ==========================================
// 职责: 工序推进、成本核算、可见性、进度统计
// 红线: Engine 不拼 SQL,无 I/O,不持有可变共享状态
// ==========================================

pub mod cost;
pub mod error;
pub mod progress;
pub mod shipping;
pub mod stage_progression;
pub mod visibility;

// 重导出核心引擎
pub use cost::{CostBreakdown, CostCalculator};
pub use error::{EngineError, EngineResult};
pub use progress::{DashboardStats, OrderPhase, OrderProgressCalculator};
pub use shipping::ReadyToShipCalculator;
pub use stage_progression::StageProgressionEngine;
pub use visibility::{Capabilities, VisibilityFilter};
