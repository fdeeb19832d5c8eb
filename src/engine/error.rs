// ==========================================
// 生产订单跟踪系统 - 引擎层错误类型
// ==========================================
// 引擎只有一种硬错误: 工序ID不在订单内
// 其余输入一律容错（缺失件数按 0,数量 ≤ 0 时进度为 0）
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("工序未找到: stage_id={stage_id}")]
    StageNotFound { stage_id: String },
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
