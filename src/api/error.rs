// ==========================================
// 生产订单跟踪系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository/Engine错误为用户友好的错误消息
// ==========================================

use crate::engine::error::EngineError;
use crate::repository::error::RepositoryError;
use serde::Serialize;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("订单不存在: order_id={0}")]
    OrderNotFound(String),

    #[error("工序不存在: stage_id={0}")]
    StageNotFound(String),

    #[error("更新内容为空: 未提供任何可识别字段")]
    EmptyUpdate,

    #[error("权限不足: {0}")]
    PermissionDenied(String),

    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 并发控制错误
    // ==========================================
    #[error("乐观锁冲突: {0}")]
    OptimisticLockFailure(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 稳定错误码（供前端/调用方分支判断）
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::OrderNotFound(_) => "ORDER_NOT_FOUND",
            ApiError::StageNotFound(_) => "STAGE_NOT_FOUND",
            ApiError::EmptyUpdate => "EMPTY_UPDATE",
            ApiError::PermissionDenied(_) => "PERMISSION_DENIED",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::OptimisticLockFailure(_) => "OPTIMISTIC_LOCK_FAILURE",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::DatabaseConnectionError(_) => "DATABASE_CONNECTION_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::Other(_) => "OTHER_ERROR",
        }
    }

    /// 序列化为统一错误响应 JSON
    pub fn to_error_json(&self) -> String {
        let response = ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
        };
        serde_json::to_string(&response).unwrap_or_else(|_| self.to_string())
    }
}

/// 统一错误响应
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::OptimisticLockFailure {
                order_id,
                expected,
                actual,
            } => ApiError::OptimisticLockFailure(format!(
                "订单{}已被其他用户修改（期望revision={}，实际revision={}）",
                order_id, expected, actual
            )),

            RepositoryError::NotFound { entity, id } => {
                if entity == "Order" {
                    ApiError::OrderNotFound(id)
                } else {
                    ApiError::NotFound(format!("{}(id={})不存在", entity, id))
                }
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::InvalidInput(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::InvalidInput(format!("外键约束违反: {}", msg))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }

            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::StageNotFound { stage_id } => ApiError::StageNotFound(stage_id),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
