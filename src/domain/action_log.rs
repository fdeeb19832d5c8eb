// ==========================================
// 生产订单跟踪系统 - 操作日志领域模型
// ==========================================
// 红线: 所有写入必须记录
// 用途: 审计追踪
// 对齐: action_log 表
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

// ==========================================
// ActionLog - 操作日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,
    pub order_id: Option<String>, // 删除订单后仍保留日志
    pub action_type: String,      // 操作类型（存储为字符串）
    pub action_ts: NaiveDateTime,
    pub actor: String,            // 操作人（用户ID）

    pub payload_json: Option<JsonValue>, // 操作参数
    pub detail: Option<String>,
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    CreateOrder,
    UpdateOrder,
    DeleteOrder,
    UpdateStage,
    AttachFile,
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionType::CreateOrder => write!(f, "CREATE_ORDER"),
            ActionType::UpdateOrder => write!(f, "UPDATE_ORDER"),
            ActionType::DeleteOrder => write!(f, "DELETE_ORDER"),
            ActionType::UpdateStage => write!(f, "UPDATE_STAGE"),
            ActionType::AttachFile => write!(f, "ATTACH_FILE"),
        }
    }
}
