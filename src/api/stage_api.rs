// ==========================================
// 生产订单跟踪系统 - 工序 API
// ==========================================
// 职责: 工序更新边界层（读取订单 → 引擎计算 → 带版本号保存 → 记录日志）
// 并发: 进程内按 order_id 加锁 + revision 乐观锁,冲突不重试
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::api::order_locks::OrderLocks;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::stage::{ProductionStage, StagePatch};
use crate::domain::types::Caller;
use crate::engine::stage_progression::StageProgressionEngine;
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::error::RepositoryError;
use crate::repository::order_store::OrderStore;

/// 工序更新成功提示
pub const STAGE_UPDATED_MESSAGE: &str = "Stage updated successfully";

// ==========================================
// StageUpdateResponse - 工序更新响应
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageUpdateResponse {
    pub message: String,
    pub stages: Vec<ProductionStage>,
}

// ==========================================
// StageApi - 工序 API
// ==========================================
pub struct StageApi {
    order_store: Arc<dyn OrderStore>,
    action_log_repo: Arc<ActionLogRepository>,
    engine: StageProgressionEngine,
    order_locks: Arc<OrderLocks>,
}

impl StageApi {
    pub fn new(
        order_store: Arc<dyn OrderStore>,
        action_log_repo: Arc<ActionLogRepository>,
        order_locks: Arc<OrderLocks>,
    ) -> Self {
        Self {
            order_store,
            action_log_repo,
            engine: StageProgressionEngine::new(),
            order_locks,
        }
    }

    /// 更新工序（任意角色）
    ///
    /// # 错误
    /// - `ApiError::EmptyUpdate`: 补丁不含任何字段
    /// - `ApiError::OrderNotFound`: 订单不存在
    /// - `ApiError::StageNotFound`: 工序ID不在订单内
    /// - `ApiError::OptimisticLockFailure`: 其他进程已先行保存
    pub fn update_stage(
        &self,
        caller: &Caller,
        order_id: &str,
        stage_id: &str,
        patch: StagePatch,
    ) -> ApiResult<StageUpdateResponse> {
        let today = chrono::Local::now().date_naive();
        self.update_stage_on(caller, order_id, stage_id, patch, today)
    }

    /// 以指定日期作为"今天"更新工序
    pub fn update_stage_on(
        &self,
        caller: &Caller,
        order_id: &str,
        stage_id: &str,
        patch: StagePatch,
        today: NaiveDate,
    ) -> ApiResult<StageUpdateResponse> {
        if patch.is_empty() {
            return Err(ApiError::EmptyUpdate);
        }

        let (stages, revision) = self.order_locks.with_lock(order_id, || {
            self.apply_and_save(order_id, stage_id, &patch, today)
        })?;

        // 工序已提交,审计日志写入失败不回滚更新
        let action_log = ActionLog {
            action_id: Uuid::new_v4().to_string(),
            order_id: Some(order_id.to_string()),
            action_type: ActionType::UpdateStage.to_string(),
            action_ts: chrono::Local::now().naive_local(),
            actor: caller.user_id.clone(),
            payload_json: Some(json!({
                "stage_id": stage_id,
                "patch": patch,
                "revision": revision,
            })),
            detail: stages
                .iter()
                .find(|s| s.id == stage_id)
                .map(|s| format!("更新工序: {} ({}%)", s.name, s.percentage)),
        };
        if let Err(e) = self.action_log_repo.insert(&action_log) {
            warn!(order_id = %order_id, stage_id = %stage_id, error = %e, "工序更新日志写入失败");
        }

        info!(order_id = %order_id, stage_id = %stage_id, actor = %caller.user_id, "工序已更新");
        Ok(StageUpdateResponse {
            message: STAGE_UPDATED_MESSAGE.to_string(),
            stages,
        })
    }

    /// 读取 → 引擎计算 → 带版本号保存,返回新工序序列与保存后的 revision
    fn apply_and_save(
        &self,
        order_id: &str,
        stage_id: &str,
        patch: &StagePatch,
        today: NaiveDate,
    ) -> ApiResult<(Vec<ProductionStage>, i64)> {
        let order = self
            .order_store
            .load_order(order_id)?
            .ok_or_else(|| ApiError::OrderNotFound(order_id.to_string()))?;

        let stages = self
            .engine
            .apply_stage_update(&order, stage_id, patch, today)?;

        if let Err(e) = self.order_store.save_stages(order_id, &stages, order.revision) {
            if matches!(e, RepositoryError::OptimisticLockFailure { .. }) {
                warn!(order_id = %order_id, stage_id = %stage_id, error = %e, "工序保存冲突");
            }
            return Err(e.into());
        }
        Ok((stages, order.revision + 1))
    }
}
