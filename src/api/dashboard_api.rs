// ==========================================
// 生产订单跟踪系统 - 驾驶舱 API
// ==========================================
// 职责: 订单进度汇总、单订单摘要、操作日志查询
// 成本列仅对 Manager 输出
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::api::order_api::require_manager;
use crate::config::{block_on_config, OrderConfigReader};
use crate::domain::action_log::ActionLog;
use crate::domain::order::Order;
use crate::domain::types::Caller;
use crate::engine::cost::CostCalculator;
use crate::engine::progress::{DashboardStats, OrderPhase, OrderProgressCalculator};
use crate::engine::shipping::ReadyToShipCalculator;
use crate::engine::visibility::Capabilities;
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::order_repo::OrderRepository;

// ==========================================
// OrderSummary - 订单摘要行
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    pub order_id: String,
    pub order_number: String,
    pub client_name: String,
    pub quantity: i64,
    pub progress: i32,            // 已完成工序占比（%）
    pub phase: OrderPhase,
    pub manufacturing_units: i64,
    pub shipped_units: i64,
    pub ready_to_ship: i64,
    pub total_cost: Option<f64>,  // 仅 Manager 可见
}

// ==========================================
// DashboardView - 驾驶舱数据
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardView {
    pub stats: DashboardStats,
    pub orders: Vec<OrderSummary>,
}

// ==========================================
// DashboardApi - 驾驶舱 API
// ==========================================
pub struct DashboardApi {
    order_repo: Arc<OrderRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    config: Arc<dyn OrderConfigReader>,
}

impl DashboardApi {
    pub fn new(
        order_repo: Arc<OrderRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        config: Arc<dyn OrderConfigReader>,
    ) -> Self {
        Self {
            order_repo,
            action_log_repo,
            config,
        }
    }

    /// 驾驶舱汇总
    pub fn get_dashboard(&self, caller: &Caller) -> ApiResult<DashboardView> {
        let limit = block_on_config(self.config.get_order_list_limit())
            .map_err(|e| ApiError::InternalError(format!("读取配置失败: {}", e)))?;
        let orders = self.order_repo.list_all(limit)?;
        let can_see_costs = Capabilities::for_role(caller.role).can_see_costs;

        Ok(DashboardView {
            stats: OrderProgressCalculator::dashboard_stats(&orders),
            orders: orders
                .iter()
                .map(|order| summarize(order, can_see_costs))
                .collect(),
        })
    }

    /// 最近操作日志（仅 Manager）
    pub fn list_recent_actions(&self, caller: &Caller, limit: i32) -> ApiResult<Vec<ActionLog>> {
        require_manager(caller, "查看操作日志")?;
        if limit <= 0 {
            return Err(ApiError::InvalidInput(format!("limit必须为正数，实际为{}", limit)));
        }
        Ok(self.action_log_repo.find_recent(limit)?)
    }

    /// 指定订单的操作日志（仅 Manager）
    pub fn list_order_actions(&self, caller: &Caller, order_id: &str) -> ApiResult<Vec<ActionLog>> {
        require_manager(caller, "查看操作日志")?;
        Ok(self.action_log_repo.find_by_order(order_id)?)
    }
}

fn summarize(order: &Order, can_see_costs: bool) -> OrderSummary {
    OrderSummary {
        order_id: order.id.clone(),
        order_number: order.order_number.clone(),
        client_name: order.client_name.clone(),
        quantity: order.quantity,
        progress: OrderProgressCalculator::order_progress(order),
        phase: OrderProgressCalculator::order_phase(order),
        manufacturing_units: OrderProgressCalculator::manufacturing_units(order),
        shipped_units: OrderProgressCalculator::shipped_units(order),
        ready_to_ship: ReadyToShipCalculator::ready_to_ship(order),
        total_cost: can_see_costs.then(|| CostCalculator::total_order_cost(order)),
    }
}
