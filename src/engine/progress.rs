// ==========================================
// 生产订单跟踪系统 - 订单进度统计
// ==========================================
// 职责: 订单整体进度、阶段判定、驾驶舱汇总
// 口径: 整体进度按"已完成工序数 / 工序总数"计,与各工序百分比无关
// ==========================================

use crate::domain::order::Order;
use crate::domain::types::StageKind;
use serde::{Deserialize, Serialize};

// ==========================================
// OrderPhase - 订单阶段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderPhase {
    NotStarted, // 没有已完成工序
    InProgress,
    Completed,  // 全部工序完成
}

// ==========================================
// DashboardStats - 驾驶舱汇总
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total: usize,
    pub not_started: usize,
    pub in_progress: usize,
    pub completed: usize,
}

pub struct OrderProgressCalculator;

impl OrderProgressCalculator {
    pub fn completed_stage_count(order: &Order) -> usize {
        order.stages.iter().filter(|s| s.is_completed()).count()
    }

    /// 整体进度百分比（无工序时为 0）
    pub fn order_progress(order: &Order) -> i32 {
        let total = order.stages.len();
        if total == 0 {
            return 0;
        }
        let completed = Self::completed_stage_count(order);
        ((completed as f64 / total as f64) * 100.0).round() as i32
    }

    pub fn order_phase(order: &Order) -> OrderPhase {
        let completed = Self::completed_stage_count(order);
        if completed == 0 {
            OrderPhase::NotStarted
        } else if completed == order.stages.len() {
            OrderPhase::Completed
        } else {
            OrderPhase::InProgress
        }
    }

    /// 加工工序完成件数
    pub fn manufacturing_units(order: &Order) -> i64 {
        order
            .stage(StageKind::Manufacturing)
            .map(|s| s.units())
            .unwrap_or(0)
    }

    /// 已发货件数
    pub fn shipped_units(order: &Order) -> i64 {
        order
            .stage(StageKind::Shipping)
            .map(|s| s.units())
            .unwrap_or(0)
    }

    pub fn dashboard_stats(orders: &[Order]) -> DashboardStats {
        orders.iter().fold(
            DashboardStats {
                total: orders.len(),
                ..Default::default()
            },
            |mut stats, order| {
                match Self::order_phase(order) {
                    OrderPhase::NotStarted => stats.not_started += 1,
                    OrderPhase::InProgress => stats.in_progress += 1,
                    OrderPhase::Completed => stats.completed += 1,
                }
                stats
            },
        )
    }
}
