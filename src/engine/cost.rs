// ==========================================
// 生产订单跟踪系统 - 成本计算器
// ==========================================
// 职责: 从订单财务字段派生单件成本与订单总成本
// 红线: 纯函数,不做取整（展示层自行取整）
// ==========================================

use crate::domain::order::Order;
use crate::domain::types::MarketType;
use serde::{Deserialize, Serialize};

// ==========================================
// CostBreakdown - 成本明细
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub material_cost_per_unit: f64,
    pub processing_rate: f64,
    pub processing_cost_per_unit: f64,
    pub total_cost_per_unit: f64,
    pub total_order_cost: f64,
}

// ==========================================
// CostCalculator - 成本计算器
// ==========================================
pub struct CostCalculator;

impl CostCalculator {
    /// 单件材料成本（数量 ≤ 0 时为 0）
    pub fn material_cost_per_unit(order: &Order) -> f64 {
        if order.quantity > 0 {
            order.material_cost / order.quantity as f64
        } else {
            0.0
        }
    }

    /// 按市场类型选取分钟费率
    pub fn processing_rate(order: &Order) -> f64 {
        match order.market_type {
            MarketType::Domestic => order.minute_rate_domestic,
            MarketType::Foreign => order.minute_rate_foreign,
        }
    }

    pub fn processing_cost_per_unit(order: &Order) -> f64 {
        order.processing_time_per_unit * Self::processing_rate(order)
    }

    pub fn total_cost_per_unit(order: &Order) -> f64 {
        Self::material_cost_per_unit(order) + Self::processing_cost_per_unit(order)
    }

    pub fn total_order_cost(order: &Order) -> f64 {
        Self::total_cost_per_unit(order) * order.quantity as f64
    }

    /// 一次性计算全部成本项
    pub fn breakdown(order: &Order) -> CostBreakdown {
        let material_cost_per_unit = Self::material_cost_per_unit(order);
        let processing_rate = Self::processing_rate(order);
        let processing_cost_per_unit = order.processing_time_per_unit * processing_rate;
        let total_cost_per_unit = material_cost_per_unit + processing_cost_per_unit;

        CostBreakdown {
            material_cost_per_unit,
            processing_rate,
            processing_cost_per_unit,
            total_cost_per_unit,
            total_order_cost: total_cost_per_unit * order.quantity as f64,
        }
    }
}
