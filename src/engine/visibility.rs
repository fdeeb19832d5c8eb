// ==========================================
// 生产订单跟踪系统 - 角色可见性过滤
// ==========================================
// 职责: 按访问角色生成订单视图
// 红线: 纯函数,不修改存储中的订单
// ==========================================
// Manager: 原样返回
// Employee: 材料成本与两档费率置零,附件清空,数量与工序数据保留
// ==========================================

use crate::domain::order::Order;
use crate::domain::types::AccessRole;

// ==========================================
// Capabilities - 角色能力
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub can_see_costs: bool,
    pub can_see_files: bool,
    pub can_manage_orders: bool,
}

impl Capabilities {
    /// 每个角色一组固定能力
    pub fn for_role(role: AccessRole) -> Self {
        match role {
            AccessRole::Manager => Capabilities {
                can_see_costs: true,
                can_see_files: true,
                can_manage_orders: true,
            },
            AccessRole::Employee => Capabilities {
                can_see_costs: false,
                can_see_files: false,
                can_manage_orders: false,
            },
        }
    }
}

// ==========================================
// VisibilityFilter - 可见性过滤器
// ==========================================
pub struct VisibilityFilter;

impl VisibilityFilter {
    /// 生成角色视图
    pub fn filter_for_role(order: &Order, role: AccessRole) -> Order {
        let caps = Capabilities::for_role(role);
        let mut view = order.clone();

        if !caps.can_see_costs {
            view.material_cost = 0.0;
            view.minute_rate_domestic = 0.0;
            view.minute_rate_foreign = 0.0;
        }
        if !caps.can_see_files {
            view.files.clear();
        }

        view
    }

    /// 批量过滤
    pub fn filter_all(orders: Vec<Order>, role: AccessRole) -> Vec<Order> {
        if role == AccessRole::Manager {
            return orders;
        }
        orders
            .iter()
            .map(|order| Self::filter_for_role(order, role))
            .collect()
    }
}
