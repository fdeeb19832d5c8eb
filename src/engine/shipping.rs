// ==========================================
// 生产订单跟踪系统 - 待发货计算器
// ==========================================
// 待发货 = max(0, 包装件数 - 发货件数)
// ==========================================

use crate::domain::order::Order;
use crate::domain::types::StageKind;

pub struct ReadyToShipCalculator;

impl ReadyToShipCalculator {
    /// 计算订单待发货件数
    pub fn ready_to_ship(order: &Order) -> i64 {
        let packaged = Self::units_of(order, StageKind::Packaging);
        let shipped = Self::units_of(order, StageKind::Shipping);
        Self::from_units(packaged, shipped)
    }

    pub fn from_units(packaged: i64, shipped: i64) -> i64 {
        (packaged - shipped).max(0)
    }

    fn units_of(order: &Order, kind: StageKind) -> i64 {
        order.stage(kind).map(|s| s.units()).unwrap_or(0)
    }
}
