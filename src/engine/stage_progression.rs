// ==========================================
// 生产订单跟踪系统 - 工序推进引擎
// ==========================================
// 职责: 应用单道工序的局部更新,重算进度,并向前级联修正同订单其他工序
// 输入: 订单快照 + 工序ID + StagePatch + 当前日期
// 输出: 新的工序序列（不修改输入订单）
// 红线: 引擎无状态、无 I/O,唯一硬错误为 StageNotFound
// ==========================================
// 级联规则（按类别互斥）:
// - 门控工序完成 → 之前所有工序置为完成,只补空日期
// - 计件工序件数增加 → 之前计件工序件数抬升到当前值
// ==========================================

use crate::domain::order::Order;
use crate::domain::stage::{ProductionStage, StagePatch};
use crate::domain::types::{StageCategory, StageStatus};
use crate::engine::error::{EngineError, EngineResult};
use chrono::NaiveDate;
use tracing::{debug, instrument};

// ==========================================
// StageProgressionEngine - 工序推进引擎
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct StageProgressionEngine;

impl StageProgressionEngine {
    /// 创建新的工序推进引擎
    pub fn new() -> Self {
        Self
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 应用工序更新（主入口）
    ///
    /// # 参数
    /// - order: 订单快照（只读）
    /// - stage_id: 目标工序ID
    /// - patch: 局部更新（缺省字段不变）
    /// - today: 当前日期（计件工序自动补开工日期时使用）
    ///
    /// # 返回
    /// - Ok(Vec<ProductionStage>): 更新后的完整工序序列
    /// - Err(EngineError::StageNotFound): 工序ID不在订单内
    #[instrument(skip(self, order, patch), fields(order_id = %order.id))]
    pub fn apply_stage_update(
        &self,
        order: &Order,
        stage_id: &str,
        patch: &StagePatch,
        today: NaiveDate,
    ) -> EngineResult<Vec<ProductionStage>> {
        // === 步骤 1: 定位目标工序 ===
        let stage_index = order
            .stages
            .iter()
            .position(|s| s.id == stage_id)
            .ok_or_else(|| EngineError::StageNotFound {
                stage_id: stage_id.to_string(),
            })?;

        let mut stages = order.stages.clone();
        let quantity = order.quantity;

        // === 步骤 2-4: 应用补丁、重算进度、自动转入进行中 ===
        {
            let stage = &mut stages[stage_index];
            Self::apply_patch(stage, patch);
            stage.percentage = Self::calculate_percentage(stage, quantity);

            if stage.category == StageCategory::Quantity && stage.units() > 0 {
                if stage.status == StageStatus::Pending {
                    stage.status = StageStatus::InProgress;
                }
                if stage.start_date.is_none() {
                    stage.start_date = Some(today);
                }
            }
        }

        // === 步骤 5: 级联 ===
        match stages[stage_index].category {
            StageCategory::Gating => Self::cascade_gating_completion(&mut stages, stage_index),
            StageCategory::Quantity => {
                Self::forward_fill_quantities(&mut stages, stage_index, quantity)
            }
        }

        Ok(stages)
    }

    /// 计算工序完成百分比
    ///
    /// - 门控工序: 已完成 100,否则 0
    /// - 计件工序: round(件数 / 订单数量 × 100),截断到 [0, 100]；数量 ≤ 0 时为 0
    ///
    /// 取整采用银行家舍入（四舍六入五成双）
    pub fn calculate_percentage(stage: &ProductionStage, quantity: i64) -> i32 {
        match stage.category {
            StageCategory::Gating => {
                if stage.is_completed() {
                    100
                } else {
                    0
                }
            }
            StageCategory::Quantity => Self::quantity_percentage(stage.units(), quantity),
        }
    }

    /// 计件进度公式
    pub fn quantity_percentage(completed_units: i64, quantity: i64) -> i32 {
        if quantity <= 0 {
            return 0;
        }
        let raw = (completed_units as f64 / quantity as f64) * 100.0;
        raw.round_ties_even().clamp(0.0, 100.0) as i32
    }

    // ==========================================
    // 内部步骤
    // ==========================================

    /// 直接字段覆盖,不做合并
    fn apply_patch(stage: &mut ProductionStage, patch: &StagePatch) {
        if let Some(status) = patch.status {
            stage.status = status;
        }
        if let Some(start_date) = patch.start_date {
            stage.start_date = Some(start_date);
        }
        if let Some(end_date) = patch.end_date {
            stage.end_date = Some(end_date);
        }
        if let Some(units) = patch.completed_units {
            stage.completed_units = Some(units);
        }
        if let Some(notes) = &patch.notes {
            stage.notes = Some(notes.clone());
        }
        if let Some(person) = &patch.responsible_person {
            stage.responsible_person = Some(person.clone());
        }
    }

    /// 门控工序完成后,之前的工序全部置为完成
    ///
    /// 已手工填写的日期不覆盖
    fn cascade_gating_completion(stages: &mut [ProductionStage], stage_index: usize) {
        let current = &stages[stage_index];
        if !current.is_completed() {
            return;
        }

        let fill_start = current.start_date.or(current.end_date);
        let fill_end = current.end_date;

        for prev in stages[..stage_index].iter_mut() {
            if prev.is_completed() {
                continue;
            }

            prev.status = StageStatus::Completed;
            prev.percentage = 100;
            if prev.start_date.is_none() {
                prev.start_date = fill_start;
            }
            if prev.end_date.is_none() {
                prev.end_date = fill_end;
            }

            debug!(
                stage = %prev.name,
                trigger_index = stage_index,
                "门控级联: 前序工序自动完成"
            );
        }
    }

    /// 计件工序件数向前抬升
    ///
    /// 只影响计件类别、序号小于当前工序、且件数更少的工序
    fn forward_fill_quantities(stages: &mut [ProductionStage], stage_index: usize, quantity: i64) {
        let current_units = stages[stage_index].units();
        if current_units <= 0 {
            return;
        }
        let current_start = stages[stage_index].start_date;

        for prev in stages[..stage_index]
            .iter_mut()
            .filter(|s| s.category == StageCategory::Quantity)
        {
            if current_units <= prev.units() {
                continue;
            }

            prev.completed_units = Some(current_units);
            prev.percentage = Self::quantity_percentage(current_units, quantity);

            if prev.status == StageStatus::Pending {
                prev.status = StageStatus::InProgress;
            }
            if prev.start_date.is_none() {
                prev.start_date = current_start;
            }

            debug!(
                stage = %prev.name,
                completed_units = current_units,
                trigger_index = stage_index,
                "件数级联: 前序工序件数抬升"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::Order;
    use crate::domain::stage::default_stages;
    use crate::domain::types::{MarketType, StageKind};
    use chrono::Utc;

    fn create_test_order(quantity: i64) -> Order {
        Order {
            id: "ORD001".to_string(),
            order_number: "PO-001".to_string(),
            client_name: "Test Client".to_string(),
            description: "test".to_string(),
            processing_types: vec![],
            quantity,
            market_type: MarketType::Domestic,
            material_cost: 1000.0,
            processing_time_per_unit: 45.0,
            minute_rate_domestic: 25.0,
            minute_rate_foreign: 0.42,
            files: vec![],
            stages: default_stages(),
            created_at: Utc::now(),
            created_by: "u1".to_string(),
            revision: 0,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn stage_id(order: &Order, kind: StageKind) -> String {
        order.stage(kind).unwrap().id.clone()
    }

    #[test]
    fn test_unknown_stage_id() {
        let engine = StageProgressionEngine::new();
        let order = create_test_order(10);
        let before = order.stages.clone();

        let result = engine.apply_stage_update(
            &order,
            "missing",
            &StagePatch::default().completed_units(5),
            day(1),
        );

        match result {
            Err(EngineError::StageNotFound { stage_id }) => assert_eq!(stage_id, "missing"),
            other => panic!("Expected StageNotFound, got {:?}", other),
        }
        assert_eq!(order.stages, before);
    }

    #[test]
    fn test_gating_percentage_follows_status() {
        let engine = StageProgressionEngine::new();
        let order = create_test_order(10);
        let id = stage_id(&order, StageKind::OrderReceived);

        let stages = engine
            .apply_stage_update(
                &order,
                &id,
                &StagePatch::default().status(StageStatus::InProgress),
                day(1),
            )
            .unwrap();
        assert_eq!(stages[0].percentage, 0);
        assert_eq!(stages[0].status, StageStatus::InProgress);

        let stages = engine
            .apply_stage_update(
                &order,
                &id,
                &StagePatch::default().status(StageStatus::Completed),
                day(1),
            )
            .unwrap();
        assert_eq!(stages[0].percentage, 100);
    }

    #[test]
    fn test_gating_completion_cascades_backward() {
        let engine = StageProgressionEngine::new();
        let mut order = create_test_order(10);
        // 第一道工序已手工填写开工日期
        order.stages[0].start_date = Some(day(2));

        let id = stage_id(&order, StageKind::MaterialPurchase);
        let patch = StagePatch::default()
            .status(StageStatus::Completed)
            .start_date(day(5))
            .end_date(day(8));
        let stages = engine.apply_stage_update(&order, &id, &patch, day(20)).unwrap();

        for stage in &stages[..3] {
            assert_eq!(stage.status, StageStatus::Completed);
            assert_eq!(stage.percentage, 100);
            assert_eq!(stage.end_date, Some(day(8)));
        }
        assert_eq!(stages[0].start_date, Some(day(2)), "手工日期不可覆盖");
        assert_eq!(stages[1].start_date, Some(day(5)));

        // 计件工序不受影响
        for stage in &stages[3..] {
            assert_eq!(stage.status, StageStatus::Pending);
            assert_eq!(stage.percentage, 0);
        }
    }

    #[test]
    fn test_gating_cascade_start_falls_back_to_end_date() {
        let engine = StageProgressionEngine::new();
        let order = create_test_order(10);
        let id = stage_id(&order, StageKind::MaterialSearch);

        let patch = StagePatch::default()
            .status(StageStatus::Completed)
            .end_date(day(9));
        let stages = engine.apply_stage_update(&order, &id, &patch, day(20)).unwrap();

        assert_eq!(stages[0].start_date, Some(day(9)));
        assert_eq!(stages[0].end_date, Some(day(9)));
        assert_eq!(stages[1].start_date, None);
    }

    #[test]
    fn test_gating_cascade_skips_already_completed() {
        let engine = StageProgressionEngine::new();
        let mut order = create_test_order(10);
        order.stages[0].status = StageStatus::Completed;
        order.stages[0].percentage = 100;

        let id = stage_id(&order, StageKind::MaterialSearch);
        let patch = StagePatch::default()
            .status(StageStatus::Completed)
            .start_date(day(3))
            .end_date(day(4));
        let stages = engine.apply_stage_update(&order, &id, &patch, day(20)).unwrap();

        // 已完成的工序保持原样（日期不补）
        assert_eq!(stages[0].start_date, None);
        assert_eq!(stages[0].end_date, None);
    }

    #[test]
    fn test_gating_not_completed_no_cascade() {
        let engine = StageProgressionEngine::new();
        let order = create_test_order(10);
        let id = stage_id(&order, StageKind::MaterialPurchase);

        let stages = engine
            .apply_stage_update(
                &order,
                &id,
                &StagePatch::default().status(StageStatus::Delayed),
                day(1),
            )
            .unwrap();

        assert_eq!(stages[0].status, StageStatus::Pending);
        assert_eq!(stages[1].status, StageStatus::Pending);
        assert_eq!(stages[2].status, StageStatus::Delayed);
    }

    #[test]
    fn test_quantity_percentage_and_auto_start() {
        let engine = StageProgressionEngine::new();
        let order = create_test_order(100);
        let id = stage_id(&order, StageKind::MaterialPreparation);

        let stages = engine
            .apply_stage_update(&order, &id, &StagePatch::default().completed_units(25), day(7))
            .unwrap();

        assert_eq!(stages[3].percentage, 25);
        assert_eq!(stages[3].status, StageStatus::InProgress);
        assert_eq!(stages[3].start_date, Some(day(7)));
    }

    #[test]
    fn test_quantity_keeps_manual_start_and_status() {
        let engine = StageProgressionEngine::new();
        let order = create_test_order(100);
        let id = stage_id(&order, StageKind::Manufacturing);

        let patch = StagePatch::default()
            .completed_units(10)
            .status(StageStatus::Delayed)
            .start_date(day(2));
        let stages = engine.apply_stage_update(&order, &id, &patch, day(7)).unwrap();

        assert_eq!(stages[4].status, StageStatus::Delayed);
        assert_eq!(stages[4].start_date, Some(day(2)));
    }

    #[test]
    fn test_quantity_forward_fill() {
        let engine = StageProgressionEngine::new();
        let mut order = create_test_order(100);
        // 质检前: 下料 60 件（不受影响）,加工 20 件（被抬升）
        order.stages[3].completed_units = Some(60);
        order.stages[3].percentage = 60;
        order.stages[3].status = StageStatus::InProgress;
        order.stages[4].completed_units = Some(20);
        order.stages[4].percentage = 20;
        order.stages[4].status = StageStatus::InProgress;

        let id = stage_id(&order, StageKind::QcInspection);
        let patch = StagePatch::default().completed_units(40).start_date(day(3));
        let stages = engine.apply_stage_update(&order, &id, &patch, day(10)).unwrap();

        assert_eq!(stages[3].completed_units, Some(60));
        assert_eq!(stages[3].percentage, 60);
        assert_eq!(stages[4].completed_units, Some(40));
        assert_eq!(stages[4].percentage, 40);
        assert_eq!(stages[5].completed_units, Some(40));

        // 之后的工序不受影响
        assert_eq!(stages[6].completed_units, Some(0));
        assert_eq!(stages[7].completed_units, Some(0));
        // 门控工序不受影响
        assert_eq!(stages[0].status, StageStatus::Pending);
    }

    #[test]
    fn test_forward_fill_promotes_pending_and_backfills_start() {
        let engine = StageProgressionEngine::new();
        let order = create_test_order(50);
        let id = stage_id(&order, StageKind::Packaging);

        let stages = engine
            .apply_stage_update(&order, &id, &StagePatch::default().completed_units(50), day(12))
            .unwrap();

        for stage in &stages[3..=6] {
            assert_eq!(stage.completed_units, Some(50));
            assert_eq!(stage.percentage, 100);
            assert_eq!(stage.status, StageStatus::InProgress);
            assert_eq!(stage.start_date, Some(day(12)));
        }
        assert_eq!(stages[7].completed_units, Some(0));
    }

    #[test]
    fn test_zero_units_no_forward_fill() {
        let engine = StageProgressionEngine::new();
        let mut order = create_test_order(10);
        order.stages[3].completed_units = Some(-2);

        let id = stage_id(&order, StageKind::Manufacturing);
        let stages = engine
            .apply_stage_update(&order, &id, &StagePatch::default().completed_units(0), day(1))
            .unwrap();

        assert_eq!(stages[3].completed_units, Some(-2));
        assert_eq!(stages[4].status, StageStatus::Pending);
        assert_eq!(stages[4].start_date, None);
    }

    #[test]
    fn test_units_over_quantity_clamped_percentage() {
        let engine = StageProgressionEngine::new();
        let order = create_test_order(10);
        let id = stage_id(&order, StageKind::Manufacturing);

        let stages = engine
            .apply_stage_update(&order, &id, &StagePatch::default().completed_units(15), day(1))
            .unwrap();

        // 件数原值保留,进度截断
        assert_eq!(stages[4].completed_units, Some(15));
        assert_eq!(stages[4].percentage, 100);
        assert_eq!(stages[3].completed_units, Some(15));
        assert_eq!(stages[3].percentage, 100);
    }

    #[test]
    fn test_non_positive_quantity_zero_percentage() {
        let engine = StageProgressionEngine::new();
        let order = create_test_order(0);
        let id = stage_id(&order, StageKind::Manufacturing);

        let stages = engine
            .apply_stage_update(&order, &id, &StagePatch::default().completed_units(5), day(1))
            .unwrap();

        assert_eq!(stages[4].percentage, 0);
        assert_eq!(stages[3].percentage, 0);
        assert_eq!(stages[3].completed_units, Some(5));
    }

    #[test]
    fn test_quantity_percentage_formula() {
        assert_eq!(StageProgressionEngine::quantity_percentage(33, 100), 33);
        assert_eq!(StageProgressionEngine::quantity_percentage(1, 3), 33);
        assert_eq!(StageProgressionEngine::quantity_percentage(2, 3), 67);
        assert_eq!(StageProgressionEngine::quantity_percentage(5, -1), 0);
        assert_eq!(StageProgressionEngine::quantity_percentage(-5, 10), 0);
        // 12.5 → 12, 37.5 → 38（五成双）
        assert_eq!(StageProgressionEngine::quantity_percentage(1, 8), 12);
        assert_eq!(StageProgressionEngine::quantity_percentage(3, 8), 38);
    }

    #[test]
    fn test_notes_and_responsible_person_only() {
        let engine = StageProgressionEngine::new();
        let order = create_test_order(10);
        let id = stage_id(&order, StageKind::Shipping);

        let patch = StagePatch::default()
            .notes("waiting for truck")
            .responsible_person("Ivan");
        let stages = engine.apply_stage_update(&order, &id, &patch, day(1)).unwrap();

        assert_eq!(stages[7].notes.as_deref(), Some("waiting for truck"));
        assert_eq!(stages[7].responsible_person.as_deref(), Some("Ivan"));
        assert_eq!(stages[7].status, StageStatus::Pending);
        assert_eq!(stages[7].start_date, None);
    }

    #[test]
    fn test_input_order_not_mutated() {
        let engine = StageProgressionEngine::new();
        let order = create_test_order(10);
        let before = order.clone();
        let id = stage_id(&order, StageKind::Shipping);

        let stages = engine
            .apply_stage_update(&order, &id, &StagePatch::default().completed_units(4), day(1))
            .unwrap();

        assert_eq!(order, before);
        assert_eq!(stages.len(), 8);
        assert_ne!(stages, before.stages);
    }
}
