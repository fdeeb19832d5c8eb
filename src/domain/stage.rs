// ==========================================
// 生产订单跟踪系统 - 工序领域模型
// ==========================================
// 红线: 工序序列长度固定为 8,序号与名称创建后不可变
// 用途: 订单创建时生成,之后只通过工序推进引擎修改
// ==========================================

use crate::domain::types::{StageCategory, StageKind, StageStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// ProductionStage - 生产工序
// ==========================================
// 对齐: production_stage 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionStage {
    // ===== 标识 =====
    pub id: String,              // 工序ID（订单内唯一）
    pub kind: StageKind,         // 标准工序
    pub name: String,            // 标准英文名称
    pub category: StageCategory, // 工序类别（创建时确定）

    // ===== 进度 =====
    pub status: StageStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub percentage: i32,              // 完成百分比 0-100（引擎计算）
    pub completed_units: Option<i64>, // 完成件数（仅计件工序）

    // ===== 备注 =====
    pub notes: Option<String>,
    pub responsible_person: Option<String>,
}

impl ProductionStage {
    /// 按标准工序创建初始工序（pending,零值）
    pub fn new(kind: StageKind) -> Self {
        let category = kind.category();
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            name: kind.canonical_name().to_string(),
            category,
            status: StageStatus::Pending,
            start_date: None,
            end_date: None,
            percentage: 0,
            completed_units: match category {
                StageCategory::Quantity => Some(0),
                StageCategory::Gating => None,
            },
            notes: None,
            responsible_person: None,
        }
    }

    pub fn index(&self) -> usize {
        self.kind.index()
    }

    pub fn is_gating(&self) -> bool {
        self.category == StageCategory::Gating
    }

    pub fn is_completed(&self) -> bool {
        self.status == StageStatus::Completed
    }

    /// 完成件数（缺失按 0）
    pub fn units(&self) -> i64 {
        self.completed_units.unwrap_or(0)
    }
}

/// 生成订单的标准 8 道工序
pub fn default_stages() -> Vec<ProductionStage> {
    StageKind::ALL.iter().map(|kind| ProductionStage::new(*kind)).collect()
}

// ==========================================
// StagePatch - 工序局部更新
// ==========================================
// 缺省字段保持不变；客户端提交的 percentage 一律忽略
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StagePatch {
    #[serde(default)]
    pub status: Option<StageStatus>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed_units: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub responsible_person: Option<String>,
}

impl StagePatch {
    /// 没有任何可识别字段
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.completed_units.is_none()
            && self.notes.is_none()
            && self.responsible_person.is_none()
    }

    pub fn status(mut self, status: StageStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn end_date(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    pub fn completed_units(mut self, units: i64) -> Self {
        self.completed_units = Some(units);
        self
    }

    pub fn notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    pub fn responsible_person(mut self, person: &str) -> Self {
        self.responsible_person = Some(person.to_string());
        self
    }
}
