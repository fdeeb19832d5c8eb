// ==========================================
// 生产订单跟踪系统 - 订单领域模型
// ==========================================
// 红线: stages 长度恒为 8
// 用途: 仓储层读写,引擎层只读快照
// ==========================================

use crate::domain::stage::ProductionStage;
use crate::domain::types::{MarketType, ProcessingType, StageKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 内销默认分钟费率（本币/分钟）
pub const DEFAULT_MINUTE_RATE_DOMESTIC: f64 = 25.0;

/// 外销默认分钟费率（外币/分钟）
pub const DEFAULT_MINUTE_RATE_FOREIGN: f64 = 0.42;

// ==========================================
// Order - 生产订单
// ==========================================
// 对齐: production_order 表 + production_stage 表 + order_file 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    // ===== 主键 =====
    pub id: String,

    // ===== 描述信息 =====
    pub order_number: String,
    pub client_name: String,
    pub description: String,
    pub processing_types: Vec<ProcessingType>,

    // ===== 数量与财务 =====
    pub quantity: i64,
    pub market_type: MarketType,
    pub material_cost: f64,             // 材料总成本
    pub processing_time_per_unit: f64,  // 单件加工时间（分钟）
    pub minute_rate_domestic: f64,
    pub minute_rate_foreign: f64,

    // ===== 关联 =====
    pub files: Vec<FileInfo>,
    pub stages: Vec<ProductionStage>,

    // ===== 审计 =====
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub revision: i64, // 乐观锁版本号（每次保存工序 +1）
}

impl Order {
    pub fn stage(&self, kind: StageKind) -> Option<&ProductionStage> {
        self.stages.iter().find(|s| s.kind == kind)
    }
}

// ==========================================
// FileInfo - 附件元数据
// ==========================================
// 只记录元数据,文件内容由外部存储负责
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub id: String,
    pub filename: String,          // 存储文件名
    pub original_filename: String, // 上传时文件名
    pub file_path: String,
    pub uploaded_at: DateTime<Utc>,
}

// ==========================================
// NewOrder - 订单创建输入
// ==========================================
// 费率缺省时由配置补齐
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub order_number: String,
    pub client_name: String,
    pub description: String,
    pub quantity: i64,
    pub market_type: MarketType,
    pub material_cost: f64,
    pub processing_time_per_unit: f64,
    #[serde(default)]
    pub processing_types: Vec<ProcessingType>,
    #[serde(default)]
    pub minute_rate_domestic: Option<f64>,
    #[serde(default)]
    pub minute_rate_foreign: Option<f64>,
}

// ==========================================
// OrderUpdate - 订单字段更新
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub client_name: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub market_type: Option<MarketType>,
    pub material_cost: Option<f64>,
    pub processing_time_per_unit: Option<f64>,
    pub processing_types: Option<Vec<ProcessingType>>,
    pub minute_rate_domestic: Option<f64>,
    pub minute_rate_foreign: Option<f64>,
}

impl OrderUpdate {
    pub fn is_empty(&self) -> bool {
        self.client_name.is_none()
            && self.description.is_none()
            && self.quantity.is_none()
            && self.market_type.is_none()
            && self.material_cost.is_none()
            && self.processing_time_per_unit.is_none()
            && self.processing_types.is_none()
            && self.minute_rate_domestic.is_none()
            && self.minute_rate_foreign.is_none()
    }

    /// 将更新应用到订单（只覆盖提供的字段）
    pub fn apply_to(&self, order: &mut Order) {
        if let Some(v) = &self.client_name {
            order.client_name = v.clone();
        }
        if let Some(v) = &self.description {
            order.description = v.clone();
        }
        if let Some(v) = self.quantity {
            order.quantity = v;
        }
        if let Some(v) = self.market_type {
            order.market_type = v;
        }
        if let Some(v) = self.material_cost {
            order.material_cost = v;
        }
        if let Some(v) = self.processing_time_per_unit {
            order.processing_time_per_unit = v;
        }
        if let Some(v) = &self.processing_types {
            order.processing_types = v.clone();
        }
        if let Some(v) = self.minute_rate_domestic {
            order.minute_rate_domestic = v;
        }
        if let Some(v) = self.minute_rate_foreign {
            order.minute_rate_foreign = v;
        }
    }
}
