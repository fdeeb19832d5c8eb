// ==========================================
// 生产订单跟踪系统 - 领域类型定义
// ==========================================
// 工序序列: 8 道固定工序,前 3 道为门控工序,后 5 道为计件工序
// 序列化格式: snake_case (与存储和前端一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 市场类型 (Market Type)
// ==========================================
// 决定加工费率取内销费率还是外销费率
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketType {
    Domestic, // 内销
    Foreign,  // 外销
}

impl MarketType {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            MarketType::Domestic => "domestic",
            MarketType::Foreign => "foreign",
        }
    }

    /// 从字符串解析市场类型（未知值按内销处理）
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "foreign" => MarketType::Foreign,
            _ => MarketType::Domestic,
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 工序状态 (Stage Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,    // 等待
    InProgress, // 进行中
    Completed,  // 已完成
    Delayed,    // 延误
}

impl StageStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            StageStatus::Pending => "pending",
            StageStatus::InProgress => "in_progress",
            StageStatus::Completed => "completed",
            StageStatus::Delayed => "delayed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "in_progress" => StageStatus::InProgress,
            "completed" => StageStatus::Completed,
            "delayed" => StageStatus::Delayed,
            _ => StageStatus::Pending,
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 工序类别 (Stage Category)
// ==========================================
// Gating: 只有 0% / 100% 两种进度,完成时向前级联
// Quantity: 进度 = 完成件数 / 订单数量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageCategory {
    Gating,
    Quantity,
}

impl StageCategory {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            StageCategory::Gating => "gating",
            StageCategory::Quantity => "quantity",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "gating" => StageCategory::Gating,
            _ => StageCategory::Quantity,
        }
    }
}

impl fmt::Display for StageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 标准工序 (Stage Kind)
// ==========================================
// 顺序即工序序号,创建订单后不可重排
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    OrderReceived,          // 接单评估
    MaterialSearch,         // 寻找材料
    MaterialPurchase,       // 采购材料 + 到货
    MaterialPreparation,    // 材料准备（下料/端面）
    Manufacturing,          // 加工制造
    QcInspection,           // 质检
    Packaging,              // 包装
    Shipping,               // 发货
}

impl StageKind {
    /// 标准工序序列（8 道）
    pub const ALL: [StageKind; 8] = [
        StageKind::OrderReceived,
        StageKind::MaterialSearch,
        StageKind::MaterialPurchase,
        StageKind::MaterialPreparation,
        StageKind::Manufacturing,
        StageKind::QcInspection,
        StageKind::Packaging,
        StageKind::Shipping,
    ];

    /// 工序序号（0 起）
    pub fn index(&self) -> usize {
        match self {
            StageKind::OrderReceived => 0,
            StageKind::MaterialSearch => 1,
            StageKind::MaterialPurchase => 2,
            StageKind::MaterialPreparation => 3,
            StageKind::Manufacturing => 4,
            StageKind::QcInspection => 5,
            StageKind::Packaging => 6,
            StageKind::Shipping => 7,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn category(&self) -> StageCategory {
        match self {
            StageKind::OrderReceived | StageKind::MaterialSearch | StageKind::MaterialPurchase => {
                StageCategory::Gating
            }
            _ => StageCategory::Quantity,
        }
    }

    /// 标准英文名称（存储与接口使用）
    pub fn canonical_name(&self) -> &'static str {
        match self {
            StageKind::OrderReceived => "Order-received-for-estimation",
            StageKind::MaterialSearch => "Material-search",
            StageKind::MaterialPurchase => "Material-purchase-and-delivery",
            StageKind::MaterialPreparation => "Material-preparation",
            StageKind::Manufacturing => "Manufacturing",
            StageKind::QcInspection => "QC-inspection",
            StageKind::Packaging => "Packaging",
            StageKind::Shipping => "Shipping",
        }
    }

    /// i18n 键后缀
    pub fn i18n_key(&self) -> &'static str {
        match self {
            StageKind::OrderReceived => "order_received",
            StageKind::MaterialSearch => "material_search",
            StageKind::MaterialPurchase => "material_purchase",
            StageKind::MaterialPreparation => "material_preparation",
            StageKind::Manufacturing => "manufacturing",
            StageKind::QcInspection => "qc_inspection",
            StageKind::Packaging => "packaging",
            StageKind::Shipping => "shipping",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_name())
    }
}

// ==========================================
// 加工类型 (Processing Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingType {
    Turning,       // 车削
    Milling,       // 铣削
    TurnMilling,   // 车铣复合
    Grinding,      // 磨削
    HeatTreatment, // 热处理
    Sandblasting,  // 喷砂
    Galvanizing,   // 镀锌
    Locksmith,     // 钳工
}

impl ProcessingType {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ProcessingType::Turning => "turning",
            ProcessingType::Milling => "milling",
            ProcessingType::TurnMilling => "turn_milling",
            ProcessingType::Grinding => "grinding",
            ProcessingType::HeatTreatment => "heat_treatment",
            ProcessingType::Sandblasting => "sandblasting",
            ProcessingType::Galvanizing => "galvanizing",
            ProcessingType::Locksmith => "locksmith",
        }
    }
}

// ==========================================
// 访问角色 (Access Role)
// ==========================================
// Manager: 特权角色,可见成本与附件
// Employee: 受限角色,成本字段置零、附件清空
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessRole {
    Manager,
    Employee,
}

impl AccessRole {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            AccessRole::Manager => "manager",
            AccessRole::Employee => "employee",
        }
    }
}

impl fmt::Display for AccessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// Caller - 调用方身份
// ==========================================
// 由接入层完成认证后构造,API 层只读取角色
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: String,
    pub role: AccessRole,
}

impl Caller {
    pub fn new(user_id: impl Into<String>, role: AccessRole) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn manager(user_id: impl Into<String>) -> Self {
        Self::new(user_id, AccessRole::Manager)
    }

    pub fn employee(user_id: impl Into<String>) -> Self {
        Self::new(user_id, AccessRole::Employee)
    }
}
