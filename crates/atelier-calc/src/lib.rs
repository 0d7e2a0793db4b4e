//! # Atelier Costing Engine
//!
//! 報價成本與用料核算引擎

pub mod consumption;
pub mod engine;
pub mod project_cost;
pub mod purchase_list;
pub mod reconciliation;
pub mod unit_cost;

// Re-export 主要類型
pub use consumption::{ConsumptionAggregator, ConsumptionLine, ConsumptionReport};
pub use engine::CostingEngine;
pub use project_cost::{HeadcountProjection, LineEstimate, ProjectCostAggregator, ProjectEstimate};
pub use purchase_list::{PurchaseList, PurchaseListBuilder, PurchaseRow};
pub use reconciliation::{FabricEstimate, Reconciler, VarianceReport, VarianceTrend};
pub use unit_cost::{SizePrice, UnitCost, UnitCostCalculator};

/// 完整核算結果
#[derive(Debug, Clone)]
pub struct CostingReport {
    /// 報價估算
    pub estimate: ProjectEstimate,

    /// 實際用量
    pub consumption: ConsumptionReport,

    /// 採購清單
    pub purchase_list: PurchaseList,

    /// 估算與實際差異
    pub variance: VarianceReport,

    /// 警告信息
    pub warnings: Vec<CostingWarning>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl CostingReport {
    /// 添加警告
    pub fn add_warning(&mut self, warning: CostingWarning) {
        self.warnings.push(warning);
    }

    /// 是否有錯誤等級的警告
    pub fn has_errors(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| w.severity == WarningSeverity::Error)
    }
}

/// 核算警告
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostingWarning {
    /// 相關對象（物料名稱、量身記錄等）
    pub subject: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl CostingWarning {
    pub fn new(subject: String, message: String, severity: WarningSeverity) -> Self {
        Self {
            subject,
            message,
            severity,
        }
    }

    pub fn info(subject: String, message: String) -> Self {
        Self::new(subject, message, WarningSeverity::Info)
    }

    pub fn warning(subject: String, message: String) -> Self {
        Self::new(subject, message, WarningSeverity::Warning)
    }

    pub fn error(subject: String, message: String) -> Self {
        Self::new(subject, message, WarningSeverity::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Info,
    Warning,
    Error,
}
