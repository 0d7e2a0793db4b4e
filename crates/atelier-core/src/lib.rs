//! # Atelier Core
//!
//! 核心資料模型與類型定義

pub mod config;
pub mod fitting;
pub mod material;
pub mod project;
pub mod quote;
pub mod size_factor;

// Re-export 主要類型
pub use config::{CompanyProfile, CostingConfig};
pub use fitting::{normalize_size_label, Fitting};
pub use material::{area_to_weight_kg, length_to_weight_kg, Material, MaterialCatalog, UnitKind};
pub use project::{ActualAggregates, ProjectConfiguration, QuotingMode};
pub use quote::{LaborCosts, LineItem, MaterialClass, QuoteItem, SizeSelection};
pub use size_factor::{SizeFactorTable, NEUTRAL_SIZE};

/// 成本計算錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum CostingError {
    #[error("找不到物料: {0}")]
    MaterialNotFound(String),

    #[error("物料 {0} 以重量計價但缺少克重")]
    MissingGrammage(String),

    #[error("無效的輸入: {0}")]
    InvalidInput(String),

    #[error("找不到專案: {0}")]
    ProjectNotFound(uuid::Uuid),

    #[error("寫入失敗: {0}")]
    Persistence(String),

    #[error("配置錯誤: {0}")]
    Config(String),

    #[error("序列化錯誤: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CostingError>;
