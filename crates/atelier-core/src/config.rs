//! 成本計算配置

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::size_factor::{SizeFactorTable, NEUTRAL_SIZE};
use crate::{CostingError, Result};

/// 公司資料（唯讀，提供稅率）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// 稅率（百分比，例如 14.94）
    #[serde(default, rename = "taxPercentage")]
    pub tax_percentage: Decimal,
}

impl CompanyProfile {
    pub fn new(tax_percentage: Decimal) -> Self {
        Self { tax_percentage }
    }
}

/// 成本計算配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostingConfig {
    /// 尺碼係數表
    #[serde(default)]
    pub size_factors: SizeFactorTable,

    /// 貨幣最小單位的小數位數
    ///
    /// 團體模式逐款向上取整也以此為單位；預設到分（2），設為 0 則取整到元。
    /// 待產品負責人確認。
    #[serde(default = "default_currency_scale")]
    pub currency_scale: u32,

    /// 量身記錄缺少尺碼時使用的尺碼
    #[serde(default = "default_neutral_size")]
    pub neutral_size: String,
}

fn default_currency_scale() -> u32 {
    2
}

fn default_neutral_size() -> String {
    NEUTRAL_SIZE.to_string()
}

impl CostingConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self {
            size_factors: SizeFactorTable::new(),
            currency_scale: default_currency_scale(),
            neutral_size: default_neutral_size(),
        }
    }

    /// 建構器模式：設置尺碼係數表
    pub fn with_size_factors(mut self, size_factors: SizeFactorTable) -> Self {
        self.size_factors = size_factors;
        self
    }

    /// 建構器模式：設置貨幣小數位數
    pub fn with_currency_scale(mut self, scale: u32) -> Self {
        self.currency_scale = scale;
        self
    }

    /// 建構器模式：設置中性尺碼
    pub fn with_neutral_size(mut self, label: impl Into<String>) -> Self {
        self.neutral_size = label.into();
        self
    }

    /// 從 JSON 字串載入
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: CostingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 從 JSON 檔案載入
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| CostingError::Config(format!("無法讀取 {}: {}", path.display(), e)))?;
        Self::from_json_str(&content)
    }

    /// 檢查配置
    pub fn validate(&self) -> Result<()> {
        self.size_factors.validate()?;
        if self.currency_scale > 10 {
            return Err(CostingError::Config(format!(
                "貨幣小數位數過大: {}",
                self.currency_scale
            )));
        }
        if self.neutral_size.trim().is_empty() {
            return Err(CostingError::Config("中性尺碼不可為空".to_string()));
        }
        Ok(())
    }

    /// 查詢尺碼係數（沒有尺碼時使用中性尺碼）
    pub fn factor_for(&self, label: Option<&str>) -> Decimal {
        self.size_factors.factor(label.unwrap_or(&self.neutral_size))
    }
}

impl Default for CostingConfig {
    fn default() -> Self {
        Self::new()
    }
}
