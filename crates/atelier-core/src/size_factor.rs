//! 尺碼係數表

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::fitting::normalize_size_label;
use crate::{CostingError, Result};

/// 中性尺碼
///
/// 量身記錄沒有為基準款式指定尺碼時使用此尺碼。基準用料（BOM）是以
/// 此尺碼定義的，因此其係數固定為 1。
pub const NEUTRAL_SIZE: &str = "S, M, L";

/// 尺碼 → 布料用量係數
///
/// 係數值是工坊自行提供的配置資料；未列出的尺碼一律為 1。
/// 係數只作用於布料類（Fabric）用料。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Decimal>",
    into = "BTreeMap<String, Decimal>"
)]
pub struct SizeFactorTable {
    factors: BTreeMap<String, Decimal>,
}

impl SizeFactorTable {
    /// 創建只含中性尺碼的係數表
    pub fn new() -> Self {
        let mut factors = BTreeMap::new();
        factors.insert(NEUTRAL_SIZE.to_string(), Decimal::ONE);
        Self { factors }
    }

    /// 建構器模式：設置尺碼係數
    ///
    /// 係數必須為正數。
    pub fn with_factor(mut self, label: &str, factor: Decimal) -> Result<Self> {
        self.set_factor(label, factor)?;
        Ok(self)
    }

    /// 設置尺碼係數
    pub fn set_factor(&mut self, label: &str, factor: Decimal) -> Result<()> {
        if factor <= Decimal::ZERO {
            return Err(CostingError::Config(format!(
                "尺碼 {label} 的係數必須為正數: {factor}"
            )));
        }
        self.factors.insert(normalize_size_label(label), factor);
        Ok(())
    }

    /// 查詢係數（未知尺碼回傳 1）
    pub fn factor(&self, label: &str) -> Decimal {
        self.factors
            .get(&normalize_size_label(label))
            .copied()
            .unwrap_or(Decimal::ONE)
    }

    /// 檢查尺碼是否在表中
    pub fn contains(&self, label: &str) -> bool {
        self.factors.contains_key(&normalize_size_label(label))
    }

    /// 已配置的尺碼
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.factors.keys().map(String::as_str)
    }

    /// 檢查所有係數為正（反序列化後使用）
    pub fn validate(&self) -> Result<()> {
        match self.factors.iter().find(|(_, f)| **f <= Decimal::ZERO) {
            Some((label, factor)) => Err(CostingError::Config(format!(
                "尺碼 {label} 的係數必須為正數: {factor}"
            ))),
            None => Ok(()),
        }
    }
}

impl TryFrom<BTreeMap<String, Decimal>> for SizeFactorTable {
    type Error = CostingError;

    fn try_from(raw: BTreeMap<String, Decimal>) -> Result<Self> {
        raw.into_iter()
            .try_fold(Self::new(), |table, (label, factor)| table.with_factor(&label, factor))
    }
}

impl From<SizeFactorTable> for BTreeMap<String, Decimal> {
    fn from(table: SizeFactorTable) -> Self {
        table.factors
    }
}

impl Default for SizeFactorTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_size_is_one() {
        let table = SizeFactorTable::new();
        assert_eq!(table.factor(NEUTRAL_SIZE), Decimal::ONE);
        assert!(table.contains("s, m, l"));
    }

    #[test]
    fn test_unknown_size_defaults_to_one() {
        let table = SizeFactorTable::new()
            .with_factor("XL", Decimal::new(12, 1))
            .unwrap();

        assert_eq!(table.factor("4XL"), Decimal::ONE);
        assert_eq!(table.factor(""), Decimal::ONE);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = SizeFactorTable::new()
            .with_factor("xxl", Decimal::new(13, 1))
            .unwrap();

        assert_eq!(table.factor(" XXL "), Decimal::new(13, 1));
        assert_eq!(table.factor("xxl"), Decimal::new(13, 1));
    }

    #[test]
    fn test_deserialize_normalizes_labels() {
        let table: SizeFactorTable = serde_json::from_str(r#"{ "xl": "1.2", " 3xl ": "1.5" }"#).unwrap();

        assert_eq!(table.factor("XL"), Decimal::new(12, 1));
        assert_eq!(table.factor("3XL"), Decimal::new(15, 1));
        assert_eq!(table.factor(NEUTRAL_SIZE), Decimal::ONE);
    }

    #[test]
    fn test_rejects_non_positive_factor() {
        assert!(SizeFactorTable::new().with_factor("XL", Decimal::ZERO).is_err());
        assert!(SizeFactorTable::new().with_factor("XL", Decimal::from(-1)).is_err());
    }
}
