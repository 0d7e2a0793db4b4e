//! 專案配置模型

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::quote::LineItem;

/// 報價模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotingMode {
    /// 個人：每位量身參與者購買一件，按尺碼報價
    Individual,
    /// 團體：每款報價一次，乘以申報批量
    Group,
}

/// 實際用量彙總（僅由用量彙總器寫入）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActualAggregates {
    /// 布料總長度
    #[serde(rename = "surfaceTotale")]
    pub total_fabric_length: Decimal,

    /// 布料總成本
    #[serde(rename = "coutTissuTotal")]
    pub total_fabric_cost: Decimal,

    /// 參與彙總的量身記錄數
    #[serde(default)]
    pub fitting_count: usize,

    /// 計算時間（外部存放只保存兩個總量時為空）
    #[serde(default)]
    pub computed_at: Option<DateTime<Utc>>,
}

impl ActualAggregates {
    pub fn new(total_fabric_length: Decimal, total_fabric_cost: Decimal, fitting_count: usize) -> Self {
        Self {
            total_fabric_length,
            total_fabric_cost,
            fitting_count,
            computed_at: Some(Utc::now()),
        }
    }

    /// 全部為零的彙總
    pub fn zero() -> Self {
        Self::new(Decimal::ZERO, Decimal::ZERO, 0)
    }

    /// 數值是否相同（忽略計算時間）
    pub fn same_totals(&self, other: &ActualAggregates) -> bool {
        self.total_fabric_length == other.total_fabric_length
            && self.total_fabric_cost == other.total_fabric_cost
            && self.fitting_count == other.fitting_count
    }
}

/// 專案配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfiguration {
    /// 專案ID
    pub id: Uuid,

    /// 名稱
    pub name: String,

    /// 報價模式
    pub mode: QuotingMode,

    /// 款式（第一款為基準款式）
    #[serde(default)]
    pub line_items: Vec<LineItem>,

    /// 實際用量彙總
    #[serde(default, flatten)]
    pub actuals: Option<ActualAggregates>,
}

impl ProjectConfiguration {
    /// 創建新的專案
    pub fn new(name: impl Into<String>, mode: QuotingMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            mode,
            line_items: Vec::new(),
            actuals: None,
        }
    }

    /// 建構器模式：加入款式
    pub fn with_line_item(mut self, line_item: LineItem) -> Self {
        self.line_items.push(line_item);
        self
    }

    /// 基準款式（第一款）
    pub fn baseline(&self) -> Option<&LineItem> {
        self.line_items.first()
    }

    /// 依ID查找款式
    pub fn line_item(&self, id: Uuid) -> Option<&LineItem> {
        self.line_items.iter().find(|line| line.id == id)
    }

    /// 依ID查找款式（可修改）
    pub fn line_item_mut(&mut self, id: Uuid) -> Option<&mut LineItem> {
        self.line_items.iter_mut().find(|line| line.id == id)
    }

    /// 移除款式
    pub fn remove_line_item(&mut self, id: Uuid) -> Option<LineItem> {
        let index = self.line_items.iter().position(|line| line.id == id)?;
        Some(self.line_items.remove(index))
    }

    /// 寫入實際用量彙總
    pub fn apply_actuals(&mut self, actuals: ActualAggregates) {
        self.actuals = Some(actuals);
    }

    /// 已儲存的布料總長度（未計算時為零）
    pub fn total_fabric_length(&self) -> Decimal {
        self.actuals
            .map(|a| a.total_fabric_length)
            .unwrap_or(Decimal::ZERO)
    }

    /// 已儲存的布料總成本（未計算時為零）
    pub fn total_fabric_cost(&self) -> Decimal {
        self.actuals
            .map(|a| a.total_fabric_cost)
            .unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_is_first_line_item() {
        let project = ProjectConfiguration::new("Chorale", QuotingMode::Individual)
            .with_line_item(LineItem::new("Robe"))
            .with_line_item(LineItem::new("Étole"));

        assert_eq!(project.baseline().map(|l| l.name.as_str()), Some("Robe"));
    }

    #[test]
    fn test_missing_actuals_read_as_zero() {
        let project = ProjectConfiguration::new("Club", QuotingMode::Group);
        assert_eq!(project.total_fabric_length(), Decimal::ZERO);
        assert_eq!(project.total_fabric_cost(), Decimal::ZERO);
    }

    #[test]
    fn test_actuals_use_store_field_names() {
        let mut project = ProjectConfiguration::new("Club", QuotingMode::Group);
        project.apply_actuals(ActualAggregates::new(Decimal::new(255, 2), Decimal::from(102), 3));

        let value = serde_json::to_value(&project).unwrap();
        assert_eq!(value["surfaceTotale"], serde_json::json!("2.55"));
        assert_eq!(value["coutTissuTotal"], serde_json::json!("102"));
        assert_eq!(value["mode"], serde_json::json!("group"));

        let back: ProjectConfiguration = serde_json::from_value(value).unwrap();
        assert_eq!(back, project);
    }

    #[test]
    fn test_store_shape_with_two_totals_keeps_actuals() {
        let json = r#"{
            "id": "6f1d2c3a-0000-4000-8000-00000000000b",
            "name": "Fanfare",
            "mode": "individual",
            "surfaceTotale": "2.55",
            "coutTissuTotal": "102"
        }"#;

        let project: ProjectConfiguration = serde_json::from_str(json).unwrap();
        let actuals = project.actuals.unwrap();
        assert_eq!(project.total_fabric_length(), Decimal::new(255, 2));
        assert_eq!(project.total_fabric_cost(), Decimal::from(102));
        assert_eq!(actuals.fitting_count, 0);
        assert!(actuals.computed_at.is_none());
    }

    #[test]
    fn test_project_without_actuals_deserializes() {
        let json = r#"{
            "id": "6f1d2c3a-0000-4000-8000-00000000000a",
            "name": "Fanfare",
            "mode": "individual"
        }"#;

        let project: ProjectConfiguration = serde_json::from_str(json).unwrap();
        assert!(project.actuals.is_none());
        assert!(project.baseline().is_none());
    }
}
