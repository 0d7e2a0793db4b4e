//! 量身記錄模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::project::ProjectConfiguration;

/// 正規化尺碼標籤（去除前後空白並轉大寫）
pub fn normalize_size_label(label: &str) -> String {
    label.trim().to_uppercase()
}

/// 量身記錄（一位參與者）
///
/// 外部存放的最小形狀為 `{personId, sizesByLineItemId}`；ID、所屬專案與時間
/// 由存放端維護，缺少時分別取新ID、空ID與目前時間。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fitting {
    /// 記錄ID
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// 所屬專案
    #[serde(default)]
    pub project_id: Uuid,

    /// 參與者
    pub person_id: String,

    /// 款式ID → 尺碼
    #[serde(default, rename = "sizesByLineItemId")]
    pub sizes_by_line_item: BTreeMap<Uuid, String>,

    /// 建立時間
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// 最後修改時間
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Fitting {
    /// 創建新的量身記錄
    pub fn new(project_id: Uuid, person_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            project_id,
            person_id: person_id.into(),
            sizes_by_line_item: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// 建構器模式：指定所屬專案（匯入外部記錄時使用）
    pub fn in_project(mut self, project_id: Uuid) -> Self {
        self.project_id = project_id;
        self
    }

    /// 建構器模式：指定尺碼
    pub fn with_size(mut self, line_item_id: Uuid, label: &str) -> Self {
        self.assign_size(line_item_id, label);
        self
    }

    /// 指定尺碼（寫入時正規化；空白標籤視為清除）
    pub fn assign_size(&mut self, line_item_id: Uuid, label: &str) {
        let label = normalize_size_label(label);
        if label.is_empty() {
            self.sizes_by_line_item.remove(&line_item_id);
        } else {
            self.sizes_by_line_item.insert(line_item_id, label);
        }
        self.updated_at = Utc::now();
    }

    /// 清除尺碼
    pub fn clear_size(&mut self, line_item_id: Uuid) -> Option<String> {
        let removed = self.sizes_by_line_item.remove(&line_item_id);
        if removed.is_some() {
            self.updated_at = Utc::now();
        }
        removed
    }

    /// 某款式的尺碼
    pub fn size_for(&self, line_item_id: Uuid) -> Option<&str> {
        self.sizes_by_line_item
            .get(&line_item_id)
            .map(String::as_str)
            .filter(|label| !label.trim().is_empty())
    }

    /// 正規化所有尺碼（用於外部匯入的資料）
    pub fn normalize(&mut self) {
        self.sizes_by_line_item = std::mem::take(&mut self.sizes_by_line_item)
            .into_iter()
            .map(|(id, label)| (id, normalize_size_label(&label)))
            .filter(|(_, label)| !label.is_empty())
            .collect();
    }

    /// 移除指向已刪除款式的尺碼
    ///
    /// 回傳被移除的數量。
    pub fn prune_dangling(&mut self, project: &ProjectConfiguration) -> usize {
        let before = self.sizes_by_line_item.len();
        self.sizes_by_line_item
            .retain(|line_item_id, _| project.line_item(*line_item_id).is_some());
        let removed = before - self.sizes_by_line_item.len();
        if removed > 0 {
            self.updated_at = Utc::now();
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::QuotingMode;
    use crate::quote::LineItem;

    #[test]
    fn test_assign_size_normalizes() {
        let line_id = Uuid::new_v4();
        let fitting = Fitting::new(Uuid::new_v4(), "P-001").with_size(line_id, "  xl ");

        assert_eq!(fitting.size_for(line_id), Some("XL"));
    }

    #[test]
    fn test_blank_label_clears_size() {
        let line_id = Uuid::new_v4();
        let mut fitting = Fitting::new(Uuid::new_v4(), "P-001").with_size(line_id, "M");

        fitting.assign_size(line_id, "   ");
        assert_eq!(fitting.size_for(line_id), None);
    }

    #[test]
    fn test_normalize_imported_sizes() {
        let line_id = Uuid::new_v4();
        let other_id = Uuid::new_v4();
        let mut fitting = Fitting::new(Uuid::new_v4(), "P-002");
        fitting.sizes_by_line_item.insert(line_id, " xxl".to_string());
        fitting.sizes_by_line_item.insert(other_id, "".to_string());

        fitting.normalize();

        assert_eq!(fitting.size_for(line_id), Some("XXL"));
        assert_eq!(fitting.sizes_by_line_item.len(), 1);
    }

    #[test]
    fn test_store_shape_deserializes() {
        let line_id = Uuid::new_v4();
        let project_id = Uuid::new_v4();
        let json = format!(r#"{{ "personId": "A", "sizesByLineItemId": {{ "{line_id}": " xl " }} }}"#);

        let mut fitting: Fitting = serde_json::from_str(&json).unwrap();
        assert_eq!(fitting.person_id, "A");
        assert!(fitting.project_id.is_nil());

        fitting = fitting.in_project(project_id);
        fitting.normalize();
        assert_eq!(fitting.project_id, project_id);
        assert_eq!(fitting.size_for(line_id), Some("XL"));

        let value = serde_json::to_value(&fitting).unwrap();
        assert_eq!(value["personId"], serde_json::json!("A"));
        assert_eq!(value["sizesByLineItemId"][line_id.to_string()], serde_json::json!("XL"));
    }

    #[test]
    fn test_empty_store_shape_deserializes() {
        let fitting: Fitting =
            serde_json::from_str(r#"{ "personId": "A", "sizesByLineItemId": {} }"#).unwrap();
        assert!(fitting.sizes_by_line_item.is_empty());
        assert!(!fitting.id.is_nil());
    }

    #[test]
    fn test_prune_dangling() {
        let shirt = LineItem::new("Chemise");
        let shirt_id = shirt.id;
        let project = ProjectConfiguration::new("Uniformes", QuotingMode::Individual)
            .with_line_item(shirt);

        let mut fitting = Fitting::new(project.id, "P-003")
            .with_size(shirt_id, "L")
            .with_size(Uuid::new_v4(), "XL");

        assert_eq!(fitting.prune_dangling(&project), 1);
        assert_eq!(fitting.size_for(shirt_id), Some("L"));
    }
}
