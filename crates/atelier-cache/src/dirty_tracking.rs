//! 髒標記追蹤

use std::collections::BTreeSet;
use uuid::Uuid;

/// 髒標記追蹤器
///
/// 記錄實際用量彙總需要重算的專案。
#[derive(Debug, Clone)]
pub struct DirtyTracker {
    dirty_projects: BTreeSet<Uuid>,
}

impl DirtyTracker {
    /// 創建新的追蹤器
    pub fn new() -> Self {
        Self {
            dirty_projects: BTreeSet::new(),
        }
    }

    /// 標記專案為髒
    pub fn mark_dirty(&mut self, project_id: Uuid) {
        self.dirty_projects.insert(project_id);
    }

    /// 清除單一專案的髒標記
    pub fn mark_clean(&mut self, project_id: Uuid) {
        self.dirty_projects.remove(&project_id);
    }

    /// 檢查專案是否為髒
    pub fn is_dirty(&self, project_id: Uuid) -> bool {
        self.dirty_projects.contains(&project_id)
    }

    /// 清除所有髒標記
    pub fn clear(&mut self) {
        self.dirty_projects.clear();
    }

    /// 獲取所有髒專案（依ID排序）
    pub fn get_dirty_projects(&self) -> Vec<Uuid> {
        self.dirty_projects.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.dirty_projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirty_projects.is_empty()
    }
}

impl Default for DirtyTracker {
    fn default() -> Self {
        Self::new()
    }
}
