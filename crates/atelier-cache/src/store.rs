//! 外部資料存放介面

use atelier_core::{
    ActualAggregates, CostingError, Fitting, MaterialCatalog, ProjectConfiguration, Result,
};
use std::collections::HashMap;
use uuid::Uuid;

/// 專案存放
pub trait ProjectStore {
    /// 讀取專案
    fn load_project(&self, project_id: Uuid) -> Result<ProjectConfiguration>;

    /// 寫入實際用量彙總（只有用量彙總器會呼叫）
    fn save_actuals(&mut self, project_id: Uuid, actuals: ActualAggregates) -> Result<()>;
}

/// 量身記錄存放
pub trait FittingStore {
    /// 列出專案的量身記錄
    fn list_fittings(&self, project_id: Uuid) -> Result<Vec<Fitting>>;

    /// 依ID讀取量身記錄
    fn load_fitting(&self, fitting_id: Uuid) -> Result<Option<Fitting>>;

    /// 新增或更新量身記錄
    fn save_fitting(&mut self, fitting: Fitting) -> Result<()>;

    /// 刪除量身記錄
    fn delete_fitting(&mut self, fitting_id: Uuid) -> Result<Option<Fitting>>;
}

/// 物料目錄來源
pub trait CatalogSource {
    /// 目前的物料目錄
    fn catalog(&self) -> Result<MaterialCatalog>;
}

/// 記憶體內存放（測試與單機使用）
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    projects: HashMap<Uuid, ProjectConfiguration>,
    fittings: HashMap<Uuid, Fitting>,
    catalog: MaterialCatalog,
    fail_writes: bool,
    actuals_writes: usize,
}

impl InMemoryStore {
    /// 創建空存放
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置物料目錄
    pub fn with_catalog(mut self, catalog: MaterialCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// 建構器模式：加入專案
    pub fn with_project(mut self, project: ProjectConfiguration) -> Self {
        self.insert_project(project);
        self
    }

    /// 加入或取代專案
    pub fn insert_project(&mut self, project: ProjectConfiguration) {
        self.projects.insert(project.id, project);
    }

    /// 移除專案（量身記錄保留，由呼叫端處理）
    pub fn remove_project(&mut self, project_id: Uuid) -> Option<ProjectConfiguration> {
        self.projects.remove(&project_id)
    }

    /// 修改專案（報價編輯）
    pub fn project_mut(&mut self, project_id: Uuid) -> Option<&mut ProjectConfiguration> {
        self.projects.get_mut(&project_id)
    }

    /// 修改物料目錄
    pub fn catalog_mut(&mut self) -> &mut MaterialCatalog {
        &mut self.catalog
    }

    /// 模擬寫入失敗
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// 實際用量彙總的寫入次數
    pub fn actuals_writes(&self) -> usize {
        self.actuals_writes
    }

    /// 依ID查找量身記錄
    pub fn fitting(&self, fitting_id: Uuid) -> Option<&Fitting> {
        self.fittings.get(&fitting_id)
    }
}

impl ProjectStore for InMemoryStore {
    fn load_project(&self, project_id: Uuid) -> Result<ProjectConfiguration> {
        self.projects
            .get(&project_id)
            .cloned()
            .ok_or(CostingError::ProjectNotFound(project_id))
    }

    fn save_actuals(&mut self, project_id: Uuid, actuals: ActualAggregates) -> Result<()> {
        if self.fail_writes {
            return Err(CostingError::Persistence(format!(
                "專案 {project_id} 的實際用量寫入失敗"
            )));
        }
        let project = self
            .projects
            .get_mut(&project_id)
            .ok_or(CostingError::ProjectNotFound(project_id))?;
        project.apply_actuals(actuals);
        self.actuals_writes += 1;
        Ok(())
    }
}

impl FittingStore for InMemoryStore {
    fn list_fittings(&self, project_id: Uuid) -> Result<Vec<Fitting>> {
        let mut fittings: Vec<Fitting> = self
            .fittings
            .values()
            .filter(|f| f.project_id == project_id)
            .cloned()
            .collect();
        fittings.sort_by_key(|f| f.created_at);
        Ok(fittings)
    }

    fn load_fitting(&self, fitting_id: Uuid) -> Result<Option<Fitting>> {
        Ok(self.fittings.get(&fitting_id).cloned())
    }

    fn save_fitting(&mut self, fitting: Fitting) -> Result<()> {
        if !self.projects.contains_key(&fitting.project_id) {
            return Err(CostingError::ProjectNotFound(fitting.project_id));
        }
        self.fittings.insert(fitting.id, fitting);
        Ok(())
    }

    fn delete_fitting(&mut self, fitting_id: Uuid) -> Result<Option<Fitting>> {
        Ok(self.fittings.remove(&fitting_id))
    }
}

impl CatalogSource for InMemoryStore {
    fn catalog(&self) -> Result<MaterialCatalog> {
        Ok(self.catalog.clone())
    }
}
