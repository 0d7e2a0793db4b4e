//! 實際用量彙總的重算與寫回
//!
//! 每次量身記錄新增、修改、刪除或批次匯入後整體重算專案的實際用量，
//! 不做增量修補。批次模式下只在提交時對每個受影響的專案重算一次。

use atelier_calc::{ConsumptionReport, CostingEngine};
use atelier_core::{ActualAggregates, CostingError, Fitting, Result};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

use crate::dirty_tracking::DirtyTracker;
use crate::store::{CatalogSource, FittingStore, ProjectStore};

/// 量身記錄異動事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FittingEvent {
    Created { project_id: Uuid },
    Updated { project_id: Uuid },
    Deleted { project_id: Uuid },
    BulkImported { project_id: Uuid, count: usize },
}

impl FittingEvent {
    /// 受影響的專案
    pub fn project_id(&self) -> Uuid {
        match *self {
            FittingEvent::Created { project_id }
            | FittingEvent::Updated { project_id }
            | FittingEvent::Deleted { project_id }
            | FittingEvent::BulkImported { project_id, .. } => project_id,
        }
    }
}

/// 實際用量重算器
pub struct AggregateRefresher<S> {
    store: S,
    engine: CostingEngine,
    tracker: DirtyTracker,
    batching: bool,
    runs: usize,
}

impl<S> AggregateRefresher<S>
where
    S: ProjectStore + FittingStore + CatalogSource,
{
    /// 創建新的重算器
    pub fn new(store: S, engine: CostingEngine) -> Self {
        Self {
            store,
            engine,
            tracker: DirtyTracker::new(),
            batching: false,
            runs: 0,
        }
    }

    /// 獲取存放引用
    pub fn store(&self) -> &S {
        &self.store
    }

    /// 獲取存放引用（可修改）
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// 獲取引擎引用
    pub fn engine(&self) -> &CostingEngine {
        &self.engine
    }

    /// 已執行的彙總次數
    pub fn runs(&self) -> usize {
        self.runs
    }

    /// 專案是否等待重算
    pub fn is_dirty(&self, project_id: Uuid) -> bool {
        self.tracker.is_dirty(project_id)
    }

    /// 新增量身記錄
    pub fn create_fitting(&mut self, fitting: Fitting) -> Result<()> {
        let project_id = fitting.project_id;
        let moved_from = self.save_fitting(fitting)?;
        self.after_save(FittingEvent::Created { project_id }, moved_from)
    }

    /// 修改量身記錄
    ///
    /// 記錄移到其他專案時，原專案與新專案都會重算。
    pub fn update_fitting(&mut self, mut fitting: Fitting) -> Result<()> {
        fitting.updated_at = chrono::Utc::now();
        let project_id = fitting.project_id;
        let moved_from = self.save_fitting(fitting)?;
        self.after_save(FittingEvent::Updated { project_id }, moved_from)
    }

    /// 刪除量身記錄
    ///
    /// 記錄刪除後才重算；重算失敗時回傳錯誤，記錄不會恢復，
    /// 專案保持髒標記，可用 [`AggregateRefresher::retry_dirty`] 重試。
    pub fn delete_fitting(&mut self, fitting_id: Uuid) -> Result<Option<Fitting>> {
        let removed = self.store.delete_fitting(fitting_id)?;
        if let Some(fitting) = &removed {
            self.on_fitting_event(FittingEvent::Deleted {
                project_id: fitting.project_id,
            })?;
        }
        Ok(removed)
    }

    /// 批次匯入量身記錄
    ///
    /// 全部寫入後每個受影響的專案只重算一次。
    pub fn bulk_import(&mut self, fittings: Vec<Fitting>) -> Result<Vec<Uuid>> {
        let was_batching = self.batching;
        self.begin_batch();

        let mut counts: BTreeMap<Uuid, usize> = BTreeMap::new();
        let mut moved_from: BTreeSet<Uuid> = BTreeSet::new();
        let mut outcome = Ok(());
        for fitting in fittings {
            let project_id = fitting.project_id;
            match self.save_fitting(fitting) {
                Ok(previous) => {
                    moved_from.extend(previous);
                    *counts.entry(project_id).or_insert(0) += 1;
                }
                Err(e) => {
                    outcome = Err(e);
                    break;
                }
            }
        }

        for (project_id, count) in counts {
            tracing::info!("專案 {} 批次匯入 {} 筆量身記錄", project_id, count);
            self.on_fitting_event(FittingEvent::BulkImported { project_id, count })?;
        }
        for project_id in moved_from {
            self.on_fitting_event(FittingEvent::Updated { project_id })?;
        }

        // 已寫入的記錄仍需重算，即使中途失敗
        if was_batching {
            outcome?;
            return Ok(Vec::new());
        }
        let refreshed = self.commit_batch();
        outcome?;
        refreshed
    }

    /// 處理量身記錄異動事件
    ///
    /// 批次模式下只標記；否則立即重算。
    pub fn on_fitting_event(&mut self, event: FittingEvent) -> Result<()> {
        let project_id = event.project_id();
        tracing::debug!("量身記錄異動: {:?}", event);

        self.tracker.mark_dirty(project_id);
        if self.batching {
            return Ok(());
        }
        self.refresh(project_id).map(|_| ())
    }

    /// 開始批次模式
    pub fn begin_batch(&mut self) {
        self.batching = true;
    }

    /// 結束批次模式並重算所有受影響的專案
    ///
    /// 回傳成功重算的專案；任一專案寫入失敗時回傳第一個錯誤，
    /// 失敗的專案保持髒標記以便重試。
    pub fn commit_batch(&mut self) -> Result<Vec<Uuid>> {
        self.batching = false;
        self.refresh_dirty()
    }

    /// 重試所有等待重算的專案
    pub fn retry_dirty(&mut self) -> Result<Vec<Uuid>> {
        self.refresh_dirty()
    }

    fn refresh_dirty(&mut self) -> Result<Vec<Uuid>> {
        let mut refreshed = Vec::new();
        let mut first_error = None;

        for project_id in self.tracker.get_dirty_projects() {
            match self.refresh(project_id) {
                Ok(_) => refreshed.push(project_id),
                // 專案已不存在，髒標記已在 refresh 中清除
                Err(CostingError::ProjectNotFound(_)) => {}
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(refreshed),
        }
    }

    /// 整體重算專案實際用量並寫回
    ///
    /// 寫入失敗時保留原有的彙總值，專案保持髒標記。
    /// 專案已不存在時清除髒標記並回傳 `ProjectNotFound`。
    pub fn refresh(&mut self, project_id: Uuid) -> Result<ActualAggregates> {
        let report = match self.recompute(project_id) {
            Ok(report) => report,
            Err(e @ CostingError::ProjectNotFound(_)) => {
                tracing::warn!("專案 {} 已不存在，放棄重算", project_id);
                self.tracker.mark_clean(project_id);
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        if let Err(e) = self.store.save_actuals(project_id, report.actuals) {
            tracing::warn!("專案 {} 實際用量寫入失敗: {}", project_id, e);
            self.tracker.mark_dirty(project_id);
            return Err(e);
        }

        self.tracker.mark_clean(project_id);
        tracing::info!(
            "專案 {} 實際用量已更新：布料 {}，布料成本 {}",
            project_id,
            report.actuals.total_fabric_length,
            report.actuals.total_fabric_cost
        );
        Ok(report.actuals)
    }

    /// 重算但不寫回
    pub fn recompute(&mut self, project_id: Uuid) -> Result<ConsumptionReport> {
        let project = self.store.load_project(project_id)?;
        let fittings = self.store.list_fittings(project_id)?;
        let catalog = self.store.catalog()?;

        self.runs += 1;
        Ok(self.engine.consumption(&project, &fittings, &catalog))
    }

    /// 正規化並寫入記錄，回傳記錄原本所屬的其他專案
    fn save_fitting(&mut self, mut fitting: Fitting) -> Result<Option<Uuid>> {
        fitting.normalize();
        let project_id = fitting.project_id;
        let previous = self
            .store
            .load_fitting(fitting.id)?
            .map(|f| f.project_id)
            .filter(|previous| *previous != project_id);

        self.store.save_fitting(fitting)?;
        if let Some(previous) = previous {
            tracing::info!("量身記錄由專案 {} 移至 {}", previous, project_id);
        }
        Ok(previous)
    }

    /// 重算新專案；記錄搬移時原專案也重算（原專案已刪除則略過）
    fn after_save(&mut self, event: FittingEvent, moved_from: Option<Uuid>) -> Result<()> {
        let result = self.on_fitting_event(event);
        let Some(previous) = moved_from else {
            return result;
        };

        let previous_result = match self.on_fitting_event(FittingEvent::Updated {
            project_id: previous,
        }) {
            Err(CostingError::ProjectNotFound(_)) => Ok(()),
            other => other,
        };
        result.and(previous_result)
    }
}
