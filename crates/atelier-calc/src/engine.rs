//! 成本核算主引擎

use atelier_core::{
    CompanyProfile, CostingConfig, Fitting, LineItem, MaterialCatalog, ProjectConfiguration,
};

use crate::consumption::{ConsumptionAggregator, ConsumptionReport};
use crate::project_cost::{ProjectCostAggregator, ProjectEstimate};
use crate::purchase_list::{PurchaseList, PurchaseListBuilder};
use crate::reconciliation::{Reconciler, VarianceReport};
use crate::unit_cost::{UnitCost, UnitCostCalculator};
use crate::{CostingReport, CostingWarning};

/// 成本核算引擎
///
/// 所有計算都是對傳入快照的純函數，不持有任何專案狀態。
pub struct CostingEngine {
    /// 核算配置
    config: CostingConfig,
}

impl CostingEngine {
    /// 創建新的核算引擎
    pub fn new(config: CostingConfig) -> Self {
        Self { config }
    }

    /// 單款報價
    pub fn quote_line(
        &self,
        project: &ProjectConfiguration,
        line: &LineItem,
        profile: &CompanyProfile,
    ) -> UnitCost {
        UnitCostCalculator::calculate(line, profile.tax_percentage, project.mode)
    }

    /// 專案報價估算
    pub fn estimate(
        &self,
        project: &ProjectConfiguration,
        profile: &CompanyProfile,
    ) -> ProjectEstimate {
        ProjectCostAggregator::aggregate(project, profile.tax_percentage, self.config.currency_scale)
    }

    /// 將計算出的尺碼售價寫回專案（報價單輸出前使用）
    pub fn apply_quote(&self, project: &mut ProjectConfiguration, profile: &CompanyProfile) {
        let mode = project.mode;
        for line in project.line_items.iter_mut() {
            let unit = UnitCostCalculator::calculate(line, profile.tax_percentage, mode);
            UnitCostCalculator::apply_size_prices(line, &unit);
        }
    }

    /// 計算實際用量（不寫回）
    pub fn consumption(
        &self,
        project: &ProjectConfiguration,
        fittings: &[Fitting],
        catalog: &MaterialCatalog,
    ) -> ConsumptionReport {
        ConsumptionAggregator::aggregate(project, fittings, catalog, &self.config)
    }

    /// 重算實際用量並寫回專案
    pub fn refresh_actuals(
        &self,
        project: &mut ProjectConfiguration,
        fittings: &[Fitting],
        catalog: &MaterialCatalog,
    ) -> ConsumptionReport {
        tracing::info!(
            "重算專案 {} 實際用量：量身記錄 {} 筆",
            project.name,
            fittings.len()
        );
        ConsumptionAggregator::refresh_project(project, fittings, catalog, &self.config)
    }

    /// 採購清單
    pub fn purchase_list(
        &self,
        project: &ProjectConfiguration,
        fittings: &[Fitting],
        catalog: &MaterialCatalog,
    ) -> PurchaseList {
        PurchaseListBuilder::build(&self.consumption(project, fittings, catalog))
    }

    /// 估算與已儲存實際值的差異
    pub fn reconcile(&self, project: &ProjectConfiguration, fittings: &[Fitting]) -> VarianceReport {
        Reconciler::reconcile(project, fittings)
    }

    /// 完整核算報告
    ///
    /// 讀取專案中已儲存的實際彙總做差異比對；如需最新值請先呼叫
    /// [`CostingEngine::refresh_actuals`]。
    pub fn full_report(
        &self,
        project: &ProjectConfiguration,
        fittings: &[Fitting],
        catalog: &MaterialCatalog,
        profile: &CompanyProfile,
    ) -> CostingReport {
        tracing::info!(
            "開始核算專案 {}：款式 {} 款，量身記錄 {} 筆，目錄物料 {} 種",
            project.name,
            project.line_items.len(),
            fittings.len(),
            catalog.len()
        );

        let start_time = std::time::Instant::now();

        // Step 1: 報價估算
        tracing::debug!("Step 1: 報價估算");
        let estimate = self.estimate(project, profile);

        // Step 2: 實際用量
        tracing::debug!("Step 2: 實際用量彙總");
        let consumption = self.consumption(project, fittings, catalog);

        // Step 3: 採購清單
        tracing::debug!("Step 3: 採購清單");
        let purchase_list = PurchaseListBuilder::build(&consumption);

        // Step 4: 差異核對
        tracing::debug!("Step 4: 估算與實際核對");
        let variance = Reconciler::reconcile(project, fittings);

        let mut warnings = consumption.warnings.clone();
        match project.actuals {
            None => warnings.push(CostingWarning::info(
                project.name.clone(),
                "專案尚未計算實際用量".to_string(),
            )),
            Some(stored) if !stored.same_totals(&consumption.actuals) => {
                tracing::warn!("專案 {} 的實際用量彙總已過期", project.name);
                warnings.push(CostingWarning::warning(
                    project.name.clone(),
                    "已儲存的實際用量與目前量身名單不一致，請重新計算".to_string(),
                ));
            }
            Some(_) => {}
        }

        for line in &project.line_items {
            if let Err(e) = line.validate() {
                warnings.push(CostingWarning::error(line.name.clone(), e.to_string()));
            }
        }

        let report = CostingReport {
            estimate,
            consumption,
            purchase_list,
            variance,
            warnings,
            calculation_time_ms: Some(start_time.elapsed().as_millis()),
        };

        tracing::info!("核算完成，耗時 {:?}", start_time.elapsed());
        tracing::info!(
            "採購物料 {} 種，警告 {} 筆",
            report.purchase_list.len(),
            report.warnings.len()
        );

        report
    }

    /// 獲取配置引用
    pub fn config(&self) -> &CostingConfig {
        &self.config
    }
}

impl Default for CostingEngine {
    fn default() -> Self {
        Self::new(CostingConfig::default())
    }
}
