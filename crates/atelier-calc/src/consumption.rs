//! 量身驅動的用料彙總
//!
//! 以專案基準款式（第一款）的用料為單件基準，依每位量身參與者的尺碼
//! 縮放布料用量，累計得到實際總用量與總成本。每次量身記錄異動後都
//! 應整體重算，不做增量更新。

use atelier_core::{
    ActualAggregates, CostingConfig, Fitting, MaterialCatalog, MaterialClass, ProjectConfiguration,
    QuoteItem, UnitKind,
};
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::CostingWarning;

/// 平行累計時每塊的量身記錄數
const LEDGER_CHUNK: usize = 512;

/// 單一物料的累計用量（以物料名稱為鍵）
#[derive(Debug, Clone)]
struct LedgerEntry {
    /// 首次出現的用料類別
    class: MaterialClass,
    unit: UnitKind,
    /// BOM 中首次出現的位置
    position: usize,
    total_quantity: Decimal,
    /// 布料類明細貢獻的用量
    fabric_quantity: Decimal,
    fittings: usize,
}

impl LedgerEntry {
    fn merge(&mut self, other: LedgerEntry) {
        self.total_quantity += other.total_quantity;
        self.fabric_quantity += other.fabric_quantity;
        self.fittings += other.fittings;
    }
}

/// 累計帳（可平行累計後合併）
#[derive(Debug, Clone, Default)]
struct ConsumptionLedger {
    entries: BTreeMap<String, LedgerEntry>,
    sizes: BTreeMap<String, usize>,
    fittings: usize,
}

impl ConsumptionLedger {
    /// 累計一位參與者
    fn record(&mut self, size: &str, factor: Decimal, items: &[(usize, &QuoteItem)]) {
        self.fittings += 1;
        *self.sizes.entry(size.to_string()).or_insert(0) += 1;

        let mut touched: Vec<&str> = Vec::with_capacity(items.len());
        for &(position, item) in items {
            let quantity = if item.class.is_size_scaled() {
                item.quantity * factor
            } else {
                item.quantity
            };

            let entry = self
                .entries
                .entry(item.material_name.clone())
                .or_insert_with(|| LedgerEntry {
                    class: item.class,
                    unit: item.unit,
                    position,
                    total_quantity: Decimal::ZERO,
                    fabric_quantity: Decimal::ZERO,
                    fittings: 0,
                });

            entry.total_quantity += quantity;
            if item.is_fabric() {
                entry.fabric_quantity += quantity;
            }
            if !touched.contains(&item.material_name.as_str()) {
                touched.push(&item.material_name);
                entry.fittings += 1;
            }
        }
    }

    fn merge(mut self, other: ConsumptionLedger) -> ConsumptionLedger {
        for (name, entry) in other.entries {
            match self.entries.get_mut(&name) {
                Some(existing) => existing.merge(entry),
                None => {
                    self.entries.insert(name, entry);
                }
            }
        }
        for (size, count) in other.sizes {
            *self.sizes.entry(size).or_insert(0) += count;
        }
        self.fittings += other.fittings;
        self
    }
}

/// 單一物料的實際用量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionLine {
    /// 物料名稱
    pub material_name: String,

    /// 用料類別
    pub class: MaterialClass,

    /// 計價單位
    pub unit: UnitKind,

    /// 總用量（布料依尺碼縮放）
    pub total_quantity: Decimal,

    /// 其中布料類明細的用量
    pub fabric_quantity: Decimal,

    /// 目前單價
    pub unit_price: Decimal,

    /// 總成本（總用量 × 目前單價）
    pub total_cost: Decimal,

    /// 貢獻的量身記錄數
    pub fittings: usize,
}

/// 用料彙總結果
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumptionReport {
    /// 各物料用量（依基準款式 BOM 順序）
    pub lines: Vec<ConsumptionLine>,

    /// 布料總長度與總成本
    pub actuals: ActualAggregates,

    /// 各尺碼人數
    pub size_distribution: BTreeMap<String, usize>,

    /// 警告信息
    pub warnings: Vec<CostingWarning>,
}

impl ConsumptionReport {
    /// 依名稱查找物料用量
    pub fn line(&self, material_name: &str) -> Option<&ConsumptionLine> {
        self.lines.iter().find(|l| l.material_name == material_name)
    }

    /// 所有物料總成本
    pub fn total_cost(&self) -> Decimal {
        self.lines.iter().map(|l| l.total_cost).sum()
    }
}

/// 用料彙總器
pub struct ConsumptionAggregator;

impl ConsumptionAggregator {
    /// 依量身名單計算實際用量
    ///
    /// - 沒有尺碼的參與者使用配置中的中性尺碼
    /// - 未知尺碼係數為 1
    /// - 目錄中已不存在的物料略過並產生警告
    /// - 成本以目錄目前單價計算
    pub fn aggregate(
        project: &ProjectConfiguration,
        fittings: &[Fitting],
        catalog: &MaterialCatalog,
        config: &CostingConfig,
    ) -> ConsumptionReport {
        let mut warnings = Vec::new();

        let Some(baseline) = project.baseline() else {
            tracing::debug!("專案 {} 沒有款式，用量為零", project.name);
            warnings.push(CostingWarning::info(
                project.name.clone(),
                "專案沒有款式，用量為零".to_string(),
            ));
            return ConsumptionReport {
                lines: Vec::new(),
                actuals: ActualAggregates::zero(),
                size_distribution: BTreeMap::new(),
                warnings,
            };
        };

        // 只保留目錄中仍存在的物料
        let items: Vec<(usize, &QuoteItem)> = baseline
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| {
                let known = catalog.get(&item.material_name).is_some();
                if !known {
                    tracing::warn!("物料 {} 不在目錄中，略過", item.material_name);
                    warnings.push(CostingWarning::warning(
                        item.material_name.clone(),
                        "物料已不在目錄中，未計入用量".to_string(),
                    ));
                }
                known
            })
            .collect();

        let roster: Vec<&Fitting> = fittings
            .iter()
            .filter(|f| f.project_id == project.id)
            .collect();
        if roster.len() < fittings.len() {
            warnings.push(CostingWarning::warning(
                project.name.clone(),
                format!("{} 筆量身記錄屬於其他專案，已略過", fittings.len() - roster.len()),
            ));
        }

        let accumulate = |chunk: &[&Fitting]| {
            chunk.iter().fold(ConsumptionLedger::default(), |mut ledger, fitting| {
                let size = fitting
                    .size_for(baseline.id)
                    .map(str::to_string)
                    .unwrap_or_else(|| atelier_core::normalize_size_label(&config.neutral_size));
                let factor = config.size_factors.factor(&size);
                ledger.record(&size, factor, &items);
                ledger
            })
        };

        // 切分點只取決於名單長度，各塊依原順序合併，結果與執行緒排程無關
        let ledger = if roster.len() <= LEDGER_CHUNK {
            accumulate(&roster)
        } else {
            roster
                .par_chunks(LEDGER_CHUNK)
                .map(&accumulate)
                .collect::<Vec<_>>()
                .into_iter()
                .fold(ConsumptionLedger::default(), ConsumptionLedger::merge)
        };

        let mut entries: Vec<(String, LedgerEntry)> = ledger.entries.into_iter().collect();
        entries.sort_by_key(|(_, entry)| entry.position);

        let mut total_fabric_length = Decimal::ZERO;
        let mut total_fabric_cost = Decimal::ZERO;
        let mut lines = Vec::with_capacity(entries.len());

        for (name, entry) in entries {
            // 已在上方過濾，目錄中必定存在
            let unit_price = catalog.current_price(&name).unwrap_or(Decimal::ZERO);

            total_fabric_length += entry.fabric_quantity;
            total_fabric_cost += entry.fabric_quantity * unit_price;

            lines.push(ConsumptionLine {
                material_name: name,
                class: entry.class,
                unit: entry.unit,
                total_cost: entry.total_quantity * unit_price,
                total_quantity: entry.total_quantity,
                fabric_quantity: entry.fabric_quantity,
                unit_price,
                fittings: entry.fittings,
            });
        }

        tracing::debug!(
            "專案 {} 用料彙總：{} 位參與者，{} 種物料，布料 {}，布料成本 {}",
            project.name,
            ledger.fittings,
            lines.len(),
            total_fabric_length,
            total_fabric_cost
        );

        ConsumptionReport {
            lines,
            actuals: ActualAggregates::new(total_fabric_length, total_fabric_cost, ledger.fittings),
            size_distribution: ledger.sizes,
            warnings,
        }
    }

    /// 重算並寫回專案
    pub fn refresh_project(
        project: &mut ProjectConfiguration,
        fittings: &[Fitting],
        catalog: &MaterialCatalog,
        config: &CostingConfig,
    ) -> ConsumptionReport {
        let report = Self::aggregate(project, fittings, catalog, config);
        project.apply_actuals(report.actuals);
        report
    }
}
