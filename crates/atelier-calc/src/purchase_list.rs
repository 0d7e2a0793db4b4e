//! 全局採購清單

use atelier_core::{MaterialClass, UnitKind};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::consumption::ConsumptionReport;
use crate::project_cost::round_to_currency;

/// 採購清單行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRow {
    /// 物料名稱
    pub material_name: String,
    /// 用料類別
    pub class: MaterialClass,
    /// 計價單位
    pub unit: UnitKind,
    /// 採購數量
    pub quantity: Decimal,
    /// 單價
    pub unit_price: Decimal,
    /// 金額
    pub total_cost: Decimal,
}

/// 採購清單（所有用料類別）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PurchaseList {
    pub rows: Vec<PurchaseRow>,
}

impl PurchaseList {
    /// 總金額
    pub fn grand_total(&self) -> Decimal {
        self.rows.iter().map(|r| r.total_cost).sum()
    }

    /// 某類別小計
    pub fn subtotal(&self, class: MaterialClass) -> Decimal {
        self.rows
            .iter()
            .filter(|r| r.class == class)
            .map(|r| r.total_cost)
            .sum()
    }

    /// 依名稱查找
    pub fn row(&self, material_name: &str) -> Option<&PurchaseRow> {
        self.rows.iter().find(|r| r.material_name == material_name)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 四捨五入金額（列印用）
    pub fn rounded(&self, scale: u32) -> PurchaseList {
        PurchaseList {
            rows: self
                .rows
                .iter()
                .map(|r| PurchaseRow {
                    total_cost: round_to_currency(r.total_cost, scale),
                    ..r.clone()
                })
                .collect(),
        }
    }
}

/// 採購清單建構器
pub struct PurchaseListBuilder;

impl PurchaseListBuilder {
    /// 由用料彙總建立採購清單
    ///
    /// 只列出至少有一位參與者貢獻用量的物料，不會出現零數量的空行。
    pub fn build(consumption: &ConsumptionReport) -> PurchaseList {
        let rows = consumption
            .lines
            .iter()
            .filter(|line| line.fittings > 0)
            .map(|line| PurchaseRow {
                material_name: line.material_name.clone(),
                class: line.class,
                unit: line.unit,
                quantity: line.total_quantity,
                unit_price: line.unit_price,
                total_cost: line.total_cost,
            })
            .collect();

        PurchaseList { rows }
    }
}
