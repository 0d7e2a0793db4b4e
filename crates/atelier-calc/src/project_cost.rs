//! 專案成本彙總

use atelier_core::{ProjectConfiguration, QuotingMode};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::unit_cost::{UnitCost, UnitCostCalculator};

/// 向上取整到貨幣單位（避免因分位小數而少報）
///
/// `scale` 來自 `CostingConfig::currency_scale`。
pub(crate) fn ceil_to_currency(value: Decimal, scale: u32) -> Decimal {
    value.round_dp_with_strategy(scale, RoundingStrategy::ToPositiveInfinity)
}

/// 四捨五入到貨幣單位
pub(crate) fn round_to_currency(value: Decimal, scale: u32) -> Decimal {
    value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

/// 單款估算
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineEstimate {
    /// 款式名稱
    pub name: String,

    /// 單件成本
    pub unit: UnitCost,

    /// 權重（團體模式為批量，個人模式為 1）
    pub weight: u32,

    /// 成本合計
    pub line_cost: Decimal,

    /// 售價合計
    pub line_total: Decimal,
}

/// 專案估算
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectEstimate {
    /// 報價模式
    pub mode: QuotingMode,

    /// 各款估算（順序與專案相同）
    pub lines: Vec<LineEstimate>,

    /// 專案總成本
    pub total_project_cost: Decimal,

    /// 專案總售價
    pub grand_total: Decimal,
}

/// 按人數推算（個人模式）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadcountProjection {
    /// 人數
    pub headcount: usize,
    /// 總成本
    pub total_cost: Decimal,
    /// 總售價
    pub total_price: Decimal,
}

impl ProjectEstimate {
    /// 依款式ID查找估算
    pub fn line(&self, line_item_id: uuid::Uuid) -> Option<&LineEstimate> {
        self.lines.iter().find(|l| l.unit.line_item_id == line_item_id)
    }

    /// 專案毛利
    pub fn margin(&self) -> Decimal {
        self.grand_total - self.total_project_cost
    }

    /// 按量身人數推算總額
    ///
    /// 個人模式下每位參與者購買每款各一件；每款先乘以人數再向上取整。
    pub fn for_headcount(&self, headcount: usize, scale: u32) -> HeadcountProjection {
        let people = Decimal::from(headcount);
        let (total_cost, total_price) = self.lines.iter().fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(cost, price), line| {
                (
                    cost + ceil_to_currency(line.unit.cost_per_unit * people, scale),
                    price + ceil_to_currency(line.unit.final_price_per_unit * people, scale),
                )
            },
        );

        HeadcountProjection {
            headcount,
            total_cost,
            total_price,
        }
    }
}

/// 專案成本彙總器
pub struct ProjectCostAggregator;

impl ProjectCostAggregator {
    /// 彙總專案所有款式
    ///
    /// - 團體模式：每款成本與售價乘以批量後各自向上取整，再加總
    /// - 個人模式：每款權重為 1，總額只在輸出時四捨五入一次
    pub fn aggregate(
        project: &ProjectConfiguration,
        tax_percentage: Decimal,
        scale: u32,
    ) -> ProjectEstimate {
        let lines: Vec<LineEstimate> = project
            .line_items
            .iter()
            .map(|line| {
                let unit = UnitCostCalculator::calculate(line, tax_percentage, project.mode);
                match project.mode {
                    QuotingMode::Group => {
                        let quantity = Decimal::from(line.quantity);
                        LineEstimate {
                            name: line.name.clone(),
                            weight: line.quantity,
                            line_cost: ceil_to_currency(unit.cost_per_unit * quantity, scale),
                            line_total: ceil_to_currency(
                                unit.final_price_per_unit * quantity,
                                scale,
                            ),
                            unit,
                        }
                    }
                    QuotingMode::Individual => LineEstimate {
                        name: line.name.clone(),
                        weight: 1,
                        line_cost: unit.cost_per_unit,
                        line_total: unit.final_price_per_unit,
                        unit,
                    },
                }
            })
            .collect();

        let cost_sum: Decimal = lines.iter().map(|l| l.line_cost).sum();
        let total_sum: Decimal = lines.iter().map(|l| l.line_total).sum();

        let (total_project_cost, grand_total) = match project.mode {
            QuotingMode::Group => (cost_sum, total_sum),
            QuotingMode::Individual => (
                round_to_currency(cost_sum, scale),
                round_to_currency(total_sum, scale),
            ),
        };

        tracing::debug!(
            "專案 {} 估算：{} 款，總成本 {}，總售價 {}",
            project.name,
            lines.len(),
            total_project_cost,
            grand_total
        );

        ProjectEstimate {
            mode: project.mode,
            lines,
            total_project_cost,
            grand_total,
        }
    }
}
