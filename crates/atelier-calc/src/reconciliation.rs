//! 估算與實際用量核對

use atelier_core::{Fitting, ProjectConfiguration, QuotingMode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 差異方向（顯示用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarianceTrend {
    /// 無差異
    NoChange,
    /// 超支
    Unfavorable,
    /// 節省
    Favorable,
}

impl VarianceTrend {
    /// 由差異值判斷方向（正值為超支）
    pub fn of(difference: Decimal) -> Self {
        if difference.is_zero() {
            VarianceTrend::NoChange
        } else if difference > Decimal::ZERO {
            VarianceTrend::Unfavorable
        } else {
            VarianceTrend::Favorable
        }
    }
}

/// 布料估算（以名目用量計）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FabricEstimate {
    /// 預計件數
    pub planned_units: u64,
    /// 預計布料長度
    pub estimated_length: Decimal,
    /// 預計布料成本（報價凍結單價）
    pub estimated_cost: Decimal,
}

/// 差異報告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceReport {
    pub estimate: FabricEstimate,

    /// 實際布料長度
    pub actual_length: Decimal,

    /// 實際布料成本
    pub actual_cost: Decimal,

    /// 長度差異（實際 - 估算）
    pub length_difference: Decimal,

    /// 長度差異百分比（估算為零時為零）
    pub fabric_length_difference_percentage: Decimal,

    /// 成本差異（正值為超支）
    pub cost_difference: Decimal,

    pub length_trend: VarianceTrend,
    pub cost_trend: VarianceTrend,
}

/// 估算與實際核對器
pub struct Reconciler;

impl Reconciler {
    /// 以基準款式名目用量估算布料
    ///
    /// 個人模式的件數為量身人數，團體模式為基準款式的批量。
    pub fn estimate(project: &ProjectConfiguration, fittings: &[Fitting]) -> FabricEstimate {
        let Some(baseline) = project.baseline() else {
            return FabricEstimate {
                planned_units: 0,
                estimated_length: Decimal::ZERO,
                estimated_cost: Decimal::ZERO,
            };
        };

        let planned_units = match project.mode {
            QuotingMode::Individual => fittings
                .iter()
                .filter(|f| f.project_id == project.id)
                .count() as u64,
            QuotingMode::Group => u64::from(baseline.quantity),
        };
        let units = Decimal::from(planned_units);

        FabricEstimate {
            planned_units,
            estimated_length: baseline.fabric_requirement() * units,
            estimated_cost: baseline.fabric_cost() * units,
        }
    }

    /// 核對估算與已儲存的實際彙總
    pub fn reconcile(project: &ProjectConfiguration, fittings: &[Fitting]) -> VarianceReport {
        let estimate = Self::estimate(project, fittings);
        let actual_length = project.total_fabric_length();
        let actual_cost = project.total_fabric_cost();

        let length_difference = actual_length - estimate.estimated_length;
        let fabric_length_difference_percentage = if estimate.estimated_length.is_zero() {
            Decimal::ZERO
        } else {
            length_difference / estimate.estimated_length * Decimal::ONE_HUNDRED
        };
        let cost_difference = actual_cost - estimate.estimated_cost;

        VarianceReport {
            estimate,
            actual_length,
            actual_cost,
            length_difference,
            fabric_length_difference_percentage,
            cost_difference,
            length_trend: VarianceTrend::of(fabric_length_difference_percentage),
            cost_trend: VarianceTrend::of(cost_difference),
        }
    }
}
