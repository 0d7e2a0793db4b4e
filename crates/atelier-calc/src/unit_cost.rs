//! 單件成本計算

use atelier_core::{LineItem, QuotingMode};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 尺碼售價
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizePrice {
    /// 尺碼
    pub label: String,
    /// 售價
    pub price: Decimal,
    /// 是否為指定售價
    pub overridden: bool,
}

/// 單件成本計算結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitCost {
    /// 款式ID
    pub line_item_id: Uuid,

    /// 用料小計
    pub materials_total: Decimal,

    /// 工資小計（車縫 + 裁剪）
    pub labor_total: Decimal,

    /// 稅前小計
    pub subtotal_per_unit: Decimal,

    /// 稅額
    pub tax_per_unit: Decimal,

    /// 含稅成本
    pub cost_per_unit: Decimal,

    /// 售價
    pub final_price_per_unit: Decimal,

    /// 各尺碼售價（僅個人模式）
    pub size_prices: Vec<SizePrice>,
}

impl UnitCost {
    /// 四捨五入到貨幣單位（僅供顯示）
    pub fn rounded(&self, scale: u32) -> UnitCost {
        let round = |value: Decimal| {
            value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
        };
        UnitCost {
            line_item_id: self.line_item_id,
            materials_total: round(self.materials_total),
            labor_total: round(self.labor_total),
            subtotal_per_unit: round(self.subtotal_per_unit),
            tax_per_unit: round(self.tax_per_unit),
            cost_per_unit: round(self.cost_per_unit),
            final_price_per_unit: round(self.final_price_per_unit),
            size_prices: self
                .size_prices
                .iter()
                .map(|sp| SizePrice {
                    label: sp.label.clone(),
                    price: round(sp.price),
                    overridden: sp.overridden,
                })
                .collect(),
        }
    }

    /// 每件毛利
    pub fn margin_per_unit(&self) -> Decimal {
        self.final_price_per_unit - self.cost_per_unit
    }

    /// 某尺碼的售價
    pub fn price_for_size(&self, label: &str) -> Option<Decimal> {
        let label = atelier_core::normalize_size_label(label);
        self.size_prices
            .iter()
            .find(|sp| sp.label == label)
            .map(|sp| sp.price)
    }
}

/// 單件成本計算器
pub struct UnitCostCalculator;

impl UnitCostCalculator {
    /// 計算單件成本與售價
    ///
    /// 其他費用（`LaborCosts::other`）只記錄，不計入售價。
    pub fn calculate(line: &LineItem, tax_percentage: Decimal, mode: QuotingMode) -> UnitCost {
        let materials_total = line.materials_total();
        let labor_total = line.labor_costs.priced();

        let subtotal_per_unit = materials_total + labor_total;
        let tax_per_unit = subtotal_per_unit * tax_percentage / Decimal::ONE_HUNDRED;
        let cost_per_unit = subtotal_per_unit + tax_per_unit;
        let final_price_per_unit =
            cost_per_unit * (Decimal::ONE + line.profit_margin / Decimal::ONE_HUNDRED);

        // 尺碼只影響用量，不影響售價（除非有指定售價）
        let size_prices = match mode {
            QuotingMode::Individual => line
                .selected_sizes()
                .map(|size| SizePrice {
                    label: atelier_core::normalize_size_label(&size.label),
                    price: size.price_override.unwrap_or(final_price_per_unit),
                    overridden: size.price_override.is_some(),
                })
                .collect(),
            QuotingMode::Group => Vec::new(),
        };

        UnitCost {
            line_item_id: line.id,
            materials_total,
            labor_total,
            subtotal_per_unit,
            tax_per_unit,
            cost_per_unit,
            final_price_per_unit,
            size_prices,
        }
    }

    /// 將尺碼售價寫回款式（報價單輸出用）
    pub fn apply_size_prices(line: &mut LineItem, unit_cost: &UnitCost) {
        for size in line.sizes.iter_mut() {
            size.calculated_price = if size.selected {
                unit_cost.price_for_size(&size.label)
            } else {
                None
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::{LaborCosts, Material, MaterialClass, QuoteItem, SizeSelection, UnitKind};
    use rstest::rstest;

    fn line_with_subtotal_100() -> LineItem {
        let cotton = Material::new("Coton", Decimal::from(40), UnitKind::Meter);
        LineItem::new("Polo")
            .with_item(QuoteItem::new(&cotton, Decimal::ONE, MaterialClass::Fabric))
            .with_labor_costs(LaborCosts::new(
                Decimal::from(50),
                Decimal::from(10),
                Decimal::from(25),
            ))
    }

    #[test]
    fn test_tax_then_margin_chain() {
        let line = line_with_subtotal_100().with_profit_margin(Decimal::from(50));

        let cost = UnitCostCalculator::calculate(&line, Decimal::new(1494, 2), QuotingMode::Group);

        assert_eq!(cost.subtotal_per_unit, Decimal::from(100));
        assert_eq!(cost.tax_per_unit, Decimal::new(1494, 2));
        assert_eq!(cost.cost_per_unit, Decimal::new(11494, 2));
        assert_eq!(cost.final_price_per_unit, Decimal::new(17241, 2));
        assert!(cost.size_prices.is_empty());
    }

    #[test]
    fn test_other_cost_excluded_from_price() {
        let mut line = line_with_subtotal_100();
        let before = UnitCostCalculator::calculate(&line, Decimal::ZERO, QuotingMode::Group);

        line.labor_costs.other = Decimal::from(1000);
        let after = UnitCostCalculator::calculate(&line, Decimal::ZERO, QuotingMode::Group);

        assert_eq!(before, after);
    }

    #[test]
    fn test_empty_line_is_zero_not_error() {
        let line = LineItem::new("Vide").with_profit_margin(Decimal::from(30));
        let cost = UnitCostCalculator::calculate(&line, Decimal::new(1494, 2), QuotingMode::Group);

        assert_eq!(cost.subtotal_per_unit, Decimal::ZERO);
        assert_eq!(cost.final_price_per_unit, Decimal::ZERO);
    }

    #[rstest]
    #[case(0, 0, 100)]
    #[case(20, 0, 120)]
    #[case(0, 200, 300)]
    #[case(10, 100, 220)]
    fn test_tax_and_margin_chain(#[case] tax: i64, #[case] margin: i64, #[case] expected: i64) {
        let line = line_with_subtotal_100().with_profit_margin(Decimal::from(margin));
        let cost = UnitCostCalculator::calculate(&line, Decimal::from(tax), QuotingMode::Group);

        assert_eq!(cost.final_price_per_unit, Decimal::from(expected));
    }

    #[test]
    fn test_individual_mode_prices_selected_sizes() {
        let mut unselected = SizeSelection::selected("XS");
        unselected.selected = false;

        let line = line_with_subtotal_100()
            .with_profit_margin(Decimal::from(50))
            .with_size(SizeSelection::selected("s, m, l"))
            .with_size(SizeSelection::selected("XXL").with_price_override(Decimal::from(180)))
            .with_size(unselected);

        let cost = UnitCostCalculator::calculate(&line, Decimal::ZERO, QuotingMode::Individual);

        assert_eq!(cost.size_prices.len(), 2);
        assert_eq!(cost.price_for_size("S, M, L"), Some(Decimal::from(150)));
        assert_eq!(cost.price_for_size("xxl"), Some(Decimal::from(180)));
        assert!(cost.size_prices[1].overridden);
        assert_eq!(cost.price_for_size("XS"), None);
    }

    #[test]
    fn test_apply_size_prices() {
        let mut unselected = SizeSelection::selected("XS");
        unselected.selected = false;
        unselected.calculated_price = Some(Decimal::from(99));

        let mut line = line_with_subtotal_100()
            .with_size(SizeSelection::selected("M"))
            .with_size(unselected);

        let cost = UnitCostCalculator::calculate(&line, Decimal::ZERO, QuotingMode::Individual);
        UnitCostCalculator::apply_size_prices(&mut line, &cost);

        assert_eq!(line.sizes[0].calculated_price, Some(Decimal::from(100)));
        assert_eq!(line.sizes[1].calculated_price, None);
    }

    #[test]
    fn test_rounded_for_display() {
        let line = line_with_subtotal_100().with_profit_margin(Decimal::new(333, 1));
        let cost = UnitCostCalculator::calculate(&line, Decimal::new(1494, 2), QuotingMode::Group);

        // 114.94 × 1.333 = 153.21502
        assert_eq!(cost.final_price_per_unit, Decimal::new(15321502, 5));
        assert_eq!(cost.rounded(2).final_price_per_unit, Decimal::new(15322, 2));
    }
}
