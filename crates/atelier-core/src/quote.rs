//! 報價明細模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fitting::normalize_size_label;
use crate::material::{Material, UnitKind};
use crate::{CostingError, Result};

/// 利潤率上限（百分比）
pub const MAX_PROFIT_MARGIN: u32 = 200;

/// 用料類別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MaterialClass {
    /// 布料（用量隨尺碼縮放）
    Fabric,
    /// 輔料
    Accessory,
    /// 印花
    Print,
}

impl MaterialClass {
    /// 是否套用尺碼係數
    pub fn is_size_scaled(&self) -> bool {
        *self == MaterialClass::Fabric
    }
}

/// 報價用料明細
///
/// 加入時凍結物料單價；數量以物料單位計，為單件成衣的用量。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteItem {
    /// 物料ID
    pub material_id: Uuid,

    /// 物料名稱
    pub material_name: String,

    /// 凍結單價
    #[serde(default)]
    pub unit_price: Decimal,

    /// 計價單位
    pub unit: UnitKind,

    /// 單件用量
    #[serde(default)]
    pub quantity: Decimal,

    /// 用料類別
    pub class: MaterialClass,
}

impl QuoteItem {
    /// 以目前單價創建用料明細
    pub fn new(material: &Material, quantity: Decimal, class: MaterialClass) -> Self {
        Self {
            material_id: material.id,
            material_name: material.name.clone(),
            unit_price: material.price,
            unit: material.unit,
            quantity,
            class,
        }
    }

    /// 以布料面積創建用料明細（重量計價的物料依克重換算）
    pub fn from_area(material: &Material, area_m2: Decimal, class: MaterialClass) -> Result<Self> {
        let quantity = material.quantity_for_area(area_m2)?;
        Ok(Self::new(material, quantity, class))
    }

    /// 小計 = 用量 × 凍結單價
    pub fn total(&self) -> Decimal {
        self.quantity * self.unit_price
    }

    /// 修改用量
    pub fn set_quantity(&mut self, quantity: Decimal) {
        self.quantity = quantity;
    }

    /// 以物料目前單價重新凍結
    pub fn reprice(&mut self, material: &Material) {
        self.unit_price = material.price;
    }

    /// 是否為布料
    pub fn is_fabric(&self) -> bool {
        self.class == MaterialClass::Fabric
    }
}

/// 工資費用（每件固定）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LaborCosts {
    /// 車縫工資
    #[serde(default)]
    pub labor: Decimal,

    /// 裁剪費
    #[serde(default)]
    pub cutting: Decimal,

    /// 其他費用（僅記錄，不計入售價）
    #[serde(default)]
    pub other: Decimal,
}

impl LaborCosts {
    pub fn new(labor: Decimal, cutting: Decimal, other: Decimal) -> Self {
        Self {
            labor,
            cutting,
            other,
        }
    }

    /// 計入售價的工資（車縫 + 裁剪）
    ///
    /// `other` 只記錄不計價，待產品負責人確認。
    pub fn priced(&self) -> Decimal {
        self.labor + self.cutting
    }
}

/// 尺碼選擇（個人報價模式）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeSelection {
    /// 尺碼
    pub label: String,

    /// 是否選用
    #[serde(default)]
    pub selected: bool,

    /// 指定售價（覆蓋計算結果）
    #[serde(default)]
    pub price_override: Option<Decimal>,

    /// 計算售價
    #[serde(default)]
    pub calculated_price: Option<Decimal>,
}

impl SizeSelection {
    /// 創建已選用的尺碼
    pub fn selected(label: &str) -> Self {
        Self {
            label: normalize_size_label(label),
            selected: true,
            price_override: None,
            calculated_price: None,
        }
    }

    /// 建構器模式：設置指定售價
    pub fn with_price_override(mut self, price: Decimal) -> Self {
        self.price_override = Some(price);
        self
    }
}

/// 款式（報價中的一件成衣）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// 款式ID
    pub id: Uuid,

    /// 名稱
    pub name: String,

    /// 批量（團體模式）
    #[serde(default)]
    pub quantity: u32,

    /// 利潤率（百分比，0-200）
    #[serde(default)]
    pub profit_margin: Decimal,

    /// 用料明細
    #[serde(default)]
    pub items: Vec<QuoteItem>,

    /// 工資費用
    #[serde(default)]
    pub labor_costs: LaborCosts,

    /// 尺碼（個人模式）
    #[serde(default)]
    pub sizes: Vec<SizeSelection>,
}

impl LineItem {
    /// 創建新的款式
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            quantity: 1,
            profit_margin: Decimal::ZERO,
            items: Vec::new(),
            labor_costs: LaborCosts::default(),
            sizes: Vec::new(),
        }
    }

    /// 建構器模式：設置批量
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// 建構器模式：設置利潤率
    pub fn with_profit_margin(mut self, margin: Decimal) -> Self {
        self.profit_margin = margin;
        self
    }

    /// 建構器模式：設置工資
    pub fn with_labor_costs(mut self, labor_costs: LaborCosts) -> Self {
        self.labor_costs = labor_costs;
        self
    }

    /// 建構器模式：加入用料
    pub fn with_item(mut self, item: QuoteItem) -> Self {
        self.items.push(item);
        self
    }

    /// 建構器模式：加入尺碼
    pub fn with_size(mut self, size: SizeSelection) -> Self {
        self.sizes.push(size);
        self
    }

    /// 加入用料
    pub fn add_item(&mut self, item: QuoteItem) {
        self.items.push(item);
    }

    /// 移除用料
    pub fn remove_item(&mut self, index: usize) -> Option<QuoteItem> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// 用料小計
    pub fn materials_total(&self) -> Decimal {
        self.items.iter().map(QuoteItem::total).sum()
    }

    /// 單件布料長度需求（布料類用量總和）
    pub fn fabric_requirement(&self) -> Decimal {
        self.items
            .iter()
            .filter(|item| item.is_fabric())
            .map(|item| item.quantity)
            .sum()
    }

    /// 單件布料成本（凍結單價）
    pub fn fabric_cost(&self) -> Decimal {
        self.items
            .iter()
            .filter(|item| item.is_fabric())
            .map(QuoteItem::total)
            .sum()
    }

    /// 已選用的尺碼
    pub fn selected_sizes(&self) -> impl Iterator<Item = &SizeSelection> {
        self.sizes.iter().filter(|s| s.selected)
    }

    /// 輸入驗證
    pub fn validate(&self) -> Result<()> {
        if self.profit_margin < Decimal::ZERO
            || self.profit_margin > Decimal::from(MAX_PROFIT_MARGIN)
        {
            return Err(CostingError::InvalidInput(format!(
                "款式 {} 的利潤率超出範圍 0-{}: {}",
                self.name, MAX_PROFIT_MARGIN, self.profit_margin
            )));
        }

        for item in &self.items {
            if item.quantity < Decimal::ZERO || item.unit_price < Decimal::ZERO {
                return Err(CostingError::InvalidInput(format!(
                    "款式 {} 的用料 {} 數量或單價為負",
                    self.name, item.material_name
                )));
            }
        }

        let labor = &self.labor_costs;
        if labor.labor < Decimal::ZERO || labor.cutting < Decimal::ZERO || labor.other < Decimal::ZERO
        {
            return Err(CostingError::InvalidInput(format!(
                "款式 {} 的工資不可為負",
                self.name
            )));
        }

        if let Some(size) = self
            .sizes
            .iter()
            .find(|s| s.price_override.is_some_and(|p| p < Decimal::ZERO))
        {
            return Err(CostingError::InvalidInput(format!(
                "款式 {} 尺碼 {} 的指定售價為負",
                self.name, size.label
            )));
        }

        Ok(())
    }
}
