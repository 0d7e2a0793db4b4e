//! 物料與物料目錄模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::{CostingError, Result};

/// 計價單位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    /// 長度（米）
    #[serde(rename = "m")]
    Meter,
    /// 重量（公斤）
    #[serde(rename = "kg")]
    Kilogram,
    /// 件
    #[serde(rename = "piece")]
    Piece,
    /// 固定費用
    #[serde(rename = "fixed")]
    Fixed,
}

impl UnitKind {
    /// 所有單位
    pub const ALL: [UnitKind; 4] = [
        UnitKind::Meter,
        UnitKind::Kilogram,
        UnitKind::Piece,
        UnitKind::Fixed,
    ];

    /// 序列化代碼（與外部資料存放一致）
    pub fn code(&self) -> &'static str {
        match self {
            UnitKind::Meter => "m",
            UnitKind::Kilogram => "kg",
            UnitKind::Piece => "piece",
            UnitKind::Fixed => "fixed",
        }
    }

    /// 報價單上顯示的單位符號
    pub fn symbol(&self) -> &'static str {
        match self {
            UnitKind::Meter => "m",
            UnitKind::Kilogram => "kg",
            UnitKind::Piece => "pc",
            UnitKind::Fixed => "forfait",
        }
    }

    /// 是否為可量測的連續單位（可有小數數量）
    pub fn is_measured(&self) -> bool {
        matches!(self, UnitKind::Meter | UnitKind::Kilogram)
    }

    /// 是否需要克重才能換算
    pub fn requires_grammage(&self) -> bool {
        *self == UnitKind::Kilogram
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for UnitKind {
    type Err = CostingError;

    fn from_str(s: &str) -> Result<Self> {
        let code = s.trim().to_ascii_lowercase();
        UnitKind::ALL
            .into_iter()
            .find(|unit| unit.code() == code)
            .ok_or_else(|| CostingError::InvalidInput(format!("未知的計價單位: {s}")))
    }
}

/// 面積換算重量（公斤）
///
/// `grammage` 為每平方米克數。
pub fn area_to_weight_kg(area_m2: Decimal, grammage: Decimal) -> Decimal {
    area_m2 * grammage / Decimal::ONE_THOUSAND
}

/// 布長換算重量（公斤）
///
/// `width_cm` 為幅寬（公分），`grammage` 為每平方米克數。
pub fn length_to_weight_kg(length_m: Decimal, width_cm: Decimal, grammage: Decimal) -> Decimal {
    area_to_weight_kg(length_m * width_cm / Decimal::ONE_HUNDRED, grammage)
}

/// 物料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// 物料ID
    pub id: Uuid,

    /// 名稱（消耗彙總時以名稱作為鍵）
    pub name: String,

    /// 單價
    #[serde(default)]
    pub price: Decimal,

    /// 計價單位
    pub unit: UnitKind,

    /// 幅寬（公分，僅供參考）
    #[serde(default, rename = "width")]
    pub width_cm: Option<Decimal>,

    /// 克重（g/m²，重量計價時必填）
    #[serde(default)]
    pub grammage: Option<Decimal>,
}

impl Material {
    /// 創建新的物料
    pub fn new(name: impl Into<String>, price: Decimal, unit: UnitKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            price,
            unit,
            width_cm: None,
            grammage: None,
        }
    }

    /// 建構器模式：設置幅寬
    pub fn with_width_cm(mut self, width_cm: Decimal) -> Self {
        self.width_cm = Some(width_cm);
        self
    }

    /// 建構器模式：設置克重
    pub fn with_grammage(mut self, grammage: Decimal) -> Self {
        self.grammage = Some(grammage);
        self
    }

    /// 修正單價（物料被報價引用後唯一允許的修改）
    pub fn correct_price(&mut self, price: Decimal) -> Result<()> {
        if price < Decimal::ZERO {
            return Err(CostingError::InvalidInput(format!(
                "物料 {} 單價不可為負: {}",
                self.name, price
            )));
        }
        self.price = price;
        Ok(())
    }

    /// 將布料面積換算為本物料的計價數量
    ///
    /// 重量計價的物料需要克重；其他單位直接回傳面積。
    pub fn quantity_for_area(&self, area_m2: Decimal) -> Result<Decimal> {
        if !self.unit.requires_grammage() {
            return Ok(area_m2);
        }
        let grammage = self
            .grammage
            .filter(|g| *g > Decimal::ZERO)
            .ok_or_else(|| CostingError::MissingGrammage(self.name.clone()))?;
        Ok(area_to_weight_kg(area_m2, grammage))
    }

    /// 檢查物料定義是否完整
    pub fn validate(&self) -> Result<()> {
        if self.price < Decimal::ZERO {
            return Err(CostingError::InvalidInput(format!(
                "物料 {} 單價不可為負",
                self.name
            )));
        }
        if self.unit.requires_grammage() && self.grammage.is_none() {
            return Err(CostingError::MissingGrammage(self.name.clone()));
        }
        Ok(())
    }
}

/// 物料目錄（以名稱為鍵）
///
/// 由呼叫端在計算時傳入，計算器不讀取任何全域狀態。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialCatalog {
    materials: BTreeMap<String, Material>,
}

impl MaterialCatalog {
    /// 創建空目錄
    pub fn new() -> Self {
        Self::default()
    }

    /// 從物料列表建立目錄（同名物料以後者為準）
    pub fn from_materials(materials: impl IntoIterator<Item = Material>) -> Self {
        let mut catalog = Self::new();
        for material in materials {
            catalog.insert(material);
        }
        catalog
    }

    /// 加入或取代物料
    pub fn insert(&mut self, material: Material) -> Option<Material> {
        self.materials.insert(material.name.clone(), material)
    }

    /// 移除物料
    pub fn remove(&mut self, name: &str) -> Option<Material> {
        self.materials.remove(name)
    }

    /// 依名稱查找
    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    /// 依名稱查找（可修改，用於價格修正）
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Material> {
        self.materials.get_mut(name)
    }

    /// 目前單價
    pub fn current_price(&self, name: &str) -> Option<Decimal> {
        self.materials.get(name).map(|m| m.price)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.values()
    }
}
