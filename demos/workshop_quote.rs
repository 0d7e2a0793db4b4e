//! # 工坊報價範例
//!
//! 一個團體制服專案的報價流程：
//! - 物料目錄：布料、配件、印花
//! - 款式：襯衫（基準款式）與帽子
//! - 團體模式：每款乘以批量後向上取整
//! - 個人模式：逐尺碼售價

use anyhow::Result;
use atelier::model::*;
use atelier::CostingEngine;
use rust_decimal::Decimal;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("🧵 ===== 工坊報價範例 =====");
    println!();

    // ========== 1. 物料目錄 ==========
    println!("📦 步驟 1: 建立物料目錄");
    let cotton = Material::new("Coton", Decimal::from(40), UnitKind::Meter)
        .with_width_cm(Decimal::from(150))
        .with_grammage(Decimal::from(140));
    let button = Material::new("Bouton", Decimal::new(5, 1), UnitKind::Piece);
    let print = Material::new("Sérigraphie", Decimal::from(4), UnitKind::Fixed);
    let twill = Material::new("Sergé", Decimal::from(30), UnitKind::Meter);
    let catalog = MaterialCatalog::from_materials(vec![
        cotton.clone(),
        button.clone(),
        print.clone(),
        twill.clone(),
    ]);
    for material in catalog.iter() {
        println!("   ✓ {}: {} / {}", material.name, material.price, material.unit.symbol());
    }
    println!();

    // ========== 2. 款式報價單 ==========
    println!("👕 步驟 2: 建立款式");
    let shirt = LineItem::new("Chemise")
        .with_quantity(25)
        .with_profit_margin(Decimal::from(50))
        .with_item(QuoteItem::new(&cotton, Decimal::new(75, 2), MaterialClass::Fabric))
        .with_item(QuoteItem::new(&button, Decimal::from(6), MaterialClass::Accessory))
        .with_item(QuoteItem::new(&print, Decimal::ONE, MaterialClass::Print))
        .with_labor_costs(LaborCosts::new(Decimal::from(50), Decimal::from(13), Decimal::from(8)))
        .with_size(SizeSelection::selected("S, M, L"))
        .with_size(SizeSelection::selected("XL"))
        .with_size(SizeSelection::selected("XXL").with_price_override(Decimal::from(180)));
    let cap = LineItem::new("Casquette")
        .with_quantity(25)
        .with_profit_margin(Decimal::from(100))
        .with_item(QuoteItem::new(&twill, Decimal::new(3, 1), MaterialClass::Fabric))
        .with_labor_costs(LaborCosts::new(Decimal::from(6), Decimal::ZERO, Decimal::ZERO));
    shirt.validate()?;
    cap.validate()?;
    println!("   ✓ {}: 批量 {}", shirt.name, shirt.quantity);
    println!("   ✓ {}: 批量 {}", cap.name, cap.quantity);
    println!();

    let profile = CompanyProfile::new(Decimal::new(1494, 2));
    let engine = CostingEngine::new(CostingConfig::new());

    // ========== 3. 團體模式 ==========
    println!("🧮 步驟 3: 團體模式報價（稅率 {}%）", profile.tax_percentage);
    let group = ProjectConfiguration::new("Fanfare municipale", QuotingMode::Group)
        .with_line_item(shirt.clone())
        .with_line_item(cap.clone());
    let estimate = engine.estimate(&group, &profile);
    for line in &estimate.lines {
        let unit = line.unit.rounded(2);
        println!(
            "   {} × {}: 單件成本 {}，單件售價 {}，成本合計 {}，售價合計 {}",
            line.name, line.weight, unit.cost_per_unit, unit.final_price_per_unit, line.line_cost, line.line_total
        );
    }
    println!("   總成本: {}", estimate.total_project_cost);
    println!("   總售價: {}", estimate.grand_total);
    println!("   毛利:   {}", estimate.margin());
    println!();

    // ========== 4. 個人模式 ==========
    println!("🏷️  步驟 4: 個人模式逐尺碼售價");
    let mut individual = ProjectConfiguration::new("Boutique", QuotingMode::Individual)
        .with_line_item(shirt)
        .with_line_item(cap);
    engine.apply_quote(&mut individual, &profile);
    for line in &individual.line_items {
        for size in line.selected_sizes() {
            let mark = if size.price_override.is_some() { "（指定）" } else { "" };
            println!(
                "   {} [{}]: {}{}",
                line.name,
                size.label,
                size.calculated_price.unwrap_or_default().round_dp(2),
                mark
            );
        }
    }

    let estimate = engine.estimate(&individual, &profile);
    let projection = estimate.for_headcount(40, engine.config().currency_scale);
    println!(
        "   每人一套：{} 人，總成本 {}，總售價 {}",
        projection.headcount, projection.total_cost, projection.total_price
    );
    println!();

    // ========== 5. 輸出報價 JSON ==========
    println!("💾 步驟 5: 輸出專案資料");
    let json = serde_json::to_string_pretty(&individual)?;
    println!("   ✓ JSON 長度: {} 字元", json.len());
    println!();

    println!("✅ 報價完成");
    Ok(())
}
