//! # 量身名單與採購清單範例
//!
//! 從量身名單到採購：
//! - 從 JSON 載入尺碼係數
//! - 批次匯入量身記錄，每個專案只重算一次
//! - 單筆修改後自動更新實際用量
//! - 輸出全局採購清單與估算差異

use anyhow::Result;
use atelier::cache::{CatalogSource, FittingStore, ProjectStore};
use atelier::model::*;
use atelier::{AggregateRefresher, CostingEngine, InMemoryStore};
use rust_decimal::Decimal;

const SIZE_CONFIG: &str = r#"{
    "size_factors": {
        "S, M, L": "1",
        "XL": "1.2",
        "XXL": "1.2",
        "XXXL": "1.4",
        "4 ANS": "0.6"
    },
    "currency_scale": 2
}"#;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("📏 ===== 量身名單範例 =====");
    println!();

    // ========== 1. 配置 ==========
    println!("⚙️  步驟 1: 載入尺碼係數");
    let config = CostingConfig::from_json_str(SIZE_CONFIG)?;
    for label in config.size_factors.labels() {
        println!("   ✓ {}: × {}", label, config.size_factors.factor(label));
    }
    println!();

    // ========== 2. 專案與目錄 ==========
    println!("🔧 步驟 2: 建立專案");
    let cotton = Material::new("Coton", Decimal::from(40), UnitKind::Meter);
    let button = Material::new("Bouton", Decimal::new(5, 1), UnitKind::Piece);
    let print = Material::new("Sérigraphie", Decimal::from(4), UnitKind::Fixed);

    let shirt = LineItem::new("Chemise")
        .with_profit_margin(Decimal::from(50))
        .with_item(QuoteItem::new(&cotton, Decimal::new(75, 2), MaterialClass::Fabric))
        .with_item(QuoteItem::new(&button, Decimal::from(6), MaterialClass::Accessory))
        .with_item(QuoteItem::new(&print, Decimal::ONE, MaterialClass::Print))
        .with_labor_costs(LaborCosts::new(Decimal::from(50), Decimal::from(13), Decimal::ZERO));
    let shirt_id = shirt.id;

    let project = ProjectConfiguration::new("Chorale", QuotingMode::Individual).with_line_item(shirt);
    let project_id = project.id;
    println!("   ✓ 專案 {}，基準款式 Chemise", project.name);
    println!();

    let store = InMemoryStore::new()
        .with_catalog(MaterialCatalog::from_materials(vec![cotton, button, print]))
        .with_project(project);
    let mut refresher = AggregateRefresher::new(store, CostingEngine::new(config));

    // ========== 3. 批次匯入 ==========
    println!("📥 步驟 3: 批次匯入量身記錄");
    let sizes = ["s, m, l", "XL", "xxl", "XL", "4 ans", "XXXL", ""];
    let roster: Vec<Fitting> = sizes
        .iter()
        .enumerate()
        .map(|(i, size)| Fitting::new(project_id, format!("CHORISTE-{:02}", i + 1)).with_size(shirt_id, size))
        .collect();
    refresher.bulk_import(roster)?;
    let stored = refresher.store().load_project(project_id)?;
    println!("   ✓ 重算次數: {}", refresher.runs());
    println!("   ✓ 布料總長: {} m", stored.total_fabric_length());
    println!("   ✓ 布料成本: {}", stored.total_fabric_cost());
    println!();

    // ========== 4. 單筆修改 ==========
    println!("✏️  步驟 4: 修改一位參與者的尺碼");
    let mut fitting = refresher
        .store()
        .list_fittings(project_id)?
        .into_iter()
        .find(|f| f.person_id == "CHORISTE-07")
        .ok_or_else(|| anyhow::anyhow!("找不到參與者 CHORISTE-07"))?;
    fitting.assign_size(shirt_id, "XXL");
    refresher.update_fitting(fitting)?;
    let stored = refresher.store().load_project(project_id)?;
    println!("   ✓ 布料總長: {} m", stored.total_fabric_length());
    println!();

    // ========== 5. 採購清單 ==========
    println!("🛒 步驟 5: 全局採購清單");
    let fittings = refresher.store().list_fittings(project_id)?;
    let catalog = refresher.store().catalog()?;
    let profile = CompanyProfile::new(Decimal::new(1494, 2));
    let report = refresher
        .engine()
        .full_report(&stored, &fittings, &catalog, &profile);

    for (size, count) in &report.consumption.size_distribution {
        println!("   尺碼 {}: {} 人", size, count);
    }
    for row in &report.purchase_list.rounded(2).rows {
        println!(
            "   {} ({:?}): {} {} × {} = {}",
            row.material_name,
            row.class,
            row.quantity,
            row.unit.symbol(),
            row.unit_price,
            row.total_cost
        );
    }
    println!("   合計: {}", report.purchase_list.grand_total().round_dp(2));
    println!();

    // ========== 6. 差異 ==========
    println!("📊 步驟 6: 估算與實際差異");
    let variance = &report.variance;
    println!(
        "   估算 {} m / {}，實際 {} m / {}",
        variance.estimate.estimated_length,
        variance.estimate.estimated_cost,
        variance.actual_length,
        variance.actual_cost
    );
    println!(
        "   長度差異 {}% ({:?})，成本差異 {} ({:?})",
        variance.fabric_length_difference_percentage.round_dp(2),
        variance.length_trend,
        variance.cost_difference,
        variance.cost_trend
    );

    if !report.warnings.is_empty() {
        println!();
        println!("⚠️  警告:");
        for warning in &report.warnings {
            println!("   [{:?}] {}: {}", warning.severity, warning.subject, warning.message);
        }
    }

    println!();
    println!("✅ 完成");
    Ok(())
}
