//! 集成測試

use atelier::cache::{CatalogSource, FittingStore, ProjectStore};
use atelier::calc::{VarianceTrend, WarningSeverity};
use atelier::model::*;
use atelier::{AggregateRefresher, CostingEngine, InMemoryStore};
use rstest::rstest;
use rust_decimal::Decimal;
use uuid::Uuid;

struct Scenario {
    refresher: AggregateRefresher<InMemoryStore>,
    project_id: Uuid,
    shirt_id: Uuid,
    profile: CompanyProfile,
}

/// 場景：團體制服，基準款式為襯衫（布料 + 鈕扣 + 印花），另有一款帽子
fn scenario(mode: QuotingMode) -> Scenario {
    let cotton = Material::new("Coton", Decimal::from(40), UnitKind::Meter).with_width_cm(Decimal::from(150));
    let button = Material::new("Bouton", Decimal::new(5, 1), UnitKind::Piece);
    let print = Material::new("Sérigraphie", Decimal::from(4), UnitKind::Fixed);
    let twill = Material::new("Sergé", Decimal::from(30), UnitKind::Meter);

    let shirt = LineItem::new("Chemise")
        .with_quantity(3)
        .with_profit_margin(Decimal::from(50))
        .with_item(QuoteItem::new(&cotton, Decimal::new(75, 2), MaterialClass::Fabric))
        .with_item(QuoteItem::new(&button, Decimal::from(6), MaterialClass::Accessory))
        .with_item(QuoteItem::new(&print, Decimal::ONE, MaterialClass::Print))
        .with_labor_costs(LaborCosts::new(Decimal::from(50), Decimal::from(13), Decimal::from(8)))
        .with_size(SizeSelection::selected("S, M, L"))
        .with_size(SizeSelection::selected("XL"))
        .with_size(SizeSelection::selected("XXL"));
    let shirt_id = shirt.id;

    let cap = LineItem::new("Casquette")
        .with_quantity(3)
        .with_profit_margin(Decimal::from(100))
        .with_item(QuoteItem::new(&twill, Decimal::new(3, 1), MaterialClass::Fabric))
        .with_labor_costs(LaborCosts::new(Decimal::from(6), Decimal::ZERO, Decimal::ZERO));

    let project = ProjectConfiguration::new("Fanfare municipale", mode)
        .with_line_item(shirt)
        .with_line_item(cap);
    let project_id = project.id;

    let store = InMemoryStore::new()
        .with_catalog(MaterialCatalog::from_materials(vec![cotton, button, print, twill]))
        .with_project(project);

    let table = SizeFactorTable::new()
        .with_factor("XL", Decimal::new(12, 1))
        .and_then(|t| t.with_factor("XXL", Decimal::new(12, 1)))
        .unwrap();
    let engine = CostingEngine::new(CostingConfig::new().with_size_factors(table));

    Scenario {
        refresher: AggregateRefresher::new(store, engine),
        project_id,
        shirt_id,
        profile: CompanyProfile::new(Decimal::new(1494, 2)),
    }
}

fn fittings(s: &Scenario, sizes: &[&str]) -> Vec<Fitting> {
    sizes
        .iter()
        .enumerate()
        .map(|(i, size)| Fitting::new(s.project_id, format!("MUSICIEN-{i:02}")).with_size(s.shirt_id, size))
        .collect()
}

#[test]
fn test_quote_to_purchase_list() {
    // 1. 報價：30 + 3 + 4 + 50 + 13 = 100 / 件
    let mut s = scenario(QuotingMode::Individual);
    let project = s.refresher.store().load_project(s.project_id).unwrap();
    let engine = s.refresher.engine();

    let estimate = engine.estimate(&project, &s.profile);
    let shirt = estimate.line(s.shirt_id).unwrap();
    assert_eq!(shirt.unit.subtotal_per_unit, Decimal::from(100));
    assert_eq!(shirt.unit.cost_per_unit, Decimal::new(11494, 2));
    assert_eq!(shirt.unit.final_price_per_unit, Decimal::new(17241, 2));
    assert_eq!(shirt.unit.size_prices.len(), 3);

    // 2. 量身：批次匯入三位參與者
    let roster = fittings(&s, &["s, m, l", "XL", "xxl"]);
    s.refresher.bulk_import(roster).unwrap();
    assert_eq!(s.refresher.runs(), 1);

    // 3. 寫回的實際值：0.75 + 0.9 + 0.9 = 2.55 m，× 40 = 102
    let project = s.refresher.store().load_project(s.project_id).unwrap();
    assert_eq!(project.total_fabric_length(), Decimal::new(255, 2));
    assert_eq!(project.total_fabric_cost(), Decimal::from(102));

    // 4. 採購清單
    let roster = s.refresher.store().list_fittings(s.project_id).unwrap();
    let catalog = s.refresher.store().catalog().unwrap();
    let report = s
        .refresher
        .engine()
        .full_report(&project, &roster, &catalog, &s.profile);

    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    let list = &report.purchase_list;
    assert_eq!(list.len(), 3);
    assert_eq!(list.row("Coton").unwrap().quantity, Decimal::new(255, 2));
    assert_eq!(list.row("Bouton").unwrap().quantity, Decimal::from(18));
    assert_eq!(list.row("Sérigraphie").unwrap().quantity, Decimal::from(3));
    // 帽子不是基準款式，不在清單中
    assert!(list.row("Sergé").is_none());
    assert_eq!(list.grand_total(), Decimal::from(123));

    // 5. 差異：估算 2.25 m / 90，實際 2.55 m / 102
    let variance = &report.variance;
    assert_eq!(variance.estimate.estimated_length, Decimal::new(225, 2));
    assert_eq!(variance.cost_difference, Decimal::from(12));
    assert_eq!(variance.cost_trend, VarianceTrend::Unfavorable);
}

#[test]
fn test_group_mode_totals() {
    let s = scenario(QuotingMode::Group);
    let project = s.refresher.store().load_project(s.project_id).unwrap();

    let estimate = s.refresher.engine().estimate(&project, &s.profile);

    // 襯衫：114.94 × 3 = 344.82；172.41 × 3 = 517.23
    // 帽子：成本 17.241 × 3 = 51.723 → 51.73；售價 34.482 × 3 = 103.446 → 103.45
    assert_eq!(estimate.lines[0].line_cost, Decimal::new(34482, 2));
    assert_eq!(estimate.lines[0].line_total, Decimal::new(51723, 2));
    assert_eq!(estimate.lines[1].line_cost, Decimal::new(5173, 2));
    assert_eq!(estimate.lines[1].line_total, Decimal::new(10345, 2));
    assert_eq!(estimate.total_project_cost, Decimal::new(39655, 2));
    assert_eq!(estimate.grand_total, Decimal::new(62068, 2));
}

#[rstest]
#[case("S, M, L", Decimal::new(75, 2), Decimal::from(30))]
#[case(" xl ", Decimal::new(9, 1), Decimal::from(36))]
#[case("4 ANS", Decimal::new(75, 2), Decimal::from(30))]
#[case("", Decimal::new(75, 2), Decimal::from(30))]
fn test_single_fitting_actuals(
    #[case] size: &str,
    #[case] length: Decimal,
    #[case] cost: Decimal,
) {
    // 不在係數表中的尺碼與空白尺碼都以 1 計
    let mut s = scenario(QuotingMode::Individual);
    let fitting = Fitting::new(s.project_id, "SOLO").with_size(s.shirt_id, size);
    s.refresher.create_fitting(fitting).unwrap();

    let project = s.refresher.store().load_project(s.project_id).unwrap();
    assert_eq!(project.total_fabric_length(), length);
    assert_eq!(project.total_fabric_cost(), cost);
}

#[test]
fn test_fitting_lifecycle_keeps_actuals_current() {
    let mut s = scenario(QuotingMode::Individual);

    let mut fitting = Fitting::new(s.project_id, "MUSICIEN-01").with_size(s.shirt_id, "XXL");
    let fitting_id = fitting.id;
    s.refresher.create_fitting(fitting.clone()).unwrap();

    let length = |s: &Scenario| {
        s.refresher
            .store()
            .load_project(s.project_id)
            .unwrap()
            .total_fabric_length()
    };
    assert_eq!(length(&s), Decimal::new(9, 1));

    // 尺碼改為不存在的款式：對基準款式視為沒有尺碼
    fitting.clear_size(s.shirt_id);
    fitting.assign_size(Uuid::new_v4(), "XXL");
    s.refresher.update_fitting(fitting).unwrap();
    assert_eq!(length(&s), Decimal::new(75, 2));

    s.refresher.delete_fitting(fitting_id).unwrap();
    assert_eq!(length(&s), Decimal::ZERO);
    assert_eq!(s.refresher.runs(), 3);
}

#[test]
fn test_removed_material_is_skipped_with_warning() {
    let mut s = scenario(QuotingMode::Individual);
    s.refresher.store_mut().catalog_mut().remove("Bouton");
    s.refresher.bulk_import(fittings(&s, &["XL", "XL"])).unwrap();

    let project = s.refresher.store().load_project(s.project_id).unwrap();
    let roster = s.refresher.store().list_fittings(s.project_id).unwrap();
    let catalog = s.refresher.store().catalog().unwrap();
    let report = s
        .refresher
        .engine()
        .full_report(&project, &roster, &catalog, &s.profile);

    assert!(report.purchase_list.row("Bouton").is_none());
    assert!(report
        .warnings
        .iter()
        .any(|w| w.subject == "Bouton" && w.severity == WarningSeverity::Warning));
    assert_eq!(project.total_fabric_length(), Decimal::new(18, 1));
}

#[test]
fn test_persisted_project_round_trip() {
    // 重新讀取已儲存的專案，差異結果必須完全一致
    let mut s = scenario(QuotingMode::Individual);
    s.refresher
        .bulk_import(fittings(&s, &["XL", "S, M, L", "XXL", "XL", "M"]))
        .unwrap();

    let project = s.refresher.store().load_project(s.project_id).unwrap();
    let roster = s.refresher.store().list_fittings(s.project_id).unwrap();
    let engine = s.refresher.engine();
    let before = engine.reconcile(&project, &roster);

    let json = serde_json::to_string_pretty(&project).unwrap();
    assert!(json.contains("\"surfaceTotale\""));
    assert!(json.contains("\"coutTissuTotal\""));

    let reloaded: ProjectConfiguration = serde_json::from_str(&json).unwrap();
    assert_eq!(reloaded, project);

    let after = engine.reconcile(&reloaded, &roster);
    assert_eq!(before, after);
    assert_eq!(
        before.fabric_length_difference_percentage.to_string(),
        after.fabric_length_difference_percentage.to_string()
    );
}

#[test]
fn test_zero_fittings_reconciliation() {
    let mut s = scenario(QuotingMode::Individual);
    s.refresher.refresh(s.project_id).unwrap();

    let project = s.refresher.store().load_project(s.project_id).unwrap();
    let variance = s.refresher.engine().reconcile(&project, &[]);

    assert_eq!(variance.estimate.estimated_length, Decimal::ZERO);
    assert_eq!(variance.fabric_length_difference_percentage, Decimal::ZERO);
    assert_eq!(variance.length_trend, VarianceTrend::NoChange);
    assert_eq!(variance.cost_trend, VarianceTrend::NoChange);
}

#[test]
fn test_config_loaded_from_json() {
    let config = CostingConfig::from_json_str(
        r#"{ "size_factors": { "xl": "1.2", "XXL": "1.2" }, "currency_scale": 2 }"#,
    )
    .unwrap();
    let engine = CostingEngine::new(config);

    let s = scenario(QuotingMode::Individual);
    let project = s.refresher.store().load_project(s.project_id).unwrap();
    let catalog = s.refresher.store().catalog().unwrap();
    let roster = fittings(&s, &["S, M, L", "XL", "XXL"]);

    let consumption = engine.consumption(&project, &roster, &catalog);
    assert_eq!(consumption.actuals.total_fabric_length, Decimal::new(255, 2));
}
