use rust_decimal::Decimal;

use commrec_recon::model::{Category, Presence, UNASSIGNED};
use commrec_recon::{run, AliasMap, Cell, ReconConfig, ReconOutcome, Table};

fn config(tolerance: &str) -> ReconConfig {
    let json = format!(
        r#"{{
            "input_file": "book.xlsx",
            "odv_sheet": "Orders",
            "com_sheet": "Commissions",
            "odv_key": "BookingLocator",
            "com_key": "Locator",
            "odv_commission_col": "ExpectedCommissionUSD",
            "com_commission_col": "BilledCommissionUSD",
            "tolerance": {tolerance}
        }}"#
    );
    ReconConfig::from_json(&json).unwrap()
}

fn orders(rows: &[(&str, &str, &str)]) -> Table {
    let mut t = Table::new(
        "orders",
        vec!["BookingLocator".into(), "Provider".into(), "ExpectedCommissionUSD".into()],
    );
    for (k, p, v) in rows {
        t.push_row(vec![k.to_string(), p.to_string(), v.to_string()]);
    }
    t
}

fn commissions(rows: &[(&str, &str, &str)]) -> Table {
    let mut t = Table::new(
        "commissions",
        vec!["Locator".into(), "Provider".into(), "BilledCommissionUSD".into()],
    );
    for (k, p, v) in rows {
        t.push_row(vec![k.to_string(), p.to_string(), v.to_string()]);
    }
    t
}

fn run_default(o: Table, c: Table) -> ReconOutcome {
    run(&config("0.25"), &AliasMap::new(), o, c).unwrap()
}

fn dec(v: i64, scale: u32) -> Decimal {
    Decimal::new(v, scale)
}

// ---------------------------------------------------------------------------
// Tolerance
// ---------------------------------------------------------------------------

#[test]
fn gap_inside_tolerance_is_perfect_match() {
    let out = run_default(
        orders(&[("ABC123", "", "100.00")]),
        commissions(&[("abc-123", "", "99.80")]),
    );
    assert_eq!(out.records[0].category, Category::PerfectMatch);
    assert_eq!(out.records[0].record.commission_gap, dec(20, 2));
}

#[test]
fn gap_on_boundary_is_inclusive() {
    let out = run_default(
        orders(&[("ABC123", "", "100.00")]),
        commissions(&[("ABC123", "", "99.75")]),
    );
    assert_eq!(out.records[0].category, Category::PerfectMatch);
}

#[test]
fn gap_beyond_tolerance_is_commission_gap() {
    let out = run_default(
        orders(&[("ABC123", "", "100.00")]),
        commissions(&[("ABC123", "", "90.00")]),
    );
    assert_eq!(out.records[0].category, Category::CommissionGap);
    assert_eq!(out.summary[1].totals.commission_gap, dec(10, 0));
}

#[test]
fn zero_tolerance_requires_exact_amounts() {
    let out = run(
        &config("0"),
        &AliasMap::new(),
        orders(&[("A", "", "10.00"), ("B", "", "10.00")]),
        commissions(&[("A", "", "10"), ("B", "", "10.01")]),
    )
    .unwrap();
    assert_eq!(out.records[0].category, Category::PerfectMatch);
    assert_eq!(out.records[1].category, Category::CommissionGap);
}

#[test]
fn negative_tolerance_rejected() {
    let err = ReconConfig::from_json(
        r#"{"orders_key":"k","commissions_key":"k","orders_commission_col":"a","commissions_commission_col":"b","tolerance":-1}"#,
    )
    .unwrap_err();
    assert!(err.is_config());
}

// ---------------------------------------------------------------------------
// Join shape
// ---------------------------------------------------------------------------

#[test]
fn duplicate_keys_expand_to_cross_product() {
    let out = run_default(
        orders(&[("K1", "", "10"), ("k-1", "", "20")]),
        commissions(&[("K1", "", "5")]),
    );
    assert_eq!(out.records.len(), 2);
    let gaps: Vec<Decimal> = out.records.iter().map(|r| r.record.commission_gap).collect();
    assert_eq!(gaps, vec![dec(5, 0), dec(15, 0)]);
    assert!(out
        .records
        .iter()
        .all(|r| r.category == Category::CommissionGap));
}

#[test]
fn every_record_lands_in_exactly_one_partition() {
    let out = run_default(
        orders(&[("A", "", "1"), ("B", "", "2"), ("C", "", "3")]),
        commissions(&[("A", "", "1"), ("B", "", "9"), ("D", "", "4")]),
    );
    assert_eq!(out.partitions.total(), out.records.len());
    assert_eq!(out.partitions.matches.len(), 1);
    assert_eq!(out.partitions.commission_gap.len(), 1);
    assert_eq!(out.partitions.orders_missing_commission.len(), 1);
    assert_eq!(out.partitions.commissions_missing_order.len(), 1);
    assert_eq!(
        out.partitions.commissions_missing_order[0].presence,
        Presence::CommissionOnly
    );
}

#[test]
fn empty_inputs_produce_zero_summary() {
    let out = run_default(orders(&[]), commissions(&[]));
    assert!(out.records.is_empty());
    assert_eq!(out.summary.len(), 4);
    assert!(out.summary.iter().all(|r| r.totals.records == 0));
    assert!(out.provider_summary.is_empty());
    let tables = out.tables();
    assert_eq!(tables.len(), 6);
    assert!(tables[..4].iter().all(|t| t.rows.is_empty()));
}

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

#[test]
fn providers_canonicalized_and_defaulted() {
    let aliases =
        AliasMap::from_json(r#"{"ACME LTD": "Acme", "acme": "Acme"}"#, "aliases").unwrap();
    let out = run(
        &config("0.25"),
        &aliases,
        orders(&[("A", "ACME LTD", "5"), ("B", "", "5")]),
        commissions(&[("A", "", "5"), ("C", " acme ", "2")]),
    )
    .unwrap();

    let names: Vec<&str> = out.records.iter().map(|r| r.record.provider.as_str()).collect();
    assert_eq!(names, vec!["Acme", UNASSIGNED, "Acme"]);

    let breakdown: Vec<(Category, &str, usize)> = out
        .provider_summary
        .iter()
        .map(|p| (p.category, p.provider.as_str(), p.totals.records))
        .collect();
    assert_eq!(
        breakdown,
        vec![
            (Category::PerfectMatch, "Acme", 1),
            (Category::OrdersMissingCommission, UNASSIGNED, 1),
            (Category::CommissionsMissingOrder, "Acme", 1),
        ]
    );
}

// ---------------------------------------------------------------------------
// Output tables
// ---------------------------------------------------------------------------

#[test]
fn partition_rows_carry_source_columns() {
    let out = run_default(
        orders(&[("ABC123", "Acme", "100")]),
        commissions(&[("abc-123", "Acme", "100")]),
    );
    let tables = out.tables();
    let matches = &tables[0];
    let raw_locator = matches.column_index("locator").unwrap();
    let order_provider = matches.column_index("provider_order").unwrap();
    assert_eq!(matches.rows[0][0], Cell::Text("ABC123".into()));
    assert_eq!(matches.rows[0][raw_locator], Cell::Text("abc-123".into()));
    assert_eq!(matches.rows[0][order_provider], Cell::Text("Acme".into()));
}

#[test]
fn outcome_serializes_for_json_output() {
    let out = run_default(
        orders(&[("A", "", "1.50")]),
        commissions(&[("A", "", "1.00")]),
    );
    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["records"][0]["category"], "Commission Gap");
    assert_eq!(json["records"][0]["presence"], "BOTH");
    assert_eq!(json["summary"].as_array().unwrap().len(), 4);
    assert_eq!(json["stats"]["order_rows"], 1);
    assert!(json.get("partitions").is_none());
}
