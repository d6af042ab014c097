use rust_decimal::Decimal;
use serde::Serialize;

use crate::classify::{classify_all, Partitions, Tolerance};
use crate::coerce::amount_or_zero;
use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::matcher::reconcile;
use crate::model::{
    ClassifiedRecord, CommissionRecord, OrderRecord, ProviderSummaryRow, RunStats, Side,
    SummaryRow,
};
use crate::normalize::normalize_key;
use crate::provider::{AliasMap, ProviderResolver};
use crate::summary::summarize;
use crate::table::Table;

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub engine_version: String,
    pub tolerance: Tolerance,
    pub provider_cols: Vec<String>,
    pub provider_aliases: usize,
}

/// Everything one reconciliation run produces.
#[derive(Debug, Clone, Serialize)]
pub struct ReconOutcome {
    pub meta: ReconMeta,
    pub stats: RunStats,
    pub summary: Vec<SummaryRow>,
    pub provider_summary: Vec<ProviderSummaryRow>,
    pub records: Vec<ClassifiedRecord>,
    #[serde(skip)]
    pub partitions: Partitions,
    /// Source tables with normalized headers, kept for partition output.
    #[serde(skip)]
    pub orders: Table,
    #[serde(skip)]
    pub commissions: Table,
}

/// Column positions of the key and amount for one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideColumns {
    pub key: usize,
    pub amount: usize,
}

/// Verify both tables carry their configured key and amount columns.
pub fn check_schema(
    config: &ReconConfig,
    orders: &Table,
    commissions: &Table,
) -> Result<(SideColumns, SideColumns), ReconError> {
    Ok((
        side_columns(config, Side::Orders, orders)?,
        side_columns(config, Side::Commissions, commissions)?,
    ))
}

fn side_columns(config: &ReconConfig, side: Side, table: &Table) -> Result<SideColumns, ReconError> {
    let (key, amount) = config.columns(side);
    Ok(SideColumns {
        key: table.require_column(key)?,
        amount: table.require_column(amount)?,
    })
}

/// Run reconciliation: normalize, resolve providers, join, classify, summarize.
///
/// Schema problems abort before any record is read. Bad amount cells and
/// rows without a locator are counted in `stats` and never fail the run.
pub fn run(
    config: &ReconConfig,
    aliases: &AliasMap,
    mut orders: Table,
    mut commissions: Table,
) -> Result<ReconOutcome, ReconError> {
    orders.normalize_headers();
    commissions.normalize_headers();
    let (order_cols, commission_cols) = check_schema(config, &orders, &commissions)?;

    log::info!(
        "reconciling {} order rows against {} commission rows (tolerance {})",
        orders.len(),
        commissions.len(),
        config.tolerance.value()
    );

    let mut stats = RunStats::default();

    let order_records: Vec<OrderRecord> =
        extract_rows(&orders, order_cols, config, aliases, &mut stats)
            .into_iter()
            .map(|(key, provider, amount, source_row)| OrderRecord {
                key,
                provider,
                expected_commission: amount,
                source_row,
            })
            .collect();
    stats.order_rows = order_records.len();

    let commission_records: Vec<CommissionRecord> =
        extract_rows(&commissions, commission_cols, config, aliases, &mut stats)
            .into_iter()
            .map(|(key, provider, amount, source_row)| CommissionRecord {
                key,
                provider,
                billed_commission: amount,
                source_row,
            })
            .collect();
    stats.commission_rows = commission_records.len();

    if stats.skipped_missing_key > 0 {
        log::warn!("skipped {} rows without a locator", stats.skipped_missing_key);
    }
    if stats.coerced_amounts > 0 {
        log::warn!("{} unparsable amounts read as 0", stats.coerced_amounts);
    }

    let joined = reconcile(&order_records, &commission_records);
    let records = classify_all(joined, config.tolerance);
    let (summary, provider_summary) = summarize(&records);
    let partitions = Partitions::from_classified(&records);

    for row in &summary {
        log::info!("{}: {} records", row.category, row.totals.records);
    }

    Ok(ReconOutcome {
        meta: ReconMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            tolerance: config.tolerance,
            provider_cols: config.provider_cols.clone(),
            provider_aliases: aliases.len(),
        },
        stats,
        summary,
        provider_summary,
        records,
        partitions,
        orders,
        commissions,
    })
}

/// (key, provider, amount, source row) for every row with a locator.
fn extract_rows(
    table: &Table,
    cols: SideColumns,
    config: &ReconConfig,
    aliases: &AliasMap,
    stats: &mut RunStats,
) -> Vec<(String, Option<String>, Decimal, usize)> {
    let resolver = ProviderResolver::new(table, &config.provider_cols, aliases);
    if !resolver.has_columns() {
        log::debug!("{}: no provider column found", table.name);
    }

    let mut out = Vec::with_capacity(table.len());
    for (i, row) in table.rows.iter().enumerate() {
        let raw_key = table.cell(i, cols.key);
        if raw_key.trim().is_empty() {
            stats.skipped_missing_key += 1;
            continue;
        }
        let (amount, coerced) = amount_or_zero(table.cell(i, cols.amount));
        if coerced {
            stats.coerced_amounts += 1;
        }
        out.push((normalize_key(raw_key), resolver.resolve_raw(row), amount, i));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Presence, UNASSIGNED};
    use std::str::FromStr;

    fn config() -> ReconConfig {
        ReconConfig::from_json(
            r#"{
                "orders_key": "BookingLocator",
                "commissions_key": "Locator",
                "orders_commission_col": "ExpectedCommissionUSD",
                "commissions_commission_col": "BilledCommissionUSD"
            }"#,
        )
        .unwrap()
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
            vec!["Locator".into(), "Supplier".into(), "BilledCommissionUSD".into()],
        );
        for (k, p, v) in rows {
            t.push_row(vec![k.to_string(), p.to_string(), v.to_string()]);
        }
        t
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn perfect_match_end_to_end() {
        let out = run(
            &config(),
            &AliasMap::new(),
            orders(&[("ABC123", "", "100")]),
            commissions(&[("abc-123", "", "100")]),
        )
        .unwrap();
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].category, Category::PerfectMatch);
        assert_eq!(out.records[0].record.commission_gap, Decimal::ZERO);
        assert_eq!(out.summary[1].category, Category::CommissionGap);
        assert_eq!(out.summary[1].totals.records, 0);
    }

    #[test]
    fn order_without_commission_end_to_end() {
        let out = run(
            &config(),
            &AliasMap::new(),
            orders(&[("XYZ1", "", "50")]),
            commissions(&[]),
        )
        .unwrap();
        assert_eq!(out.partitions.orders_missing_commission.len(), 1);
        let r = &out.partitions.orders_missing_commission[0];
        assert_eq!(r.billed_commission, Decimal::ZERO);
        assert_eq!(r.commission_gap, dec("50"));
        assert!(out.partitions.commissions_missing_order.is_empty());
    }

    #[test]
    fn providers_resolved_per_side_with_aliases() {
        let aliases: AliasMap = [("ACME LTD".to_string(), "Acme".to_string())]
            .into_iter()
            .collect();
        let out = run(
            &config(),
            &aliases,
            orders(&[("A", "ACME LTD", "1"), ("B", "", "1"), ("C", "", "1")]),
            commissions(&[("A", "Other", "1"), ("B", "Globex", "1")]),
        )
        .unwrap();
        let providers: Vec<(&str, &str)> = out
            .records
            .iter()
            .map(|c| (c.record.key.as_str(), c.record.provider.as_str()))
            .collect();
        assert_eq!(providers, vec![("A", "Acme"), ("B", "Globex"), ("C", UNASSIGNED)]);
        assert_eq!(out.meta.provider_aliases, 1);
    }

    #[test]
    fn bad_amounts_and_missing_keys_counted() {
        let out = run(
            &config(),
            &AliasMap::new(),
            orders(&[("A", "", "n/a"), ("", "", "9"), ("B", "", "")]),
            commissions(&[("A", "", "0")]),
        )
        .unwrap();
        assert_eq!(out.stats.order_rows, 2);
        assert_eq!(out.stats.commission_rows, 1);
        assert_eq!(out.stats.skipped_missing_key, 1);
        assert_eq!(out.stats.coerced_amounts, 1);
        assert_eq!(out.records[0].record.presence, Presence::Both);
        assert_eq!(out.records[0].category, Category::PerfectMatch);
    }

    #[test]
    fn extreme_amounts_read_as_zero() {
        let huge = "79228162514264337593543950335";
        let neg_huge = "-79228162514264337593543950335";
        let out = run(
            &config(),
            &AliasMap::new(),
            orders(&[("A", "", huge), ("B", "", huge), ("C", "", "100000000000000000000")]),
            commissions(&[("A", "", neg_huge), ("C", "", "-100000000000000000000")]),
        )
        .unwrap();
        assert_eq!(out.stats.coerced_amounts, 3);
        assert_eq!(out.records.len(), 3);
        assert_eq!(out.records[0].category, Category::PerfectMatch);
        assert_eq!(out.records[0].record.commission_gap, Decimal::ZERO);
        assert_eq!(out.records[2].record.commission_gap, dec("200000000000000000000"));
        assert_eq!(out.summary[1].totals.commission_gap, dec("200000000000000000000"));
    }

    #[test]
    fn header_case_and_padding_ignored() {
        let mut o = orders(&[("A", "", "1")]);
        o.columns[0] = "  bookinglocator ".into();
        let out = run(&config(), &AliasMap::new(), o, commissions(&[])).unwrap();
        assert_eq!(out.orders.columns[0], "bookinglocator");
        assert_eq!(out.records.len(), 1);
    }

    #[test]
    fn missing_column_aborts() {
        let mut c = commissions(&[("A", "", "1")]);
        c.columns[2] = "Amount".into();
        let err = run(&config(), &AliasMap::new(), orders(&[]), c).unwrap_err();
        assert!(err.is_schema());
        assert_eq!(err.to_string(), "commissions: missing column 'billedcommissionusd'");
    }
}
