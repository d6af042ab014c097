use std::collections::BTreeMap;

use crate::model::{CommissionRecord, JoinedRecord, OrderRecord};

/// Full outer join of orders and commissions on normalized key.
///
/// Keys are visited in sorted order. Within a key shared by both sides every
/// (order, commission) pair is emitted, orders outer and commissions inner,
/// each in input order. Unmatched records are emitted one per record with the
/// missing side filled with zero.
pub fn reconcile(orders: &[OrderRecord], commissions: &[CommissionRecord]) -> Vec<JoinedRecord> {
    let mut by_key: BTreeMap<&str, (Vec<&OrderRecord>, Vec<&CommissionRecord>)> = BTreeMap::new();
    for order in orders {
        by_key.entry(order.key.as_str()).or_default().0.push(order);
    }
    for commission in commissions {
        by_key.entry(commission.key.as_str()).or_default().1.push(commission);
    }

    let mut joined = Vec::with_capacity(orders.len().max(commissions.len()));

    for (key, (key_orders, key_commissions)) in by_key {
        match (key_orders.is_empty(), key_commissions.is_empty()) {
            (false, false) => {
                if key_orders.len() > 1 || key_commissions.len() > 1 {
                    log::debug!(
                        "key {key}: {} orders x {} commissions paired",
                        key_orders.len(),
                        key_commissions.len()
                    );
                }
                for order in &key_orders {
                    for commission in &key_commissions {
                        joined.push(JoinedRecord::both(order, commission));
                    }
                }
            }
            (false, true) => {
                joined.extend(key_orders.iter().map(|o| JoinedRecord::order_only(o)));
            }
            (true, false) => {
                joined.extend(key_commissions.iter().map(|c| JoinedRecord::commission_only(c)));
            }
            (true, true) => {}
        }
    }

    joined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Presence;
    use rust_decimal::Decimal;

    fn order(key: &str, amount: i64) -> OrderRecord {
        OrderRecord {
            key: key.into(),
            provider: None,
            expected_commission: Decimal::from(amount),
            source_row: 0,
        }
    }

    fn commission(key: &str, amount: i64) -> CommissionRecord {
        CommissionRecord {
            key: key.into(),
            provider: None,
            billed_commission: Decimal::from(amount),
            source_row: 0,
        }
    }

    #[test]
    fn single_key_match() {
        let out = reconcile(&[order("ABC123", 100)], &[commission("ABC123", 100)]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].presence, Presence::Both);
        assert_eq!(out[0].commission_gap, Decimal::ZERO);
    }

    #[test]
    fn order_without_commission() {
        let out = reconcile(&[order("XYZ1", 50)], &[]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].presence, Presence::OrderOnly);
        assert_eq!(out[0].billed_commission, Decimal::ZERO);
        assert_eq!(out[0].commission_gap, Decimal::from(50));
    }

    #[test]
    fn commission_without_order() {
        let out = reconcile(&[], &[commission("Q", 8)]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].presence, Presence::CommissionOnly);
        assert_eq!(out[0].commission_gap, Decimal::from(-8));
    }

    #[test]
    fn duplicate_keys_cross_product() {
        let out = reconcile(&[order("K", 10), order("K", 20)], &[commission("K", 5)]);
        assert_eq!(out.len(), 2);
        let gaps: Vec<Decimal> = out.iter().map(|j| j.commission_gap).collect();
        assert_eq!(gaps, vec![Decimal::from(5), Decimal::from(15)]);
    }

    #[test]
    fn duplicates_on_both_sides_multiply() {
        let out = reconcile(
            &[order("K", 1), order("K", 2)],
            &[commission("K", 1), commission("K", 1), commission("K", 1)],
        );
        assert_eq!(out.len(), 6);
        assert!(out.iter().all(|j| j.presence == Presence::Both));
    }

    #[test]
    fn duplicate_unmatched_orders_each_kept() {
        let out = reconcile(&[order("K", 1), order("K", 2)], &[commission("J", 3)]);
        assert_eq!(out.len(), 3);
        assert_eq!(
            out.iter().filter(|j| j.presence == Presence::OrderOnly).count(),
            2
        );
    }

    #[test]
    fn output_sorted_by_key() {
        let out = reconcile(
            &[order("B", 1), order("A", 1)],
            &[commission("C", 1), commission("A", 1)],
        );
        let keys: Vec<&str> = out.iter().map(|j| j.key.as_str()).collect();
        assert_eq!(keys, vec!["A", "B", "C"]);
    }
}
