//! Aggregates derived from a list of orders.
//!
//! All functions are total over a decoded order list: they never fail and
//! always preserve document order in their results unless stated otherwise.

use std::collections::{BTreeMap, HashMap, HashSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::checks;
use crate::order::{Order, OrderStatus};

/// Order ids in document order. A missing id shows up as `""`.
pub fn list_order_ids(orders: &[Order]) -> Vec<String> {
    orders.iter().map(|o| o.id().to_string()).collect()
}

pub fn total_line_items(orders: &[Order]) -> usize {
    orders.iter().map(|o| o.lines().len()).sum()
}

/// Top `n` skus by total quantity across all lines.
///
/// Only lines with `qty > 0` are tallied (others are skipped, not clamped);
/// lines without a sku are skipped too. Equal totals keep the order in which
/// the sku was first seen. Tallies saturate at `Decimal::MAX`, which is also
/// what a quantity beyond `Decimal`'s range counts as.
pub fn top_n_skus_by_quantity(orders: &[Order], n: usize) -> Vec<(String, Decimal)> {
    let mut totals: Vec<(String, Decimal)> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();

    for line in orders.iter().flat_map(|o| o.lines()) {
        let qty = line.qty();
        if !qty.is_positive() {
            continue;
        }
        let qty = qty.exact().unwrap_or(Decimal::MAX);
        let Some(sku) = line.sku.as_deref() else {
            continue;
        };
        match slots.get(sku) {
            Some(&slot) => totals[slot].1 = totals[slot].1.saturating_add(qty),
            None => {
                slots.insert(sku, totals.len());
                totals.push((sku.to_string(), qty));
            }
        }
    }

    // `sort_by` is stable, so ties stay in first-seen order.
    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals.truncate(n);
    totals
}

/// Gross merchandise value per order id: Σ(qty × price), zero without lines.
///
/// Every order is included regardless of status, validity or sign. A
/// repeated id keeps the value of its last occurrence. The value is `None`
/// when the order's total does not fit in a `Decimal`.
pub fn gmv_per_order(orders: &[Order]) -> BTreeMap<String, Option<Decimal>> {
    orders
        .iter()
        .map(|o| (o.id().to_string(), o.line_total()))
        .collect()
}

fn ids_where(orders: &[Order], predicate: impl Fn(&Order) -> bool) -> Vec<String> {
    orders
        .iter()
        .filter(|o| predicate(o))
        .map(|o| o.id().to_string())
        .collect()
}

pub fn invalid_email_order_ids(orders: &[Order]) -> Vec<String> {
    ids_where(orders, |o| !checks::check_email_format(o))
}

pub fn invalid_status_order_ids(orders: &[Order]) -> Vec<String> {
    ids_where(orders, |o| !checks::check_status_valid(o))
}

pub fn lines_integrity_failures(orders: &[Order]) -> Vec<String> {
    ids_where(orders, |o| !checks::check_lines_integrity(o))
}

pub fn negative_shipping_fee_order_ids(orders: &[Order]) -> Vec<String> {
    ids_where(orders, |o| !checks::check_shipping_fee(o))
}

pub fn paid_orders_without_capture(orders: &[Order]) -> Vec<String> {
    ids_where(orders, |o| {
        o.is_status(OrderStatus::Paid) && !checks::check_payment_captured(o)
    })
}

pub fn cancelled_orders_with_correct_refund(orders: &[Order]) -> Vec<String> {
    ids_where(orders, |o| {
        checks::refund_applies(o) && checks::check_refund_consistency(o)
    })
}

pub fn cancelled_orders_with_refund_mismatch(orders: &[Order]) -> Vec<String> {
    ids_where(orders, |o| !checks::check_refund_consistency(o))
}

/// Ids that occur more than once, each reported once, in the order their
/// first repetition is met. Missing ids are not considered.
pub fn duplicate_order_ids(orders: &[Order]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();

    for id in orders.iter().map(Order::id).filter(|id| !id.is_empty()) {
        if !seen.insert(id) && reported.insert(id) {
            duplicates.push(id.to_string());
        }
    }
    duplicates
}

/// Failing order ids per rule, over one order list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    pub missing_ids: usize,
    pub duplicate_ids: Vec<String>,
    pub invalid_status: Vec<String>,
    pub invalid_email: Vec<String>,
    pub lines_integrity: Vec<String>,
    pub paid_without_capture: Vec<String>,
    pub refund_mismatch: Vec<String>,
    pub negative_shipping_fee: Vec<String>,
}

impl AuditReport {
    /// True when no rule failed for any order.
    pub fn passed(&self) -> bool {
        self.missing_ids == 0
            && self.duplicate_ids.is_empty()
            && self.invalid_status.is_empty()
            && self.invalid_email.is_empty()
            && self.lines_integrity.is_empty()
            && self.paid_without_capture.is_empty()
            && self.refund_mismatch.is_empty()
            && self.negative_shipping_fee.is_empty()
    }

    fn failures(&self) -> [(&'static str, &[String]); 7] {
        [
            ("duplicate id", self.duplicate_ids.as_slice()),
            ("invalid status", self.invalid_status.as_slice()),
            ("invalid email", self.invalid_email.as_slice()),
            ("lines integrity", self.lines_integrity.as_slice()),
            ("paid without capture", self.paid_without_capture.as_slice()),
            ("refund mismatch", self.refund_mismatch.as_slice()),
            ("negative shipping fee", self.negative_shipping_fee.as_slice()),
        ]
    }
}

/// Run every rule over `orders`.
pub fn audit(orders: &[Order]) -> AuditReport {
    let report = AuditReport {
        missing_ids: orders.iter().filter(|o| !checks::check_id_present(o)).count(),
        duplicate_ids: duplicate_order_ids(orders),
        invalid_status: invalid_status_order_ids(orders),
        invalid_email: invalid_email_order_ids(orders),
        lines_integrity: lines_integrity_failures(orders),
        paid_without_capture: paid_orders_without_capture(orders),
        refund_mismatch: cancelled_orders_with_refund_mismatch(orders),
        negative_shipping_fee: negative_shipping_fee_order_ids(orders),
    };

    if report.missing_ids > 0 {
        tracing::warn!(count = report.missing_ids, "orders without id");
    }
    for (rule, ids) in report.failures() {
        if !ids.is_empty() {
            tracing::warn!(rule, ?ids, "rule failed");
        }
    }
    tracing::debug!(orders = orders.len(), passed = report.passed(), "audit complete");

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{Amount, LineItem};
    use rust_decimal_macros::dec;

    fn order(id: &str, status: OrderStatus, lines: &[(&str, Decimal, Decimal)]) -> Order {
        lines.iter().fold(
            Order::new(id, status).with_email(format!("{}@shop.test", id.to_lowercase())),
            |o, (sku, qty, price)| o.with_line(LineItem::new(*sku, *qty, *price)),
        )
    }

    #[test]
    fn ids_follow_document_order() {
        let orders = vec![
            order("B", OrderStatus::Paid, &[]),
            order("A", OrderStatus::Paid, &[]),
            Order::default(),
        ];
        assert_eq!(list_order_ids(&orders), vec!["B", "A", ""]);
    }

    #[test]
    fn total_line_items_counts_every_line() {
        let orders = vec![
            order("A", OrderStatus::Paid, &[("X", dec!(1), dec!(1)), ("Y", dec!(-1), dec!(1))]),
            order("B", OrderStatus::Cancelled, &[]),
            order("C", OrderStatus::Pending, &[("Z", dec!(0), dec!(1))]),
        ];
        assert_eq!(total_line_items(&orders), 3);
        assert_eq!(total_line_items(&[]), 0);
    }

    #[test]
    fn top_skus_skip_non_positive_quantities() {
        let orders = vec![
            order("A", OrderStatus::Paid, &[("PEN", dec!(2), dec!(1)), ("MUG", dec!(-5), dec!(1))]),
            order("B", OrderStatus::Paid, &[("MUG", dec!(1), dec!(1)), ("PEN", dec!(0), dec!(1))]),
        ];
        assert_eq!(
            top_n_skus_by_quantity(&orders, 10),
            vec![("PEN".to_string(), dec!(2)), ("MUG".to_string(), dec!(1))]
        );
    }

    #[test]
    fn top_skus_ties_keep_first_seen_order() {
        let orders = vec![
            order("A", OrderStatus::Paid, &[("ZED", dec!(2), dec!(1)), ("ALPHA", dec!(1), dec!(1))]),
            order("B", OrderStatus::Paid, &[("MID", dec!(2), dec!(1)), ("ALPHA", dec!(1), dec!(1))]),
        ];
        assert_eq!(
            top_n_skus_by_quantity(&orders, 3),
            vec![
                ("ZED".to_string(), dec!(2)),
                ("ALPHA".to_string(), dec!(2)),
                ("MID".to_string(), dec!(2)),
            ]
        );
        assert_eq!(top_n_skus_by_quantity(&orders, 1), vec![("ZED".to_string(), dec!(2))]);
        assert!(top_n_skus_by_quantity(&orders, 0).is_empty());
    }

    #[test]
    fn top_skus_ignore_lines_without_sku() {
        let mut o = order("A", OrderStatus::Paid, &[("PEN", dec!(1), dec!(1))]);
        o.lines.push(LineItem {
            sku: None,
            qty: Some(dec!(9).into()),
            price: Some(dec!(1).into()),
        });
        assert_eq!(top_n_skus_by_quantity(&[o], 5), vec![("PEN".to_string(), dec!(1))]);
    }

    #[test]
    fn gmv_includes_every_order_regardless_of_validity() {
        let orders = vec![
            order("A", OrderStatus::Paid, &[("X", dec!(2), dec!(10.5))]),
            order("B", OrderStatus::Pending, &[]),
            order("C", OrderStatus::Cancelled, &[("Y", dec!(1), dec!(-15)), ("Z", dec!(0), dec!(4))]),
        ];
        let gmv = gmv_per_order(&orders);
        assert_eq!(gmv.len(), 3);
        assert_eq!(gmv["A"], Some(dec!(21)));
        assert_eq!(gmv["B"], Some(dec!(0)));
        assert_eq!(gmv["C"], Some(dec!(-15)));
    }

    #[test]
    fn gmv_repeated_id_keeps_last_value() {
        let orders = vec![
            order("A", OrderStatus::Paid, &[("X", dec!(1), dec!(1))]),
            order("A", OrderStatus::Paid, &[("X", dec!(3), dec!(1))]),
        ];
        assert_eq!(gmv_per_order(&orders)["A"], Some(dec!(3)));
    }

    #[test]
    fn capture_and_refund_selections() {
        let orders = vec![
            order("P1", OrderStatus::Paid, &[("X", dec!(1), dec!(1))]).with_captured(true),
            order("P2", OrderStatus::Paid, &[("X", dec!(1), dec!(1))]),
            order("C1", OrderStatus::Cancelled, &[("X", dec!(2), dec!(8))]).with_refund(dec!(16)),
            order("C2", OrderStatus::Cancelled, &[("X", dec!(2), dec!(8))]).with_refund(dec!(10)),
            order("C3", OrderStatus::Cancelled, &[]),
        ];
        assert_eq!(paid_orders_without_capture(&orders), vec!["P2"]);
        assert_eq!(cancelled_orders_with_correct_refund(&orders), vec!["C1"]);
        assert_eq!(cancelled_orders_with_refund_mismatch(&orders), vec!["C2"]);
    }

    #[test]
    fn duplicates_reported_once_each() {
        let orders = vec![
            order("A", OrderStatus::Paid, &[]),
            order("B", OrderStatus::Paid, &[]),
            order("B", OrderStatus::Paid, &[]),
            order("A", OrderStatus::Paid, &[]),
            order("B", OrderStatus::Paid, &[]),
            Order::default(),
            Order::default(),
        ];
        assert_eq!(duplicate_order_ids(&orders), vec!["B", "A"]);
    }

    #[test]
    fn audit_collects_each_rule() {
        let mut bad_status = order("S", OrderStatus::Pending, &[("X", dec!(1), dec!(1))]);
        bad_status.status = Some("LOST".into());

        let orders = vec![
            order("OK", OrderStatus::Paid, &[("X", dec!(1), dec!(1))]).with_captured(true),
            bad_status,
            order("E", OrderStatus::Pending, &[("X", dec!(1), dec!(1))]).with_email("nope"),
            order("F", OrderStatus::Pending, &[("X", dec!(1), dec!(1))]).with_shipping_fee(dec!(-1)),
            Order::default(),
        ];
        let report = audit(&orders);

        assert!(!report.passed());
        assert_eq!(report.missing_ids, 1);
        assert_eq!(report.invalid_status, vec!["S", ""]);
        assert_eq!(report.invalid_email, vec!["E", ""]);
        assert_eq!(report.negative_shipping_fee, vec!["F"]);
        assert!(report.paid_without_capture.is_empty());
        assert!(report.lines_integrity.is_empty());
    }

    #[test]
    fn audit_of_clean_orders_passes() {
        let orders = vec![
            order("A", OrderStatus::Paid, &[("X", dec!(1), dec!(1))]).with_captured(true),
            order("B", OrderStatus::Cancelled, &[("X", dec!(1), dec!(2))]).with_refund(dec!(2)),
        ];
        assert!(audit(&orders).passed());
        assert!(audit(&[]).passed());
    }

    #[test]
    fn overflowing_gmv_is_reported_as_none() {
        let orders = vec![
            order("BIG", OrderStatus::Paid, &[("X", dec!(1000000000000000), dec!(1000000000000000))]),
            order("OK", OrderStatus::Paid, &[("X", dec!(2), dec!(3))]),
        ];
        let gmv = gmv_per_order(&orders);
        assert_eq!(gmv["BIG"], None);
        assert_eq!(gmv["OK"], Some(dec!(6)));

        let report = audit(&orders);
        assert!(report.refund_mismatch.is_empty());
    }

    #[test]
    fn top_sku_tally_saturates_instead_of_overflowing() {
        let mut huge = order("A", OrderStatus::Paid, &[("PEN", Decimal::MAX, dec!(1))]);
        huge.lines.push(LineItem {
            sku: Some("PEN".into()),
            qty: Some(Amount::OutOfRange { negative: false }),
            price: Some(dec!(1).into()),
        });
        huge.lines.push(LineItem::new("MUG", dec!(1), dec!(1)));

        assert_eq!(
            top_n_skus_by_quantity(&[huge], 2),
            vec![("PEN".to_string(), Decimal::MAX), ("MUG".to_string(), dec!(1))]
        );
    }

    mod proptest_tests {
        use super::*;
        use crate::strategies;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: top-N is deterministic and ordered by descending quantity.
            #[test]
            fn top_skus_are_deterministic_and_sorted(orders in strategies::orders(), n in 0usize..6) {
                let first = top_n_skus_by_quantity(&orders, n);
                let second = top_n_skus_by_quantity(&orders, n);
                prop_assert_eq!(&first, &second);
                prop_assert!(first.len() <= n);
                prop_assert!(first.windows(2).all(|w| w[0].1 >= w[1].1));
                prop_assert!(first.iter().all(|(_, qty)| *qty > Decimal::ZERO));
            }

            /// Property: a shorter top-N is a prefix of a longer one.
            #[test]
            fn top_skus_prefix_stable(orders in strategies::orders()) {
                let all = top_n_skus_by_quantity(&orders, usize::MAX);
                let top3 = top_n_skus_by_quantity(&orders, 3);
                prop_assert_eq!(&all[..top3.len()], &top3[..]);
            }

            /// Property: GMV over distinct ids sums to the grand line total.
            #[test]
            fn gmv_sums_to_grand_total(orders in strategies::orders()) {
                let orders: Vec<Order> = orders
                    .into_iter()
                    .enumerate()
                    .map(|(i, mut o)| {
                        o.id = Some(format!("ORD-{i}"));
                        o
                    })
                    .collect();

                let gmv_total: Option<Decimal> = gmv_per_order(&orders).values().copied().sum();
                let line_total: Option<Decimal> = orders
                    .iter()
                    .flat_map(|o| o.lines())
                    .map(|l| l.total())
                    .sum();
                prop_assert_eq!(gmv_total, line_total);
            }

            /// Property: invalid email ids are an order-preserving subsequence of all ids.
            #[test]
            fn invalid_email_ids_are_a_subsequence(orders in strategies::orders()) {
                let ids = list_order_ids(&orders);
                let invalid = invalid_email_order_ids(&orders);

                let mut remaining = ids.iter();
                for id in &invalid {
                    prop_assert!(remaining.any(|candidate| candidate == id));
                }
            }

            /// Property: correct refunds and refund mismatches split exactly the
            /// orders the refund rule applies to.
            #[test]
            fn refund_selections_partition_applicable_orders(orders in strategies::orders()) {
                let orders: Vec<Order> = orders
                    .into_iter()
                    .enumerate()
                    .map(|(i, mut o)| {
                        o.id = Some(format!("ORD-{i}"));
                        o
                    })
                    .collect();

                let applicable: Vec<String> = orders
                    .iter()
                    .filter(|o| checks::refund_applies(o))
                    .map(|o| o.id().to_string())
                    .collect();
                let correct = cancelled_orders_with_correct_refund(&orders);
                let mismatch = cancelled_orders_with_refund_mismatch(&orders);

                prop_assert!(correct.iter().all(|id| applicable.contains(id)));
                prop_assert!(mismatch.iter().all(|id| applicable.contains(id)));
                prop_assert!(correct.iter().all(|id| !mismatch.contains(id)));
                prop_assert_eq!(correct.len() + mismatch.len(), applicable.len());
            }
        }
    }
}
