//! Per-order rules.
//!
//! Every check is a pure predicate over one [`Order`]: `true` means the rule
//! holds. Absent fields and sub-objects never error; they only make the rule
//! that inspects them fail (or pass vacuously when the rule does not apply).

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::order::{Amount, LineItem, Order, OrderStatus};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles")
});

/// A single rule broken by one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineViolation {
    MissingSku,
    NonPositiveQty,
    NegativePrice,
}

/// Every rule `line` breaks, in sku / qty / price order.
pub fn line_violations(line: &LineItem) -> Vec<LineViolation> {
    let mut violations = Vec::new();
    if line.sku().is_empty() {
        violations.push(LineViolation::MissingSku);
    }
    if !line.qty().is_positive() {
        violations.push(LineViolation::NonPositiveQty);
    }
    if line.price().is_negative() {
        violations.push(LineViolation::NegativePrice);
    }
    violations
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn check_id_present(order: &Order) -> bool {
    !order.id().is_empty()
}

pub fn check_status_valid(order: &Order) -> bool {
    order.status().is_some()
}

/// Fails when the customer or its email is absent.
pub fn check_email_format(order: &Order) -> bool {
    order.email().is_some_and(is_valid_email)
}

/// Fails when a paid/pending order has no lines, or when any line breaks a
/// line rule.
pub fn check_lines_integrity(order: &Order) -> bool {
    let lines_required = order.status().is_some_and(OrderStatus::requires_lines);
    if lines_required && order.lines().is_empty() {
        return false;
    }

    order
        .lines()
        .iter()
        .all(|line| line_violations(line).is_empty())
}

pub fn check_shipping_fee(order: &Order) -> bool {
    order.shipping_fee().is_none_or(|fee| !fee.is_negative())
}

/// Paid orders must have a captured payment. Other statuses pass.
pub fn check_payment_captured(order: &Order) -> bool {
    !order.is_status(OrderStatus::Paid) || order.is_captured()
}

/// Whether the refund rule applies: cancelled with at least one line.
pub fn refund_applies(order: &Order) -> bool {
    order.is_status(OrderStatus::Cancelled) && !order.lines().is_empty()
}

/// Cancelled orders with lines must refund exactly Σ(qty × price).
///
/// Equality is exact; no tolerance is applied. A missing refund amount
/// fails, and so does a line total too large to represent. Orders the rule
/// does not apply to pass.
pub fn check_refund_consistency(order: &Order) -> bool {
    if !refund_applies(order) {
        return true;
    }
    match (order.refund_amount(), order.line_total()) {
        (Some(Amount::Exact(amount)), Some(expected)) => amount == expected,
        _ => false,
    }
}
