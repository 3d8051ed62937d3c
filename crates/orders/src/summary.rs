//! Validity summary over a whole order list.

use serde::{Deserialize, Serialize};

use crate::aggregate::total_line_items;
use crate::checks::{self, LineViolation};
use crate::order::Order;

/// One failed rule for one order, rendered as a fixed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Issue {
    #[serde(rename = "missing id")]
    MissingId,
    #[serde(rename = "invalid status")]
    InvalidStatus,
    #[serde(rename = "invalid email")]
    InvalidEmail,
    #[serde(rename = "non-positive qty")]
    NonPositiveQty,
    #[serde(rename = "negative price")]
    NegativePrice,
}

impl Issue {
    pub fn message(self) -> &'static str {
        match self {
            Self::MissingId => "missing id",
            Self::InvalidStatus => "invalid status",
            Self::InvalidEmail => "invalid email",
            Self::NonPositiveQty => "non-positive qty",
            Self::NegativePrice => "negative price",
        }
    }

    /// Line rules that surface in the summary. A missing sku does not.
    fn from_line_violation(violation: LineViolation) -> Option<Self> {
        match violation {
            LineViolation::MissingSku => None,
            LineViolation::NonPositiveQty => Some(Self::NonPositiveQty),
            LineViolation::NegativePrice => Some(Self::NegativePrice),
        }
    }
}

impl core::fmt::Display for Issue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

/// How line issues accumulate within one order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssuePolicy {
    /// One issue per offending line; an order with two bad quantities lists
    /// "non-positive qty" twice.
    #[default]
    PerLine,
    /// Each issue at most once per order, in first-occurrence order.
    Deduplicate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidOrder {
    /// Raw id; `None` when the order has no id at all.
    pub id: Option<String>,
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub total_orders: usize,
    pub total_line_items: usize,
    pub invalid_orders: Vec<InvalidOrder>,
}

impl SummaryReport {
    pub fn is_clean(&self) -> bool {
        self.invalid_orders.is_empty()
    }

    /// Issues recorded for the first invalid order with this id.
    pub fn issues_for(&self, id: &str) -> Option<&[Issue]> {
        self.invalid_orders
            .iter()
            .find(|o| o.id.as_deref() == Some(id))
            .map(|o| o.issues.as_slice())
    }
}

/// Issues for one order in fixed order: id, status, email, then line issues
/// line by line.
pub fn order_issues(order: &Order, policy: IssuePolicy) -> Vec<Issue> {
    let mut issues = Vec::new();
    if !checks::check_id_present(order) {
        issues.push(Issue::MissingId);
    }
    if !checks::check_status_valid(order) {
        issues.push(Issue::InvalidStatus);
    }
    if !checks::check_email_format(order) {
        issues.push(Issue::InvalidEmail);
    }

    let line_issues = order
        .lines()
        .iter()
        .flat_map(checks::line_violations)
        .filter_map(Issue::from_line_violation);
    for issue in line_issues {
        if policy == IssuePolicy::Deduplicate && issues.contains(&issue) {
            continue;
        }
        issues.push(issue);
    }
    issues
}

/// Summary with the default [`IssuePolicy::PerLine`].
pub fn build_summary(orders: &[Order]) -> SummaryReport {
    build_summary_with(orders, IssuePolicy::default())
}

pub fn build_summary_with(orders: &[Order], policy: IssuePolicy) -> SummaryReport {
    let invalid_orders: Vec<InvalidOrder> = orders
        .iter()
        .filter_map(|order| {
            let issues = order_issues(order, policy);
            (!issues.is_empty()).then(|| InvalidOrder {
                id: order.id.clone(),
                issues,
            })
        })
        .collect();

    let report = SummaryReport {
        total_orders: orders.len(),
        total_line_items: total_line_items(orders),
        invalid_orders,
    };
    tracing::debug!(
        total_orders = report.total_orders,
        invalid_orders = report.invalid_orders.len(),
        ?policy,
        "summary built"
    );
    report
}
