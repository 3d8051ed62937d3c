//! Order validation and aggregation.
//!
//! This crate holds the order rules and the reports derived from a list of
//! orders, implemented as pure functions over a decoded document (no
//! mutation, no shared state). Decoding lives in [`document`]; everything
//! else takes `&Order` or `&[Order]`.

pub mod aggregate;
pub mod checks;
pub mod document;
pub mod order;
pub mod summary;

#[cfg(test)]
mod strategies;

pub use aggregate::{
    AuditReport, audit, cancelled_orders_with_correct_refund,
    cancelled_orders_with_refund_mismatch, duplicate_order_ids, gmv_per_order,
    invalid_email_order_ids, invalid_status_order_ids, lines_integrity_failures,
    list_order_ids, negative_shipping_fee_order_ids, paid_orders_without_capture,
    top_n_skus_by_quantity, total_line_items,
};
pub use checks::{
    LineViolation, check_email_format, check_id_present, check_lines_integrity,
    check_payment_captured, check_refund_consistency, check_shipping_fee, check_status_valid,
    line_violations, refund_applies,
};
pub use document::OrderDocument;
pub use order::{Amount, Customer, LineItem, Order, OrderStatus, Payment, Refund, Shipping};
pub use summary::{
    InvalidOrder, Issue, IssuePolicy, SummaryReport, build_summary, build_summary_with,
    order_issues,
};
