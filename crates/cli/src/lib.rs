//! `ordercheck` application: load one order document and report on it.

pub mod config;

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ordercheck_orders::{
    AuditReport, OrderDocument, SummaryReport, audit, build_summary_with, gmv_per_order,
    list_order_ids, top_n_skus_by_quantity, total_line_items,
};

pub use config::{Cli, Config};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuTotal {
    pub sku: String,
    pub quantity: Decimal,
}

/// Everything one run reports, printed as a single JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub order_ids: Vec<String>,
    pub total_line_items: usize,
    pub top_skus: Vec<SkuTotal>,
    /// `null` for an order whose total does not fit in a decimal.
    pub gmv: BTreeMap<String, Option<Decimal>>,
    pub audit: AuditReport,
    pub summary: SummaryReport,
}

impl RunReport {
    /// Whether a strict run should succeed.
    pub fn passed(&self) -> bool {
        self.audit.passed()
    }
}

/// Derive the full report from an already-decoded document.
pub fn build_report(document: &OrderDocument, config: &Config) -> RunReport {
    let orders = document.orders();

    let top_skus = top_n_skus_by_quantity(orders, config.top_n)
        .into_iter()
        .map(|(sku, quantity)| SkuTotal { sku, quantity })
        .collect();

    RunReport {
        order_ids: list_order_ids(orders),
        total_line_items: total_line_items(orders),
        top_skus,
        gmv: gmv_per_order(orders),
        audit: audit(orders),
        summary: build_summary_with(orders, config.issue_policy),
    }
}

/// Load the configured document and build its report.
pub fn run(config: &Config) -> Result<RunReport> {
    let document = OrderDocument::from_path(&config.document_path).with_context(|| {
        format!(
            "failed to load order document {}",
            config.document_path.display()
        )
    })?;

    let report = build_report(&document, config);
    tracing::info!(
        total_orders = report.summary.total_orders,
        total_line_items = report.summary.total_line_items,
        invalid_orders = report.summary.invalid_orders.len(),
        passed = report.passed(),
        "SUMMARY"
    );
    Ok(report)
}
