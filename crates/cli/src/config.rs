//! Run configuration: command line flags with environment fallbacks.

use std::path::PathBuf;

use clap::Parser;

use ordercheck_observability::LogFormat;
use ordercheck_orders::IssuePolicy;

#[derive(Parser, Debug)]
#[command(name = "ordercheck")]
#[command(about = "Validate and summarize an order document")]
#[command(version)]
pub struct Cli {
    /// Path to the order document (JSON, `{"orders": [...]}`)
    #[arg(env = "ORDERCHECK_DOCUMENT")]
    pub document: PathBuf,

    /// Number of skus to list by quantity
    #[arg(long, env = "ORDERCHECK_TOP_N", default_value_t = 2)]
    pub top: usize,

    /// Report each issue once per order instead of once per offending line
    #[arg(long, env = "ORDERCHECK_DEDUP_ISSUES", default_value_t = false)]
    pub dedup_issues: bool,

    /// Exit with a failure status when any rule fails
    #[arg(long, default_value_t = false)]
    pub strict: bool,

    /// Log output format (json or pretty)
    #[arg(long, env = "ORDERCHECK_LOG_FORMAT", default_value = "json", value_parser = parse_log_format)]
    pub log_format: LogFormat,
}

fn parse_log_format(raw: &str) -> Result<LogFormat, String> {
    LogFormat::parse(raw).ok_or_else(|| format!("unknown log format `{raw}` (expected json or pretty)"))
}

/// Resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub document_path: PathBuf,
    pub top_n: usize,
    pub issue_policy: IssuePolicy,
    pub strict: bool,
    pub log_format: LogFormat,
}

impl Config {
    /// Defaults for everything but the document path.
    pub fn new(document_path: impl Into<PathBuf>) -> Self {
        Self {
            document_path: document_path.into(),
            top_n: 2,
            issue_policy: IssuePolicy::PerLine,
            strict: false,
            log_format: LogFormat::Json,
        }
    }

    pub fn from_cli(cli: Cli) -> Self {
        let issue_policy = if cli.dedup_issues {
            IssuePolicy::Deduplicate
        } else {
            IssuePolicy::PerLine
        };

        Self {
            document_path: cli.document,
            top_n: cli.top,
            issue_policy,
            strict: cli.strict,
            log_format: cli.log_format,
        }
    }
}
