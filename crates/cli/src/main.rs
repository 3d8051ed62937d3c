use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use ordercheck_cli::{Cli, Config};

fn main() -> Result<ExitCode> {
    let config = Config::from_cli(Cli::parse());
    ordercheck_observability::init(config.log_format);

    let report = ordercheck_cli::run(&config).inspect_err(|e| {
        tracing::error!(error = ?e, "order check failed");
    })?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if config.strict && !report.passed() {
        tracing::warn!("strict mode: rule failures found");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
