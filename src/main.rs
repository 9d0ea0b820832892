use anyhow::Context;
use clap::Parser;
use std::process;
use suna_processor::cli::{Args, report_summary, setup_logging};
use suna_processor::models::ProcessingStats;
use suna_processor::processor::SunaProcessor;

fn main() {
    let args = Args::parse();
    setup_logging(&args);

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        tokio::select! {
            result = run(&args) => result,
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\nReceived CTRL+C, shutting down...");
                Err(anyhow::anyhow!("Processing interrupted by user"))
            }
        }
    });

    match result {
        Ok(stats) => {
            if !args.quiet {
                report_summary(&stats);
            }
            process::exit(0);
        }
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

async fn run(args: &Args) -> anyhow::Result<ProcessingStats> {
    let config = args.to_config().context("Invalid arguments")?;

    let processor = SunaProcessor::new(args.directory.clone(), args.output_dir.clone())
        .with_context(|| format!("Cannot process {}", args.directory.display()))?
        .with_config(config);

    processor
        .process()
        .await
        .with_context(|| format!("Processing {} failed", args.directory.display()))
}
