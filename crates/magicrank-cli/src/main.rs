mod cli;
mod config;
mod error;
mod pipeline;
mod telemetry;

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;

use crate::cli::Cli;
use crate::config::RunConfig;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<ExitCode, CliError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    telemetry::init(&cli.log_level)?;

    let config = RunConfig::from_process_env(&cli)?;
    let summary = pipeline::execute(&config).await?;

    writeln!(std::io::stderr().lock(), "{summary}")?;
    Ok(ExitCode::SUCCESS)
}
