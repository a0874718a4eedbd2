use anyhow::Context;
use clap::Parser;
use pubsubc::config::env::{collect_project_vars, process_env};
use pubsubc::utils::logger;
use pubsubc::{run_cli, CliConfig, CliOutcome, RestBackend, Settings};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliConfig::parse();

    let settings = Settings::from_cli(&cli);
    logger::init_cli_logger(settings.debug);
    tracing::debug!("Settings: {:?}", settings);

    let vars = collect_project_vars(process_env);
    let backend = RestBackend::new(settings.pubsub.clone());
    let program = program_name();
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();

    // dropping the batch future cancels whichever backend call is in flight
    let outcome = tokio::select! {
        outcome = run_cli(&cli, &vars, backend, &program, &mut stdout, &mut stderr) => outcome,
        signal = tokio::signal::ctrl_c() => {
            match signal.context("failed to listen for Ctrl-C") {
                Ok(()) => eprintln!("{}: interrupted", program),
                Err(e) => eprintln!("{}: {:#}", program, e),
            }
            CliOutcome::Failed
        }
    };

    outcome.exit_code()
}

fn program_name() -> String {
    std::env::args()
        .next()
        .unwrap_or_else(|| "pubsubc".to_string())
}
