// Application layer: what the binary does for one invocation, minus process plumbing.

use crate::config::env::ProjectVar;
use crate::config::{version_string, CliConfig};
use crate::core::batch::BatchRunner;
use crate::core::provisioner::Provisioner;
use crate::domain::ports::ProvisioningBackend;
use std::io::Write;
use std::process::ExitCode;

/// How an invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliOutcome {
    Provisioned,
    PrintedVersion,
    /// `PUBSUB_PROJECT1` was missing; usage was printed instead.
    PrintedUsage,
    Failed,
}

impl CliOutcome {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Self::Provisioned | Self::PrintedVersion => ExitCode::SUCCESS,
            Self::PrintedUsage | Self::Failed => ExitCode::FAILURE,
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, Self::Provisioned | Self::PrintedVersion)
    }
}

/// Runs one invocation: version, usage, or the whole batch.
///
/// Normal output goes to `out`, the `<program>: <error>` line to `err`.
pub async fn run_cli<B: ProvisioningBackend>(
    cli: &CliConfig,
    vars: &[ProjectVar],
    backend: B,
    program: &str,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> CliOutcome {
    // writes to the terminal are best effort; a closed stdout must not change the exit code
    if cli.version {
        writeln!(out, "{}", version_string()).ok();
        return CliOutcome::PrintedVersion;
    }

    if vars.is_empty() {
        CliConfig::write_usage(out);
        return CliOutcome::PrintedUsage;
    }

    let runner = BatchRunner::new(Provisioner::new(backend));
    match runner.run(vars).await {
        Ok(report) => {
            tracing::debug!("Provisioned {} projects", report.projects.len());
            CliOutcome::Provisioned
        }
        Err(failure) => {
            tracing::error!(
                "Provisioning stopped at {}. Suggestion: {}",
                failure.variable,
                failure.error.recovery_suggestion()
            );
            writeln!(err, "{}: {}", program, failure).ok();
            CliOutcome::Failed
        }
    }
}
