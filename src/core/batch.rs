use crate::config::env::ProjectVar;
use crate::core::parser::parse_project;
use crate::core::provisioner::Provisioner;
use crate::core::ProvisionSummary;
use crate::domain::ports::ProvisioningBackend;
use crate::utils::error::ProvisionError;
use crate::utils::validation::Validate;
use thiserror::Error;

/// The first failure of a batch, with the variable that caused it.
#[derive(Error, Debug)]
#[error("{variable}: {error}")]
pub struct BatchFailure {
    pub variable: String,
    #[source]
    pub error: ProvisionError,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub projects: Vec<ProvisionSummary>,
}

/// Provisions the collected `PUBSUB_PROJECTn` variables one after another.
pub struct BatchRunner<B: ProvisioningBackend> {
    provisioner: Provisioner<B>,
}

impl<B: ProvisioningBackend> BatchRunner<B> {
    pub fn new(provisioner: Provisioner<B>) -> Self {
        Self { provisioner }
    }

    /// Stops at the first variable that fails to parse, validate or provision.
    pub async fn run(&self, vars: &[ProjectVar]) -> Result<BatchReport, BatchFailure> {
        let mut report = BatchReport::default();

        for var in vars {
            tracing::debug!("Processing {}", var.name);
            let summary = self.run_one(var).await.map_err(|error| BatchFailure {
                variable: var.name.clone(),
                error,
            })?;
            report.projects.push(summary);
        }

        Ok(report)
    }

    async fn run_one(&self, var: &ProjectVar) -> Result<ProvisionSummary, ProvisionError> {
        let spec = parse_project(&var.value)?;
        spec.validate()?;
        self.provisioner.provision(&spec).await
    }
}
