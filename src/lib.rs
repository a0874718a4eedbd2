pub mod adapters;
#[cfg(feature = "cli")]
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use app::{run_cli, CliOutcome};
#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use crate::adapters::RestBackend;
pub use crate::core::{
    batch::{BatchFailure, BatchReport, BatchRunner},
    parser::parse_project,
    provisioner::Provisioner,
};
pub use config::Settings;
pub use utils::error::{BackendError, ProvisionError, Result};
