pub mod batch;
pub mod parser;
pub mod provisioner;
#[cfg(test)]
pub(crate) mod testing;

pub use crate::domain::model::{ProjectSpec, ProvisionSummary, SubscriptionToken, TopicSpec};
pub use crate::domain::ports::{BackendSession, ProvisioningBackend};
pub use crate::utils::error::Result;
