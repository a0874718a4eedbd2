use crate::domain::model::{SubscriptionConfig, SubscriptionHandle, TopicHandle};
use crate::utils::error::BackendError;
use async_trait::async_trait;

/// Something that can open a provisioning session for a project.
#[async_trait]
pub trait ProvisioningBackend: Send + Sync {
    type Session: BackendSession;

    async fn connect(&self, project_id: &str) -> Result<Self::Session, BackendError>;
}

/// Control-plane calls scoped to one project.
#[async_trait]
pub trait BackendSession: Send + Sync {
    async fn create_topic(&self, topic_id: &str) -> Result<TopicHandle, BackendError>;

    async fn create_subscription(
        &self,
        subscription_id: &str,
        config: SubscriptionConfig,
    ) -> Result<SubscriptionHandle, BackendError>;

    /// Releases the session. Called once per pass, also after a failed pass.
    async fn close(&self) -> Result<(), BackendError>;
}
