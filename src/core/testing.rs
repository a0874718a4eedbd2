//! In-memory backend that records every call, shared by unit tests.

use crate::domain::model::{SubscriptionConfig, SubscriptionHandle, TopicHandle};
use crate::domain::ports::{BackendSession, ProvisioningBackend};
use crate::utils::error::BackendError;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Connect(String),
    CreateTopic(String),
    CreateSubscription(String, SubscriptionConfig),
    Close,
}

/// Fails any connect, topic or subscription whose name is in `failing`.
#[derive(Clone, Default)]
pub(crate) struct RecordingBackend {
    calls: Arc<Mutex<Vec<Call>>>,
    failing: Arc<HashSet<String>>,
}

impl RecordingBackend {
    pub(crate) fn failing_on(names: &[&str]) -> Self {
        Self {
            calls: Arc::default(),
            failing: Arc::new(names.iter().map(|n| n.to_string()).collect()),
        }
    }

    pub(crate) async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, call: Call) {
        self.calls.lock().await.push(call);
    }

    fn check(&self, name: &str) -> Result<(), BackendError> {
        if self.failing.contains(name) {
            return Err(BackendError::Other {
                message: format!("{} rejected", name),
            });
        }
        Ok(())
    }
}

pub(crate) struct RecordingSession {
    project_id: String,
    backend: RecordingBackend,
}

#[async_trait]
impl ProvisioningBackend for RecordingBackend {
    type Session = RecordingSession;

    async fn connect(&self, project_id: &str) -> Result<RecordingSession, BackendError> {
        self.record(Call::Connect(project_id.to_string())).await;
        self.check(project_id)?;
        Ok(RecordingSession {
            project_id: project_id.to_string(),
            backend: self.clone(),
        })
    }
}

#[async_trait]
impl BackendSession for RecordingSession {
    async fn create_topic(&self, topic_id: &str) -> Result<TopicHandle, BackendError> {
        self.backend
            .record(Call::CreateTopic(topic_id.to_string()))
            .await;
        self.backend.check(topic_id)?;
        Ok(TopicHandle::new(&self.project_id, topic_id))
    }

    async fn create_subscription(
        &self,
        subscription_id: &str,
        config: SubscriptionConfig,
    ) -> Result<SubscriptionHandle, BackendError> {
        self.backend
            .record(Call::CreateSubscription(subscription_id.to_string(), config))
            .await;
        self.backend.check(subscription_id)?;
        Ok(SubscriptionHandle::new(&self.project_id, subscription_id))
    }

    async fn close(&self) -> Result<(), BackendError> {
        self.backend.record(Call::Close).await;
        Ok(())
    }
}
