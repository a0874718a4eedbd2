use crate::core::parser::decompose_token;
use crate::core::{ProjectSpec, ProvisionSummary, TopicSpec};
use crate::domain::model::{
    DeadLetterResources, PushEndpoint, SubscriptionConfig, SubscriptionKind, SubscriptionPlan,
    TopicHandle,
};
use crate::domain::ports::{BackendSession, ProvisioningBackend};
use crate::utils::error::{ProvisionError, Result};

/// Creates the topics and subscriptions of a [`ProjectSpec`] through a backend.
///
/// A pass stops at the first failure. Nothing created before the failure is
/// rolled back, and the backend session is closed either way.
pub struct Provisioner<B: ProvisioningBackend> {
    backend: B,
}

impl<B: ProvisioningBackend> Provisioner<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub async fn provision(&self, spec: &ProjectSpec) -> Result<ProvisionSummary> {
        let project_id = spec.project_id.as_str();
        let session = self
            .backend
            .connect(project_id)
            .await
            .map_err(|source| ProvisionError::BackendConnect {
                project_id: project_id.to_string(),
                source,
            })?;

        tracing::debug!("Client connected with project ID {:?}", project_id);

        let result = self.create_topics(&session, spec).await;

        if let Err(e) = session.close().await {
            tracing::warn!("Failed to close session for project {:?}: {}", project_id, e);
        }

        if let Ok(summary) = &result {
            tracing::info!(
                "Project {:?}: created {} topics, {} subscriptions, {} dead letter pairs",
                summary.project_id,
                summary.topics,
                summary.subscriptions,
                summary.dead_letter_pairs
            );
        }
        result
    }

    async fn create_topics(
        &self,
        session: &B::Session,
        spec: &ProjectSpec,
    ) -> Result<ProvisionSummary> {
        let mut summary = ProvisionSummary::new(&spec.project_id);

        for topic_spec in &spec.topics {
            let topic = self
                .create_topic(session, &spec.project_id, topic_spec)
                .await?;
            summary.topics += 1;

            for token in &topic_spec.subscriptions {
                let plan = decompose_token(token)?;
                self.create_subscription(session, &topic, plan, &mut summary)
                    .await?;
            }
        }

        Ok(summary)
    }

    async fn create_topic(
        &self,
        session: &B::Session,
        project_id: &str,
        topic_spec: &TopicSpec,
    ) -> Result<TopicHandle> {
        tracing::debug!("  Creating topic {:?}", topic_spec.topic_id);
        session
            .create_topic(&topic_spec.topic_id)
            .await
            .map_err(|source| ProvisionError::TopicCreate {
                project_id: project_id.to_string(),
                topic_id: topic_spec.topic_id.clone(),
                source,
            })
    }

    async fn create_subscription(
        &self,
        session: &B::Session,
        topic: &TopicHandle,
        plan: SubscriptionPlan,
        summary: &mut ProvisionSummary,
    ) -> Result<()> {
        let config = match &plan.kind {
            SubscriptionKind::Plain => {
                tracing::debug!("    Creating subscription {:?}", plan.subscription_id);
                SubscriptionConfig::pull(topic)
            }
            SubscriptionKind::Push { endpoint } => {
                tracing::debug!(
                    "    Creating push subscription {:?} with target {:?}",
                    plan.subscription_id,
                    endpoint.url()
                );
                SubscriptionConfig::push(topic, endpoint.url())
            }
            SubscriptionKind::PushWithDeadLetter { endpoint } => {
                tracing::debug!(
                    "    Creating push subscription {:?} with target {:?}",
                    plan.subscription_id,
                    endpoint.url()
                );
                // the backend rejects a policy whose dead-letter topic does not exist yet
                let dlq_topic = self
                    .create_dead_letter_pair(session, topic, &plan.subscription_id, endpoint)
                    .await?;
                summary.dead_letter_pairs += 1;
                summary.topics += 1;
                summary.subscriptions += 1;
                tracing::debug!(
                    "      The topic {:?} on project {:?} has a dead letter policy",
                    topic.topic_id,
                    topic.project_id
                );
                SubscriptionConfig::push(topic, endpoint.url()).with_dead_letter_topic(&dlq_topic)
            }
        };

        session
            .create_subscription(&plan.subscription_id, config)
            .await
            .map_err(|source| ProvisionError::SubscriptionCreate {
                project_id: topic.project_id.clone(),
                topic_id: topic.topic_id.clone(),
                subscription_id: plan.subscription_id.clone(),
                push_endpoint: plan.kind.push_endpoint().map(|e| e.url().to_string()),
                source,
            })?;
        summary.subscriptions += 1;
        Ok(())
    }

    async fn create_dead_letter_pair(
        &self,
        session: &B::Session,
        topic: &TopicHandle,
        subscription_id: &str,
        endpoint: &PushEndpoint,
    ) -> Result<TopicHandle> {
        let dlq = DeadLetterResources::derive(&topic.topic_id, subscription_id, endpoint);

        tracing::debug!("      Creating DLQ topic {:?}", dlq.topic_id);
        let dlq_topic = session.create_topic(&dlq.topic_id).await.map_err(|source| {
            ProvisionError::DlqTopicCreate {
                project_id: topic.project_id.clone(),
                topic_id: topic.topic_id.clone(),
                dlq_topic_id: dlq.topic_id.clone(),
                source,
            }
        })?;

        tracing::debug!(
            "      Creating DLQ subscription {:?} with target {:?}",
            dlq.subscription_id,
            dlq.push_endpoint
        );
        session
            .create_subscription(
                &dlq.subscription_id,
                SubscriptionConfig::push(&dlq_topic, dlq.push_endpoint.clone()),
            )
            .await
            .map_err(|source| ProvisionError::DlqSubscriptionCreate {
                project_id: topic.project_id.clone(),
                dlq_topic_id: dlq.topic_id.clone(),
                dlq_subscription_id: dlq.subscription_id.clone(),
                push_endpoint: dlq.push_endpoint.clone(),
                source,
            })?;

        Ok(dlq_topic)
    }
}
