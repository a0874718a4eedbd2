use serde::Serialize;
use std::fmt;

/// Scheme prefixed to every push endpoint built from a subscription token.
pub const PUSH_ENDPOINT_SCHEME: &str = "http://";

/// Suffix appended to topic and subscription IDs for dead-letter resources.
pub const DEAD_LETTER_SUFFIX: &str = "-dlq";

/// Path appended to a push endpoint for the dead-letter subscription.
pub const DEAD_LETTER_PUSH_PATH: &str = "/dead";

/// Max delivery attempts before a message is dead-lettered (the Pub/Sub default).
pub const DEFAULT_MAX_DELIVERY_ATTEMPTS: i32 = 5;

/// Everything one `PUBSUB_PROJECTn` variable asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSpec {
    pub project_id: String,
    pub topics: Vec<TopicSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSpec {
    pub topic_id: String,
    pub subscriptions: Vec<SubscriptionToken>,
}

/// Raw `id[+host[|port]][+dlq]` text, decomposed only when it is provisioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionToken(String);

impl SubscriptionToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubscriptionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A decomposed subscription token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionPlan {
    pub subscription_id: String,
    pub kind: SubscriptionKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionKind {
    Plain,
    Push { endpoint: PushEndpoint },
    PushWithDeadLetter { endpoint: PushEndpoint },
}

impl SubscriptionKind {
    pub fn push_endpoint(&self) -> Option<&PushEndpoint> {
        match self {
            Self::Plain => None,
            Self::Push { endpoint } | Self::PushWithDeadLetter { endpoint } => Some(endpoint),
        }
    }
}

/// A push target in `http://host[:port]` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushEndpoint {
    url: String,
}

impl PushEndpoint {
    /// Builds the endpoint from the `host[|port]` form used inside tokens.
    pub fn from_token_segment(segment: &str) -> Self {
        Self {
            url: format!("{}{}", PUSH_ENDPOINT_SCHEME, segment.replacen('|', ":", 1)),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn dead_letter_url(&self) -> String {
        format!("{}{}", self.url, DEAD_LETTER_PUSH_PATH)
    }
}

impl fmt::Display for PushEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// The dead-letter topic/subscription pair derived for one DLQ-marked subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadLetterResources {
    pub topic_id: String,
    pub subscription_id: String,
    pub push_endpoint: String,
}

impl DeadLetterResources {
    pub fn derive(topic_id: &str, subscription_id: &str, endpoint: &PushEndpoint) -> Self {
        Self {
            topic_id: format!("{}{}", topic_id, DEAD_LETTER_SUFFIX),
            subscription_id: format!("{}{}", subscription_id, DEAD_LETTER_SUFFIX),
            push_endpoint: endpoint.dead_letter_url(),
        }
    }
}

/// A topic as created by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicHandle {
    pub project_id: String,
    pub topic_id: String,
}

impl TopicHandle {
    pub fn new(project_id: impl Into<String>, topic_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            topic_id: topic_id.into(),
        }
    }

    /// `projects/{project}/topics/{topic}`
    pub fn fully_qualified_name(&self) -> String {
        format!("projects/{}/topics/{}", self.project_id, self.topic_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionHandle {
    pub project_id: String,
    pub subscription_id: String,
}

impl SubscriptionHandle {
    pub fn new(project_id: impl Into<String>, subscription_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            subscription_id: subscription_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushConfig {
    pub push_endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadLetterPolicy {
    /// Fully-qualified dead-letter topic name.
    pub dead_letter_topic: String,
    pub max_delivery_attempts: i32,
}

/// What a subscription is created with, apart from its ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionConfig {
    pub topic: TopicHandle,
    pub push_config: Option<PushConfig>,
    pub dead_letter_policy: Option<DeadLetterPolicy>,
}

impl SubscriptionConfig {
    pub fn pull(topic: &TopicHandle) -> Self {
        Self {
            topic: topic.clone(),
            push_config: None,
            dead_letter_policy: None,
        }
    }

    pub fn push(topic: &TopicHandle, push_endpoint: impl Into<String>) -> Self {
        Self {
            topic: topic.clone(),
            push_config: Some(PushConfig {
                push_endpoint: push_endpoint.into(),
            }),
            dead_letter_policy: None,
        }
    }

    pub fn with_dead_letter_topic(mut self, dead_letter_topic: &TopicHandle) -> Self {
        self.dead_letter_policy = Some(DeadLetterPolicy {
            dead_letter_topic: dead_letter_topic.fully_qualified_name(),
            max_delivery_attempts: DEFAULT_MAX_DELIVERY_ATTEMPTS,
        });
        self
    }
}

/// Counts of what one provisioning pass created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionSummary {
    pub project_id: String,
    pub topics: usize,
    pub subscriptions: usize,
    pub dead_letter_pairs: usize,
}

impl ProvisionSummary {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            ..Default::default()
        }
    }
}
