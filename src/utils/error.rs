use thiserror::Error;

/// Failure reported by a provisioning backend call.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid service endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("resource already exists: {resource}")]
    AlreadyExists { resource: String },

    #[error("{status} ({code}): {message}")]
    Api {
        code: u16,
        status: String,
        message: String,
    },

    #[error("{message}")]
    Other { message: String },
}

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Malformed project spec: {message}")]
    MalformedSpec { message: String },

    #[error("Unable to create client to project {project_id:?}: {source}")]
    BackendConnect {
        project_id: String,
        #[source]
        source: BackendError,
    },

    #[error("Unable to create topic {topic_id:?} for project {project_id:?}: {source}")]
    TopicCreate {
        project_id: String,
        topic_id: String,
        #[source]
        source: BackendError,
    },

    #[error("{}", subscription_message(.project_id, .topic_id, .subscription_id, .push_endpoint, .source))]
    SubscriptionCreate {
        project_id: String,
        topic_id: String,
        subscription_id: String,
        push_endpoint: Option<String>,
        #[source]
        source: BackendError,
    },

    #[error("Unable to create dead letter topic {dlq_topic_id:?} for topic {topic_id:?} for project {project_id:?}: {source}")]
    DlqTopicCreate {
        project_id: String,
        topic_id: String,
        dlq_topic_id: String,
        #[source]
        source: BackendError,
    },

    #[error("Unable to create dead letter subscription {dlq_subscription_id:?} on topic {dlq_topic_id:?} for project {project_id:?} using push endpoint {push_endpoint:?}: {source}")]
    DlqSubscriptionCreate {
        project_id: String,
        dlq_topic_id: String,
        dlq_subscription_id: String,
        push_endpoint: String,
        #[source]
        source: BackendError,
    },
}

fn subscription_message(
    project_id: &str,
    topic_id: &str,
    subscription_id: &str,
    push_endpoint: &Option<String>,
    source: &BackendError,
) -> String {
    match push_endpoint {
        Some(endpoint) => format!(
            "Unable to create push subscription {:?} on topic {:?} for project {:?} using push endpoint {:?}: {}",
            subscription_id, topic_id, project_id, endpoint, source
        ),
        None => format!(
            "Unable to create subscription {:?} on topic {:?} for project {:?}: {}",
            subscription_id, topic_id, project_id, source
        ),
    }
}

impl ProvisionError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedSpec {
            message: message.into(),
        }
    }

    /// The backend cause, if this error came from a backend call.
    pub fn backend_error(&self) -> Option<&BackendError> {
        match self {
            Self::MalformedSpec { .. } => None,
            Self::BackendConnect { source, .. }
            | Self::TopicCreate { source, .. }
            | Self::SubscriptionCreate { source, .. }
            | Self::DlqTopicCreate { source, .. }
            | Self::DlqSubscriptionCreate { source, .. } => Some(source),
        }
    }

    /// Reruns against a backend that kept earlier resources fail this way.
    pub fn is_already_exists(&self) -> bool {
        matches!(self.backend_error(), Some(BackendError::AlreadyExists { .. }))
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        if self.is_already_exists() {
            return "Delete the existing resource or rename it in the PUBSUB_PROJECT variable, then rerun";
        }
        match self {
            Self::MalformedSpec { .. } => {
                "Check the value against: project,topic[:sub[+host[|port][+dlq]]]..."
            }
            Self::BackendConnect { .. } => {
                "Check the project ID and that PUBSUB_EMULATOR_HOST points at a running service"
            }
            Self::TopicCreate { .. } | Self::DlqTopicCreate { .. } => {
                "Check the topic ID and the backend logs; resources created before this one were kept"
            }
            Self::SubscriptionCreate { .. } | Self::DlqSubscriptionCreate { .. } => {
                "Check the subscription ID and push endpoint; resources created before this one were kept"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
