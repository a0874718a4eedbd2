use crate::config::PubsubSettings;
use crate::domain::model::{
    DeadLetterPolicy, PushConfig, SubscriptionConfig, SubscriptionHandle, TopicHandle,
};
use crate::domain::ports::{BackendSession, ProvisioningBackend};
use crate::utils::error::BackendError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

/// Provisions through the Pub/Sub v1 REST API (Google or the local emulator).
#[derive(Debug, Clone)]
pub struct RestBackend {
    settings: PubsubSettings,
}

impl RestBackend {
    pub fn new(settings: PubsubSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl ProvisioningBackend for RestBackend {
    type Session = RestSession;

    async fn connect(&self, project_id: &str) -> Result<RestSession, BackendError> {
        if project_id.is_empty() {
            return Err(BackendError::Other {
                message: "project ID string is empty".to_string(),
            });
        }

        let base_url = Url::parse(&self.settings.endpoint).map_err(|e| {
            BackendError::InvalidEndpoint {
                endpoint: self.settings.endpoint.clone(),
                reason: e.to_string(),
            }
        })?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::InvalidEndpoint {
                endpoint: self.settings.endpoint.clone(),
                reason: "not a base URL".to_string(),
            });
        }

        let client = Client::builder()
            .user_agent(concat!("pubsubc/", env!("CARGO_PKG_VERSION")))
            .build()?;

        tracing::debug!("Using Pub/Sub endpoint {}", base_url);

        Ok(RestSession {
            client,
            base_url,
            project_id: project_id.to_string(),
            access_token: self.settings.access_token.clone(),
        })
    }
}

/// A REST client bound to one project.
#[derive(Debug)]
pub struct RestSession {
    client: Client,
    base_url: Url,
    project_id: String,
    access_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TopicRequest {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopicResource {
    name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionRequest {
    topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    push_config: Option<PushConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dead_letter_policy: Option<DeadLetterPolicy>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionResource {
    name: Option<String>,
}

/// Google API error envelope.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl RestSession {
    fn resource_url(&self, collection: &str, id: &str) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::InvalidEndpoint {
                endpoint: self.base_url.to_string(),
                reason: "not a base URL".to_string(),
            })?
            .pop_if_empty()
            .extend(["v1", "projects", self.project_id.as_str(), collection, id]);
        Ok(url)
    }

    /// PUTs `body` to the resource. A 2xx reply whose body does not decode yields `Ok(None)`.
    async fn put<B, R>(
        &self,
        collection: &str,
        id: &str,
        body: &B,
    ) -> Result<Option<R>, BackendError>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let url = self.resource_url(collection, id)?;
        tracing::debug!("PUT {}", url);

        let mut request = self.client.put(url).json(body);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("Pub/Sub response status: {}", status);

        if status.is_success() {
            let bytes = response.bytes().await?;
            return Ok(decode_created(&bytes));
        }

        let resource = format!("projects/{}/{}/{}", self.project_id, collection, id);
        let text = response.text().await.unwrap_or_default();
        Err(api_error(status, resource, &text))
    }
}

fn decode_created<R>(body: &[u8]) -> Option<R>
where
    R: for<'de> Deserialize<'de>,
{
    match serde_json::from_slice(body) {
        Ok(resource) => Some(resource),
        Err(e) => {
            tracing::debug!("Ignoring undecodable response body: {}", e);
            None
        }
    }
}

fn api_error(status: StatusCode, resource: String, body: &str) -> BackendError {
    let detail = serde_json::from_str::<ErrorResponse>(body)
        .map(|r| r.error)
        .unwrap_or_else(|_| ErrorDetail {
            code: status.as_u16(),
            message: body.trim().to_string(),
            status: status
                .canonical_reason()
                .unwrap_or("UNKNOWN")
                .to_string(),
        });

    if status == StatusCode::CONFLICT || detail.status == "ALREADY_EXISTS" {
        return BackendError::AlreadyExists { resource };
    }

    BackendError::Api {
        code: if detail.code == 0 { status.as_u16() } else { detail.code },
        status: detail.status,
        message: detail.message,
    }
}

#[async_trait]
impl BackendSession for RestSession {
    async fn create_topic(&self, topic_id: &str) -> Result<TopicHandle, BackendError> {
        let created: Option<TopicResource> =
            self.put("topics", topic_id, &TopicRequest {}).await?;
        if let Some(name) = created.and_then(|r| r.name) {
            tracing::debug!("Created {}", name);
        }
        Ok(TopicHandle::new(&self.project_id, topic_id))
    }

    async fn create_subscription(
        &self,
        subscription_id: &str,
        config: SubscriptionConfig,
    ) -> Result<SubscriptionHandle, BackendError> {
        let body = SubscriptionRequest {
            topic: config.topic.fully_qualified_name(),
            push_config: config.push_config,
            dead_letter_policy: config.dead_letter_policy,
        };
        let created: Option<SubscriptionResource> =
            self.put("subscriptions", subscription_id, &body).await?;
        if let Some(name) = created.and_then(|r| r.name) {
            tracing::debug!("Created {}", name);
        }
        Ok(SubscriptionHandle::new(&self.project_id, subscription_id))
    }

    async fn close(&self) -> Result<(), BackendError> {
        // reqwest releases pooled connections when the client is dropped
        tracing::debug!("Closing session for project {:?}", self.project_id);
        Ok(())
    }
}
