use crate::core::parser::decompose_token;
use crate::core::ProjectSpec;
use crate::domain::model::SubscriptionKind;
use crate::utils::error::{ProvisionError, Result};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ProvisionError::malformed(format!(
            "{}: URL cannot be empty",
            field_name
        )));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" if url.host_str().is_some_and(|h| !h.is_empty()) => Ok(()),
            "http" | "https" => Err(ProvisionError::malformed(format!(
                "{}: URL {:?} has no host",
                field_name, url_str
            ))),
            scheme => Err(ProvisionError::malformed(format!(
                "{}: unsupported URL scheme {:?} in {:?}",
                field_name, scheme, url_str
            ))),
        },
        Err(e) => Err(ProvisionError::malformed(format!(
            "{}: invalid URL {:?}: {}",
            field_name, url_str, e
        ))),
    }
}

/// Decomposes every token up front, so a malformed token is reported before
/// any resource of the project is created.
impl Validate for ProjectSpec {
    fn validate(&self) -> Result<()> {
        for topic in &self.topics {
            let mut seen = HashSet::new();
            for token in &topic.subscriptions {
                let plan = decompose_token(token)?;
                if let Some(endpoint) = plan.kind.push_endpoint() {
                    validate_url(
                        &format!("push endpoint of subscription {:?}", plan.subscription_id),
                        endpoint.url(),
                    )?;
                }
                if !seen.insert(plan.subscription_id.clone()) {
                    tracing::warn!(
                        "Subscription {:?} is listed twice on topic {:?}; \
                         the backend will reject the second one",
                        plan.subscription_id,
                        topic.topic_id
                    );
                }
                if matches!(plan.kind, SubscriptionKind::PushWithDeadLetter { .. }) {
                    tracing::debug!(
                        "Subscription {:?} on topic {:?} gets a dead letter pair",
                        plan.subscription_id,
                        topic.topic_id
                    );
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parser::parse_project;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("push_endpoint", "https://example.com").is_ok());
        assert!(validate_url("push_endpoint", "http://host1:8080").is_ok());
        assert!(validate_url("push_endpoint", "").is_err());
        assert!(validate_url("push_endpoint", "invalid-url").is_err());
        assert!(validate_url("push_endpoint", "ftp://example.com").is_err());
        assert!(validate_url("push_endpoint", "http://host1:notaport").is_err());
    }

    #[test]
    fn test_validate_project_spec() {
        let spec =
            parse_project("proj1,topicA:sub1:sub2+host1|8080:sub3+host2+dlq,topicB").unwrap();
        assert!(spec.validate().is_ok());

        let spec = parse_project("proj1,topicA:sub1,topicB:sub2+host1+later").unwrap();
        assert!(matches!(
            spec.validate(),
            Err(ProvisionError::MalformedSpec { .. })
        ));

        let spec = parse_project("proj1,topicA:sub1+host1|99999").unwrap();
        assert!(spec.validate().is_err());
    }
}
