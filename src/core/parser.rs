use crate::core::{ProjectSpec, SubscriptionToken, TopicSpec};
use crate::domain::model::{PushEndpoint, SubscriptionKind, SubscriptionPlan};
use crate::utils::error::{ProvisionError, Result};

const PROJECT_DELIMITER: char = ',';
const TOPIC_DELIMITER: char = ':';
const TOKEN_DELIMITER: char = '+';
const DEAD_LETTER_MARKER: &str = "dlq";

/// Splits one `PUBSUB_PROJECTn` value into a project descriptor.
///
/// This is a purely structural split: identifiers are not validated here and
/// subscription tokens are kept raw until [`decompose_token`] is called on them.
pub fn parse_project(raw: &str) -> Result<ProjectSpec> {
    let mut fields = raw.split(PROJECT_DELIMITER);
    // split always yields at least one field
    let project_id = fields.next().unwrap_or_default().to_string();

    let mut topics: Vec<TopicSpec> = Vec::new();
    for field in fields {
        let mut segments = field.split(TOPIC_DELIMITER);
        let topic_id = segments.next().unwrap_or_default().to_string();
        let subscriptions = segments.map(SubscriptionToken::new).collect();
        let topic = TopicSpec {
            topic_id,
            subscriptions,
        };

        // a repeated topic ID replaces the earlier entry in place
        match topics.iter_mut().find(|t| t.topic_id == topic.topic_id) {
            Some(existing) => {
                tracing::debug!("Topic {:?} defined twice, keeping the last one", topic.topic_id);
                *existing = topic;
            }
            None => topics.push(topic),
        }
    }

    if topics.is_empty() {
        return Err(ProvisionError::malformed(
            "Expected at least 1 topic to be defined",
        ));
    }

    Ok(ProjectSpec { project_id, topics })
}

/// Turns a raw `id[+host[|port]][+dlq]` token into what should be created.
pub fn decompose_token(token: &SubscriptionToken) -> Result<SubscriptionPlan> {
    let raw = token.as_str();
    let parts: Vec<&str> = raw.split(TOKEN_DELIMITER).collect();

    let subscription_id = parts[0];
    if subscription_id.is_empty() {
        return Err(ProvisionError::malformed(format!(
            "subscription {:?} has an empty subscription ID",
            raw
        )));
    }

    let kind = match parts.as_slice() {
        [_] => SubscriptionKind::Plain,
        [_, endpoint] => SubscriptionKind::Push {
            endpoint: push_endpoint(raw, endpoint)?,
        },
        [_, endpoint, marker] if *marker == DEAD_LETTER_MARKER => {
            SubscriptionKind::PushWithDeadLetter {
                endpoint: push_endpoint(raw, endpoint)?,
            }
        }
        [_, _, marker] => {
            return Err(ProvisionError::malformed(format!(
                "subscription {:?} has unknown option {:?} (expected \"{}\")",
                raw, marker, DEAD_LETTER_MARKER
            )));
        }
        _ => {
            return Err(ProvisionError::malformed(format!(
                "subscription {:?} has {} '{}'-separated parts (at most 3 allowed)",
                raw,
                parts.len(),
                TOKEN_DELIMITER
            )));
        }
    };

    Ok(SubscriptionPlan {
        subscription_id: subscription_id.to_string(),
        kind,
    })
}

fn push_endpoint(raw: &str, segment: &str) -> Result<PushEndpoint> {
    if segment.is_empty() {
        return Err(ProvisionError::malformed(format!(
            "subscription {:?} has an empty push endpoint",
            raw
        )));
    }
    Ok(PushEndpoint::from_token_segment(segment))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(raw: &str) -> Result<SubscriptionPlan> {
        decompose_token(&SubscriptionToken::new(raw))
    }

    #[test]
    fn test_parse_single_plain_subscription() {
        let spec = parse_project("proj1,topicA:sub1").unwrap();

        assert_eq!(spec.project_id, "proj1");
        assert_eq!(spec.topics.len(), 1);
        assert_eq!(spec.topics[0].topic_id, "topicA");
        assert_eq!(spec.topics[0].subscriptions, vec![SubscriptionToken::new("sub1")]);
    }

    #[test]
    fn test_parse_keeps_field_order_and_identifiers() {
        let raw = "proj1,topic1,topic2:subscription1,topic3:subscription2+endpoint1:subscription3";
        let spec = parse_project(raw).unwrap();

        let topic_ids: Vec<&str> = spec.topics.iter().map(|t| t.topic_id.as_str()).collect();
        assert_eq!(topic_ids, vec!["topic1", "topic2", "topic3"]);
        assert!(spec.topics[0].subscriptions.is_empty());
        assert_eq!(spec.topics[2].subscriptions[0].as_str(), "subscription2+endpoint1");
        assert_eq!(spec.topics[2].subscriptions[1].as_str(), "subscription3");

        // rebuilding the value from the descriptor yields the input
        let rebuilt: Vec<String> = std::iter::once(spec.project_id.clone())
            .chain(spec.topics.iter().map(|t| {
                std::iter::once(t.topic_id.clone())
                    .chain(t.subscriptions.iter().map(|s| s.to_string()))
                    .collect::<Vec<_>>()
                    .join(":")
            }))
            .collect();
        assert_eq!(rebuilt.join(","), raw);
    }

    #[test]
    fn test_parse_requires_a_topic() {
        assert!(matches!(
            parse_project("proj1"),
            Err(ProvisionError::MalformedSpec { .. })
        ));
        assert!(matches!(
            parse_project(""),
            Err(ProvisionError::MalformedSpec { .. })
        ));
    }

    #[test]
    fn test_parse_allows_empty_identifiers() {
        // empty IDs are left for the backend to reject
        let spec = parse_project(",:sub1").unwrap();
        assert_eq!(spec.project_id, "");
        assert_eq!(spec.topics[0].topic_id, "");
    }

    #[test]
    fn test_duplicate_topic_overwrites_in_place() {
        let spec = parse_project("proj1,topicA:sub1,topicB,topicA:sub2").unwrap();

        assert_eq!(spec.topics.len(), 2);
        assert_eq!(spec.topics[0].topic_id, "topicA");
        assert_eq!(spec.topics[0].subscriptions, vec![SubscriptionToken::new("sub2")]);
        assert_eq!(spec.topics[1].topic_id, "topicB");
    }

    #[test]
    fn test_decompose_plain() {
        let plan = plan("sub1").unwrap();
        assert_eq!(plan.subscription_id, "sub1");
        assert_eq!(plan.kind, SubscriptionKind::Plain);
    }

    #[test]
    fn test_decompose_push_with_port() {
        let plan = plan("sub1+host1|8080").unwrap();
        assert_eq!(plan.subscription_id, "sub1");
        match plan.kind {
            SubscriptionKind::Push { endpoint } => assert_eq!(endpoint.url(), "http://host1:8080"),
            other => panic!("expected push subscription, got {:?}", other),
        }
    }

    #[test]
    fn test_decompose_push_with_dead_letter() {
        let plan = plan("sub1+host1|8080+dlq").unwrap();
        match plan.kind {
            SubscriptionKind::PushWithDeadLetter { endpoint } => {
                assert_eq!(endpoint.url(), "http://host1:8080");
                assert_eq!(endpoint.dead_letter_url(), "http://host1:8080/dead");
            }
            other => panic!("expected dead-letter subscription, got {:?}", other),
        }
    }

    #[test]
    fn test_decompose_rejects_ambiguous_shapes() {
        for raw in ["sub1+host1+retry", "sub1++dlq", "sub1+", "+host1", "", "a+b+dlq+x"] {
            assert!(
                matches!(plan(raw), Err(ProvisionError::MalformedSpec { .. })),
                "{:?} should be rejected",
                raw
            );
        }
    }
}
