pub mod env;

#[cfg(feature = "cli")]
use clap::Parser;

pub const EMULATOR_HOST_VAR: &str = "PUBSUB_EMULATOR_HOST";
pub const ACCESS_TOKEN_VAR: &str = "PUBSUB_ACCESS_TOKEN";
pub const DEFAULT_PUBSUB_ENDPOINT: &str = "https://pubsub.googleapis.com";

#[cfg(feature = "cli")]
const USAGE_EXAMPLE: &str = "Usage: env PUBSUB_PROJECT1=\"project1,topic1,topic2:subscription1,topic3:subscription2+endpoint1\" pubsubc

Each PUBSUB_PROJECTn variable (n = 1, 2, ...) holds:
  projectID,topicID[:subscription]...[,topicID[:subscription]...]...

where a subscription is:
  subscriptionID                    pull subscription
  subscriptionID+host[|port]        push subscription to http://host[:port]
  subscriptionID+host[|port]+dlq    push subscription with a dead letter topic <topicID>-dlq
                                    and subscription <subscriptionID>-dlq pushing to /dead

PUBSUB_EMULATOR_HOST selects the Pub/Sub emulator (host:port).";

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "pubsubc")]
#[command(about = "Create Pub/Sub topics and subscriptions from PUBSUB_PROJECT environment variables")]
#[command(disable_version_flag = true)]
#[command(after_help = USAGE_EXAMPLE)]
pub struct CliConfig {
    #[arg(long, help = "Enable debug logging")]
    pub debug: bool,

    #[arg(long, help = "Display version information")]
    pub version: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Writes the `--help` text, grammar included.
    pub fn write_usage(out: &mut dyn std::io::Write) {
        use clap::CommandFactory;
        use std::io::Write;
        // best effort, the caller exits non-zero either way
        write!(out, "{}", Self::command().render_help()).ok();
    }
}

/// Runtime configuration, built once at startup and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub debug: bool,
    pub pubsub: PubsubSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PubsubSettings {
    /// Base URL of the Pub/Sub REST API.
    pub endpoint: String,
    pub access_token: Option<String>,
}

impl Default for PubsubSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_PUBSUB_ENDPOINT.to_string(),
            access_token: None,
        }
    }
}

impl PubsubSettings {
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let endpoint = match non_empty(EMULATOR_HOST_VAR) {
            Some(host) if host.starts_with("http://") || host.starts_with("https://") => {
                host.trim_end_matches('/').to_string()
            }
            Some(host) => format!("http://{}", host.trim_end_matches('/')),
            None => DEFAULT_PUBSUB_ENDPOINT.to_string(),
        };

        Self {
            endpoint,
            access_token: non_empty(ACCESS_TOKEN_VAR),
        }
    }
}

impl Settings {
    pub fn from_lookup<F>(debug: bool, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            debug,
            pubsub: PubsubSettings::from_lookup(lookup),
        }
    }

    #[cfg(feature = "cli")]
    pub fn from_cli(cli: &CliConfig) -> Self {
        Self::from_lookup(cli.debug, env::process_env)
    }
}

/// `pubsubc - build <revision> (<commit>) running on <os>/<arch>`
pub fn version_string() -> String {
    format!(
        "pubsubc - build {} ({}) running on {}/{}",
        option_env!("PUBSUBC_REVISION").unwrap_or("<not set>"),
        option_env!("PUBSUBC_COMMIT_HASH").unwrap_or("<not set>"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emulator_host_selects_plain_http() {
        let settings = PubsubSettings::from_lookup(|name| {
            (name == EMULATOR_HOST_VAR).then(|| "localhost:8085".to_string())
        });
        assert_eq!(settings.endpoint, "http://localhost:8085");
        assert_eq!(settings.access_token, None);
    }

    #[test]
    fn test_defaults_to_google_endpoint() {
        let settings = Settings::from_lookup(true, |_| None);
        assert!(settings.debug);
        assert_eq!(settings.pubsub, PubsubSettings::default());
    }

    #[test]
    fn test_access_token_and_explicit_scheme() {
        let settings = PubsubSettings::from_lookup(|name| match name {
            EMULATOR_HOST_VAR => Some("https://pubsub.internal/".to_string()),
            ACCESS_TOKEN_VAR => Some("token-123".to_string()),
            _ => None,
        });
        assert_eq!(settings.endpoint, "https://pubsub.internal");
        assert_eq!(settings.access_token.as_deref(), Some("token-123"));
    }

    #[test]
    fn test_version_string_shape() {
        let version = version_string();
        assert!(version.starts_with("pubsubc - build "));
        assert!(version.contains(" running on "));
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_flags() {
        let cli = CliConfig::try_parse_from(["pubsubc", "--debug"]).unwrap();
        assert!(cli.debug);
        assert!(!cli.version);

        let cli = CliConfig::try_parse_from(["pubsubc", "--version"]).unwrap();
        assert!(cli.version);

        assert!(CliConfig::try_parse_from(["pubsubc", "--project", "x"]).is_err());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_usage_includes_grammar() {
        let mut out = Vec::new();
        CliConfig::write_usage(&mut out);
        let usage = String::from_utf8(out).unwrap();
        assert!(usage.contains("--debug"));
        assert!(usage.contains("subscriptionID+host[|port]+dlq"));
    }
}
