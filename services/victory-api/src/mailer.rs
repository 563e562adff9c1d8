//! Mailgun-backed notification gateway.

use crate::config::MailConfig;
use crate::template;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, error};
use victory_core::fingerprint;
use victory_identity::{CodeNotification, Notifier, NotifyError};

/// Sends verification mail through the Mailgun messages API.
#[derive(Debug, Clone)]
pub struct MailgunNotifier {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    sender: String,
    timeout: Duration,
    ttl_minutes: u64,
}

impl MailgunNotifier {
    pub fn new(config: &MailConfig, code_ttl: Duration) -> Result<Self, NotifyError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: messages_endpoint(&config.api_base, &config.domain),
            api_key: config.api_key.clone().unwrap_or_default(),
            sender: config.sender.clone(),
            timeout,
            ttl_minutes: (code_ttl.as_secs() / 60).max(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// `{base}/v3/{domain}/messages`, tolerant of a trailing slash on `base`.
pub fn messages_endpoint(api_base: &str, domain: &str) -> String {
    format!("{}/v3/{}/messages", api_base.trim_end_matches('/'), domain)
}

#[async_trait]
impl Notifier for MailgunNotifier {
    async fn send(&self, notification: &CodeNotification) -> Result<(), NotifyError> {
        let message = template::render(notification, self.ttl_minutes)?;
        let form = [
            ("from", self.sender.as_str()),
            ("to", notification.to.as_str()),
            ("subject", message.subject.as_str()),
            ("text", message.text.as_str()),
            ("html", message.html.as_str()),
        ];

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth("api", Some(&self.api_key))
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NotifyError::Timeout(self.timeout)
                } else {
                    NotifyError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                to = %fingerprint(&notification.to),
                status = status.as_u16(),
                "Mailgun rejected message"
            );
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(
            to = %fingerprint(&notification.to),
            kind = notification.kind.as_str(),
            "Verification mail accepted by Mailgun"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MailConfig;

    #[test]
    fn test_messages_endpoint() {
        assert_eq!(
            messages_endpoint("https://api.mailgun.net/", "mail.victoryapp.net"),
            "https://api.mailgun.net/v3/mail.victoryapp.net/messages"
        );
    }

    #[test]
    fn test_new_uses_config() {
        let config = MailConfig {
            api_key: Some("key-1".to_string()),
            api_base: "https://api.eu.mailgun.net".to_string(),
            ..MailConfig::default()
        };
        let notifier = MailgunNotifier::new(&config, Duration::from_secs(900)).unwrap();
        assert_eq!(
            notifier.endpoint(),
            "https://api.eu.mailgun.net/v3/mail.victoryapp.net/messages"
        );
        assert_eq!(notifier.ttl_minutes, 15);
    }
}
