// # Telegram Notifier
//
// Delivers alert text through the Telegram Bot API `sendMessage` method.
//
// ## Behaviour
//
// - One HTTP request per `send()`; retries are owned by the caller's next run
// - Any non-success status, or a body with `"ok": false`, is `Error::Delivery`
// - Dry runs never reach the notifier; `WatchEngine` logs the alert instead
//
// ## Security
//
// - The bot token is part of the request URL, so the URL is never logged
// - Transport errors are stripped of their URL before they are reported
// - Construction fails fast if the token or chat ID is empty
//
// ## API Reference
//
// - Bot API: https://core.telegram.org/bots/api#sendmessage

use async_trait::async_trait;
use overland_core::traits::Notifier;
use overland_core::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Telegram Bot API base URL
const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// `sendMessage` request body
#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Telegram notifier
///
/// The Debug implementation does not expose the bot token.
pub struct TelegramNotifier {
    /// Bot token
    /// ⚠️ NEVER log this value
    bot_token: String,

    /// Destination chat ID (numeric ID or `@channel`)
    chat_id: String,

    /// API base URL, overridable for tests
    api_base: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the bot token
impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("bot_token", &"<REDACTED>")
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl TelegramNotifier {
    /// Create a new Telegram notifier
    ///
    /// # Parameters
    ///
    /// - `bot_token`: Token issued by @BotFather
    /// - `chat_id`: Chat to deliver alerts to
    ///
    /// # Errors
    ///
    /// `Error::Config` if either credential is empty or the HTTP client
    /// cannot be built.
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Result<Self> {
        let bot_token = bot_token.into();
        let chat_id = chat_id.into();

        if bot_token.trim().is_empty() {
            return Err(Error::config("Telegram bot token cannot be empty"));
        }
        if chat_id.trim().is_empty() {
            return Err(Error::config("Telegram chat ID cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            bot_token,
            chat_id,
            api_base: TELEGRAM_API_BASE.to_string(),
            client,
        })
    }

    /// Point the notifier at a different API host
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
        };

        let response = self
            .client
            .post(self.send_message_url())
            .json(&body)
            .send()
            .await
            // reqwest errors carry the URL, which carries the token
            .map_err(|e| Error::delivery(format!("Request failed: {}", e.without_url())))?;

        let status = response.status();
        let payload: Option<Value> = response.json().await.ok();
        let description = payload
            .as_ref()
            .and_then(|v| v.get("description"))
            .and_then(Value::as_str)
            .unwrap_or("no description");

        if !status.is_success() {
            return Err(match status.as_u16() {
                401 | 404 => Error::delivery(format!(
                    "Authentication failed: invalid bot token. Status: {}",
                    status
                )),
                403 => Error::delivery(format!(
                    "Forbidden: bot cannot message this chat. Status: {} - {}",
                    status, description
                )),
                429 => Error::delivery(format!(
                    "Rate limit exceeded. Status: {} - {}",
                    status, description
                )),
                500..=599 => Error::delivery(format!(
                    "Telegram server error (transient): {} - {}",
                    status, description
                )),
                _ => Error::delivery(format!("sendMessage failed: {} - {}", status, description)),
            });
        }

        let ok = payload
            .as_ref()
            .and_then(|v| v.get("ok"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if !ok {
            return Err(Error::delivery(format!(
                "sendMessage rejected: {}",
                description
            )));
        }

        tracing::debug!("Telegram message delivered to chat {}", self.chat_id);
        Ok(())
    }

    fn notifier_name(&self) -> &'static str {
        "telegram"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let notifier = TelegramNotifier::new("123456:secret-token", "42").unwrap();
        let debug = format!("{:?}", notifier);

        assert!(debug.contains("<REDACTED>"));
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("42"));
    }

    #[test]
    fn test_empty_credentials_rejected() {
        assert!(matches!(
            TelegramNotifier::new("", "42"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            TelegramNotifier::new("token", "  "),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_send_message_url() {
        let notifier = TelegramNotifier::new("abc", "42")
            .unwrap()
            .with_api_base("http://localhost:8081/");
        assert_eq!(notifier.send_message_url(), "http://localhost:8081/botabc/sendMessage");
        assert_eq!(notifier.notifier_name(), "telegram");
    }

    #[test]
    fn test_request_body_shape() {
        let body = SendMessage {
            chat_id: "42",
            text: "hello",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "chat_id": "42", "text": "hello" })
        );
    }

    #[tokio::test]
    async fn test_unreachable_api_is_delivery_error() {
        let notifier = TelegramNotifier::new("abc", "42")
            .unwrap()
            .with_api_base("http://127.0.0.1:9");
        let err = notifier.send("test").await.unwrap_err();

        assert!(matches!(err, Error::Delivery(_)));
        assert!(!err.to_string().contains("botabc"));
    }
}
