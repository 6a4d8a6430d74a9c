use anyhow::Context;
use axum::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::{json, Value};
use tracing::debug;

/// Outbound seam to the external chat backend.
///
/// The backend speaks a call-style JSON contract: a method name and a
/// parameter map, answered with a plain success/failure status. Any
/// non-success answer is a request-level failure; the backend makes no
/// idempotency promises, so callers never retry.
#[async_trait]
pub trait RelayClient: Send + Sync {
    async fn call(&self, method: &str, params: Value) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct ChatRelay {
    http: reqwest::Client,
    base_url: String,
}

impl ChatRelay {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl RelayClient for ChatRelay {
    async fn call(&self, method: &str, params: Value) -> anyhow::Result<()> {
        let body = json!({
            "id": 1,
            "method": method,
            "params": params,
        });

        let resp = self
            .http
            .post(format!("{}/v1", self.base_url))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("relay call {method}"))?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("relay call {method} answered {status}");
        }
        debug!(%method, "relay call ok");
        Ok(())
    }
}

/// Secret for the relay's `basic` auth scheme.
pub fn basic_secret(login: &str, password: &str) -> String {
    BASE64.encode(format!("{login}:{password}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_secret_encodes_login_and_password() {
        // "a@x.com:password1"
        assert_eq!(
            basic_secret("a@x.com", "password1"),
            "YUB4LmNvbTpwYXNzd29yZDE="
        );
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let relay = ChatRelay::new("http://chat.local/");
        assert_eq!(relay.base_url, "http://chat.local");
    }
}
