use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::types::{Outbound, UserId};

/// Outbound side of the chat transport. The transport itself (message and
/// button delivery, command parsing) lives outside this service; this is the
/// delivery contract the service owns.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, user_id: UserId, message: &Outbound) -> Result<(), String>;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    user_id: UserId,
    message: &'a Outbound,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post(&self, user_id: UserId, message: &Outbound) -> Result<(), String> {
        let response = self
            .client
            .post(format!("{}/send", self.base_url))
            .json(&SendRequest { user_id, message })
            .send()
            .await
            .map_err(|e| format!("transport send failed: {e}"))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("transport API error: {body}"));
        }

        tracing::debug!(user_id = user_id, "message delivered");
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, user_id: UserId, message: &Outbound) -> Result<(), String> {
        match self.post(user_id, message).await {
            Ok(()) => Ok(()),
            // Photo delivery can fail on the recipient's side (blocked media,
            // expired file reference). Degrade to the caption as plain text.
            Err(e) => {
                if let Outbound::Photos { caption, keyboard, .. } = message {
                    tracing::warn!(user_id = user_id, error = %e, "photo delivery failed, falling back to text");
                    let fallback = Outbound::Message {
                        text: caption.clone(),
                        keyboard: keyboard.clone(),
                    };
                    self.post(user_id, &fallback).await
                } else {
                    Err(e)
                }
            }
        }
    }
}
