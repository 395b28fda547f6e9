pub mod actions;
pub mod commands;
pub mod dialogue;
pub mod purchase;
pub mod render;

use serde::Deserialize;

use amora_shared::errors::AppResult;
use amora_shared::types::{Outbound, UserId};

use crate::AppState;

/// One inbound chat-transport event, as delivered to the webhook.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InboundEvent {
    Command { user_id: UserId, name: String },
    Callback { user_id: UserId, data: String },
    Text { user_id: UserId, text: String },
    Photo { user_id: UserId, file_ref: String },
    PreCheckout { user_id: UserId, query_id: String, payload: String },
    PaymentConfirmed { user_id: UserId, payload: String },
}

impl InboundEvent {
    pub fn user_id(&self) -> UserId {
        match self {
            Self::Command { user_id, .. }
            | Self::Callback { user_id, .. }
            | Self::Text { user_id, .. }
            | Self::Photo { user_id, .. }
            | Self::PreCheckout { user_id, .. }
            | Self::PaymentConfirmed { user_id, .. } => *user_id,
        }
    }
}

/// Route one event to its handler. Text starting with the command marker is
/// dispatched as a command no matter what dialogue step is pending.
pub async fn handle_event(state: &AppState, event: InboundEvent) -> AppResult<Vec<Outbound>> {
    match event {
        InboundEvent::Command { user_id, name } => {
            commands::dispatch(state, user_id, name.trim_start_matches('/')).await
        }
        InboundEvent::Callback { user_id, data } => actions::dispatch(state, user_id, &data).await,
        InboundEvent::Text { user_id, text } => {
            if let Some(rest) = text.strip_prefix('/') {
                let name = rest.split_whitespace().next().unwrap_or_default();
                commands::dispatch(state, user_id, name).await
            } else {
                dialogue::handle_text(state, user_id, &text).await
            }
        }
        InboundEvent::Photo { user_id, file_ref } => {
            dialogue::handle_photo(state, user_id, file_ref).await
        }
        InboundEvent::PreCheckout { user_id, query_id, payload } => {
            purchase::pre_checkout(state, user_id, &query_id, &payload).await
        }
        InboundEvent::PaymentConfirmed { user_id, payload } => {
            purchase::payment_confirmed(state, user_id, &payload).await
        }
    }
}
