use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use amora_shared::types::api::ApiResponse;
use amora_shared::types::Outbound;

use crate::handlers::{self, InboundEvent};
use crate::AppState;

/// Single ingress for the chat transport. Every event kind arrives here;
/// replies for the acting user go back in the response body, while
/// deliveries to other users ride the outbound transport.
///
/// Handler failures never bounce back to the transport (it would retry the
/// same event); they are logged and answered with a generic apology.
pub async fn receive_event(
    State(state): State<Arc<AppState>>,
    Json(event): Json<InboundEvent>,
) -> Json<ApiResponse<Vec<Outbound>>> {
    let user_id = event.user_id();
    let replies = match handlers::handle_event(&state, event).await {
        Ok(replies) => replies,
        Err(e) => {
            tracing::error!(user_id = user_id, error = %e, "event handling failed");
            vec![crate::handlers::render::generic_failure()]
        }
    };
    Json(ApiResponse::ok(replies))
}
