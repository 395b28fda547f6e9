//! Swipe-pack purchases. The invoice/payment mechanics belong to the chat
//! transport; this module owns tier definitions, payload validation and the
//! credit on confirmed payment.

use amora_shared::errors::AppResult;
use amora_shared::types::{Outbound, UserId};

use crate::models::CounterField;
use crate::AppState;

/// Prefix every invoice payload carries; anything else is not ours.
pub const PAYLOAD_PREFIX: &str = "swipes:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipePack {
    Small,
    Large,
}

impl SwipePack {
    pub fn units(self) -> u32 {
        match self {
            Self::Small => 40,
            Self::Large => 80,
        }
    }

    /// Fixed price in minor currency units.
    pub fn price(self) -> u32 {
        match self {
            Self::Small => 199,
            Self::Large => 349,
        }
    }

    pub fn tier(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Large => "large",
        }
    }

    pub fn from_tier(tier: &str) -> Option<Self> {
        match tier {
            "small" => Some(Self::Small),
            "large" => Some(Self::Large),
            _ => None,
        }
    }

    pub fn payload(self) -> String {
        format!("{PAYLOAD_PREFIX}{}", self.tier())
    }
}

pub fn parse_payload(payload: &str) -> Option<SwipePack> {
    payload.strip_prefix(PAYLOAD_PREFIX).and_then(SwipePack::from_tier)
}

/// The user picked a pack: hand the transport an invoice to issue.
pub async fn offer_invoice(_state: &AppState, user_id: UserId, pack: SwipePack) -> AppResult<Vec<Outbound>> {
    tracing::debug!(user_id = user_id, tier = pack.tier(), "invoice offered");
    Ok(vec![Outbound::Invoice {
        title: format!("{} extra swipes", pack.units()),
        description: format!(
            "{} additional swipes, spent before your daily free quota.",
            pack.units()
        ),
        payload: pack.payload(),
        amount: pack.price(),
        currency: "USD".into(),
    }])
}

/// Pre-authorization: the transport asks whether to proceed with the charge.
/// Unrecognized payloads are declined before any money moves.
pub async fn pre_checkout(
    _state: &AppState,
    user_id: UserId,
    query_id: &str,
    payload: &str,
) -> AppResult<Vec<Outbound>> {
    match parse_payload(payload) {
        Some(_) => Ok(vec![Outbound::PreCheckoutAnswer {
            query_id: query_id.to_string(),
            ok: true,
            error: None,
        }]),
        None => {
            tracing::warn!(user_id = user_id, payload = payload, "unrecognized pre-checkout payload declined");
            Ok(vec![Outbound::PreCheckoutAnswer {
                query_id: query_id.to_string(),
                ok: false,
                error: Some("Unrecognized purchase — please try again.".into()),
            }])
        }
    }
}

/// Payment went through. A malformed payload at this point is logged and
/// ignored; the charge itself is the transport's problem.
pub async fn payment_confirmed(state: &AppState, user_id: UserId, payload: &str) -> AppResult<Vec<Outbound>> {
    let Some(pack) = parse_payload(payload) else {
        tracing::warn!(user_id = user_id, payload = payload, "malformed payment payload ignored");
        return Ok(vec![]);
    };

    state
        .profiles
        .atomic_increment(user_id, CounterField::PurchasedSwipes, pack.units() as i64)
        .await?;

    tracing::info!(user_id = user_id, units = pack.units(), "purchased swipes credited");
    Ok(vec![Outbound::text(format!(
        "Payment received — {} swipes added to your balance. Happy matching!",
        pack.units()
    ))])
}
