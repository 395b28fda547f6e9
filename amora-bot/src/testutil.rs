//! Shared fixtures for the unit tests: an in-memory application state and a
//! transport that records instead of sending.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use amora_shared::clients::transport::ChatTransport;
use amora_shared::types::{Outbound, UserId};

use crate::config::AppConfig;
use crate::models::{Gender, Intention, LookingFor, UserProfile};
use crate::sessions::SessionStore;
use crate::storage::MemoryStore;
use crate::AppState;

/// Captures every outbound delivery for later assertions.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(UserId, Outbound)>>,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<(UserId, Outbound)> {
        self.sent.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send(&self, user_id: UserId, message: &Outbound) -> Result<(), String> {
        self.sent
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push((user_id, message.clone()));
        Ok(())
    }
}

pub struct TestEnv {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub transport: Arc<RecordingTransport>,
}

impl TestEnv {
    pub fn set_relax_preferences(&mut self, relax: bool) {
        self.state.config.relax_preferences = relax;
    }
}

pub fn test_env() -> TestEnv {
    let store = Arc::new(MemoryStore::new());
    let transport = Arc::new(RecordingTransport::default());
    let state = AppState {
        config: AppConfig {
            port: 0,
            transport_api_url: "http://localhost:0".into(),
            relax_preferences: true,
            // No artificial pauses in tests.
            match_resume_delay_ms: 0,
            notify_timeout_ms: 1000,
        },
        profiles: store.clone(),
        reports: store.clone(),
        reasons: store.clone(),
        sessions: SessionStore::new(),
        transport: transport.clone(),
    };
    TestEnv { state, store, transport }
}

/// A complete, valid profile with deterministic filler fields.
pub fn profile_with(id: UserId, gender: Gender, looking: LookingFor) -> UserProfile {
    UserProfile {
        id,
        display_name: format!("User {id}"),
        age: 25,
        gender,
        looking,
        intention: Intention::Serious,
        bio: "Coffee, climbing, bad puns.".into(),
        photos: vec![format!("photo-{id}-a"), format!("photo-{id}-b")],
        likes: Vec::new(),
        matches: Vec::new(),
        recent_likes: Vec::new(),
        daily_swipes: 0,
        daily_reset_at: Utc::now(),
        purchased_swipes: 0,
        created_at: Utc::now(),
    }
}

pub fn profile(id: UserId) -> UserProfile {
    profile_with(id, Gender::Female, LookingFor::Men)
}

/// Let spawned notification tasks run to completion before asserting on the
/// recorded transport.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
