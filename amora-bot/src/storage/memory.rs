use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use amora_shared::errors::AppResult;
use amora_shared::types::UserId;

use crate::models::{CounterField, DeletionReason, ProfilePatch, Report, UserProfile};

use super::{ProfileStore, ReasonStore, ReportStore};

/// In-memory backend for all three collections. Used by tests and as the
/// default runtime store when no external document store is wired in.
#[derive(Default)]
pub struct MemoryStore {
    profiles: RwLock<HashMap<UserId, UserProfile>>,
    reports: RwLock<Vec<Report>>,
    reasons: RwLock<Vec<DeletionReason>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn reasons_snapshot(&self) -> Vec<DeletionReason> {
        self.reasons.read().await.clone()
    }
}

fn apply_patch(profile: &mut UserProfile, patch: ProfilePatch) {
    if let Some(v) = patch.display_name {
        profile.display_name = v;
    }
    if let Some(v) = patch.age {
        profile.age = v;
    }
    if let Some(v) = patch.gender {
        profile.gender = v;
    }
    if let Some(v) = patch.looking {
        profile.looking = v;
    }
    if let Some(v) = patch.intention {
        profile.intention = v;
    }
    if let Some(v) = patch.bio {
        profile.bio = v;
    }
    if let Some(v) = patch.photos {
        profile.photos = v;
    }
    if let Some(v) = patch.likes {
        profile.likes = v;
    }
    if let Some(v) = patch.matches {
        profile.matches = v;
    }
    if let Some(v) = patch.recent_likes {
        profile.recent_likes = v;
    }
    if let Some(v) = patch.daily_swipes {
        profile.daily_swipes = v;
    }
    if let Some(v) = patch.daily_reset_at {
        profile.daily_reset_at = v;
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn find_one(&self, id: UserId) -> AppResult<Option<UserProfile>> {
        Ok(self.profiles.read().await.get(&id).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<UserProfile>> {
        Ok(self.profiles.read().await.values().cloned().collect())
    }

    async fn upsert(&self, profile: UserProfile) -> AppResult<()> {
        self.profiles.write().await.insert(profile.id, profile);
        Ok(())
    }

    async fn delete(&self, id: UserId) -> AppResult<bool> {
        Ok(self.profiles.write().await.remove(&id).is_some())
    }

    async fn update_fields(&self, id: UserId, patch: ProfilePatch) -> AppResult<bool> {
        let mut profiles = self.profiles.write().await;
        match profiles.get_mut(&id) {
            Some(profile) => {
                apply_patch(profile, patch);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn atomic_increment(&self, id: UserId, field: CounterField, delta: i64) -> AppResult<bool> {
        let mut profiles = self.profiles.write().await;
        match profiles.get_mut(&id) {
            Some(profile) => {
                let counter = match field {
                    CounterField::DailySwipes => &mut profile.daily_swipes,
                    CounterField::PurchasedSwipes => &mut profile.purchased_swipes,
                };
                let next = (*counter as i64).saturating_add(delta).max(0);
                *counter = next as u32;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.profiles.read().await.len() as u64)
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn insert(&self, report: Report) -> AppResult<()> {
        self.reports.write().await.push(report);
        Ok(())
    }

    async fn find_one(&self, reporter_id: UserId, reported_id: UserId) -> AppResult<Option<Report>> {
        Ok(self
            .reports
            .read()
            .await
            .iter()
            .find(|r| r.reporter_id == reporter_id && r.reported_id == reported_id)
            .cloned())
    }
}

#[async_trait]
impl ReasonStore for MemoryStore {
    async fn insert(&self, reason: DeletionReason) -> AppResult<()> {
        self.reasons.write().await.push(reason);
        Ok(())
    }
}
