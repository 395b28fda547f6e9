use async_trait::async_trait;

use amora_shared::errors::AppResult;
use amora_shared::types::UserId;

use crate::models::{CounterField, DeletionReason, ProfilePatch, Report, UserProfile};

mod memory;

pub use memory::MemoryStore;

/// Durable per-user record store. The document store itself is an external
/// collaborator; this is the contract the service depends on.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_one(&self, id: UserId) -> AppResult<Option<UserProfile>>;
    async fn find_all(&self) -> AppResult<Vec<UserProfile>>;
    async fn upsert(&self, profile: UserProfile) -> AppResult<()>;
    /// Returns false when no such profile existed.
    async fn delete(&self, id: UserId) -> AppResult<bool>;
    /// Field-level update; absent patch fields are left untouched.
    async fn update_fields(&self, id: UserId, patch: ProfilePatch) -> AppResult<bool>;
    /// Atomic counter mutation, clamped at zero on the way down.
    async fn atomic_increment(&self, id: UserId, field: CounterField, delta: i64) -> AppResult<bool>;
    async fn count(&self) -> AppResult<u64>;
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn insert(&self, report: Report) -> AppResult<()>;
    async fn find_one(&self, reporter_id: UserId, reported_id: UserId) -> AppResult<Option<Report>>;
}

#[async_trait]
pub trait ReasonStore: Send + Sync {
    async fn insert(&self, reason: DeletionReason) -> AppResult<()>;
}

/// Read helper: a storage failure is logged and degraded to an empty pool so
/// callers keep serving instead of cascading.
pub async fn find_all_or_empty(store: &dyn ProfileStore) -> Vec<UserProfile> {
    match store.find_all().await {
        Ok(profiles) => profiles,
        Err(e) => {
            tracing::error!(error = %e, "profile listing failed, treating pool as empty");
            Vec::new()
        }
    }
}

/// Read helper: a storage failure is logged and degraded to a zero count.
pub async fn count_or_zero(store: &dyn ProfileStore) -> u64 {
    match store.count().await {
        Ok(count) => count,
        Err(e) => {
            tracing::error!(error = %e, "profile count failed, treating as zero");
            0
        }
    }
}
