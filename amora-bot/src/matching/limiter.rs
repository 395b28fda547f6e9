use chrono::{DateTime, Local, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::types::UserId;

use crate::models::{CounterField, ProfilePatch, UserProfile};
use crate::storage::ProfileStore;

pub const DAILY_FREE_SWIPES: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SwipeAllowance {
    pub free: u32,
    pub purchased: u32,
}

impl SwipeAllowance {
    pub fn total(&self) -> u32 {
        self.free + self.purchased
    }

    pub fn is_exhausted(&self) -> bool {
        self.total() == 0
    }
}

fn start_of_local_day(now: DateTime<Local>) -> DateTime<Utc> {
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    Local
        .from_local_datetime(&midnight)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

/// Zero the daily counter when the local calendar day has rolled over since
/// the last reset. Runs before every read or increment of the counter.
/// Returns the free swipes used today after the check.
async fn rollover(profiles: &dyn ProfileStore, profile: &UserProfile) -> AppResult<u32> {
    let now = Local::now();
    let last_reset_day = profile.daily_reset_at.with_timezone(&Local).date_naive();
    if last_reset_day == now.date_naive() {
        return Ok(profile.daily_swipes);
    }

    let patch = ProfilePatch {
        daily_swipes: Some(0),
        daily_reset_at: Some(start_of_local_day(now)),
        ..Default::default()
    };
    profiles.update_fields(profile.id, patch).await?;
    tracing::debug!(user_id = profile.id, "daily swipe counter reset");
    Ok(0)
}

/// Remaining allowance: daily free quota plus purchased credits.
pub async fn available(profiles: &dyn ProfileStore, user_id: UserId) -> AppResult<SwipeAllowance> {
    let profile = profiles
        .find_one(user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    let used_today = rollover(profiles, &profile).await?;
    Ok(SwipeAllowance {
        free: DAILY_FREE_SWIPES.saturating_sub(used_today),
        purchased: profile.purchased_swipes,
    })
}

/// Spend one swipe unit. Purchased credits are consumed before the free
/// daily quota. The rollover check always happens first, never after the
/// increment.
pub async fn consume(profiles: &dyn ProfileStore, user_id: UserId) -> AppResult<()> {
    let profile = profiles
        .find_one(user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    rollover(profiles, &profile).await?;

    if profile.purchased_swipes > 0 {
        profiles
            .atomic_increment(user_id, CounterField::PurchasedSwipes, -1)
            .await?;
    } else {
        profiles
            .atomic_increment(user_id, CounterField::DailySwipes, 1)
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::testutil::profile;
    use chrono::Duration;

    #[tokio::test]
    async fn free_quota_runs_out_after_twenty() {
        let store = MemoryStore::new();
        store.upsert(profile(1)).await.unwrap();

        for _ in 0..DAILY_FREE_SWIPES {
            consume(&store, 1).await.unwrap();
        }

        let allowance = available(&store, 1).await.unwrap();
        assert_eq!(allowance.free, 0);
        assert_eq!(allowance.purchased, 0);
        assert!(allowance.is_exhausted());
    }

    #[tokio::test]
    async fn counter_resets_across_calendar_days() {
        let store = MemoryStore::new();
        let mut p = profile(1);
        p.daily_swipes = DAILY_FREE_SWIPES;
        p.daily_reset_at = Utc::now() - Duration::days(1);
        store.upsert(p).await.unwrap();

        // The stale counter is zeroed before it is read.
        let allowance = available(&store, 1).await.unwrap();
        assert_eq!(allowance.free, DAILY_FREE_SWIPES);

        consume(&store, 1).await.unwrap();
        let allowance = available(&store, 1).await.unwrap();
        assert_eq!(allowance.free, DAILY_FREE_SWIPES - 1);
    }

    #[tokio::test]
    async fn purchased_credits_are_spent_first() {
        let store = MemoryStore::new();
        store.upsert(profile(1)).await.unwrap();
        store
            .atomic_increment(1, CounterField::PurchasedSwipes, 5)
            .await
            .unwrap();

        consume(&store, 1).await.unwrap();

        let p = store.find_one(1).await.unwrap().unwrap();
        assert_eq!(p.purchased_swipes, 4);
        assert_eq!(p.daily_swipes, 0);
    }

    #[tokio::test]
    async fn total_combines_free_and_purchased() {
        let store = MemoryStore::new();
        let mut p = profile(1);
        p.daily_swipes = 18;
        store.upsert(p).await.unwrap();
        store
            .atomic_increment(1, CounterField::PurchasedSwipes, 3)
            .await
            .unwrap();

        let allowance = available(&store, 1).await.unwrap();
        assert_eq!(allowance.free, 2);
        assert_eq!(allowance.purchased, 3);
        assert_eq!(allowance.total(), 5);
    }
}
