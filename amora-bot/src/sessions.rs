use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use amora_shared::types::UserId;

use crate::models::{EditField, LookingFor, ProfileDraft, UserProfile};

/// Where a user currently is in the conversation. One variant per expected
/// input; commands preempt any of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueStep {
    AwaitingName,
    AwaitingAge,
    AwaitingGender,
    AwaitingLooking,
    AwaitingIntention,
    AwaitingBio,
    CollectingPhotos,
    EditingField(EditField),
    AwaitingMessage { target: UserId },
    AwaitingDeletionReason,
}

/// Ephemeral per-user state. Lost on restart, reconstructible from the
/// durable profile, so nothing here is persisted.
#[derive(Debug, Default)]
pub struct Session {
    pub step: Option<DialogueStep>,
    pub draft: ProfileDraft,
    /// Candidates waiting to be presented, consumed front to back.
    pub queue: VecDeque<UserProfile>,
    /// Identifiers already presented in the current pass.
    pub shown: HashSet<UserId>,
    /// Cached `looking` value; a mismatch means the preference changed
    /// mid-session and the pass must restart.
    pub looking_fingerprint: Option<LookingFor>,
}

impl Session {
    /// Start a fresh pass over the candidate pool.
    pub fn reset_pass(&mut self) {
        self.queue.clear();
        self.shown.clear();
    }

    /// Compare the current preference against the cached fingerprint.
    /// On change the pass is reset so stale candidates never surface.
    /// Returns true when a reset happened.
    pub fn sync_fingerprint(&mut self, looking: LookingFor) -> bool {
        if self.looking_fingerprint == Some(looking) {
            return false;
        }
        let changed = self.looking_fingerprint.is_some();
        self.looking_fingerprint = Some(looking);
        if changed {
            self.reset_pass();
        }
        changed
    }
}

/// Process-wide session registry, created once at startup and injected.
/// `get_or_create` is the only access path; each session sits behind its own
/// mutex so one user's event never blocks another's.
pub struct SessionStore {
    inner: Mutex<HashMap<UserId, Arc<tokio::sync::Mutex<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    pub fn get_or_create(&self, user_id: UserId) -> Arc<tokio::sync::Mutex<Session>> {
        let mut map = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        map.entry(user_id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(Session::default())))
            .clone()
    }

    /// Discard a session entirely (profile deletion).
    pub fn remove(&self, user_id: UserId) {
        let mut map = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        map.remove(&user_id);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::profile;

    #[test]
    fn fingerprint_change_resets_the_pass() {
        let mut session = Session::default();

        // First sync just caches, no reset.
        assert!(!session.sync_fingerprint(LookingFor::Women));

        session.queue.push_back(profile(2));
        session.shown.insert(2);

        // Same value: untouched.
        assert!(!session.sync_fingerprint(LookingFor::Women));
        assert_eq!(session.queue.len(), 1);

        // Changed value: queue and shown-set cleared.
        assert!(session.sync_fingerprint(LookingFor::Men));
        assert!(session.queue.is_empty());
        assert!(session.shown.is_empty());
    }

    #[tokio::test]
    async fn get_or_create_returns_the_same_session() {
        let store = SessionStore::new();
        let a = store.get_or_create(1);
        a.lock().await.shown.insert(42);

        let b = store.get_or_create(1);
        assert!(b.lock().await.shown.contains(&42));

        store.remove(1);
        let c = store.get_or_create(1);
        assert!(c.lock().await.shown.is_empty());
    }
}
