use std::collections::HashSet;

use amora_shared::types::UserId;

use crate::models::UserProfile;

/// Eligibility filter applied when assembling a swipe queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateFilter {
    /// Bidirectional preference compatibility: the requester's `looking`
    /// must accept the candidate's gender and vice versa.
    MutualPreference,
    /// Anyone except the requester. Relaxation stage for tiny populations.
    Anyone,
}

/// Build the ordered candidate list for one pass. Already-matched users are
/// deliberately not excluded; re-showing matches is intentional.
///
/// Ordering is ascending by identifier, so a full pass visits every eligible
/// user exactly once before any repeat.
pub fn build(
    pool: &[UserProfile],
    me: &UserProfile,
    shown: &HashSet<UserId>,
    exclude_shown: bool,
    filter: CandidateFilter,
) -> Vec<UserProfile> {
    let mut candidates: Vec<UserProfile> = pool
        .iter()
        .filter(|candidate| {
            if candidate.id == me.id {
                return false;
            }
            if exclude_shown && shown.contains(&candidate.id) {
                return false;
            }
            match filter {
                CandidateFilter::MutualPreference => me.is_compatible_with(candidate),
                CandidateFilter::Anyone => true,
            }
        })
        .cloned()
        .collect();

    candidates.sort_by_key(|c| c.id);
    candidates
}
