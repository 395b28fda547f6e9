use chrono::Utc;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::types::UserId;

use crate::models::{DeletionReason, ProfilePatch, Report, UserProfile};
use crate::sessions::Session;
use crate::storage;
use crate::AppState;

use super::limiter::{self, SwipeAllowance};
use super::queue::{self, CandidateFilter};

/// Result of asking for the next candidate.
#[derive(Debug)]
pub enum Presentation {
    Candidate(UserProfile),
    NoProfile,
    PopulationEmpty,
    LimitReached(SwipeAllowance),
    /// Every relaxation stage came up empty. Only reachable when preference
    /// relaxation is disabled, since the final stages admit anyone.
    Exhausted,
}

#[derive(Debug)]
pub enum SkipOutcome {
    Skipped,
    LimitReached(SwipeAllowance),
}

#[derive(Debug)]
pub enum LikeOutcome {
    /// The target had already liked the requester: both sides now carry the
    /// reciprocal match entry.
    Matched(UserProfile),
    /// One-way like recorded; the target's recent-likes list was updated.
    Liked(UserProfile),
    /// The liked profile no longer exists (deleted mid-pass).
    TargetGone,
    LimitReached(SwipeAllowance),
}

#[derive(Debug, PartialEq, Eq)]
pub enum ReportOutcome {
    Filed,
    Duplicate,
}

#[derive(Debug)]
pub struct MatchesView {
    pub matches: Vec<UserProfile>,
    /// Users who liked the requester and are not yet matched, newest first.
    pub admirers: Vec<UserProfile>,
}

/// Refill ladder, strictest stage first. Each stage runs only when the
/// previous one produced nothing, and the loop is bounded by the number of
/// stages, so it always terminates.
async fn refill(state: &AppState, me: &UserProfile, session: &mut Session) {
    let pool = storage::find_all_or_empty(state.profiles.as_ref()).await;

    // Stage 1: mutual preference, skip candidates already shown this pass.
    let mut built = queue::build(&pool, me, &session.shown, true, CandidateFilter::MutualPreference);

    // Stage 2: same filter over a fresh pass.
    if built.is_empty() && !session.shown.is_empty() {
        session.shown.clear();
        built = queue::build(&pool, me, &session.shown, true, CandidateFilter::MutualPreference);
    }

    if built.is_empty() && state.config.relax_preferences {
        // Stage 3: drop the preference requirement.
        built = queue::build(&pool, me, &session.shown, true, CandidateFilter::Anyone);

        // Stage 4: fresh pass without the preference requirement.
        if built.is_empty() && !session.shown.is_empty() {
            session.shown.clear();
            built = queue::build(&pool, me, &session.shown, true, CandidateFilter::Anyone);
        }
    }

    session.queue = built.into();
}

/// Serve the next candidate for `user_id`, refilling the queue on demand.
/// Popping the candidate and marking it shown is the only queue mutation
/// outside explicit actions, so the queue doubles as the pass cursor.
pub async fn present_next(
    state: &AppState,
    session: &mut Session,
    user_id: UserId,
) -> AppResult<Presentation> {
    let Some(me) = state.profiles.find_one(user_id).await? else {
        return Ok(Presentation::NoProfile);
    };

    if storage::count_or_zero(state.profiles.as_ref()).await <= 1 {
        return Ok(Presentation::PopulationEmpty);
    }

    let allowance = limiter::available(state.profiles.as_ref(), user_id).await?;
    if allowance.is_exhausted() {
        return Ok(Presentation::LimitReached(allowance));
    }

    if session.sync_fingerprint(me.looking) {
        tracing::debug!(user_id = user_id, "preference changed, restarting pass");
    }

    if session.queue.is_empty() {
        refill(state, &me, session).await;
    }

    match session.queue.pop_front() {
        Some(candidate) => {
            session.shown.insert(candidate.id);
            Ok(Presentation::Candidate(candidate))
        }
        None => Ok(Presentation::Exhausted),
    }
}

/// Spend one swipe unit without recording any interest.
pub async fn skip(state: &AppState, user_id: UserId) -> AppResult<SkipOutcome> {
    let allowance = limiter::available(state.profiles.as_ref(), user_id).await?;
    if allowance.is_exhausted() {
        return Ok(SkipOutcome::LimitReached(allowance));
    }
    limiter::consume(state.profiles.as_ref(), user_id).await?;
    Ok(SkipOutcome::Skipped)
}

/// Record a like from `me` to `target_id`: array updates, swipe consumption
/// and mutual-like detection. Notifying the target is the caller's concern,
/// since the message differs between a plain like and a message-send.
pub async fn register_like(
    state: &AppState,
    me: &UserProfile,
    target_id: UserId,
) -> AppResult<LikeOutcome> {
    let allowance = limiter::available(state.profiles.as_ref(), me.id).await?;
    if allowance.is_exhausted() {
        return Ok(LikeOutcome::LimitReached(allowance));
    }

    let Some(target) = state.profiles.find_one(target_id).await? else {
        tracing::warn!(user_id = me.id, target_id = target_id, "liked profile no longer exists");
        return Ok(LikeOutcome::TargetGone);
    };

    let mut likes = me.likes.clone();
    if !likes.contains(&target_id) {
        likes.push(target_id);
    }
    state
        .profiles
        .update_fields(
            me.id,
            ProfilePatch {
                likes: Some(likes),
                ..Default::default()
            },
        )
        .await?;

    limiter::consume(state.profiles.as_ref(), me.id).await?;

    if target.likes.contains(&me.id) {
        // Mutual interest: write the reciprocal entry on both sides before
        // anything else resumes.
        let mut mine = me.matches.clone();
        if !mine.contains(&target_id) {
            mine.push(target_id);
        }
        let mut theirs = target.matches.clone();
        if !theirs.contains(&me.id) {
            theirs.push(me.id);
        }
        state
            .profiles
            .update_fields(
                me.id,
                ProfilePatch {
                    matches: Some(mine),
                    ..Default::default()
                },
            )
            .await?;
        state
            .profiles
            .update_fields(
                target_id,
                ProfilePatch {
                    matches: Some(theirs),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(user_id = me.id, target_id = target_id, "mutual like, match created");
        Ok(LikeOutcome::Matched(target))
    } else {
        // Most recent admirer goes to the back; an earlier entry is moved,
        // not duplicated.
        let mut recent = target.recent_likes.clone();
        recent.retain(|&id| id != me.id);
        recent.push(me.id);
        state
            .profiles
            .update_fields(
                target_id,
                ProfilePatch {
                    recent_likes: Some(recent),
                    ..Default::default()
                },
            )
            .await?;

        Ok(LikeOutcome::Liked(target))
    }
}

/// File a report. Duplicate (reporter, reported) pairs are rejected
/// politely, not treated as errors. Reports never consume a swipe.
pub async fn report(
    state: &AppState,
    reporter_id: UserId,
    reported_id: UserId,
) -> AppResult<ReportOutcome> {
    if reporter_id == reported_id {
        return Err(AppError::new(
            ErrorCode::CannotReportSelf,
            "you cannot report yourself",
        ));
    }

    if state
        .reports
        .find_one(reporter_id, reported_id)
        .await?
        .is_some()
    {
        return Ok(ReportOutcome::Duplicate);
    }

    state
        .reports
        .insert(Report {
            reporter_id,
            reported_id,
            created_at: Utc::now(),
        })
        .await?;

    tracing::info!(reporter_id = reporter_id, reported_id = reported_id, "report filed");
    Ok(ReportOutcome::Filed)
}

/// Resolve the requester's matches and pending admirers. Viewing consumes
/// the recent-likes list. Dangling references (deleted profiles) are
/// skipped, not errors.
pub async fn view_matches(state: &AppState, user_id: UserId) -> AppResult<Option<MatchesView>> {
    let Some(me) = state.profiles.find_one(user_id).await? else {
        return Ok(None);
    };

    let mut matches = Vec::new();
    for id in &me.matches {
        match state.profiles.find_one(*id).await? {
            Some(profile) => matches.push(profile),
            None => tracing::debug!(user_id = user_id, missing_id = id, "dangling match reference skipped"),
        }
    }

    let mut admirers = Vec::new();
    for id in me.recent_likes.iter().rev() {
        match state.profiles.find_one(*id).await? {
            Some(profile) => admirers.push(profile),
            None => tracing::debug!(user_id = user_id, missing_id = id, "dangling admirer reference skipped"),
        }
    }

    if !me.recent_likes.is_empty() {
        state
            .profiles
            .update_fields(
                user_id,
                ProfilePatch {
                    recent_likes: Some(Vec::new()),
                    ..Default::default()
                },
            )
            .await?;
    }

    Ok(Some(MatchesView { matches, admirers }))
}

/// Delete a profile: persist the reason, purge the id from every other
/// profile's arrays, drop the record, discard the session. The purge is
/// per-profile best-effort, not transactional; read paths tolerate leftover
/// references as "user not found".
pub async fn delete_profile(state: &AppState, user_id: UserId, reason: &str) -> AppResult<()> {
    let Some(me) = state.profiles.find_one(user_id).await? else {
        return Err(AppError::new(ErrorCode::ProfileNotFound, "profile not found"));
    };

    state
        .reasons
        .insert(DeletionReason {
            user_id,
            display_name: me.display_name.clone(),
            reason: reason.to_string(),
            created_at: Utc::now(),
        })
        .await?;

    let pool = storage::find_all_or_empty(state.profiles.as_ref()).await;
    for other in pool.iter().filter(|p| p.id != user_id) {
        let references = other.likes.contains(&user_id)
            || other.matches.contains(&user_id)
            || other.recent_likes.contains(&user_id);
        if !references {
            continue;
        }

        let patch = ProfilePatch {
            likes: Some(other.likes.iter().copied().filter(|&id| id != user_id).collect()),
            matches: Some(other.matches.iter().copied().filter(|&id| id != user_id).collect()),
            recent_likes: Some(
                other
                    .recent_likes
                    .iter()
                    .copied()
                    .filter(|&id| id != user_id)
                    .collect(),
            ),
            ..Default::default()
        };
        if let Err(e) = state.profiles.update_fields(other.id, patch).await {
            tracing::error!(user_id = other.id, error = %e, "purge of deleted id failed for this profile");
        }
    }

    state.profiles.delete(user_id).await?;
    state.sessions.remove(user_id);

    tracing::info!(user_id = user_id, "profile deleted and purged");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, LookingFor};
    use crate::testutil::{profile_with, test_env};

    async fn seed(env: &crate::testutil::TestEnv, profiles: Vec<UserProfile>) {
        for p in profiles {
            env.state.profiles.upsert(p).await.unwrap();
        }
    }

    async fn next_id(env: &crate::testutil::TestEnv, session: &mut Session, user: UserId) -> UserId {
        match present_next(&env.state, session, user).await.unwrap() {
            Presentation::Candidate(c) => c.id,
            other => panic!("expected candidate, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn full_pass_before_any_repeat() {
        let env = test_env();
        let me = profile_with(1, Gender::Male, LookingFor::Women);
        let mut pool = vec![me.clone()];
        for id in 2..=6 {
            pool.push(profile_with(id, Gender::Female, LookingFor::Men));
        }
        seed(&env, pool).await;

        let mut session = Session::default();
        let mut seen = Vec::new();
        for _ in 0..5 {
            seen.push(next_id(&env, &mut session, 1).await);
        }
        assert_eq!(seen, vec![2, 3, 4, 5, 6]);

        // Pool exhausted: the pass restarts from the beginning.
        assert_eq!(next_id(&env, &mut session, 1).await, 2);
    }

    #[tokio::test]
    async fn preconditions_are_checked_in_order() {
        let env = test_env();
        let mut session = Session::default();

        // No profile yet.
        assert!(matches!(
            present_next(&env.state, &mut session, 1).await.unwrap(),
            Presentation::NoProfile
        ));

        // Alone in the pool.
        seed(&env, vec![profile_with(1, Gender::Male, LookingFor::Women)]).await;
        assert!(matches!(
            present_next(&env.state, &mut session, 1).await.unwrap(),
            Presentation::PopulationEmpty
        ));

        // Out of swipes.
        let mut broke = profile_with(1, Gender::Male, LookingFor::Women);
        broke.daily_swipes = limiter::DAILY_FREE_SWIPES;
        seed(
            &env,
            vec![broke, profile_with(2, Gender::Female, LookingFor::Men)],
        )
        .await;
        assert!(matches!(
            present_next(&env.state, &mut session, 1).await.unwrap(),
            Presentation::LimitReached(_)
        ));
    }

    #[tokio::test]
    async fn preference_change_restarts_the_pass() {
        let env = test_env();
        seed(
            &env,
            vec![
                profile_with(1, Gender::Male, LookingFor::Women),
                profile_with(2, Gender::Female, LookingFor::Men),
                profile_with(3, Gender::Male, LookingFor::Men),
            ],
        )
        .await;

        let mut session = Session::default();
        assert_eq!(next_id(&env, &mut session, 1).await, 2);
        assert!(session.shown.contains(&2));

        // Mid-session preference flip.
        env.state
            .profiles
            .update_fields(
                1,
                ProfilePatch {
                    looking: Some(LookingFor::Men),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // Shown-set was cleared and the queue rebuilt for the new preference.
        assert_eq!(next_id(&env, &mut session, 1).await, 3);
        assert!(!session.shown.contains(&2));
    }

    #[tokio::test]
    async fn relaxation_shows_anyone_when_enabled() {
        let env = test_env();
        // Nobody compatible with user 1.
        seed(
            &env,
            vec![
                profile_with(1, Gender::Male, LookingFor::Women),
                profile_with(2, Gender::Male, LookingFor::Women),
            ],
        )
        .await;

        let mut session = Session::default();
        assert_eq!(next_id(&env, &mut session, 1).await, 2);
    }

    #[tokio::test]
    async fn strict_policy_reports_exhaustion() {
        let mut env = test_env();
        env.set_relax_preferences(false);
        seed(
            &env,
            vec![
                profile_with(1, Gender::Male, LookingFor::Women),
                profile_with(2, Gender::Male, LookingFor::Women),
            ],
        )
        .await;

        let mut session = Session::default();
        assert!(matches!(
            present_next(&env.state, &mut session, 1).await.unwrap(),
            Presentation::Exhausted
        ));
    }

    #[tokio::test]
    async fn like_then_reciprocal_like_creates_a_symmetric_match() {
        let env = test_env();
        seed(
            &env,
            vec![
                profile_with(1, Gender::Male, LookingFor::Women),
                profile_with(2, Gender::Female, LookingFor::Men),
            ],
        )
        .await;

        // A likes B: pending, no match.
        let a = env.state.profiles.find_one(1).await.unwrap().unwrap();
        assert!(matches!(
            register_like(&env.state, &a, 2).await.unwrap(),
            LikeOutcome::Liked(_)
        ));

        let a = env.state.profiles.find_one(1).await.unwrap().unwrap();
        let b = env.state.profiles.find_one(2).await.unwrap().unwrap();
        assert_eq!(a.likes, vec![2]);
        assert!(a.matches.is_empty());
        assert_eq!(b.recent_likes, vec![1]);
        assert!(b.matches.is_empty());

        // B likes A back: symmetric match, recent-likes untouched by this action.
        assert!(matches!(
            register_like(&env.state, &b, 1).await.unwrap(),
            LikeOutcome::Matched(_)
        ));

        let a = env.state.profiles.find_one(1).await.unwrap().unwrap();
        let b = env.state.profiles.find_one(2).await.unwrap().unwrap();
        assert_eq!(a.matches, vec![2]);
        assert_eq!(b.matches, vec![1]);
        assert_eq!(b.recent_likes, vec![1]);

        // Viewing matches clears the admirer list.
        let view = view_matches(&env.state, 2).await.unwrap().unwrap();
        assert_eq!(view.matches.len(), 1);
        let b = env.state.profiles.find_one(2).await.unwrap().unwrap();
        assert!(b.recent_likes.is_empty());
    }

    #[tokio::test]
    async fn double_like_stays_single_in_likes() {
        let env = test_env();
        seed(
            &env,
            vec![
                profile_with(1, Gender::Male, LookingFor::Women),
                profile_with(2, Gender::Female, LookingFor::Men),
            ],
        )
        .await;

        for _ in 0..2 {
            let a = env.state.profiles.find_one(1).await.unwrap().unwrap();
            register_like(&env.state, &a, 2).await.unwrap();
        }

        let a = env.state.profiles.find_one(1).await.unwrap().unwrap();
        assert_eq!(a.likes, vec![2]);
    }

    #[tokio::test]
    async fn repeated_like_moves_admirer_to_most_recent() {
        let env = test_env();
        seed(
            &env,
            vec![
                profile_with(1, Gender::Male, LookingFor::Women),
                profile_with(2, Gender::Female, LookingFor::Men),
                profile_with(3, Gender::Male, LookingFor::Women),
            ],
        )
        .await;

        let a = env.state.profiles.find_one(1).await.unwrap().unwrap();
        register_like(&env.state, &a, 2).await.unwrap();
        let c = env.state.profiles.find_one(3).await.unwrap().unwrap();
        register_like(&env.state, &c, 2).await.unwrap();
        let a = env.state.profiles.find_one(1).await.unwrap().unwrap();
        register_like(&env.state, &a, 2).await.unwrap();

        let b = env.state.profiles.find_one(2).await.unwrap().unwrap();
        assert_eq!(b.recent_likes, vec![3, 1]);
    }

    #[tokio::test]
    async fn like_of_a_deleted_profile_is_tolerated() {
        let env = test_env();
        seed(&env, vec![profile_with(1, Gender::Male, LookingFor::Women)]).await;

        let a = env.state.profiles.find_one(1).await.unwrap().unwrap();
        assert!(matches!(
            register_like(&env.state, &a, 99).await.unwrap(),
            LikeOutcome::TargetGone
        ));
    }

    #[tokio::test]
    async fn duplicate_report_is_rejected_not_errored() {
        let env = test_env();
        assert_eq!(report(&env.state, 1, 2).await.unwrap(), ReportOutcome::Filed);
        assert_eq!(report(&env.state, 1, 2).await.unwrap(), ReportOutcome::Duplicate);
        // The reverse direction is a different pair.
        assert_eq!(report(&env.state, 2, 1).await.unwrap(), ReportOutcome::Filed);
        assert!(report(&env.state, 1, 1).await.is_err());
    }

    #[tokio::test]
    async fn deletion_purges_every_back_reference() {
        let env = test_env();
        let mut a = profile_with(1, Gender::Male, LookingFor::Women);
        let mut b = profile_with(2, Gender::Female, LookingFor::Men);
        let x = profile_with(3, Gender::Female, LookingFor::Men);
        a.likes = vec![3];
        a.matches = vec![3];
        b.recent_likes = vec![3, 1];
        seed(&env, vec![a, b, x.clone()]).await;

        delete_profile(&env.state, 3, "taking a break").await.unwrap();

        let a = env.state.profiles.find_one(1).await.unwrap().unwrap();
        let b = env.state.profiles.find_one(2).await.unwrap().unwrap();
        assert!(a.likes.is_empty());
        assert!(a.matches.is_empty());
        assert_eq!(b.recent_likes, vec![1]);
        assert!(env.state.profiles.find_one(3).await.unwrap().is_none());

        let reasons = env.store.reasons_snapshot().await;
        assert_eq!(reasons.len(), 1);
        assert_eq!(reasons[0].user_id, 3);
        assert_eq!(reasons[0].reason, "taking a break");

        // No remaining queue ever contains the deleted user.
        let mut session = Session::default();
        let shown = next_id(&env, &mut session, 1).await;
        assert_ne!(shown, 3);
    }
}
