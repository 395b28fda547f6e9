//! Button (callback) actions: parsing the action string into a typed value
//! and running the swipe-time flows.

use amora_shared::errors::AppResult;
use amora_shared::types::{Outbound, UserId};

use crate::matching::{engine, limiter};
use crate::models::{EditField, Gender, Intention, LookingFor};
use crate::notify;
use crate::sessions::DialogueStep;
use crate::AppState;

use super::purchase::{self, SwipePack};
use super::{dialogue, render};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Gender(Gender),
    Looking(LookingFor),
    Intention(Intention),
    PhotosDone,
    Skip(UserId),
    Like(UserId),
    Message(UserId),
    Report(UserId),
    Edit(EditField),
    BuySwipes(SwipePack),
    CancelPurchase,
}

impl Action {
    pub fn parse(data: &str) -> Option<Self> {
        if let Some(rest) = data.strip_prefix("gender_") {
            return match rest {
                "male" => Some(Self::Gender(Gender::Male)),
                "female" => Some(Self::Gender(Gender::Female)),
                _ => None,
            };
        }
        if let Some(rest) = data.strip_prefix("look_") {
            return match rest {
                "men" => Some(Self::Looking(LookingFor::Men)),
                "women" => Some(Self::Looking(LookingFor::Women)),
                _ => None,
            };
        }
        if let Some(rest) = data.strip_prefix("intention_") {
            return match rest {
                "serious" => Some(Self::Intention(Intention::Serious)),
                "casual" => Some(Self::Intention(Intention::Casual)),
                "friendship" => Some(Self::Intention(Intention::Friendship)),
                "exploring" => Some(Self::Intention(Intention::Exploring)),
                _ => None,
            };
        }
        if data == "photos_done" {
            return Some(Self::PhotosDone);
        }
        if let Some(rest) = data.strip_prefix("skip_") {
            return rest.parse().ok().map(Self::Skip);
        }
        if let Some(rest) = data.strip_prefix("like_") {
            return rest.parse().ok().map(Self::Like);
        }
        if let Some(rest) = data.strip_prefix("message_") {
            return rest.parse().ok().map(Self::Message);
        }
        if let Some(rest) = data.strip_prefix("report_") {
            return rest.parse().ok().map(Self::Report);
        }
        if let Some(rest) = data.strip_prefix("buy_swipes_") {
            return SwipePack::from_tier(rest).map(Self::BuySwipes);
        }
        if data == "cancel_purchase" {
            return Some(Self::CancelPurchase);
        }
        if let Some(rest) = data.strip_prefix("edit_") {
            return EditField::parse(rest).map(Self::Edit);
        }
        None
    }
}

pub async fn dispatch(state: &AppState, user_id: UserId, data: &str) -> AppResult<Vec<Outbound>> {
    let Some(action) = Action::parse(data) else {
        tracing::debug!(user_id = user_id, data = data, "unknown callback action ignored");
        return Ok(vec![]);
    };

    match action {
        Action::Gender(gender) => dialogue::set_gender(state, user_id, gender).await,
        Action::Looking(looking) => dialogue::set_looking(state, user_id, looking).await,
        Action::Intention(intention) => dialogue::set_intention(state, user_id, intention).await,
        Action::PhotosDone => dialogue::photos_done(state, user_id).await,
        Action::Skip(target) => on_skip(state, user_id, target).await,
        Action::Like(target) => on_like(state, user_id, target).await,
        Action::Message(target) => on_message(state, user_id, target).await,
        Action::Report(target) => on_report(state, user_id, target).await,
        Action::Edit(field) => dialogue::begin_edit(state, user_id, field).await,
        Action::BuySwipes(pack) => purchase::offer_invoice(state, user_id, pack).await,
        Action::CancelPurchase => Ok(vec![Outbound::text(
            "No problem — your free swipes refresh at midnight.",
        )]),
    }
}

async fn on_skip(state: &AppState, user_id: UserId, _target: UserId) -> AppResult<Vec<Outbound>> {
    if state.profiles.find_one(user_id).await?.is_none() {
        return Ok(vec![render::create_prompt()]);
    }

    match engine::skip(state, user_id).await? {
        engine::SkipOutcome::LimitReached(_) => Ok(vec![render::purchase_offer()]),
        engine::SkipOutcome::Skipped => {
            let session_arc = state.sessions.get_or_create(user_id);
            let mut session = session_arc.lock().await;
            let outcome = engine::present_next(state, &mut session, user_id).await?;
            Ok(render::presentation(outcome))
        }
    }
}

async fn on_like(state: &AppState, user_id: UserId, target: UserId) -> AppResult<Vec<Outbound>> {
    let Some(me) = state.profiles.find_one(user_id).await? else {
        return Ok(vec![render::create_prompt()]);
    };

    let session_arc = state.sessions.get_or_create(user_id);
    let mut session = session_arc.lock().await;
    let mut replies = Vec::new();

    match engine::register_like(state, &me, target).await? {
        engine::LikeOutcome::LimitReached(_) => return Ok(vec![render::purchase_offer()]),
        engine::LikeOutcome::TargetGone => {
            replies.push(Outbound::text("That user is no longer around."));
        }
        engine::LikeOutcome::Liked(recipient) => {
            notify::notify(state, recipient.id, render::incoming_card(&me, None));
        }
        engine::LikeOutcome::Matched(partner) => {
            notify::notify(state, partner.id, render::match_notice(&me));
            replies.push(render::match_notice(&partner));
            // Let the confirmation land before the next card shows up.
            tokio::time::sleep(state.config.match_resume_delay()).await;
        }
    }

    let outcome = engine::present_next(state, &mut session, user_id).await?;
    replies.extend(render::presentation(outcome));
    Ok(replies)
}

async fn on_message(state: &AppState, user_id: UserId, target: UserId) -> AppResult<Vec<Outbound>> {
    let Some(_me) = state.profiles.find_one(user_id).await? else {
        return Ok(vec![render::create_prompt()]);
    };

    let allowance = limiter::available(state.profiles.as_ref(), user_id).await?;
    if allowance.is_exhausted() {
        return Ok(vec![render::purchase_offer()]);
    }

    let Some(recipient) = state.profiles.find_one(target).await? else {
        return Ok(vec![Outbound::text("That user is no longer around.")]);
    };

    let session_arc = state.sessions.get_or_create(user_id);
    let mut session = session_arc.lock().await;
    session.step = Some(DialogueStep::AwaitingMessage { target });

    Ok(vec![Outbound::text(format!(
        "Write your message for {} — sending it also counts as a like.",
        recipient.display_name
    ))])
}

async fn on_report(state: &AppState, user_id: UserId, target: UserId) -> AppResult<Vec<Outbound>> {
    if state.profiles.find_one(user_id).await?.is_none() {
        return Ok(vec![render::create_prompt()]);
    }

    let mut replies = Vec::new();
    match engine::report(state, user_id, target).await? {
        engine::ReportOutcome::Duplicate => {
            replies.push(Outbound::text("You've already reported this user."));
        }
        engine::ReportOutcome::Filed => {
            replies.push(Outbound::text("Thanks — our team will take a look."));
        }
    }

    let session_arc = state.sessions.get_or_create(user_id);
    let mut session = session_arc.lock().await;
    let outcome = engine::present_next(state, &mut session, user_id).await?;
    replies.extend(render::presentation(outcome));
    Ok(replies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{profile_with, settle, test_env};

    #[test]
    fn action_strings_round_trip() {
        assert_eq!(Action::parse("gender_female"), Some(Action::Gender(Gender::Female)));
        assert_eq!(Action::parse("look_men"), Some(Action::Looking(LookingFor::Men)));
        assert_eq!(
            Action::parse("intention_exploring"),
            Some(Action::Intention(Intention::Exploring))
        );
        assert_eq!(Action::parse("skip_42"), Some(Action::Skip(42)));
        assert_eq!(Action::parse("like_42"), Some(Action::Like(42)));
        assert_eq!(Action::parse("message_42"), Some(Action::Message(42)));
        assert_eq!(Action::parse("report_42"), Some(Action::Report(42)));
        assert_eq!(Action::parse("edit_bio"), Some(Action::Edit(EditField::Bio)));
        assert_eq!(
            Action::parse("buy_swipes_small"),
            Some(Action::BuySwipes(SwipePack::Small))
        );
        assert_eq!(Action::parse("cancel_purchase"), Some(Action::CancelPurchase));

        assert_eq!(Action::parse("like_notanumber"), None);
        assert_eq!(Action::parse("gender_other"), None);
        assert_eq!(Action::parse(""), None);
    }

    #[tokio::test]
    async fn skip_spends_a_swipe_and_advances() {
        let env = test_env();
        env.state
            .profiles
            .upsert(profile_with(1, Gender::Male, LookingFor::Women))
            .await
            .unwrap();
        env.state
            .profiles
            .upsert(profile_with(2, Gender::Female, LookingFor::Men))
            .await
            .unwrap();
        env.state
            .profiles
            .upsert(profile_with(3, Gender::Female, LookingFor::Men))
            .await
            .unwrap();

        let replies = dispatch(&env.state, 1, "skip_2").await.unwrap();
        assert!(matches!(&replies[0], Outbound::Photos { .. }));

        let me = env.state.profiles.find_one(1).await.unwrap().unwrap();
        assert_eq!(me.daily_swipes, 1);
        // No interest was recorded.
        assert!(me.likes.is_empty());
    }

    #[tokio::test]
    async fn exhausted_allowance_offers_a_purchase() {
        let env = test_env();
        let mut broke = profile_with(1, Gender::Male, LookingFor::Women);
        broke.daily_swipes = crate::matching::limiter::DAILY_FREE_SWIPES;
        env.state.profiles.upsert(broke).await.unwrap();
        env.state
            .profiles
            .upsert(profile_with(2, Gender::Female, LookingFor::Men))
            .await
            .unwrap();

        for data in ["skip_2", "like_2", "message_2"] {
            let replies = dispatch(&env.state, 1, data).await.unwrap();
            assert!(
                matches!(&replies[0], Outbound::Message { keyboard: Some(_), .. }),
                "{data} should offer a purchase"
            );
        }
    }

    #[tokio::test]
    async fn like_notifies_the_target() {
        let env = test_env();
        env.state
            .profiles
            .upsert(profile_with(1, Gender::Male, LookingFor::Women))
            .await
            .unwrap();
        env.state
            .profiles
            .upsert(profile_with(2, Gender::Female, LookingFor::Men))
            .await
            .unwrap();

        dispatch(&env.state, 1, "like_2").await.unwrap();
        settle().await;

        let sent = env.transport.sent();
        assert!(sent.iter().any(|(target, message)| {
            *target == 2 && matches!(message, Outbound::Photos { caption, .. } if caption.contains("likes you"))
        }));
    }

    #[tokio::test]
    async fn reciprocal_like_confirms_both_sides() {
        let env = test_env();
        let mut a = profile_with(1, Gender::Male, LookingFor::Women);
        a.recent_likes = vec![2];
        let mut b = profile_with(2, Gender::Female, LookingFor::Men);
        b.likes = vec![1];
        env.state.profiles.upsert(a).await.unwrap();
        env.state.profiles.upsert(b).await.unwrap();

        let replies = dispatch(&env.state, 1, "like_2").await.unwrap();
        assert!(matches!(&replies[0], Outbound::Photos { caption, .. } if caption.contains("match")));

        settle().await;
        let sent = env.transport.sent();
        assert!(sent.iter().any(|(target, message)| {
            *target == 2 && matches!(message, Outbound::Photos { caption, .. } if caption.contains("match"))
        }));
    }

    #[tokio::test]
    async fn report_flow_rejects_duplicates_but_continues() {
        let env = test_env();
        env.state
            .profiles
            .upsert(profile_with(1, Gender::Male, LookingFor::Women))
            .await
            .unwrap();
        env.state
            .profiles
            .upsert(profile_with(2, Gender::Female, LookingFor::Men))
            .await
            .unwrap();

        let replies = dispatch(&env.state, 1, "report_2").await.unwrap();
        assert!(matches!(&replies[0], Outbound::Message { text, .. } if text.contains("Thanks")));

        let replies = dispatch(&env.state, 1, "report_2").await.unwrap();
        assert!(matches!(&replies[0], Outbound::Message { text, .. } if text.contains("already reported")));

        // Reports never consume a swipe.
        let me = env.state.profiles.find_one(1).await.unwrap().unwrap();
        assert_eq!(me.daily_swipes, 0);
        assert_eq!(me.purchased_swipes, 0);
    }
}
