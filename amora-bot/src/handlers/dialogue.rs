//! Profile creation and editing dialogue, plus the text-driven tails of the
//! message and deletion flows. Each step accepts one input kind; anything
//! else is silently ignored.

use validator::Validate;

use amora_shared::errors::AppResult;
use amora_shared::types::{Outbound, UserId};

use crate::matching::{engine, limiter};
use crate::models::{EditField, Gender, Intention, LookingFor, ProfilePatch, MAX_PHOTOS, MIN_PHOTOS};
use crate::notify;
use crate::sessions::DialogueStep;
use crate::AppState;

use super::render;

pub async fn handle_text(state: &AppState, user_id: UserId, text: &str) -> AppResult<Vec<Outbound>> {
    let session_arc = state.sessions.get_or_create(user_id);
    let mut session = session_arc.lock().await;

    let Some(step) = session.step.clone() else {
        tracing::debug!(user_id = user_id, "stray text outside any dialogue ignored");
        return Ok(vec![]);
    };

    match step {
        DialogueStep::AwaitingName => {
            let name = text.trim().to_string();
            let mut probe = session.draft.clone();
            probe.display_name = Some(name.clone());
            if probe.validate().is_err() {
                return Ok(vec![Outbound::text(
                    "Please send a name between 2 and 64 characters.",
                )]);
            }
            session.draft.display_name = Some(name.clone());
            session.step = Some(DialogueStep::AwaitingAge);
            Ok(vec![Outbound::text(format!(
                "Nice to meet you, {name}! How old are you?"
            ))])
        }

        DialogueStep::AwaitingAge => match parse_age(text) {
            Some(age) => {
                session.draft.age = Some(age);
                session.step = Some(DialogueStep::AwaitingGender);
                Ok(vec![Outbound::message(
                    "What's your gender?",
                    render::gender_keyboard(),
                )])
            }
            None => Ok(vec![Outbound::text(
                "Please send your age as a number (18-99).",
            )]),
        },

        DialogueStep::AwaitingBio => {
            let bio = text.trim().to_string();
            let mut probe = session.draft.clone();
            probe.bio = Some(bio.clone());
            if probe.validate().is_err() {
                return Ok(vec![Outbound::text(
                    "That's a bit long — please keep your bio under 400 characters.",
                )]);
            }
            session.draft.bio = Some(bio);
            session.draft.photos.clear();
            session.step = Some(DialogueStep::CollectingPhotos);
            Ok(vec![Outbound::message(
                format!(
                    "Almost there! Send {MIN_PHOTOS}-{MAX_PHOTOS} photos of yourself, \
                     then press Done. The first one becomes your display photo."
                ),
                render::photos_done_keyboard(),
            )])
        }

        DialogueStep::EditingField(field) => {
            edit_text_field(state, user_id, &mut session, field, text).await
        }

        DialogueStep::AwaitingMessage { target } => {
            session.step = None;
            send_message(state, user_id, &mut session, target, text).await
        }

        DialogueStep::AwaitingDeletionReason => {
            session.step = None;
            engine::delete_profile(state, user_id, text.trim()).await?;
            Ok(vec![Outbound::text(
                "Your profile has been deleted. Thanks for the feedback, and take care!",
            )])
        }

        // Button- and photo-driven steps ignore stray text.
        DialogueStep::AwaitingGender
        | DialogueStep::AwaitingLooking
        | DialogueStep::AwaitingIntention
        | DialogueStep::CollectingPhotos => Ok(vec![]),
    }
}

pub async fn handle_photo(state: &AppState, user_id: UserId, file_ref: String) -> AppResult<Vec<Outbound>> {
    let session_arc = state.sessions.get_or_create(user_id);
    let mut session = session_arc.lock().await;

    match session.step.clone() {
        Some(DialogueStep::CollectingPhotos) => {
            if session.draft.photos.len() >= MAX_PHOTOS {
                return Ok(vec![Outbound::message(
                    format!("{MAX_PHOTOS} photos max — press Done to finish."),
                    render::photos_done_keyboard(),
                )]);
            }
            session.draft.photos.push(file_ref);
            let have = session.draft.photos.len();
            if have == MAX_PHOTOS {
                return finish_creation(state, user_id, &mut session).await;
            }
            Ok(vec![Outbound::message(
                format!("Photo {have}/{MAX_PHOTOS} saved."),
                render::photos_done_keyboard(),
            )])
        }

        Some(DialogueStep::EditingField(EditField::Photos)) => {
            if session.draft.photos.len() >= MAX_PHOTOS {
                return Ok(vec![Outbound::message(
                    format!("{MAX_PHOTOS} photos max — press Done to save."),
                    render::photos_done_keyboard(),
                )]);
            }
            session.draft.photos.push(file_ref);
            let have = session.draft.photos.len();
            if have == MAX_PHOTOS {
                return save_photos_edit(state, user_id, &mut session).await;
            }
            Ok(vec![Outbound::message(
                format!("Photo {have}/{MAX_PHOTOS} saved."),
                render::photos_done_keyboard(),
            )])
        }

        _ => {
            tracing::debug!(user_id = user_id, "stray photo ignored");
            Ok(vec![])
        }
    }
}

pub async fn set_gender(state: &AppState, user_id: UserId, gender: Gender) -> AppResult<Vec<Outbound>> {
    let session_arc = state.sessions.get_or_create(user_id);
    let mut session = session_arc.lock().await;

    match session.step.clone() {
        Some(DialogueStep::AwaitingGender) => {
            session.draft.gender = Some(gender);
            session.step = Some(DialogueStep::AwaitingLooking);
            Ok(vec![Outbound::message(
                "Who are you looking for?",
                render::looking_keyboard(),
            )])
        }
        Some(DialogueStep::EditingField(EditField::Gender)) => {
            session.step = None;
            state
                .profiles
                .update_fields(
                    user_id,
                    ProfilePatch {
                        gender: Some(gender),
                        ..Default::default()
                    },
                )
                .await?;
            Ok(vec![Outbound::text("Gender updated.")])
        }
        _ => Ok(vec![]),
    }
}

pub async fn set_looking(state: &AppState, user_id: UserId, looking: LookingFor) -> AppResult<Vec<Outbound>> {
    let session_arc = state.sessions.get_or_create(user_id);
    let mut session = session_arc.lock().await;

    match session.step.clone() {
        Some(DialogueStep::AwaitingLooking) => {
            session.draft.looking = Some(looking);
            session.step = Some(DialogueStep::AwaitingIntention);
            Ok(vec![Outbound::message(
                "What are you here for?",
                render::intention_keyboard(),
            )])
        }
        Some(DialogueStep::EditingField(EditField::Looking)) => {
            session.step = None;
            // The fingerprint check picks this up on the next presentation
            // and restarts the pass.
            state
                .profiles
                .update_fields(
                    user_id,
                    ProfilePatch {
                        looking: Some(looking),
                        ..Default::default()
                    },
                )
                .await?;
            Ok(vec![Outbound::text("Preference updated.")])
        }
        _ => Ok(vec![]),
    }
}

pub async fn set_intention(state: &AppState, user_id: UserId, intention: Intention) -> AppResult<Vec<Outbound>> {
    let session_arc = state.sessions.get_or_create(user_id);
    let mut session = session_arc.lock().await;

    match session.step.clone() {
        Some(DialogueStep::AwaitingIntention) => {
            session.draft.intention = Some(intention);
            session.step = Some(DialogueStep::AwaitingBio);
            Ok(vec![Outbound::text(
                "Tell us a little about yourself — this becomes your bio.",
            )])
        }
        Some(DialogueStep::EditingField(EditField::Intention)) => {
            session.step = None;
            state
                .profiles
                .update_fields(
                    user_id,
                    ProfilePatch {
                        intention: Some(intention),
                        ..Default::default()
                    },
                )
                .await?;
            Ok(vec![Outbound::text("Intention updated.")])
        }
        _ => Ok(vec![]),
    }
}

pub async fn photos_done(state: &AppState, user_id: UserId) -> AppResult<Vec<Outbound>> {
    let session_arc = state.sessions.get_or_create(user_id);
    let mut session = session_arc.lock().await;

    match session.step.clone() {
        Some(DialogueStep::CollectingPhotos) => {
            if session.draft.photos.len() < MIN_PHOTOS {
                return Ok(vec![Outbound::message(
                    format!("At least {MIN_PHOTOS} photos are needed — send one more."),
                    render::photos_done_keyboard(),
                )]);
            }
            finish_creation(state, user_id, &mut session).await
        }
        Some(DialogueStep::EditingField(EditField::Photos)) => {
            if session.draft.photos.is_empty() {
                return Ok(vec![Outbound::message(
                    "Send at least one photo first.",
                    render::photos_done_keyboard(),
                )]);
            }
            save_photos_edit(state, user_id, &mut session).await
        }
        _ => Ok(vec![]),
    }
}

/// Enter a single-field edit step.
pub async fn begin_edit(state: &AppState, user_id: UserId, field: EditField) -> AppResult<Vec<Outbound>> {
    if state.profiles.find_one(user_id).await?.is_none() {
        return Ok(vec![render::create_prompt()]);
    }

    let session_arc = state.sessions.get_or_create(user_id);
    let mut session = session_arc.lock().await;
    session.step = Some(DialogueStep::EditingField(field));

    let prompt = match field {
        EditField::Name => Outbound::text("Send your new name."),
        EditField::Age => Outbound::text("Send your new age."),
        EditField::Bio => Outbound::text("Send your new bio."),
        EditField::Gender => Outbound::message("Pick your gender:", render::gender_keyboard()),
        EditField::Looking => Outbound::message("Who are you looking for?", render::looking_keyboard()),
        EditField::Intention => Outbound::message("What are you here for?", render::intention_keyboard()),
        EditField::Photos => {
            session.draft.photos.clear();
            Outbound::message(
                format!("Send up to {MAX_PHOTOS} new photos, then press Done. They replace the old ones."),
                render::photos_done_keyboard(),
            )
        }
    };
    Ok(vec![prompt])
}

async fn edit_text_field(
    state: &AppState,
    user_id: UserId,
    session: &mut crate::sessions::Session,
    field: EditField,
    text: &str,
) -> AppResult<Vec<Outbound>> {
    let patch = match field {
        EditField::Name => {
            let name = text.trim();
            if name.len() < 2 || name.len() > 64 {
                return Ok(vec![Outbound::text(
                    "Please send a name between 2 and 64 characters.",
                )]);
            }
            ProfilePatch {
                display_name: Some(name.to_string()),
                ..Default::default()
            }
        }
        EditField::Age => match parse_age(text) {
            Some(age) => ProfilePatch {
                age: Some(age),
                ..Default::default()
            },
            None => {
                return Ok(vec![Outbound::text(
                    "Please send your age as a number (18-99).",
                )])
            }
        },
        EditField::Bio => {
            let bio = text.trim();
            if bio.len() > 400 {
                return Ok(vec![Outbound::text(
                    "That's a bit long — please keep your bio under 400 characters.",
                )]);
            }
            ProfilePatch {
                bio: Some(bio.to_string()),
                ..Default::default()
            }
        }
        // Button- or photo-driven fields do not accept text.
        _ => return Ok(vec![]),
    };

    session.step = None;
    state.profiles.update_fields(user_id, patch).await?;
    Ok(vec![Outbound::text("Updated.")])
}

async fn finish_creation(
    state: &AppState,
    user_id: UserId,
    session: &mut crate::sessions::Session,
) -> AppResult<Vec<Outbound>> {
    let profile = session.draft.try_build(user_id)?;
    state.profiles.upsert(profile).await?;
    session.step = None;
    session.draft = Default::default();

    tracing::info!(user_id = user_id, "profile created");
    Ok(vec![Outbound::text(
        "Your profile is live! 🎉 Send /match to start browsing, or /profile to see how you look.",
    )])
}

async fn save_photos_edit(
    state: &AppState,
    user_id: UserId,
    session: &mut crate::sessions::Session,
) -> AppResult<Vec<Outbound>> {
    let photos = std::mem::take(&mut session.draft.photos);
    session.step = None;
    state
        .profiles
        .update_fields(
            user_id,
            ProfilePatch {
                photos: Some(photos),
                ..Default::default()
            },
        )
        .await?;
    Ok(vec![Outbound::text("Photos updated.")])
}

/// Deliver a first message to a candidate. Sending shares like semantics:
/// the like is recorded (with match detection) and one swipe unit is spent.
/// Presentation resumes only if the allowance survived the send.
async fn send_message(
    state: &AppState,
    user_id: UserId,
    session: &mut crate::sessions::Session,
    target: UserId,
    text: &str,
) -> AppResult<Vec<Outbound>> {
    let Some(me) = state.profiles.find_one(user_id).await? else {
        return Ok(vec![render::create_prompt()]);
    };

    let mut replies = Vec::new();
    match engine::register_like(state, &me, target).await? {
        engine::LikeOutcome::LimitReached(_) => return Ok(vec![render::purchase_offer()]),
        engine::LikeOutcome::TargetGone => {
            replies.push(Outbound::text("That user is no longer around."));
        }
        engine::LikeOutcome::Liked(recipient) => {
            notify::notify(state, recipient.id, render::incoming_card(&me, Some(text)));
            replies.push(Outbound::text(format!("Message sent to {}!", recipient.display_name)));
        }
        engine::LikeOutcome::Matched(partner) => {
            notify::notify(state, partner.id, render::incoming_card(&me, Some(text)));
            notify::notify(state, partner.id, render::match_notice(&me));
            replies.push(render::match_notice(&partner));
        }
    }

    let allowance = limiter::available(state.profiles.as_ref(), user_id).await?;
    if allowance.is_exhausted() {
        replies.push(render::purchase_offer());
        return Ok(replies);
    }

    let outcome = engine::present_next(state, session, user_id).await?;
    replies.extend(render::presentation(outcome));
    Ok(replies)
}

fn parse_age(text: &str) -> Option<u8> {
    text.trim()
        .parse::<u8>()
        .ok()
        .filter(|age| (18..=99).contains(age))
}
