//! Slash-command entry points. Commands always preempt whatever dialogue
//! step is pending.

use amora_shared::errors::AppResult;
use amora_shared::types::{Outbound, UserId};

use crate::matching::engine;
use crate::sessions::DialogueStep;
use crate::AppState;

use super::render;

const WELCOME: &str = "Welcome to Amora! 💘\n\n\
    I'll help you meet people nearby. Set up a profile with /create, \
    then browse with /match.\n\nSend /help to see everything I can do.";

const HELP: &str = "Commands:\n\
    /create — set up your profile\n\
    /profile — see your own profile\n\
    /edit — change a profile field\n\
    /match — browse candidates\n\
    /matches — your matches and admirers\n\
    /delete — delete your profile\n\
    /help — this message";

pub async fn dispatch(state: &AppState, user_id: UserId, name: &str) -> AppResult<Vec<Outbound>> {
    match name {
        "start" => Ok(vec![Outbound::text(WELCOME)]),
        "help" => Ok(vec![Outbound::text(HELP)]),
        "create" => create(state, user_id).await,
        "profile" => profile(state, user_id).await,
        "edit" => edit(state, user_id).await,
        "match" => next_match(state, user_id).await,
        "matches" => matches(state, user_id).await,
        "delete" => delete(state, user_id).await,
        other => {
            tracing::debug!(user_id = user_id, command = other, "unknown command ignored");
            Ok(vec![])
        }
    }
}

async fn create(state: &AppState, user_id: UserId) -> AppResult<Vec<Outbound>> {
    if state.profiles.find_one(user_id).await?.is_some() {
        return Ok(vec![Outbound::text(
            "You already have a profile — use /edit to change it or /delete to start over.",
        )]);
    }

    let session_arc = state.sessions.get_or_create(user_id);
    let mut session = session_arc.lock().await;
    session.draft = Default::default();
    session.step = Some(DialogueStep::AwaitingName);

    Ok(vec![Outbound::text("Let's set you up! What's your name?")])
}

async fn profile(state: &AppState, user_id: UserId) -> AppResult<Vec<Outbound>> {
    match state.profiles.find_one(user_id).await? {
        Some(me) => Ok(vec![render::own_profile_card(&me)]),
        None => Ok(vec![render::create_prompt()]),
    }
}

async fn edit(state: &AppState, user_id: UserId) -> AppResult<Vec<Outbound>> {
    if state.profiles.find_one(user_id).await?.is_none() {
        return Ok(vec![render::create_prompt()]);
    }
    Ok(vec![render::edit_menu()])
}

async fn next_match(state: &AppState, user_id: UserId) -> AppResult<Vec<Outbound>> {
    let session_arc = state.sessions.get_or_create(user_id);
    let mut session = session_arc.lock().await;
    let outcome = engine::present_next(state, &mut session, user_id).await?;
    Ok(render::presentation(outcome))
}

async fn matches(state: &AppState, user_id: UserId) -> AppResult<Vec<Outbound>> {
    let Some(view) = engine::view_matches(state, user_id).await? else {
        return Ok(vec![render::create_prompt()]);
    };

    if view.matches.is_empty() && view.admirers.is_empty() {
        return Ok(vec![Outbound::text(
            "No matches yet — keep browsing with /match!",
        )]);
    }

    let mut replies = Vec::new();
    if !view.matches.is_empty() {
        let names: Vec<String> = view
            .matches
            .iter()
            .map(|p| format!("• {}, {}", p.display_name, p.age))
            .collect();
        replies.push(Outbound::text(format!("Your matches:\n{}", names.join("\n"))));
    }
    for admirer in &view.admirers {
        replies.push(render::incoming_card(admirer, None));
    }
    Ok(replies)
}

async fn delete(state: &AppState, user_id: UserId) -> AppResult<Vec<Outbound>> {
    if state.profiles.find_one(user_id).await?.is_none() {
        return Ok(vec![render::create_prompt()]);
    }

    let session_arc = state.sessions.get_or_create(user_id);
    let mut session = session_arc.lock().await;
    session.step = Some(DialogueStep::AwaitingDeletionReason);

    Ok(vec![Outbound::text(
        "Sorry to see you go. Tell us briefly why you're leaving — \
         sending your reason confirms the deletion.",
    )])
}
