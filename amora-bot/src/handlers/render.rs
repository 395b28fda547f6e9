//! Message and keyboard construction. All user-facing copy lives here so
//! handlers stay about control flow.

use amora_shared::types::{Button, Keyboard, Outbound};

use crate::matching::engine::Presentation;
use crate::models::UserProfile;

fn profile_caption(profile: &UserProfile) -> String {
    format!(
        "{}, {} ({})\nLooking for {}, here for {}\n\n{}",
        profile.display_name,
        profile.age,
        profile.gender.label(),
        profile.looking.label(),
        profile.intention.label(),
        profile.bio
    )
}

fn swipe_keyboard(target: i64) -> Keyboard {
    vec![vec![
        Button::new("👎 Skip", format!("skip_{target}")),
        Button::new("❤️ Like", format!("like_{target}")),
        Button::new("✉️ Message", format!("message_{target}")),
    ]]
}

pub fn candidate_card(profile: &UserProfile) -> Outbound {
    Outbound::photos(
        profile.photos.clone(),
        profile_caption(profile),
        Some(swipe_keyboard(profile.id)),
    )
}

pub fn own_profile_card(profile: &UserProfile) -> Outbound {
    Outbound::photos(profile.photos.clone(), profile_caption(profile), None)
}

/// Card forwarded to the recipient of a like or a first message, with the
/// actions they can take in response.
pub fn incoming_card(sender: &UserProfile, message: Option<&str>) -> Outbound {
    let caption = match message {
        Some(text) => format!("💌 Message for you:\n\n\"{text}\"\n\n{}", profile_caption(sender)),
        None => format!("Someone likes you!\n\n{}", profile_caption(sender)),
    };
    let keyboard = vec![vec![
        Button::new("👎 Skip", format!("skip_{}", sender.id)),
        Button::new("❤️ Like back", format!("like_{}", sender.id)),
        Button::new("🚩 Report", format!("report_{}", sender.id)),
    ]];
    Outbound::photos(sender.photos.clone(), caption, Some(keyboard))
}

pub fn match_notice(partner: &UserProfile) -> Outbound {
    Outbound::photos(
        partner.photos.clone(),
        format!(
            "It's a match! 🎉 You and {} like each other.\n\n{}",
            partner.display_name,
            profile_caption(partner)
        ),
        None,
    )
}

pub fn purchase_offer() -> Outbound {
    Outbound::message(
        "You're out of swipes for today. Your free 20 come back at midnight, \
         or you can grab an extra pack now:",
        vec![
            vec![
                Button::new("40 swipes", "buy_swipes_small"),
                Button::new("80 swipes", "buy_swipes_large"),
            ],
            vec![Button::new("Not now", "cancel_purchase")],
        ],
    )
}

pub fn create_prompt() -> Outbound {
    Outbound::text("You don't have a profile yet — send /create to set one up.")
}

pub fn edit_menu() -> Outbound {
    Outbound::message(
        "What would you like to change?",
        vec![
            vec![
                Button::new("Name", "edit_name"),
                Button::new("Age", "edit_age"),
                Button::new("Bio", "edit_bio"),
            ],
            vec![
                Button::new("Gender", "edit_gender"),
                Button::new("Preference", "edit_looking"),
                Button::new("Intention", "edit_intention"),
            ],
            vec![Button::new("Photos", "edit_photos")],
        ],
    )
}

pub fn gender_keyboard() -> Keyboard {
    vec![vec![
        Button::new("Male", "gender_male"),
        Button::new("Female", "gender_female"),
    ]]
}

pub fn looking_keyboard() -> Keyboard {
    vec![vec![
        Button::new("Men", "look_men"),
        Button::new("Women", "look_women"),
    ]]
}

pub fn intention_keyboard() -> Keyboard {
    vec![
        vec![
            Button::new("Serious", "intention_serious"),
            Button::new("Casual", "intention_casual"),
        ],
        vec![
            Button::new("Friendship", "intention_friendship"),
            Button::new("Exploring", "intention_exploring"),
        ],
    ]
}

pub fn photos_done_keyboard() -> Keyboard {
    vec![vec![Button::new("Done", "photos_done")]]
}

/// Turn a presentation outcome into user-facing messages.
pub fn presentation(outcome: Presentation) -> Vec<Outbound> {
    match outcome {
        Presentation::Candidate(profile) => vec![candidate_card(&profile)],
        Presentation::NoProfile => vec![create_prompt()],
        Presentation::PopulationEmpty => {
            vec![Outbound::text("No one else is around yet — check back soon!")]
        }
        Presentation::LimitReached(_) => vec![purchase_offer()],
        Presentation::Exhausted => vec![Outbound::text(
            "You've seen everyone matching your preference for now. Check back later!",
        )],
    }
}

pub fn generic_failure() -> Outbound {
    Outbound::text("Something went wrong on our side — please try again in a moment.")
}
