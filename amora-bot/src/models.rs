use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::types::UserId;

pub const MIN_PHOTOS: usize = 2;
pub const MAX_PHOTOS: usize = 3;

// --- Profile ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookingFor {
    Men,
    Women,
}

impl LookingFor {
    pub fn accepts(self, gender: Gender) -> bool {
        matches!(
            (self, gender),
            (Self::Men, Gender::Male) | (Self::Women, Gender::Female)
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Men => "men",
            Self::Women => "women",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intention {
    Serious,
    Casual,
    Friendship,
    Exploring,
    #[default]
    Unset,
}

impl Intention {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Serious => "a serious relationship",
            Self::Casual => "something casual",
            Self::Friendship => "friendship",
            Self::Exploring => "still exploring",
            Self::Unset => "not saying yet",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub display_name: String,
    pub age: u8,
    pub gender: Gender,
    pub looking: LookingFor,
    #[serde(default)]
    pub intention: Intention,
    pub bio: String,
    /// 0..=3 photo references, first one is the display photo.
    pub photos: Vec<String>,
    #[serde(default)]
    pub likes: Vec<UserId>,
    /// Symmetric: id B appears here iff this id appears in B's matches.
    #[serde(default)]
    pub matches: Vec<UserId>,
    /// Unreciprocated admirers, most recent last. Cleared when viewed.
    #[serde(default)]
    pub recent_likes: Vec<UserId>,
    #[serde(default)]
    pub daily_swipes: u32,
    pub daily_reset_at: DateTime<Utc>,
    #[serde(default)]
    pub purchased_swipes: u32,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Bidirectional preference check: each side's `looking` must accept the
    /// other side's gender.
    pub fn is_compatible_with(&self, other: &UserProfile) -> bool {
        self.looking.accepts(other.gender) && other.looking.accepts(self.gender)
    }
}

/// Field-level update. `None` fields are left untouched, so concurrent
/// patches to different fields do not overwrite each other.
#[derive(Debug, Default, Clone)]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub age: Option<u8>,
    pub gender: Option<Gender>,
    pub looking: Option<LookingFor>,
    pub intention: Option<Intention>,
    pub bio: Option<String>,
    pub photos: Option<Vec<String>>,
    pub likes: Option<Vec<UserId>>,
    pub matches: Option<Vec<UserId>>,
    pub recent_likes: Option<Vec<UserId>>,
    pub daily_swipes: Option<u32>,
    pub daily_reset_at: Option<DateTime<Utc>>,
}

/// Counters mutated through atomic increments rather than patches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterField {
    DailySwipes,
    PurchasedSwipes,
}

// --- Draft ---

/// Fields gathered step by step during the creation/edit dialogue.
#[derive(Debug, Default, Clone, Validate)]
pub struct ProfileDraft {
    #[validate(length(min = 2, max = 64))]
    pub display_name: Option<String>,
    #[validate(range(min = 18, max = 99))]
    pub age: Option<u8>,
    pub gender: Option<Gender>,
    pub looking: Option<LookingFor>,
    pub intention: Option<Intention>,
    #[validate(length(max = 400))]
    pub bio: Option<String>,
    pub photos: Vec<String>,
}

impl ProfileDraft {
    /// Finalize the draft into a durable profile. Requires every dialogue
    /// field plus at least two photos.
    pub fn try_build(&self, id: UserId) -> AppResult<UserProfile> {
        self.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let (display_name, age, gender, looking, bio) = match (
            self.display_name.clone(),
            self.age,
            self.gender,
            self.looking,
            self.bio.clone(),
        ) {
            (Some(n), Some(a), Some(g), Some(l), Some(b)) => (n, a, g, l, b),
            _ => {
                return Err(AppError::new(
                    ErrorCode::ProfileIncomplete,
                    "profile is missing required fields",
                ))
            }
        };

        if self.photos.len() < MIN_PHOTOS {
            return Err(AppError::new(
                ErrorCode::ProfileIncomplete,
                "at least two photos are required",
            ));
        }

        let now = Utc::now();
        Ok(UserProfile {
            id,
            display_name,
            age,
            gender,
            looking,
            intention: self.intention.unwrap_or_default(),
            bio,
            photos: self.photos.clone(),
            likes: Vec::new(),
            matches: Vec::new(),
            recent_likes: Vec::new(),
            daily_swipes: 0,
            daily_reset_at: now,
            purchased_swipes: 0,
            created_at: now,
        })
    }
}

// --- Editing ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Name,
    Age,
    Gender,
    Looking,
    Intention,
    Bio,
    Photos,
}

impl EditField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "name" => Some(Self::Name),
            "age" => Some(Self::Age),
            "gender" => Some(Self::Gender),
            "looking" => Some(Self::Looking),
            "intention" => Some(Self::Intention),
            "bio" => Some(Self::Bio),
            "photos" => Some(Self::Photos),
            _ => None,
        }
    }
}

// --- Moderation / audit records ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub reporter_id: UserId,
    pub reported_id: UserId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletionReason {
    pub user_id: UserId,
    pub display_name: String,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}
