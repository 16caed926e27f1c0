use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Tri-state answer for profile questions a user may decline to answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HasKids {
    Yes,
    No,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Never,
    Occasionally,
    Regularly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    pub const ALL: [ZodiacSign; 12] = [
        Self::Aries,
        Self::Taurus,
        Self::Gemini,
        Self::Cancer,
        Self::Leo,
        Self::Virgo,
        Self::Libra,
        Self::Scorpio,
        Self::Sagittarius,
        Self::Capricorn,
        Self::Aquarius,
        Self::Pisces,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Location {
    pub city: Option<String>,
    pub country: Option<String>,
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub auto_detected: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lifestyle {
    pub zodiac: Option<ZodiacSign>,
    #[serde(default)]
    pub languages: Vec<String>,
    pub education: Option<String>,
    pub relationship_goal: Option<String>,
    pub smoke: Option<Frequency>,
    pub drink: Option<Frequency>,
    pub height_cm: Option<i32>,
    pub body_type: Option<String>,
    pub eye_color: Option<String>,
    pub hair_color: Option<String>,
    #[serde(default)]
    pub has_kids: HasKids,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    pub looking_for: Option<Gender>,
    #[serde(default = "default_age_min")]
    pub age_min: i32,
    #[serde(default = "default_age_max")]
    pub age_max: i32,
    pub video_chat: Option<bool>,
}

fn default_age_min() -> i32 {
    18
}

fn default_age_max() -> i32 {
    99
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            looking_for: None,
            age_min: default_age_min(),
            age_max: default_age_max(),
            video_chat: None,
        }
    }
}

/// A user profile as served by the owning directory.
///
/// Read-only inside this service: profile editing lives elsewhere, and the
/// directory guarantees `age >= 18` at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: Uuid,
    pub display_name: String,
    pub age: i32,
    pub gender: Gender,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub lifestyle: Lifestyle,
    #[serde(default)]
    pub preferences: Preferences,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Bare profile with every optional attribute unset.
    pub fn new(user_id: Uuid, display_name: impl Into<String>, age: i32, gender: Gender) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            age,
            gender,
            location: Location::default(),
            interests: Vec::new(),
            lifestyle: Lifestyle::default(),
            preferences: Preferences::default(),
            created_at: Utc::now(),
        }
    }
}
