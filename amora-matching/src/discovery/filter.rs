use std::collections::HashSet;

use serde::Deserialize;
use uuid::Uuid;

use amora_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{Frequency, Gender, HasKids, Profile, ZodiacSign};

/// Browse filter. Every field is independently optional; unset fields impose
/// no constraint.
///
/// Semantics: a candidate must pass every *specified* dimension (AND across
/// dimensions). Set-valued dimensions (`zodiac_signs`, `interests`,
/// `languages`) require at least one overlapping value (OR within the
/// dimension). `city`/`country` form a single OR-group matched
/// case-insensitively as substrings. A candidate whose own attribute is
/// unset fails any dimension that names it: missing data never matches.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterCriteria {
    pub gender: Option<Gender>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub city: Option<String>,
    pub country: Option<String>,
    #[serde(default)]
    pub video_chat_only: bool,
    #[serde(default)]
    pub zodiac_signs: Vec<ZodiacSign>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    pub education: Option<String>,
    pub relationship_goal: Option<String>,
    pub has_kids: Option<HasKids>,
    pub smoke: Option<Frequency>,
    pub drink: Option<Frequency>,
    pub min_height_cm: Option<i32>,
    pub max_height_cm: Option<i32>,
    pub body_type: Option<String>,
    pub eye_color: Option<String>,
    pub hair_color: Option<String>,
    #[serde(default)]
    pub compatible_zodiac_only: bool,
}

impl FilterCriteria {
    /// Out-of-range criteria fail fast instead of silently matching nothing.
    pub fn validate(&self) -> AppResult<()> {
        if let (Some(min), Some(max)) = (self.min_age, self.max_age) {
            if min > max {
                return Err(AppError::new(
                    ErrorCode::InvalidCriteria,
                    format!("min_age ({min}) must not exceed max_age ({max})"),
                ));
            }
        }
        if let (Some(min), Some(max)) = (self.min_height_cm, self.max_height_cm) {
            if min > max {
                return Err(AppError::new(
                    ErrorCode::InvalidCriteria,
                    format!("min_height_cm ({min}) must not exceed max_height_cm ({max})"),
                ));
            }
        }
        Ok(())
    }
}

/// Apply `criteria` to `pool`, dropping `excluded` ids first, and order the
/// result newest-profile-first. Never mutates its inputs.
pub fn filter_candidates(
    criteria: &FilterCriteria,
    pool: &[Profile],
    excluded: &HashSet<Uuid>,
) -> Vec<Profile> {
    let mut out: Vec<Profile> = pool
        .iter()
        .filter(|p| !excluded.contains(&p.user_id))
        .filter(|p| matches_criteria(p, criteria))
        .cloned()
        .collect();

    // Stable sort keeps pool order for profiles created at the same instant.
    out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    out
}

fn matches_criteria(candidate: &Profile, criteria: &FilterCriteria) -> bool {
    if let Some(gender) = criteria.gender {
        if candidate.gender != gender {
            return false;
        }
    }

    if let Some(min) = criteria.min_age {
        if candidate.age < min {
            return false;
        }
    }
    if let Some(max) = criteria.max_age {
        if candidate.age > max {
            return false;
        }
    }

    if criteria.city.is_some() || criteria.country.is_some() {
        if !location_matches(candidate, criteria) {
            return false;
        }
    }

    if criteria.video_chat_only && candidate.preferences.video_chat != Some(true) {
        return false;
    }

    if !criteria.zodiac_signs.is_empty() {
        match candidate.lifestyle.zodiac {
            Some(sign) if criteria.zodiac_signs.contains(&sign) => {}
            _ => return false,
        }
    }

    if !criteria.interests.is_empty() && !overlaps(&candidate.interests, &criteria.interests) {
        return false;
    }

    if !criteria.languages.is_empty()
        && !overlaps(&candidate.lifestyle.languages, &criteria.languages)
    {
        return false;
    }

    if !scalar_matches(candidate.lifestyle.education.as_deref(), criteria.education.as_deref()) {
        return false;
    }
    if !scalar_matches(
        candidate.lifestyle.relationship_goal.as_deref(),
        criteria.relationship_goal.as_deref(),
    ) {
        return false;
    }
    if !scalar_matches(candidate.lifestyle.body_type.as_deref(), criteria.body_type.as_deref()) {
        return false;
    }
    if !scalar_matches(candidate.lifestyle.eye_color.as_deref(), criteria.eye_color.as_deref()) {
        return false;
    }
    if !scalar_matches(candidate.lifestyle.hair_color.as_deref(), criteria.hair_color.as_deref()) {
        return false;
    }

    if let Some(wanted) = criteria.has_kids {
        if candidate.lifestyle.has_kids != wanted {
            return false;
        }
    }
    if let Some(freq) = criteria.smoke {
        if candidate.lifestyle.smoke != Some(freq) {
            return false;
        }
    }
    if let Some(freq) = criteria.drink {
        if candidate.lifestyle.drink != Some(freq) {
            return false;
        }
    }

    if criteria.min_height_cm.is_some() || criteria.max_height_cm.is_some() {
        let Some(height) = candidate.lifestyle.height_cm else {
            return false;
        };
        if let Some(min) = criteria.min_height_cm {
            if height < min {
                return false;
            }
        }
        if let Some(max) = criteria.max_height_cm {
            if height > max {
                return false;
            }
        }
    }

    // compatible_zodiac_only is resolved against the requester's own sign in
    // the zodiac pass, not here.
    true
}

/// City and country form one OR-group: a candidate passes if either of the
/// requested values matches the corresponding field.
fn location_matches(candidate: &Profile, criteria: &FilterCriteria) -> bool {
    let city_ok = match (&criteria.city, &candidate.location.city) {
        (Some(wanted), Some(actual)) => contains_ci(actual, wanted),
        _ => false,
    };
    let country_ok = match (&criteria.country, &candidate.location.country) {
        (Some(wanted), Some(actual)) => contains_ci(actual, wanted),
        _ => false,
    };
    city_ok || country_ok
}

fn scalar_matches(actual: Option<&str>, wanted: Option<&str>) -> bool {
    match wanted {
        None => true,
        Some(w) => actual.is_some_and(|a| a.eq_ignore_ascii_case(w)),
    }
}

fn overlaps(values: &[String], wanted: &[String]) -> bool {
    wanted
        .iter()
        .any(|w| values.iter().any(|v| v.eq_ignore_ascii_case(w)))
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
