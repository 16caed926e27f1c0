pub mod filter;
pub mod zodiac;

use std::collections::HashSet;

use uuid::Uuid;

use crate::models::Profile;
use filter::FilterCriteria;

/// Full discovery pipeline: exclusion + criteria filtering, then the zodiac
/// compatibility pass. Pure and deterministic; callers validate the criteria
/// beforehand.
pub fn discover(
    requester: &Profile,
    criteria: &FilterCriteria,
    pool: &[Profile],
    excluded: &HashSet<Uuid>,
) -> Vec<Profile> {
    let filtered = filter::filter_candidates(criteria, pool, excluded);
    zodiac::rank(requester, filtered, criteria.compatible_zodiac_only)
}
