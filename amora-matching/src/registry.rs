use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use amora_shared::errors::{AppError, AppResult, ErrorCode};

/// Canonical ordering for an unordered user pair: the smaller uuid is always
/// side A, so at most one record can exist per pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey {
    a: Uuid,
    b: Uuid,
}

impl PairKey {
    pub fn new(x: Uuid, y: Uuid) -> Self {
        if x < y {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }

    pub fn involves(&self, user: Uuid) -> bool {
        self.a == user || self.b == user
    }

    pub fn other(&self, user: Uuid) -> Option<Uuid> {
        if self.a == user {
            Some(self.b)
        } else if self.b == user {
            Some(self.a)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchRecord {
    pub user_a: Uuid,
    pub user_b: Uuid,
    pub liked_by_a: bool,
    pub liked_by_b: bool,
    pub is_mutual: bool,
    pub matched_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl MatchRecord {
    fn new(key: PairKey) -> Self {
        Self {
            user_a: key.a,
            user_b: key.b,
            liked_by_a: false,
            liked_by_b: false,
            is_mutual: false,
            matched_at: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LikeOutcome {
    pub record: MatchRecord,
    /// True only on the call that flipped the pair to mutual; callers use
    /// this to decide whether both parties get notified.
    pub newly_mutual: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MutualMatch {
    pub record: MatchRecord,
    pub other_user_id: Uuid,
}

/// One canonical like/pass/match record per unordered user pair.
///
/// The outer map lock is held only to resolve an entry; every
/// read-modify-write happens under that record's own mutex, so unrelated
/// pairs never serialize against each other.
#[derive(Default)]
pub struct MatchRegistry {
    records: RwLock<HashMap<PairKey, Arc<Mutex<MatchRecord>>>>,
}

impl MatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a one-sided like. Idempotent: repeating a like changes
    /// nothing, and `matched_at` is stamped exactly once, on the transition
    /// to mutual.
    pub fn like(&self, actor: Uuid, target: Uuid) -> AppResult<LikeOutcome> {
        if actor == target {
            return Err(AppError::new(ErrorCode::SelfLike, "cannot like yourself"));
        }

        let key = PairKey::new(actor, target);
        let entry = {
            let mut records = self.records.write().unwrap();
            records
                .entry(key)
                .or_insert_with(|| Arc::new(Mutex::new(MatchRecord::new(key))))
                .clone()
        };

        let mut record = entry.lock().unwrap();
        if actor == record.user_a {
            record.liked_by_a = true;
        } else {
            record.liked_by_b = true;
        }

        let mut newly_mutual = false;
        if record.liked_by_a && record.liked_by_b && !record.is_mutual {
            record.is_mutual = true;
            record.matched_at = Some(Utc::now());
            newly_mutual = true;
        }

        Ok(LikeOutcome {
            record: record.clone(),
            newly_mutual,
        })
    }

    /// Remove the pair record outright, whatever its state. A pass with no
    /// existing record is a no-op, not an error. Deleting a mutual record
    /// makes both users re-discoverable to each other.
    pub fn pass(&self, actor: Uuid, target: Uuid) {
        let key = PairKey::new(actor, target);
        self.records.write().unwrap().remove(&key);
    }

    /// Mutual matches involving `user`, most recent first.
    pub fn mutual_matches(&self, user: Uuid) -> Vec<MutualMatch> {
        let records = self.records.read().unwrap();
        let mut out: Vec<MutualMatch> = records
            .iter()
            .filter_map(|(key, entry)| {
                let other_user_id = key.other(user)?;
                let record = entry.lock().unwrap();
                record.is_mutual.then(|| MutualMatch {
                    record: record.clone(),
                    other_user_id,
                })
            })
            .collect();
        out.sort_by(|x, y| y.record.matched_at.cmp(&x.record.matched_at));
        out
    }

    /// Every user id with *any* record against `user` (one-sided like in
    /// either direction, or mutual). Discovery removes these before
    /// filtering. Passed users have no record and therefore reappear.
    pub fn excluded_for(&self, user: Uuid) -> HashSet<Uuid> {
        self.records
            .read()
            .unwrap()
            .keys()
            .filter_map(|key| key.other(user))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (Uuid, Uuid) {
        (Uuid::new_v4(), Uuid::new_v4())
    }

    #[test]
    fn mutual_match_in_either_like_order() {
        let (a, b) = pair();

        let registry = MatchRegistry::new();
        let first = registry.like(a, b).unwrap();
        assert!(!first.newly_mutual);
        assert!(!first.record.is_mutual);
        assert!(first.record.matched_at.is_none());

        let second = registry.like(b, a).unwrap();
        assert!(second.newly_mutual);
        assert!(second.record.is_mutual);
        assert!(second.record.matched_at.is_some());

        // Reversed order produces the same end state.
        let registry = MatchRegistry::new();
        registry.like(b, a).unwrap();
        let outcome = registry.like(a, b).unwrap();
        assert!(outcome.newly_mutual);
    }

    #[test]
    fn duplicate_like_is_a_noop() {
        let (a, b) = pair();
        let registry = MatchRegistry::new();

        registry.like(a, b).unwrap();
        registry.like(b, a).unwrap();
        let matched_at = registry.mutual_matches(a)[0].record.matched_at;

        let again = registry.like(a, b).unwrap();
        assert!(!again.newly_mutual);
        assert_eq!(again.record.matched_at, matched_at);
    }

    #[test]
    fn self_like_is_rejected() {
        let registry = MatchRegistry::new();
        let me = Uuid::new_v4();
        let err = registry.like(me, me).unwrap_err();
        assert_eq!(err.code_str(), ErrorCode::SelfLike.code());
    }

    #[test]
    fn pass_deletes_even_a_mutual_record() {
        let (a, b) = pair();
        let registry = MatchRegistry::new();
        registry.like(a, b).unwrap();
        registry.like(b, a).unwrap();
        assert_eq!(registry.mutual_matches(a).len(), 1);

        registry.pass(b, a);
        assert!(registry.mutual_matches(a).is_empty());
        // The pair no longer excludes each other from discovery.
        assert!(registry.excluded_for(a).is_empty());
        assert!(registry.excluded_for(b).is_empty());
    }

    #[test]
    fn pass_without_a_record_is_a_noop() {
        let (a, b) = pair();
        MatchRegistry::new().pass(a, b);
    }

    #[test]
    fn one_record_per_pair_regardless_of_direction() {
        let (a, b) = pair();
        let registry = MatchRegistry::new();
        registry.like(a, b).unwrap();
        registry.like(b, a).unwrap();

        assert_eq!(registry.records.read().unwrap().len(), 1);
    }

    #[test]
    fn excluded_for_covers_one_sided_likes_both_ways() {
        let (a, b) = pair();
        let c = Uuid::new_v4();
        let registry = MatchRegistry::new();
        registry.like(a, b).unwrap(); // a liked b
        registry.like(c, a).unwrap(); // c liked a

        let excluded = registry.excluded_for(a);
        assert_eq!(excluded, HashSet::from([b, c]));
    }

    #[test]
    fn mutual_matches_are_most_recent_first() {
        let me = Uuid::new_v4();
        let registry = MatchRegistry::new();
        let others: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        for other in &others {
            registry.like(me, *other).unwrap();
            registry.like(*other, me).unwrap();
        }

        let matches = registry.mutual_matches(me);
        assert_eq!(matches.len(), 3);
        assert!(matches
            .windows(2)
            .all(|w| w[0].record.matched_at >= w[1].record.matched_at));
        // The newest mutual is listed first.
        assert_eq!(matches[0].other_user_id, others[2]);
    }

    #[test]
    fn like_after_pass_recreates_a_fresh_record() {
        let (a, b) = pair();
        let registry = MatchRegistry::new();
        registry.like(a, b).unwrap();
        registry.like(b, a).unwrap();
        registry.pass(a, b);

        let outcome = registry.like(a, b).unwrap();
        assert!(!outcome.record.is_mutual);
        assert!(outcome.record.matched_at.is_none());
    }
}
