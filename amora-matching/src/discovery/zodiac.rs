use crate::models::{Profile, ZodiacSign};

/// Fixed zodiac affinity table: every sign has exactly four compatible
/// signs (its two same-element partners plus the two adjacent signs of the
/// complementary element). The table is symmetric and a sign is never
/// compatible with itself.
pub fn compatible_signs(sign: ZodiacSign) -> [ZodiacSign; 4] {
    use ZodiacSign::*;
    match sign {
        Aries => [Leo, Sagittarius, Gemini, Aquarius],
        Taurus => [Virgo, Capricorn, Cancer, Pisces],
        Gemini => [Libra, Aquarius, Aries, Leo],
        Cancer => [Scorpio, Pisces, Taurus, Virgo],
        Leo => [Aries, Sagittarius, Gemini, Libra],
        Virgo => [Taurus, Capricorn, Cancer, Scorpio],
        Libra => [Gemini, Aquarius, Leo, Sagittarius],
        Scorpio => [Cancer, Pisces, Virgo, Capricorn],
        Sagittarius => [Aries, Leo, Libra, Aquarius],
        Capricorn => [Taurus, Virgo, Scorpio, Pisces],
        Aquarius => [Gemini, Libra, Aries, Sagittarius],
        Pisces => [Cancer, Scorpio, Taurus, Capricorn],
    }
}

pub fn is_compatible(a: ZodiacSign, b: ZodiacSign) -> bool {
    compatible_signs(a).contains(&b)
}

/// Zodiac pass over an already-filtered candidate list.
///
/// This is exclusionary, not additive: with `compatible_zodiac_only` set and
/// a recorded requester sign, incompatible candidates are removed outright.
/// There is no weighted score; the recency ordering established by the
/// candidate filter is preserved untouched. Without a recorded requester
/// sign the flag is a no-op.
pub fn rank(
    requester: &Profile,
    candidates: Vec<Profile>,
    compatible_zodiac_only: bool,
) -> Vec<Profile> {
    if !compatible_zodiac_only {
        return candidates;
    }
    let Some(own_sign) = requester.lifestyle.zodiac else {
        return candidates;
    };

    candidates
        .into_iter()
        .filter(|c| {
            c.lifestyle
                .zodiac
                .map(|sign| is_compatible(own_sign, sign))
                .unwrap_or(false)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;
    use uuid::Uuid;

    fn with_sign(name: &str, sign: Option<ZodiacSign>) -> Profile {
        let mut p = Profile::new(Uuid::new_v4(), name, 30, Gender::Male);
        p.lifestyle.zodiac = sign;
        p
    }

    #[test]
    fn every_sign_has_exactly_four_distinct_partners() {
        for sign in ZodiacSign::ALL {
            let partners = compatible_signs(sign);
            let mut unique = partners.to_vec();
            unique.dedup();
            assert_eq!(unique.len(), 4, "{sign:?}");
            assert!(!partners.contains(&sign), "{sign:?} must not match itself");
        }
    }

    #[test]
    fn table_is_symmetric() {
        for a in ZodiacSign::ALL {
            for b in compatible_signs(a) {
                assert!(is_compatible(b, a), "{a:?} -> {b:?} not reciprocated");
            }
        }
    }

    #[test]
    fn aries_row_matches_the_contract() {
        use ZodiacSign::*;
        assert_eq!(compatible_signs(Aries), [Leo, Sagittarius, Gemini, Aquarius]);
    }

    #[test]
    fn aries_requester_keeps_only_leo_from_mixed_pool() {
        use ZodiacSign::*;
        let requester = with_sign("req", Some(Aries));
        let pool = vec![
            with_sign("aries", Some(Aries)),
            with_sign("cancer", Some(Cancer)),
            with_sign("leo", Some(Leo)),
        ];

        let result = rank(&requester, pool, true);
        let names: Vec<&str> = result.iter().map(|p| p.display_name.as_str()).collect();
        assert_eq!(names, vec!["leo"]);
    }

    #[test]
    fn flag_is_noop_without_requester_sign() {
        let requester = with_sign("req", None);
        let pool = vec![with_sign("a", Some(ZodiacSign::Cancer))];
        assert_eq!(rank(&requester, pool, true).len(), 1);
    }

    #[test]
    fn unset_flag_passes_everything_through_in_order() {
        let requester = with_sign("req", Some(ZodiacSign::Aries));
        let pool = vec![
            with_sign("first", Some(ZodiacSign::Cancer)),
            with_sign("second", None),
        ];
        let result = rank(&requester, pool, false);
        let names: Vec<&str> = result.iter().map(|p| p.display_name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn hard_filter_drops_candidates_without_a_sign() {
        let requester = with_sign("req", Some(ZodiacSign::Aries));
        let pool = vec![with_sign("unset", None)];
        assert!(rank(&requester, pool, true).is_empty());
    }
}
