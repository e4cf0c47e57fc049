use chrono::NaiveDate;
use uuid::Uuid;

/// Literal prefix of every issued membership ID.
pub const MEMBERSHIP_ID_PREFIX: &str = "TPA362";
const MEMBERSHIP_ID_DIGITS: usize = 7;
const MEMBERSHIP_ID_SPACE: u128 = 10_000_000;

const APPLICATION_ID_PREFIX: &str = "APP";
const APPLICATION_SUFFIX_LEN: usize = 6;

/// Issues a membership ID such as `TPA3620001234`.
pub fn generate_membership_id() -> String {
    let number = Uuid::new_v4().as_u128() % MEMBERSHIP_ID_SPACE;
    format!(
        "{}{:0width$}",
        MEMBERSHIP_ID_PREFIX,
        number,
        width = MEMBERSHIP_ID_DIGITS
    )
}

pub fn is_membership_id(candidate: &str) -> bool {
    candidate
        .strip_prefix(MEMBERSHIP_ID_PREFIX)
        .map(|digits| {
            digits.len() == MEMBERSHIP_ID_DIGITS && digits.chars().all(|ch| ch.is_ascii_digit())
        })
        .unwrap_or(false)
}

/// Issues an application ID such as `APP-20260116-3FA91C`.
pub fn generate_application_id(submitted_on: NaiveDate) -> String {
    let suffix = Uuid::new_v4().simple().to_string()[..APPLICATION_SUFFIX_LEN].to_ascii_uppercase();
    format!(
        "{}-{}-{}",
        APPLICATION_ID_PREFIX,
        submitted_on.format("%Y%m%d"),
        suffix
    )
}

pub fn is_application_id(candidate: &str) -> bool {
    let mut parts = candidate.split('-');
    let (Some(prefix), Some(date), Some(suffix), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    prefix == APPLICATION_ID_PREFIX
        && NaiveDate::parse_from_str(date, "%Y%m%d").is_ok()
        && date.len() == 8
        && suffix.len() == APPLICATION_SUFFIX_LEN
        && suffix
            .chars()
            .all(|ch| ch.is_ascii_digit() || ('A'..='F').contains(&ch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_ids_are_prefixed_and_padded() {
        for _ in 0..64 {
            let id = generate_membership_id();
            assert_eq!(id.len(), MEMBERSHIP_ID_PREFIX.len() + MEMBERSHIP_ID_DIGITS);
            assert!(is_membership_id(&id), "malformed id {}", id);
        }
    }

    #[test]
    fn membership_id_check_rejects_near_misses() {
        assert!(is_membership_id("TPA3620001234"));
        assert!(!is_membership_id("TPA362001234"));
        assert!(!is_membership_id("TPA36200012345"));
        assert!(!is_membership_id("TPA362000123A"));
        assert!(!is_membership_id("XPA3620001234"));
    }

    #[test]
    fn application_ids_embed_submission_date() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 16).unwrap();
        let id = generate_application_id(date);
        assert!(id.starts_with("APP-20260116-"), "unexpected id {}", id);
        assert!(is_application_id(&id));
    }

    #[test]
    fn application_id_check_rejects_malformed_values() {
        assert!(is_application_id("APP-20260116-3FA91C"));
        assert!(!is_application_id("APP-20261316-3FA91C"));
        assert!(!is_application_id("APP-20260116-3fa91c"));
        assert!(!is_application_id("APP-20260116-3FA91C-1"));
        assert!(!is_application_id("REG-20260116-3FA91C"));
    }
}
