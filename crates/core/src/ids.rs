//! Sequential, human-readable identifiers.
//!
//! Every collection issues IDs of the form `<prefix><n>` where `n` is zero-padded to at least
//! [`ID_DIGITS`] digits and is one more than the largest number found among the existing IDs.
//! Uniqueness relies on a single writer: deleting the record holding the maximum number lets
//! that number be issued again.

use crate::constants::{ID_DIGITS, PATIENT_ID_PREFIX};

fn format_id(prefix: &str, n: u64) -> String {
    format!("{prefix}{n:0width$}", width = ID_DIGITS)
}

/// Returns the next identifier for a collection.
///
/// Non-digit characters are stripped from each existing ID before parsing, so `MR007` and
/// `H007` both count as 7. IDs without digits (or with an unparsable digit run) are ignored.
pub fn next_id<'a>(prefix: &str, existing: impl IntoIterator<Item = &'a str>) -> String {
    let max = existing
        .into_iter()
        .filter_map(|id| {
            let digits: String = id.chars().filter(char::is_ascii_digit).collect();
            digits.parse::<u64>().ok()
        })
        .max()
        .unwrap_or(0);

    format_id(prefix, max.saturating_add(1))
}

/// Returns `true` for IDs of the exact shape `P` followed by three or more digits.
pub fn is_patient_id(id: &str) -> bool {
    id.strip_prefix(PATIENT_ID_PREFIX)
        .is_some_and(|rest| rest.len() >= ID_DIGITS && rest.bytes().all(|b| b.is_ascii_digit()))
}

/// Patient variant of [`next_id`]: only IDs passing [`is_patient_id`] are counted, so legacy or
/// corrupt IDs cannot move the counter.
pub fn next_patient_id<'a>(existing: impl IntoIterator<Item = &'a str>) -> String {
    let max = existing
        .into_iter()
        .filter(|id| is_patient_id(id))
        .filter_map(|id| id[PATIENT_ID_PREFIX.len()..].parse::<u64>().ok())
        .max()
        .unwrap_or(0);

    format_id(PATIENT_ID_PREFIX, max.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_id_follows_the_maximum_not_the_count() {
        assert_eq!(next_id("H", ["H001", "H003"]), "H004");
    }

    #[test]
    fn next_id_starts_at_one_for_empty_collection() {
        assert_eq!(next_id("MR", std::iter::empty()), "MR001");
    }

    #[test]
    fn next_id_ignores_ids_without_digits() {
        assert_eq!(next_id("L", ["legacy", "L009", ""]), "L010");
    }

    #[test]
    fn next_id_widens_past_three_digits() {
        assert_eq!(next_id("A", ["A999"]), "A1000");
    }

    #[test]
    fn next_id_strips_prefix_letters_of_any_length() {
        assert_eq!(next_id("RX", ["RX004", "RX012"]), "RX013");
    }

    #[test]
    fn patient_counter_skips_malformed_ids() {
        assert_eq!(next_patient_id(["P002", "P77", "PX900", "900"]), "P003");
        assert!(is_patient_id("P0001"));
        assert!(!is_patient_id("P12"));
        assert!(!is_patient_id("p123"));
    }
}
