//! Lenient decoding of idea values read back from storage.
//!
//! Stored tech stacks and statuses are plain strings in both backends.
//! Values outside the closed enums can only appear through out-of-band
//! writes; they are logged and replaced so one bad record never fails a
//! whole read.

use serde::{Deserialize, Deserializer};
use tracing::warn;
use uuid::Uuid;

use crate::domain::{IdeaStatus, TechStack};

/// Parse stored tech stack names, dropping unrecognised entries.
pub(crate) fn tech_stack_from_stored(idea_id: Uuid, raw: &[String]) -> Vec<TechStack> {
    raw.iter()
        .filter_map(|name| match name.parse::<TechStack>() {
            Ok(stack) => Some(stack),
            Err(err) => {
                warn!(%idea_id, %err, "dropping unrecognised tech stack");
                None
            }
        })
        .collect()
}

/// Parse a stored status, falling back to `requested`.
pub(crate) fn status_from_stored(idea_id: Uuid, raw: &str) -> IdeaStatus {
    raw.parse::<IdeaStatus>().unwrap_or_else(|err| {
        warn!(%idea_id, %err, "unrecognised status, defaulting to requested");
        IdeaStatus::Requested
    })
}

/// Deserialize `null` the same way as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn unknown_tech_stacks_are_dropped() {
        let raw = vec!["Rust".to_owned(), "Cobol".to_owned(), "MySQL".to_owned()];

        let parsed = tech_stack_from_stored(Uuid::nil(), &raw);

        assert_eq!(parsed, vec![TechStack::Rust, TechStack::MySql]);
    }

    #[rstest]
    #[case("planned", IdeaStatus::Planned)]
    #[case("in-progress", IdeaStatus::InProgress)]
    #[case("shipped", IdeaStatus::Requested)]
    #[case("", IdeaStatus::Requested)]
    fn stored_statuses_parse(#[case] raw: &str, #[case] expected: IdeaStatus) {
        assert_eq!(status_from_stored(Uuid::nil(), raw), expected);
    }

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "null_as_default")]
        items: Vec<String>,
    }

    #[rstest]
    #[case(r#"{"items": null}"#)]
    #[case(r#"{}"#)]
    fn null_and_missing_become_empty(#[case] raw: &str) {
        let holder: Holder = serde_json::from_str(raw).expect("decode");
        assert!(holder.items.is_empty());
    }
}
