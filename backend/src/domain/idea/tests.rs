//! Tests for idea validation, enum parsing and patch overlays.

use super::*;
use chrono::TimeZone;
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn draft() -> IdeaDraft {
    IdeaDraft {
        title: "Realtime board".to_owned(),
        description: "Push vote counts over websockets".to_owned(),
        tech_stack: vec!["Go".to_owned(), "Postgres".to_owned()],
        tags: vec!["realtime".to_owned()],
        status: None,
        requested_by: None,
    }
}

#[fixture]
fn stored_idea() -> Idea {
    let created_at = Utc
        .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp");
    Idea {
        id: IdeaId::random(),
        title: "Realtime board".to_owned(),
        description: "Push vote counts".to_owned(),
        tech_stack: vec![TechStack::Rust, TechStack::Axum],
        tags: vec!["realtime".to_owned()],
        status: IdeaStatus::Reviewing,
        vote_count: 3,
        requested_by: "ada".to_owned(),
        created_at,
        updated_at: created_at,
    }
}

#[rstest]
fn create_applies_defaults(draft: IdeaDraft) {
    let fields = draft.validate_for_create().expect("valid draft");
    assert_eq!(fields.status, IdeaStatus::Requested);
    assert_eq!(fields.requested_by, ANONYMOUS_REQUESTER);
    assert_eq!(fields.tech_stack, vec![TechStack::Go, TechStack::Postgres]);
}

#[rstest]
#[case(Some("   ".to_owned()))]
#[case(Some(String::new()))]
#[case(None)]
fn blank_requester_falls_back_to_anonymous(mut draft: IdeaDraft, #[case] requester: Option<String>) {
    draft.requested_by = requester;
    let fields = draft.validate_for_create().expect("valid draft");
    assert_eq!(fields.requested_by, ANONYMOUS_REQUESTER);
}

#[rstest]
fn create_keeps_supplied_status(mut draft: IdeaDraft) {
    draft.status = Some("in-progress".to_owned());
    let fields = draft.validate_for_create().expect("valid draft");
    assert_eq!(fields.status, IdeaStatus::InProgress);
}

#[rstest]
fn create_rejects_unknown_tech_stack(mut draft: IdeaDraft) {
    draft.tech_stack.push("Cobol".to_owned());
    let err = draft.validate_for_create().expect_err("unknown stack");
    assert_eq!(
        err,
        IdeaValidationError::UnknownTechStack {
            value: "Cobol".to_owned()
        }
    );
    assert_eq!(err.to_string(), "invalid tech stack: Cobol");
    assert_eq!(err.field(), "techStack");
}

#[rstest]
fn create_rejects_unknown_status(mut draft: IdeaDraft) {
    draft.status = Some("shipped".to_owned());
    let err = draft.validate_for_create().expect_err("unknown status");
    assert_eq!(err.to_string(), "invalid request status: shipped");
}

#[rstest]
fn create_rejects_blank_title(mut draft: IdeaDraft) {
    draft.title = "  ".to_owned();
    let err = draft.validate_for_create().expect_err("blank title");
    assert_eq!(err, IdeaValidationError::BlankTitle);
}

#[rstest]
fn update_requires_status(draft: IdeaDraft) {
    let err = draft.validate_for_update().expect_err("status missing");
    assert_eq!(err, IdeaValidationError::MissingStatus);
}

#[rstest]
fn update_accepts_known_status(mut draft: IdeaDraft) {
    draft.status = Some("planned".to_owned());
    let fields = draft.validate_for_update().expect("valid update");
    assert_eq!(fields.status, IdeaStatus::Planned);
}

#[rstest]
fn tech_stack_parsing_matches_display() {
    for stack in TechStack::ALL {
        let parsed: TechStack = stack.as_str().parse().expect("round trip");
        assert_eq!(parsed, stack);
    }
    assert!("mysql".parse::<TechStack>().is_err());
}

#[rstest]
#[case(IdeaStatus::Requested, "requested")]
#[case(IdeaStatus::InProgress, "in-progress")]
#[case(IdeaStatus::Rejected, "rejected")]
fn status_serialises_in_kebab_case(#[case] status: IdeaStatus, #[case] expected: &str) {
    assert_eq!(serde_json::to_value(status).expect("serialise"), json!(expected));
    assert_eq!(status.as_str(), expected);
}

#[rstest]
fn idea_serialises_with_camel_case_fields(stored_idea: Idea) {
    let value = serde_json::to_value(&stored_idea).expect("serialise idea");
    assert_eq!(value["techStack"], json!(["Rust", "Axum"]));
    assert_eq!(value["voteCount"], json!(3));
    assert_eq!(value["requestedBy"], json!("ada"));
    assert_eq!(value["status"], json!("reviewing"));
}

#[rstest]
fn idea_id_rejects_non_uuid() {
    let err = IdeaId::new("not-a-uuid").expect_err("invalid id");
    assert_eq!(err.field(), "id");
}

#[rstest]
fn patch_overlays_only_supplied_fields(stored_idea: Idea) {
    let patch = IdeaPatch {
        status: Some("planned".to_owned()),
        tags: Some(vec![]),
        ..IdeaPatch::default()
    };

    let draft = patch.apply_to(&stored_idea);

    assert_eq!(draft.title, stored_idea.title);
    assert_eq!(draft.tech_stack, vec!["Rust".to_owned(), "Axum".to_owned()]);
    assert!(draft.tags.is_empty());
    assert_eq!(draft.status.as_deref(), Some("planned"));
    assert_eq!(draft.requested_by.as_deref(), Some("ada"));
}

#[rstest]
fn empty_patch_reproduces_current_record(stored_idea: Idea) {
    let fields = IdeaPatch::default()
        .apply_to(&stored_idea)
        .validate_for_update()
        .expect("current record is valid");

    assert_eq!(fields.status, stored_idea.status);
    assert_eq!(fields.tech_stack, stored_idea.tech_stack);
    assert_eq!(fields.requested_by, stored_idea.requested_by);
}
