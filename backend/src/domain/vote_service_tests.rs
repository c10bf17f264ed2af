//! Tests for the vote service.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ErrorCode;
use crate::domain::VoteId;
use crate::domain::ports::MockVoteRepository;

/// In-memory repository with a set standing in for the unique constraint.
#[derive(Default)]
struct StubVoteRepository {
    votes: Mutex<HashSet<(UserId, IdeaId)>>,
}

#[async_trait]
impl VoteRepository for StubVoteRepository {
    async fn add(&self, user_id: &UserId, idea_id: &IdeaId) -> Result<Vote, VoteRepositoryError> {
        let mut votes = self.votes.lock().expect("votes lock");
        if !votes.insert((*user_id, *idea_id)) {
            return Err(VoteRepositoryError::already_voted());
        }
        Ok(Vote {
            id: VoteId::random(),
            idea_id: *idea_id,
            user_id: *user_id,
            created_at: Utc::now(),
        })
    }

    async fn remove(&self, user_id: &UserId, idea_id: &IdeaId) -> Result<(), VoteRepositoryError> {
        let mut votes = self.votes.lock().expect("votes lock");
        if votes.remove(&(*user_id, *idea_id)) {
            Ok(())
        } else {
            Err(VoteRepositoryError::not_voted())
        }
    }

    async fn has_voted(
        &self,
        user_id: &UserId,
        idea_id: &IdeaId,
    ) -> Result<bool, VoteRepositoryError> {
        let votes = self.votes.lock().expect("votes lock");
        Ok(votes.contains(&(*user_id, *idea_id)))
    }

    async fn count(&self, idea_id: &IdeaId) -> Result<u64, VoteRepositoryError> {
        let votes = self.votes.lock().expect("votes lock");
        Ok(votes.iter().filter(|(_, idea)| idea == idea_id).count() as u64)
    }
}

#[fixture]
fn service() -> VoteService<StubVoteRepository> {
    VoteService::new(Arc::new(StubVoteRepository::default()))
}

#[rstest]
#[tokio::test]
async fn second_vote_is_rejected_and_count_moves_once(service: VoteService<StubVoteRepository>) {
    let user = UserId::random();
    let idea = IdeaId::random();
    let before = service.get_vote_count(&idea).await.expect("count");

    let vote = service.add_vote(&user, &idea).await.expect("first vote");
    let error = service
        .add_vote(&user, &idea)
        .await
        .expect_err("second vote");

    assert_eq!(vote.user_id, user);
    assert_eq!(vote.idea_id, idea);
    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.message(), "user has already voted");
    assert_eq!(error.detail_code(), Some("already_voted"));
    assert_eq!(service.get_vote_count(&idea).await.expect("count"), before + 1);
}

#[rstest]
#[tokio::test]
async fn removing_an_absent_vote_reports_not_voted(service: VoteService<StubVoteRepository>) {
    let error = service
        .remove_vote(&UserId::random(), &IdeaId::random())
        .await
        .expect_err("not voted");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.detail_code(), Some("not_voted"));
}

#[rstest]
#[tokio::test]
async fn removing_a_vote_updates_count_and_state(service: VoteService<StubVoteRepository>) {
    let user = UserId::random();
    let other = UserId::random();
    let idea = IdeaId::random();
    service.add_vote(&user, &idea).await.expect("vote");
    service.add_vote(&other, &idea).await.expect("vote");

    service.remove_vote(&user, &idea).await.expect("removed");

    assert_eq!(service.get_vote_count(&idea).await.expect("count"), 1);
    assert!(!service.has_user_voted(&user, &idea).await.expect("state"));
    assert!(service.has_user_voted(&other, &idea).await.expect("state"));
}

#[rstest]
#[tokio::test]
async fn votes_are_scoped_per_idea(service: VoteService<StubVoteRepository>) {
    let user = UserId::random();
    let first = IdeaId::random();
    let second = IdeaId::random();

    service.add_vote(&user, &first).await.expect("vote");
    service.add_vote(&user, &second).await.expect("vote on another idea");

    assert_eq!(service.get_vote_count(&first).await.expect("count"), 1);
    assert_eq!(service.get_vote_count(&second).await.expect("count"), 1);
}

#[rstest]
#[tokio::test]
async fn insert_race_maps_to_already_voted() {
    let mut repo = MockVoteRepository::new();
    repo.expect_has_voted().times(1).returning(|_, _| Ok(false));
    repo.expect_add()
        .times(1)
        .returning(|_, _| Err(VoteRepositoryError::already_voted()));

    let service = VoteService::new(Arc::new(repo));
    let error = service
        .add_vote(&UserId::random(), &IdeaId::random())
        .await
        .expect_err("race lost");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.detail_code(), Some("already_voted"));
}

#[rstest]
#[tokio::test]
async fn delete_race_maps_to_not_voted() {
    let mut repo = MockVoteRepository::new();
    repo.expect_has_voted().times(1).returning(|_, _| Ok(true));
    repo.expect_remove()
        .times(1)
        .returning(|_, _| Err(VoteRepositoryError::not_voted()));

    let service = VoteService::new(Arc::new(repo));
    let error = service
        .remove_vote(&UserId::random(), &IdeaId::random())
        .await
        .expect_err("race lost");

    assert_eq!(error.detail_code(), Some("not_voted"));
}

#[rstest]
#[case(VoteRepositoryError::missing_reference("idea does not exist"), ErrorCode::NotFound)]
#[case(VoteRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(VoteRepositoryError::query("syntax"), ErrorCode::InternalError)]
#[tokio::test]
async fn add_vote_maps_storage_failures(
    #[case] failure: VoteRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockVoteRepository::new();
    repo.expect_has_voted().times(1).returning(|_, _| Ok(false));
    repo.expect_add().times(1).return_once(move |_, _| Err(failure));

    let service = VoteService::new(Arc::new(repo));
    let error = service
        .add_vote(&UserId::random(), &IdeaId::random())
        .await
        .expect_err("storage failure");

    assert_eq!(error.code(), expected);
}
