use super::posts::load_post;
use crate::domain::{Post, Tally, VoteAction, VoteDirection};
use crate::infrastructure::auth::VoterFingerprinter;
use crate::infrastructure::db::{CommentRepository, PostRepository, VoteRepository};
use clipsesh_errors::AppError;
use uuid::Uuid;

/// Anonymous up/down votes, at most one per voter and post.
///
/// The ledger is read and then written without a guard, so two identical
/// requests racing each other can both count.
#[derive(Clone)]
pub struct VoteLedger {
    posts: PostRepository,
    votes: VoteRepository,
    comments: CommentRepository,
    fingerprinter: VoterFingerprinter,
}

impl VoteLedger {
    pub fn new(
        posts: PostRepository,
        votes: VoteRepository,
        comments: CommentRepository,
        fingerprinter: VoterFingerprinter,
    ) -> Self {
        Self {
            posts,
            votes,
            comments,
            fingerprinter,
        }
    }

    pub async fn cast_vote(
        &self,
        post_id: Uuid,
        voter: &str,
        direction: VoteDirection,
    ) -> Result<Post, AppError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await
            .map_err(AppError::internal)?
            .ok_or_else(|| AppError::not_found("Post"))?;

        let fingerprint = self.fingerprinter.fingerprint(voter)?;
        let existing = self
            .votes
            .find(post_id, &fingerprint)
            .await
            .map_err(AppError::internal)?;

        let previous = existing
            .as_ref()
            .and_then(|record| record.direction.parse::<VoteDirection>().ok());
        let current = Tally {
            upvotes: post.upvotes,
            downvotes: post.downvotes,
        };
        let (tally, action) = current.apply(previous, direction);

        match existing {
            None => {
                self.votes
                    .create(post_id, &fingerprint, direction)
                    .await
                    .map_err(AppError::internal)?;
            }
            Some(record) if action == VoteAction::Retracted => {
                self.votes.delete(record.id).await.map_err(AppError::internal)?;
            }
            // Switch, or a stored direction that no longer parses.
            Some(record) => {
                self.votes
                    .set_direction(record, direction)
                    .await
                    .map_err(AppError::internal)?;
            }
        }

        self.posts
            .save_tally(post, tally)
            .await
            .map_err(AppError::internal)?;
        tracing::debug!("Vote {:?} {} on post {}", action, direction, post_id);

        load_post(&self.posts, &self.comments, post_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewPost;
    use crate::infrastructure::db::memory_db;

    async fn setup() -> (VoteLedger, VoteRepository, Uuid) {
        let db = memory_db().await.unwrap();
        let posts = PostRepository::new(db.clone());
        let votes = VoteRepository::new(db.clone());
        let post = posts
            .create(&NewPost::new(
                "https://clips.example.com/a".into(),
                "streamer".into(),
                "submitter".into(),
                "title".into(),
            ))
            .await
            .unwrap();
        let ledger = VoteLedger::new(
            posts,
            votes.clone(),
            CommentRepository::new(db),
            VoterFingerprinter::new("vote-secret"),
        );
        (ledger, votes, post.id)
    }

    #[tokio::test]
    async fn first_upvote_is_recorded() {
        let (ledger, votes, id) = setup().await;
        let post = ledger.cast_vote(id, "1.2.3.4", VoteDirection::Upvote).await.unwrap();
        assert_eq!((post.upvotes, post.downvotes), (1, 0));

        let records = votes.list_for_post(id).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_ne!(records[0].fingerprint, "1.2.3.4");
    }

    #[tokio::test]
    async fn repeat_upvote_toggles_off() {
        let (ledger, votes, id) = setup().await;
        ledger.cast_vote(id, "1.2.3.4", VoteDirection::Upvote).await.unwrap();
        let post = ledger.cast_vote(id, "1.2.3.4", VoteDirection::Upvote).await.unwrap();
        assert_eq!((post.upvotes, post.downvotes), (0, 0));
        assert!(votes.list_for_post(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn switching_direction_moves_the_vote() {
        let (ledger, votes, id) = setup().await;
        ledger.cast_vote(id, "1.2.3.4", VoteDirection::Upvote).await.unwrap();
        let post = ledger.cast_vote(id, "1.2.3.4", VoteDirection::Downvote).await.unwrap();
        assert_eq!((post.upvotes, post.downvotes), (0, 1));

        let records = votes.list_for_post(id).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].direction, "downvote");
    }

    #[tokio::test]
    async fn up_down_down_from_one_address() {
        let (ledger, votes, id) = setup().await;

        let post = ledger.cast_vote(id, "1.2.3.4", VoteDirection::Upvote).await.unwrap();
        assert_eq!((post.upvotes, post.downvotes), (1, 0));

        let post = ledger.cast_vote(id, "1.2.3.4", VoteDirection::Downvote).await.unwrap();
        assert_eq!((post.upvotes, post.downvotes), (0, 1));

        let post = ledger.cast_vote(id, "1.2.3.4", VoteDirection::Downvote).await.unwrap();
        assert_eq!((post.upvotes, post.downvotes), (0, 0));
        assert!(votes.list_for_post(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn voters_are_independent() {
        let (ledger, _, id) = setup().await;
        ledger.cast_vote(id, "1.2.3.4", VoteDirection::Upvote).await.unwrap();
        let post = ledger.cast_vote(id, "5.6.7.8", VoteDirection::Upvote).await.unwrap();
        assert_eq!(post.upvotes, 2);
    }

    #[tokio::test]
    async fn unknown_post_is_not_found() {
        let (ledger, _, _) = setup().await;
        let err = ledger
            .cast_vote(Uuid::new_v4(), "1.2.3.4", VoteDirection::Upvote)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
