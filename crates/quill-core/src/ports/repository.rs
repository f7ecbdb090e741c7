use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, Post, Profile, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific lookups.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address (case-insensitive).
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Find a user by their username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Profile repository. Profiles are keyed one-to-one by user.
#[async_trait]
pub trait ProfileRepository: BaseRepository<Profile, Uuid> {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Profile>, RepoError>;
}

/// Post repository.
///
/// The ranking queries each apply descending `created_at` as the secondary
/// order so that equal counts resolve the same way on every backend.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    /// Existence probe used during slug assignment.
    async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError>;

    /// Newest-first listing for the feed. `limit` of `None` means all posts.
    async fn list_recent(&self, limit: Option<u64>) -> Result<Vec<Post>, RepoError>;

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError>;

    /// Posts ordered by descending distinct like count.
    async fn list_by_like_count(&self, limit: u64) -> Result<Vec<Post>, RepoError>;

    /// Posts ordered by descending comment count.
    async fn list_by_comment_count(&self, limit: u64) -> Result<Vec<Post>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments for a post, newest first.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;
}

/// The user<->post like relation as an explicit membership set.
///
/// Presence or absence of a `(post, user)` pair is the entire state. `add`
/// and `remove` are idempotent single-statement mutations, so a lost race
/// between two toggles settles on one of the two valid outcomes instead of
/// failing.
#[async_trait]
pub trait LikeSet: Send + Sync {
    async fn contains(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError>;

    /// Add a membership; a no-op if it already exists.
    async fn add(&self, post_id: Uuid, user_id: Uuid) -> Result<(), RepoError>;

    /// Remove a membership; a no-op if it does not exist.
    async fn remove(&self, post_id: Uuid, user_id: Uuid) -> Result<(), RepoError>;

    /// Number of distinct users liking a post.
    async fn count(&self, post_id: Uuid) -> Result<u64, RepoError>;
}
