//! In-memory repository implementations - used as fallback when no database
//! is configured, and as the substrate for service-level tests.
//!
//! Note: Data is lost on process restart.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Comment, Post, Profile, User};
use quill_core::error::RepoError;
use quill_core::ports::{
    BaseRepository, CommentRepository, LikeSet, PostRepository, ProfileRepository, UserRepository,
};

/// Shared backing store.
///
/// One instance stands in for the whole relational schema so that deletes
/// can cascade across collections the way foreign keys would, and so that
/// the unique constraints (username, email, slug, profile user_id) hold
/// across repositories.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    profiles: RwLock<HashMap<Uuid, Profile>>,
    posts: RwLock<HashMap<Uuid, Post>>,
    comments: RwLock<HashMap<Uuid, Comment>>,
    likes: RwLock<HashSet<(Uuid, Uuid)>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

fn newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

pub struct MemoryUserRepository {
    store: Arc<MemoryStore>,
}

impl MemoryUserRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for MemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.users.read().await.get(&id).cloned())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.store.users.write().await;
        let taken = users.values().any(|other| {
            other.id != user.id
                && (other.username == user.username
                    || other.email.eq_ignore_ascii_case(&user.email))
        });
        if taken {
            return Err(RepoError::Constraint(
                "users_username_email_key".to_string(),
            ));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut users = self.store.users.write().await;
        if users.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        drop(users);

        // cascade as the foreign keys would
        self.store.profiles.write().await.retain(|_, p| p.user_id != id);
        let doomed: Vec<Uuid> = self
            .store
            .posts
            .read()
            .await
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        let mut posts = self.store.posts.write().await;
        for post_id in &doomed {
            posts.remove(post_id);
        }
        drop(posts);
        self.store
            .comments
            .write()
            .await
            .retain(|_, c| c.author_id != id && !doomed.contains(&c.post_id));
        self.store
            .likes
            .write()
            .await
            .retain(|(post_id, user_id)| *user_id != id && !doomed.contains(post_id));
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .store
            .users
            .read()
            .await
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .store
            .users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

pub struct MemoryProfileRepository {
    store: Arc<MemoryStore>,
}

impl MemoryProfileRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseRepository<Profile, Uuid> for MemoryProfileRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, RepoError> {
        Ok(self.store.profiles.read().await.get(&id).cloned())
    }

    async fn save(&self, profile: Profile) -> Result<Profile, RepoError> {
        let mut profiles = self.store.profiles.write().await;
        let taken = profiles
            .values()
            .any(|other| other.id != profile.id && other.user_id == profile.user_id);
        if taken {
            return Err(RepoError::Constraint("profiles_user_id_key".to_string()));
        }
        profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        if self.store.profiles.write().await.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for MemoryProfileRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Profile>, RepoError> {
        Ok(self
            .store
            .profiles
            .read()
            .await
            .values()
            .find(|p| p.user_id == user_id)
            .cloned())
    }
}

pub struct MemoryPostRepository {
    store: Arc<MemoryStore>,
}

impl MemoryPostRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for MemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.posts.read().await.get(&id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.store.posts.write().await;
        let taken = posts
            .values()
            .any(|other| other.id != post.id && other.slug == post.slug);
        if taken {
            return Err(RepoError::Constraint("posts_slug_key".to_string()));
        }
        posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut posts = self.store.posts.write().await;
        if posts.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        drop(posts);

        // cascade: the post's comments and like memberships go with it
        self.store.comments.write().await.retain(|_, c| c.post_id != id);
        self.store.likes.write().await.retain(|(post_id, _)| *post_id != id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        Ok(self
            .store
            .posts
            .read()
            .await
            .values()
            .find(|p| p.slug == slug)
            .cloned())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError> {
        Ok(self
            .store
            .posts
            .read()
            .await
            .values()
            .any(|p| p.slug == slug))
    }

    async fn list_recent(&self, limit: Option<u64>) -> Result<Vec<Post>, RepoError> {
        let mut posts: Vec<Post> = self.store.posts.read().await.values().cloned().collect();
        newest_first(&mut posts);
        if let Some(limit) = limit {
            posts.truncate(limit as usize);
        }
        Ok(posts)
    }

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let mut posts: Vec<Post> = self
            .store
            .posts
            .read()
            .await
            .values()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect();
        newest_first(&mut posts);
        Ok(posts)
    }

    async fn list_by_like_count(&self, limit: u64) -> Result<Vec<Post>, RepoError> {
        let likes = self.store.likes.read().await;
        let mut ranked: Vec<(u64, Post)> = self
            .store
            .posts
            .read()
            .await
            .values()
            .map(|p| {
                let count = likes.iter().filter(|(post_id, _)| *post_id == p.id).count() as u64;
                (count, p.clone())
            })
            .collect();
        ranked.sort_by(|(ca, pa), (cb, pb)| {
            cb.cmp(ca).then(pb.created_at.cmp(&pa.created_at))
        });
        Ok(ranked
            .into_iter()
            .take(limit as usize)
            .map(|(_, p)| p)
            .collect())
    }

    async fn list_by_comment_count(&self, limit: u64) -> Result<Vec<Post>, RepoError> {
        let comments = self.store.comments.read().await;
        let mut ranked: Vec<(u64, Post)> = self
            .store
            .posts
            .read()
            .await
            .values()
            .map(|p| {
                let count = comments.values().filter(|c| c.post_id == p.id).count() as u64;
                (count, p.clone())
            })
            .collect();
        ranked.sort_by(|(ca, pa), (cb, pb)| {
            cb.cmp(ca).then(pb.created_at.cmp(&pa.created_at))
        });
        Ok(ranked
            .into_iter()
            .take(limit as usize)
            .map(|(_, p)| p)
            .collect())
    }
}

pub struct MemoryCommentRepository {
    store: Arc<MemoryStore>,
}

impl MemoryCommentRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for MemoryCommentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.store.comments.read().await.get(&id).cloned())
    }

    async fn save(&self, comment: Comment) -> Result<Comment, RepoError> {
        self.store
            .comments
            .write()
            .await
            .insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        if self.store.comments.write().await.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for MemoryCommentRepository {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let mut comments: Vec<Comment> = self
            .store
            .comments
            .read()
            .await
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments)
    }
}

pub struct MemoryLikeSet {
    store: Arc<MemoryStore>,
}

impl MemoryLikeSet {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl LikeSet for MemoryLikeSet {
    async fn contains(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        Ok(self.store.likes.read().await.contains(&(post_id, user_id)))
    }

    async fn add(&self, post_id: Uuid, user_id: Uuid) -> Result<(), RepoError> {
        self.store.likes.write().await.insert((post_id, user_id));
        Ok(())
    }

    async fn remove(&self, post_id: Uuid, user_id: Uuid) -> Result<(), RepoError> {
        self.store.likes.write().await.remove(&(post_id, user_id));
        Ok(())
    }

    async fn count(&self, post_id: Uuid) -> Result<u64, RepoError> {
        Ok(self
            .store
            .likes
            .read()
            .await
            .iter()
            .filter(|(candidate, _)| *candidate == post_id)
            .count() as u64)
    }
}
