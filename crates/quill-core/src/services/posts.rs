//! Post CRUD with slug assignment and ownership checks.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Comment, Post};
use crate::error::{DomainError, RepoError};
use crate::ports::{CommentRepository, PostRepository};

use super::slug::next_free_slug;

/// How many times a save retries after losing the slug probe/write race.
const SLUG_RETRY_LIMIT: u32 = 3;

/// Input for creating a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    /// An explicitly supplied slug is preserved verbatim; uniqueness is then
    /// left to the database constraint.
    pub slug: Option<String>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, comments: Arc<dyn CommentRepository>) -> Self {
        Self { posts, comments }
    }

    pub async fn create(&self, author_id: Uuid, input: NewPost) -> Result<Post, DomainError> {
        if input.title.trim().is_empty() {
            return Err(DomainError::Validation("title must not be empty".into()));
        }
        if input.content.trim().is_empty() {
            return Err(DomainError::Validation("content must not be empty".into()));
        }

        let mut post = Post::new(author_id, input.title, input.content, input.image_url);
        if let Some(slug) = input.slug.filter(|s| !s.is_empty()) {
            post.slug = slug;
        }
        self.save_with_slug(post).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", id))
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Post, DomainError> {
        self.posts
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("post", slug))
    }

    /// Author-only partial update. The slug is never regenerated from a
    /// changed title; rows that predate slugs get one on their next save.
    pub async fn update(
        &self,
        actor: Uuid,
        post_id: Uuid,
        changes: PostChanges,
    ) -> Result<Post, DomainError> {
        let mut post = self.get_by_id(post_id).await?;
        if post.author_id != actor {
            return Err(DomainError::Forbidden);
        }

        if let Some(title) = changes.title {
            if title.trim().is_empty() {
                return Err(DomainError::Validation("title must not be empty".into()));
            }
            post.title = title;
        }
        if let Some(content) = changes.content {
            post.content = content;
        }
        if let Some(image_url) = changes.image_url {
            post.image_url = Some(image_url);
        }

        self.save_with_slug(post).await
    }

    /// Author-only delete. Comments and like-set memberships go with the
    /// post.
    pub async fn delete(&self, actor: Uuid, post_id: Uuid) -> Result<(), DomainError> {
        let post = self.get_by_id(post_id).await?;
        if post.author_id != actor {
            return Err(DomainError::Forbidden);
        }
        self.posts.delete(post.id).await?;
        Ok(())
    }

    pub async fn list_recent(&self, limit: Option<u64>) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.list_recent(limit).await?)
    }

    pub async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.list_by_author(author_id).await?)
    }

    pub async fn add_comment(
        &self,
        actor: Uuid,
        post_id: Uuid,
        content: String,
    ) -> Result<Comment, DomainError> {
        if content.trim().is_empty() {
            return Err(DomainError::Validation("comment must not be empty".into()));
        }
        let post = self.get_by_id(post_id).await?;
        Ok(self
            .comments
            .save(Comment::new(post.id, actor, content))
            .await?)
    }

    pub async fn comments_for(&self, post_id: Uuid) -> Result<Vec<Comment>, DomainError> {
        let post = self.get_by_id(post_id).await?;
        Ok(self.comments.list_for_post(post.id).await?)
    }

    /// Save a post, assigning a slug first when the current one is empty.
    ///
    /// Assignment happens exactly once per post: a non-empty slug is written
    /// through unchanged. When a generated slug loses the probe/write race
    /// the save re-probes and retries a bounded number of times before
    /// surfacing [`DomainError::DuplicateSlug`].
    async fn save_with_slug(&self, mut post: Post) -> Result<Post, DomainError> {
        if !post.slug.is_empty() {
            let slug = post.slug.clone();
            return self.posts.save(post).await.map_err(|e| match e {
                RepoError::Constraint(_) => DomainError::DuplicateSlug(slug),
                other => other.into(),
            });
        }

        let mut last_candidate = String::new();
        for _ in 0..SLUG_RETRY_LIMIT {
            post.slug = next_free_slug(self.posts.as_ref(), &post.title).await?;
            last_candidate.clone_from(&post.slug);
            match self.posts.save(post.clone()).await {
                Ok(saved) => return Ok(saved),
                // lost the race to a concurrent writer; probe again
                Err(RepoError::Constraint(_)) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(DomainError::DuplicateSlug(last_candidate))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::ports::BaseRepository;

    /// Post store that pretends every probe is free but rejects the first
    /// `failures` writes with a constraint violation, like a concurrent
    /// writer slipping in between probe and save.
    struct RacyPosts {
        failures: Mutex<u32>,
    }

    impl RacyPosts {
        fn failing(failures: u32) -> Arc<Self> {
            Arc::new(Self {
                failures: Mutex::new(failures),
            })
        }
    }

    #[async_trait]
    impl BaseRepository<Post, Uuid> for RacyPosts {
        async fn find_by_id(&self, _id: Uuid) -> Result<Option<Post>, RepoError> {
            Ok(None)
        }

        async fn save(&self, post: Post) -> Result<Post, RepoError> {
            let mut failures = self.failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(RepoError::Constraint("posts_slug_key".into()));
            }
            Ok(post)
        }

        async fn delete(&self, _id: Uuid) -> Result<(), RepoError> {
            Ok(())
        }
    }

    #[async_trait]
    impl PostRepository for RacyPosts {
        async fn find_by_slug(&self, _slug: &str) -> Result<Option<Post>, RepoError> {
            Ok(None)
        }

        async fn slug_exists(&self, _slug: &str) -> Result<bool, RepoError> {
            Ok(false)
        }

        async fn list_recent(&self, _limit: Option<u64>) -> Result<Vec<Post>, RepoError> {
            Ok(Vec::new())
        }

        async fn list_by_author(&self, _author_id: Uuid) -> Result<Vec<Post>, RepoError> {
            Ok(Vec::new())
        }

        async fn list_by_like_count(&self, _limit: u64) -> Result<Vec<Post>, RepoError> {
            Ok(Vec::new())
        }

        async fn list_by_comment_count(&self, _limit: u64) -> Result<Vec<Post>, RepoError> {
            Ok(Vec::new())
        }
    }

    struct NoComments;

    #[async_trait]
    impl BaseRepository<Comment, Uuid> for NoComments {
        async fn find_by_id(&self, _id: Uuid) -> Result<Option<Comment>, RepoError> {
            Ok(None)
        }

        async fn save(&self, comment: Comment) -> Result<Comment, RepoError> {
            Ok(comment)
        }

        async fn delete(&self, _id: Uuid) -> Result<(), RepoError> {
            Ok(())
        }
    }

    #[async_trait]
    impl CommentRepository for NoComments {
        async fn list_for_post(&self, _post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
            Ok(Vec::new())
        }
    }

    fn service(posts: Arc<RacyPosts>) -> PostService {
        PostService::new(posts, Arc::new(NoComments))
    }

    fn new_post(title: &str) -> NewPost {
        NewPost {
            title: title.to_string(),
            content: "body".to_string(),
            image_url: None,
            slug: None,
        }
    }

    #[tokio::test]
    async fn explicit_slug_is_preserved_verbatim() {
        let svc = service(RacyPosts::failing(0));
        let input = NewPost {
            slug: Some("Custom-SLUG".to_string()),
            ..new_post("Hello, World!")
        };

        let post = svc.create(Uuid::new_v4(), input).await.unwrap();
        assert_eq!(post.slug, "Custom-SLUG");
    }

    #[tokio::test]
    async fn generated_slug_comes_from_title() {
        let svc = service(RacyPosts::failing(0));

        let post = svc
            .create(Uuid::new_v4(), new_post("Hello, World!"))
            .await
            .unwrap();
        assert_eq!(post.slug, "hello-world");
        assert_eq!(post.canonical_path(), "/posts/hello-world");
    }

    #[tokio::test]
    async fn lost_race_is_retried() {
        let svc = service(RacyPosts::failing(2));

        let post = svc
            .create(Uuid::new_v4(), new_post("Hello, World!"))
            .await
            .unwrap();
        assert_eq!(post.slug, "hello-world");
    }

    #[tokio::test]
    async fn retries_are_bounded() {
        let svc = service(RacyPosts::failing(u32::MAX));

        let err = svc
            .create(Uuid::new_v4(), new_post("Hello, World!"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateSlug(_)));
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let svc = service(RacyPosts::failing(0));

        let err = svc
            .create(Uuid::new_v4(), new_post("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
