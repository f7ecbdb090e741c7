use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use uuid::Uuid;

use quill_core::domain::{Comment, Post, User};
use quill_core::error::DomainError;
use quill_core::ports::{BaseRepository, CommentRepository, LikeSet};
use quill_core::services::{
    LikeService, NewPost, PostService, ProfileService, SchemaCapabilities, TrendingService,
};

use crate::database::memory::{
    MemoryCommentRepository, MemoryLikeSet, MemoryPostRepository, MemoryProfileRepository,
    MemoryStore, MemoryUserRepository,
};

struct Fixture {
    posts: Arc<MemoryPostRepository>,
    comments: Arc<MemoryCommentRepository>,
    likes: Arc<MemoryLikeSet>,
    profiles: Arc<MemoryProfileRepository>,
    users: Arc<MemoryUserRepository>,
}

fn fixture() -> Fixture {
    let store = MemoryStore::new();
    Fixture {
        posts: Arc::new(MemoryPostRepository::new(store.clone())),
        comments: Arc::new(MemoryCommentRepository::new(store.clone())),
        likes: Arc::new(MemoryLikeSet::new(store.clone())),
        profiles: Arc::new(MemoryProfileRepository::new(store.clone())),
        users: Arc::new(MemoryUserRepository::new(store)),
    }
}

impl Fixture {
    fn post_service(&self) -> PostService {
        PostService::new(self.posts.clone(), self.comments.clone())
    }

    fn trending_service(&self, capabilities: SchemaCapabilities) -> TrendingService {
        TrendingService::new(self.posts.clone(), capabilities)
    }

    fn like_service(&self) -> LikeService {
        LikeService::new(
            self.posts.clone(),
            self.likes.clone(),
            SchemaCapabilities::default(),
        )
    }

    fn profile_service(&self) -> ProfileService {
        ProfileService::new(self.profiles.clone())
    }

    /// Insert a post directly with a controlled creation time, bypassing
    /// slug assignment.
    async fn seed_post(&self, title: &str, slug: &str, minutes_ago: i64) -> Post {
        let mut post = Post::new(
            Uuid::new_v4(),
            title.to_string(),
            "body".to_string(),
            None,
        );
        post.slug = slug.to_string();
        post.created_at = Utc::now() - TimeDelta::minutes(minutes_ago);
        self.posts.save(post).await.unwrap()
    }

    async fn seed_likes(&self, post: &Post, n: usize) {
        for _ in 0..n {
            self.likes.add(post.id, Uuid::new_v4()).await.unwrap();
        }
    }

    async fn seed_comments(&self, post: &Post, n: usize) {
        for i in 0..n {
            self.comments
                .save(Comment::new(post.id, Uuid::new_v4(), format!("comment {i}")))
                .await
                .unwrap();
        }
    }
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
async fn identical_titles_get_suffixed_slugs() {
    let fx = fixture();
    let svc = fx.post_service();
    let author = Uuid::new_v4();

    let mut slugs = Vec::new();
    for _ in 0..4 {
        let post = svc.create(author, new_post("Hello, World!")).await.unwrap();
        slugs.push(post.slug);
    }

    assert_eq!(
        slugs,
        ["hello-world", "hello-world-1", "hello-world-2", "hello-world-3"]
    );
}

#[tokio::test]
async fn punctuation_only_title_uses_fallback_base() {
    let fx = fixture();
    let svc = fx.post_service();
    let author = Uuid::new_v4();

    let first = svc.create(author, new_post("???")).await.unwrap();
    let second = svc.create(author, new_post("!!!")).await.unwrap();

    assert_eq!(first.slug, "post");
    assert_eq!(second.slug, "post-1");
}

#[tokio::test]
async fn trending_ranks_by_likes_and_respects_limit() {
    let fx = fixture();
    let a = fx.seed_post("A", "a", 30).await;
    let b = fx.seed_post("B", "b", 20).await;
    let c = fx.seed_post("C", "c", 10).await;

    // A: 3 likes but 10 comments; B: 5 likes and none. Likes alone decide.
    fx.seed_likes(&a, 3).await;
    fx.seed_comments(&a, 10).await;
    fx.seed_likes(&b, 5).await;

    let svc = fx.trending_service(SchemaCapabilities::default());
    let top = svc.trending(Some(2)).await.unwrap();
    assert_eq!(
        top.iter().map(|p| p.slug.as_str()).collect::<Vec<_>>(),
        ["b", "a"]
    );

    // never more than the limit; fewer only when fewer posts exist
    let all = svc.trending(Some(10)).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[2].id, c.id);
}

#[tokio::test]
async fn like_tier_fully_shadows_comment_counts() {
    let fx = fixture();
    // x is older and heavily commented; y is newer with no comments
    let x = fx.seed_post("X", "x", 60).await;
    let y = fx.seed_post("Y", "y", 5).await;
    fx.seed_likes(&x, 1).await;
    fx.seed_likes(&y, 1).await;
    fx.seed_comments(&x, 5).await;

    // equal like counts resolve by recency, never by comment count
    let svc = fx.trending_service(SchemaCapabilities::default());
    let top = svc.trending(None).await.unwrap();
    assert_eq!(top[0].id, y.id);
    assert_eq!(top[1].id, x.id);
}

#[tokio::test]
async fn trending_degrades_to_comments_then_recency() {
    let fx = fixture();
    let quiet = fx.seed_post("Quiet", "quiet", 5).await;
    let busy = fx.seed_post("Busy", "busy", 60).await;
    fx.seed_comments(&busy, 3).await;

    let by_comments = fx
        .trending_service(SchemaCapabilities {
            likes: false,
            comments: true,
        })
        .trending(None)
        .await
        .unwrap();
    assert_eq!(by_comments[0].id, busy.id);

    let by_recency = fx
        .trending_service(SchemaCapabilities {
            likes: false,
            comments: false,
        })
        .trending(None)
        .await
        .unwrap();
    assert_eq!(by_recency[0].id, quiet.id);
}

#[tokio::test]
async fn toggling_twice_restores_membership() {
    let fx = fixture();
    let post = fx.seed_post("Toggle", "toggle", 1).await;
    let user = Uuid::new_v4();
    let svc = fx.like_service();

    let first = svc.toggle(post.id, user).await.unwrap();
    assert!(first.liked);
    assert_eq!(first.like_count, 1);

    let second = svc.toggle(post.id, user).await.unwrap();
    assert!(!second.liked);
    assert_eq!(second.like_count, 0);

    // an odd number of toggles flips it
    let third = svc.toggle(post.id, user).await.unwrap();
    assert!(third.liked);
    assert!(fx.likes.contains(post.id, user).await.unwrap());
}

#[tokio::test]
async fn toggle_without_like_relation_reports_configuration() {
    let fx = fixture();
    let post = fx.seed_post("No likes", "no-likes", 1).await;
    let svc = LikeService::new(
        fx.posts.clone(),
        fx.likes.clone(),
        SchemaCapabilities {
            likes: false,
            comments: true,
        },
    );

    let err = svc.toggle(post.id, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, DomainError::Configuration(_)));
}

#[tokio::test]
async fn ensure_profile_is_idempotent() {
    let fx = fixture();
    let user = fx
        .users
        .save(User::new(
            "ada".to_string(),
            "ada@example.com".to_string(),
            "hash".to_string(),
        ))
        .await
        .unwrap();

    let svc = fx.profile_service();
    let created = svc.ensure_profile(user.id).await.unwrap();
    let found = svc.ensure_profile(user.id).await.unwrap();
    assert_eq!(created.id, found.id);

    // settings update keeps the same row
    let updated = svc
        .update(
            user.id,
            quill_core::services::ProfileChanges {
                avatar_url: None,
                bio: Some("hello".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.bio.as_deref(), Some("hello"));
}

#[tokio::test]
async fn deleting_a_post_cascades() {
    let fx = fixture();
    let author = Uuid::new_v4();
    let svc = fx.post_service();
    let post = svc.create(author, new_post("Doomed")).await.unwrap();

    fx.seed_comments(&post, 4).await;
    fx.seed_likes(&post, 2).await;

    svc.delete(author, post.id).await.unwrap();

    assert!(fx.posts.find_by_id(post.id).await.unwrap().is_none());
    assert!(fx.comments.list_for_post(post.id).await.unwrap().is_empty());
    assert_eq!(fx.likes.count(post.id).await.unwrap(), 0);
}

#[tokio::test]
async fn only_the_author_may_edit_or_delete() {
    let fx = fixture();
    let author = Uuid::new_v4();
    let stranger = Uuid::new_v4();
    let svc = fx.post_service();
    let post = svc.create(author, new_post("Mine")).await.unwrap();

    let err = svc
        .update(
            stranger,
            post.id,
            quill_core::services::PostChanges {
                title: Some("Stolen".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden));

    let err = svc.delete(stranger, post.id).await.unwrap_err();
    assert!(matches!(err, DomainError::Forbidden));

    // the post is untouched
    let unchanged = fx.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(unchanged.title, "Mine");
}

#[cfg(feature = "postgres")]
mod postgres {
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use quill_core::domain::Post;
    use quill_core::ports::{BaseRepository, PostRepository};

    use crate::database::entity::post;
    use crate::database::postgres_repo::PostgresPostRepository;

    #[tokio::test]
    async fn test_find_post_by_id() {
        let post_id = Uuid::new_v4();
        let author_id = Uuid::new_v4();
        let now = chrono::Utc::now();

        // Mock the query expectation
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post::Model {
                id: post_id,
                author_id,
                title: "Test Post".to_owned(),
                slug: "test-post".to_owned(),
                content: "Content".to_owned(),
                image_url: None,
                created_at: now.into(),
            }]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

        assert!(result.is_some());
        let found = result.unwrap();
        assert_eq!(found.title, "Test Post");
        assert_eq!(found.id, post_id);
        assert_eq!(found.canonical_path(), "/posts/test-post");
    }

    #[tokio::test]
    async fn test_slug_probe_counts_rows() {
        use std::collections::BTreeMap;

        let mut row = BTreeMap::<&str, sea_orm::Value>::new();
        row.insert("num_items", 1i64.into());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![row]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        assert!(repo.slug_exists("hello-world").await.unwrap());
    }
}
