//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{
    CommentRepository, LikeSet, PostRepository, ProfileRepository, UserRepository,
};
use quill_core::services::{
    LikeService, PostService, ProfileService, SchemaCapabilities, TrendingService,
};
use quill_infra::database::DatabaseConnections;
use quill_infra::{
    MemoryCommentRepository, MemoryLikeSet, MemoryPostRepository, MemoryProfileRepository,
    MemoryStore, MemoryUserRepository,
};
use quill_infra::database::{
    PostgresCommentRepository, PostgresLikeSet, PostgresPostRepository, PostgresProfileRepository,
    PostgresUserRepository,
};

use crate::config::AppConfig;

/// Shared application state: the user repository plus the core services.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: PostService,
    pub trending: TrendingService,
    pub likes: LikeService,
    pub profiles: ProfileService,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        if let Some(db_config) = config.database.as_ref() {
            match DatabaseConnections::init(db_config).await {
                Ok(connections) => {
                    let db = connections.main;
                    return Self::assemble(
                        Arc::new(PostgresUserRepository::new(db.clone())),
                        Arc::new(PostgresProfileRepository::new(db.clone())),
                        Arc::new(PostgresPostRepository::new(db.clone())),
                        Arc::new(PostgresCommentRepository::new(db.clone())),
                        Arc::new(PostgresLikeSet::new(db)),
                        config.trending_default_limit,
                    );
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                }
            }
        } else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        }

        let store = MemoryStore::new();
        Self::assemble(
            Arc::new(MemoryUserRepository::new(store.clone())),
            Arc::new(MemoryProfileRepository::new(store.clone())),
            Arc::new(MemoryPostRepository::new(store.clone())),
            Arc::new(MemoryCommentRepository::new(store.clone())),
            Arc::new(MemoryLikeSet::new(store)),
            config.trending_default_limit,
        )
    }

    fn assemble(
        users: Arc<dyn UserRepository>,
        profiles: Arc<dyn ProfileRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        likes: Arc<dyn LikeSet>,
        trending_default_limit: u64,
    ) -> Self {
        // The finalized schema carries both optional relations; the ranking
        // fallback chain stays in place as the documented degrade path.
        let capabilities = SchemaCapabilities::default();

        let state = Self {
            users,
            posts: PostService::new(posts.clone(), comments),
            trending: TrendingService::new(posts.clone(), capabilities)
                .with_default_limit(trending_default_limit),
            likes: LikeService::new(posts, likes, capabilities),
            profiles: ProfileService::new(profiles),
        };
        tracing::info!("Application state initialized");
        state
    }
}
