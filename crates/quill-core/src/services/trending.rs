//! Trending ranking: a popularity-ordered, read-only view of posts.

use std::sync::Arc;

use crate::domain::Post;
use crate::error::DomainError;
use crate::ports::PostRepository;

/// Number of posts returned when the caller supplies no limit.
pub const DEFAULT_TRENDING_LIMIT: u64 = 5;

/// Which optional relations the active schema carries.
///
/// Resolved once at startup and handed to the services; ranking and toggling
/// never probe the schema per call.
#[derive(Debug, Clone, Copy)]
pub struct SchemaCapabilities {
    pub likes: bool,
    pub comments: bool,
}

impl Default for SchemaCapabilities {
    /// The finalized schema carries both relations.
    fn default() -> Self {
        Self {
            likes: true,
            comments: true,
        }
    }
}

#[derive(Clone)]
pub struct TrendingService {
    posts: Arc<dyn PostRepository>,
    capabilities: SchemaCapabilities,
    default_limit: u64,
}

impl TrendingService {
    pub fn new(posts: Arc<dyn PostRepository>, capabilities: SchemaCapabilities) -> Self {
        Self {
            posts,
            capabilities,
            default_limit: DEFAULT_TRENDING_LIMIT,
        }
    }

    pub fn with_default_limit(mut self, limit: u64) -> Self {
        self.default_limit = limit;
        self
    }

    /// Up to `limit` posts, most popular first.
    ///
    /// Exactly one ranking tier is used per call: like counts when the like
    /// relation is present, else comment counts, else recency. The lower
    /// tiers are the documented degrade path for schemas without the like
    /// relation. Within a tier, ties resolve by descending creation time.
    pub async fn trending(&self, limit: Option<u64>) -> Result<Vec<Post>, DomainError> {
        let limit = limit.unwrap_or(self.default_limit);

        let ranked = if self.capabilities.likes {
            self.posts.list_by_like_count(limit).await?
        } else if self.capabilities.comments {
            self.posts.list_by_comment_count(limit).await?
        } else {
            self.posts.list_recent(Some(limit)).await?
        };
        Ok(ranked)
    }
}
