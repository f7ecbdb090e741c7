//! Like toggling over the explicit membership set.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::DomainError;
use crate::ports::{LikeSet, PostRepository};

use super::trending::SchemaCapabilities;

/// Outcome of a toggle: the new membership state and the new count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeToggle {
    pub liked: bool,
    pub like_count: u64,
}

#[derive(Clone)]
pub struct LikeService {
    posts: Arc<dyn PostRepository>,
    likes: Arc<dyn LikeSet>,
    capabilities: SchemaCapabilities,
}

impl LikeService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        likes: Arc<dyn LikeSet>,
        capabilities: SchemaCapabilities,
    ) -> Self {
        Self {
            posts,
            likes,
            capabilities,
        }
    }

    /// Flip the user's membership in the post's like-set.
    ///
    /// Exactly one membership change per call; two rapid calls toggle twice.
    /// No entity other than the like-set is touched, so the new state is
    /// visible to the next trending computation immediately.
    pub async fn toggle(&self, post_id: Uuid, user_id: Uuid) -> Result<LikeToggle, DomainError> {
        if !self.capabilities.likes {
            return Err(DomainError::Configuration("like relation"));
        }

        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))?;

        let liked = if self.likes.contains(post.id, user_id).await? {
            self.likes.remove(post.id, user_id).await?;
            false
        } else {
            self.likes.add(post.id, user_id).await?;
            true
        };
        let like_count = self.likes.count(post.id).await?;

        Ok(LikeToggle { liked, like_count })
    }

    pub async fn count(&self, post_id: Uuid) -> Result<u64, DomainError> {
        Ok(self.likes.count(post_id).await?)
    }

    pub async fn contains(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, DomainError> {
        Ok(self.likes.contains(post_id, user_id).await?)
    }
}
