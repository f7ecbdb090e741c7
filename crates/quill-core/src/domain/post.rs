use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity - a published article.
///
/// The slug is empty until assignment and unique afterwards; posts are listed
/// newest-first by `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post. The slug may be empty here; it is assigned before
    /// the first save completes.
    pub fn new(author_id: Uuid, title: String, content: String, image_url: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            slug: String::new(),
            content,
            image_url,
            created_at: Utc::now(),
        }
    }

    /// Canonical path for this post: the slug route when a slug is present,
    /// the numeric-id route otherwise.
    pub fn canonical_path(&self) -> String {
        if self.slug.is_empty() {
            format!("/posts/id/{}", self.id)
        } else {
            format!("/posts/{}", self.slug)
        }
    }
}
