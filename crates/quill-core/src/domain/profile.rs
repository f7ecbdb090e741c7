use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Profile entity - per-user presentation data (avatar + bio).
///
/// Exactly one profile exists per user after the user's first save; see
/// [`crate::services::ProfileService::ensure_profile`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

impl Profile {
    /// Create an empty profile for a user.
    pub fn new(user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            avatar_url: None,
            bio: None,
        }
    }
}
