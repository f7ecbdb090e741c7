//! Profile sync: exactly one profile per user after the user's first save.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::Profile;
use crate::error::{DomainError, RepoError};
use crate::ports::ProfileRepository;

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

#[derive(Clone)]
pub struct ProfileService {
    profiles: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }

    /// Idempotent profile creation, called after every user save.
    ///
    /// First save creates the profile; later saves find the existing row and
    /// leave it untouched. Users persisted before the profile table existed
    /// get theirs the first time any save touches them.
    pub async fn ensure_profile(&self, user_id: Uuid) -> Result<Profile, DomainError> {
        if let Some(existing) = self.profiles.find_by_user_id(user_id).await? {
            return Ok(existing);
        }

        match self.profiles.save(Profile::new(user_id)).await {
            Ok(profile) => Ok(profile),
            // a concurrent ensure won the unique(user_id) race; its row stands
            Err(RepoError::Constraint(_)) => self
                .profiles
                .find_by_user_id(user_id)
                .await?
                .ok_or_else(|| DomainError::not_found("profile", user_id)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        changes: ProfileChanges,
    ) -> Result<Profile, DomainError> {
        let mut profile = self.ensure_profile(user_id).await?;
        if let Some(avatar_url) = changes.avatar_url {
            profile.avatar_url = Some(avatar_url);
        }
        if let Some(bio) = changes.bio {
            profile.bio = Some(bio);
        }
        Ok(self.profiles.save(profile).await?)
    }
}
