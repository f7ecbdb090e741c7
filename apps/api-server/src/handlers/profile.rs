//! Profile and settings handlers.

use actix_web::{HttpResponse, web};

use chrono::Utc;
use quill_core::services::ProfileChanges;
use quill_shared::dto::{ProfileResponse, UpdateProfileRequest};

use crate::handlers::auth::user_response;
use crate::handlers::posts::post_response;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

async fn profile_response(state: &AppState, user_id: uuid::Uuid) -> AppResult<ProfileResponse> {
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    let profile = state.profiles.ensure_profile(user.id).await?;
    let posts = state.posts.list_by_author(user.id).await?;

    Ok(ProfileResponse {
        user: user_response(&user),
        avatar_url: profile.avatar_url,
        bio: profile.bio,
        posts: posts.iter().map(post_response).collect(),
    })
}

/// GET /api/profile - Protected route
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let body = profile_response(&state, identity.user_id).await?;

    Ok(HttpResponse::Ok().json(body))
}

/// PUT /api/profile - Protected route, updates account + presentation data
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if let Some(email) = req.email {
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::BadRequest("Invalid email address".to_string()));
        }
        if let Some(other) = state.users.find_by_email(&email).await? {
            if other.id != identity.user_id {
                return Err(AppError::Conflict("Email already registered".to_string()));
            }
        }

        let mut user = state
            .users
            .find_by_id(identity.user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;
        user.email = email.to_lowercase();
        user.updated_at = Utc::now();
        let saved = state.users.save(user).await?;

        // every user save re-establishes the profile invariant
        state.profiles.ensure_profile(saved.id).await?;
    }

    state
        .profiles
        .update(
            identity.user_id,
            ProfileChanges {
                avatar_url: req.avatar_url,
                bio: req.bio,
            },
        )
        .await?;

    let body = profile_response(&state, identity.user_id).await?;
    Ok(HttpResponse::Ok().json(body))
}
