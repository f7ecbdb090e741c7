//! Home feed and trending endpoints.

use actix_web::{HttpResponse, web};

use quill_shared::dto::{HomeResponse, TrendingQuery};

use crate::handlers::posts::post_response;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// How many recent posts the home feed carries.
const HOME_FEED_LIMIT: u64 = 12;

/// How many trending posts the home feed carries.
const HOME_TRENDING_LIMIT: u64 = 6;

/// GET /api/home - latest posts plus the trending list
pub async fn home(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.list_recent(Some(HOME_FEED_LIMIT)).await?;
    let trending = state.trending.trending(Some(HOME_TRENDING_LIMIT)).await?;

    Ok(HttpResponse::Ok().json(HomeResponse {
        posts: posts.iter().map(post_response).collect(),
        trending: trending.iter().map(post_response).collect(),
    }))
}

/// GET /api/trending?limit=N - popularity-ordered posts, recomputed per call
pub async fn trending(
    state: web::Data<AppState>,
    query: web::Query<TrendingQuery>,
) -> AppResult<HttpResponse> {
    let ranked = state.trending.trending(query.limit).await?;

    Ok(HttpResponse::Ok().json(ranked.iter().map(post_response).collect::<Vec<_>>()))
}
