//! Post handlers: CRUD, likes, and comments.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::{Comment, Post};
use quill_core::services::{NewPost, PostChanges};
use quill_shared::dto::{
    CommentResponse, CreateCommentRequest, CreatePostRequest, LikeResponse, PostDetailResponse,
    PostResponse, UpdatePostRequest,
};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

pub(super) fn post_response(post: &Post) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title.clone(),
        slug: post.slug.clone(),
        url: post.canonical_path(),
        content: post.content.clone(),
        image_url: post.image_url.clone(),
        author_id: post.author_id,
        created_at: post.created_at,
    }
}

fn comment_response(comment: &Comment) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        post_id: comment.post_id,
        author_id: comment.author_id,
        content: comment.content.clone(),
        created_at: comment.created_at,
    }
}

/// Assemble the detail document: the post plus its social state.
async fn detail(
    state: &AppState,
    post: Post,
    viewer: Option<Uuid>,
) -> AppResult<PostDetailResponse> {
    let like_count = state.likes.count(post.id).await?;
    let liked = match viewer {
        Some(user_id) => Some(state.likes.contains(post.id, user_id).await?),
        None => None,
    };
    let comments = state
        .posts
        .comments_for(post.id)
        .await?
        .iter()
        .map(comment_response)
        .collect();

    Ok(PostDetailResponse {
        post: post_response(&post),
        like_count,
        liked,
        comments,
    })
}

/// GET /api/posts - all posts, newest first
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.list_recent(None).await?;

    Ok(HttpResponse::Ok().json(posts.iter().map(post_response).collect::<Vec<_>>()))
}

/// POST /api/posts - Protected route
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let post = state
        .posts
        .create(
            identity.user_id,
            NewPost {
                title: req.title,
                content: req.content,
                image_url: req.image_url,
                slug: req.slug,
            },
        )
        .await?;

    Ok(HttpResponse::Created()
        .insert_header(("Location", post.canonical_path()))
        .json(post_response(&post)))
}

/// GET /api/posts/{slug} - canonical detail route
pub async fn get_by_slug(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let post = state.posts.get_by_slug(&slug).await?;
    let body = detail(&state, post, viewer.0.map(|id| id.user_id)).await?;

    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/posts/id/{id} - fallback detail route for slugless rows
pub async fn get_by_id(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state.posts.get_by_id(path.into_inner()).await?;
    let body = detail(&state, post, viewer.0.map(|id| id.user_id)).await?;

    Ok(HttpResponse::Ok().json(body))
}

/// PUT /api/posts/id/{id} - Protected route, author only
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let post = state
        .posts
        .update(
            identity.user_id,
            path.into_inner(),
            PostChanges {
                title: req.title,
                content: req.content,
                image_url: req.image_url,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(post_response(&post)))
}

/// DELETE /api/posts/id/{id} - Protected route, author only
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.posts.delete(identity.user_id, path.into_inner()).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/posts/id/{id}/like - Protected route, toggles membership
pub async fn toggle_like(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .likes
        .toggle(path.into_inner(), identity.user_id)
        .await?;

    Ok(HttpResponse::Ok().json(LikeResponse {
        liked: outcome.liked,
        like_count: outcome.like_count,
    }))
}

/// GET /api/posts/id/{id}/comments
pub async fn list_comments(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let comments = state.posts.comments_for(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(comments.iter().map(comment_response).collect::<Vec<_>>()))
}

/// POST /api/posts/id/{id}/comments - Protected route
pub async fn add_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let comment = state
        .posts
        .add_comment(identity.user_id, path.into_inner(), body.into_inner().content)
        .await?;

    Ok(HttpResponse::Created().json(comment_response(&comment)))
}
