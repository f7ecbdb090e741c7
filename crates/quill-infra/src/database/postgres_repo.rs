//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, OnConflict};
use sea_orm::{
    ColumnTrait, DbConn, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Set,
};
use uuid::Uuid;

use quill_core::domain::{Comment, Post, Profile, User};
use quill_core::error::RepoError;
use quill_core::ports::{
    CommentRepository, LikeSet, PostRepository, ProfileRepository, UserRepository,
};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_like::{self, Entity as PostLikeEntity};
use super::entity::profile::{self, Entity as ProfileEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::PostgresBaseRepository;

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL profile repository.
pub type PostgresProfileRepository = PostgresBaseRepository<ProfileEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

fn query_err(e: DbErr) -> RepoError {
    RepoError::Query(e.to_string())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        // Mask email for logging to avoid PII in logs
        let masked = if let Some(at_pos) = email.find('@') {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = if local.len() > 1 {
                format!("{}***", &local[..1])
            } else {
                "***".to_string()
            };
            format!("{}{}", masked_local, domain)
        } else {
            "***".to_string()
        };
        tracing::debug!(user_email = %masked, "Finding user by email");

        let result = UserEntity::find()
            .filter(Expr::expr(Func::lower(Expr::col(user::Column::Email))).eq(email.to_lowercase()))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Profile>, RepoError> {
        let result = ProfileEntity::find()
            .filter(profile::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError> {
        let count = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .count(&self.db)
            .await
            .map_err(query_err)?;

        Ok(count > 0)
    }

    async fn list_recent(&self, limit: Option<u64>) -> Result<Vec<Post>, RepoError> {
        let mut query = PostEntity::find().order_by_desc(post::Column::CreatedAt);
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        let result = query.all(&self.db).await.map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn list_by_like_count(&self, limit: u64) -> Result<Vec<Post>, RepoError> {
        // Grouping by the primary key lets Postgres select every post column;
        // COUNT over the joined user_id skips the NULLs of unliked posts.
        let result = PostEntity::find()
            .left_join(PostLikeEntity)
            .group_by(post::Column::Id)
            .order_by_desc(post_like::Column::UserId.count())
            .order_by_desc(post::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn list_by_comment_count(&self, limit: u64) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .left_join(CommentEntity)
            .group_by(post::Column::Id)
            .order_by_desc(comment::Column::Id.count())
            .order_by_desc(post::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_desc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// PostgreSQL implementation of the like membership set.
///
/// `add` and `remove` are single-statement mutations (upsert / delete), so
/// each one is atomic on its own and concurrent toggles settle on a valid
/// state instead of erroring.
pub struct PostgresLikeSet {
    db: DbConn,
}

impl PostgresLikeSet {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LikeSet for PostgresLikeSet {
    async fn contains(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        let row = PostLikeEntity::find_by_id((post_id, user_id))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(row.is_some())
    }

    async fn add(&self, post_id: Uuid, user_id: Uuid) -> Result<(), RepoError> {
        let membership = post_like::ActiveModel {
            post_id: Set(post_id),
            user_id: Set(user_id),
        };

        match PostLikeEntity::insert(membership)
            .on_conflict(
                OnConflict::columns([post_like::Column::PostId, post_like::Column::UserId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&self.db)
            .await
        {
            Ok(_) => Ok(()),
            // the membership was already present
            Err(DbErr::RecordNotInserted) => Ok(()),
            Err(e) => Err(query_err(e)),
        }
    }

    async fn remove(&self, post_id: Uuid, user_id: Uuid) -> Result<(), RepoError> {
        PostLikeEntity::delete_by_id((post_id, user_id))
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        Ok(())
    }

    async fn count(&self, post_id: Uuid) -> Result<u64, RepoError> {
        PostLikeEntity::find()
            .filter(post_like::Column::PostId.eq(post_id))
            .count(&self.db)
            .await
            .map_err(query_err)
    }
}
