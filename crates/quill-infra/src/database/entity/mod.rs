//! SeaORM entity definitions for the relational schema.

pub mod comment;
pub mod post;
pub mod post_like;
pub mod profile;
pub mod user;
