//! Core services: slug assignment, trending ranking, like toggling,
//! profile sync, and post CRUD with ownership checks.

mod likes;
mod posts;
mod profiles;
mod slug;
mod trending;

pub use likes::{LikeService, LikeToggle};
pub use posts::{NewPost, PostChanges, PostService};
pub use profiles::{ProfileChanges, ProfileService};
pub use slug::{next_free_slug, slugify};
pub use trending::{DEFAULT_TRENDING_LIMIT, SchemaCapabilities, TrendingService};
