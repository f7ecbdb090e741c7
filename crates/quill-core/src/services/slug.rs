//! Slug assignment: derive a unique, URL-safe identifier from a post title.

use crate::error::RepoError;
use crate::ports::PostRepository;

/// Base used when a title normalizes to nothing (e.g. all punctuation).
const FALLBACK_BASE: &str = "post";

/// Normalize a title into a URL-safe base string: lowercase, runs of
/// non-alphanumeric characters collapsed to a single `-`, leading and
/// trailing separators trimmed.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    if slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Find the first free slug for `title`: the normalized base itself, then
/// `base-1`, `base-2`, ... in increasing order.
///
/// The existence probe and the eventual write are not atomic. Under
/// concurrent creation with identical titles the write can still hit the
/// unique constraint; callers treat that as a retryable collision.
pub async fn next_free_slug(
    posts: &dyn PostRepository,
    title: &str,
) -> Result<String, RepoError> {
    let base = match slugify(title) {
        s if s.is_empty() => FALLBACK_BASE.to_owned(),
        s => s,
    };

    if !posts.slug_exists(&base).await? {
        return Ok(base);
    }

    let mut n = 1u64;
    loop {
        let candidate = format!("{base}-{n}");
        if !posts.slug_exists(&candidate).await? {
            return Ok(candidate);
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_separates() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
    }

    #[test]
    fn collapses_runs_and_trims() {
        assert_eq!(slugify("  --A   B--  "), "a-b");
        assert_eq!(slugify("one...two...three"), "one-two-three");
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(slugify("Top 10 Posts of 2024"), "top-10-posts-of-2024");
    }

    #[test]
    fn all_punctuation_is_empty() {
        assert_eq!(slugify("!!! ???"), "");
        assert_eq!(slugify(""), "");
    }
}
