use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::pagination::{Page, PageRequest, paginate};
use crate::domain::BlogPost;

/// Whether `caller` may receive `post` in a read response.
///
/// Authors always see their own posts. Everyone else, signed in or not, sees published
/// posts only. A `false` here must be reported to the caller exactly like a missing id.
pub fn is_visible_to(post: &BlogPost, caller: Option<Uuid>) -> bool {
    caller == Some(post.author_id) || post.is_published
}

/// Set the publication flag, stamping `published_at` on the first publish only.
///
/// Returns whether `is_published` changed.
pub fn apply_publication_transition(post: &mut BlogPost, requested: bool) -> bool {
    apply_publication_transition_at(post, requested, Utc::now())
}

/// [`apply_publication_transition`] with an explicit clock reading.
pub fn apply_publication_transition_at(
    post: &mut BlogPost,
    requested: bool,
    now: DateTime<Utc>,
) -> bool {
    let changed = post.is_published != requested;
    post.is_published = requested;
    if requested && post.published_at.is_none() {
        post.published_at = Some(now);
    }
    if changed {
        post.updated_at = now;
    }
    changed
}

/// Published posts, most recently first-published first, cut to the requested page.
pub fn list_visible<I>(posts: I, request: PageRequest) -> Page<BlogPost>
where
    I: IntoIterator<Item = BlogPost>,
{
    let mut published: Vec<BlogPost> = posts.into_iter().filter(|p| p.is_published).collect();
    published.sort_by(recency);
    paginate(published, request)
}

/// `published_at` descending, then `id` ascending.
fn recency(a: &BlogPost, b: &BlogPost) -> Ordering {
    b.published_at
        .cmp(&a.published_at)
        .then_with(|| a.id.cmp(&b.id))
}

/// Lifecycle of a post's publication.
///
/// `Draft` has never been published. `PublishedFirstTime` and `Republished` both carry the
/// original `published_at`; `Unpublished` keeps it too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicationState {
    Draft,
    PublishedFirstTime,
    Unpublished,
    Republished,
}

impl PublicationState {
    /// The state reached by requesting `publish`. Requesting the current value is a no-op.
    pub fn next(self, publish: bool) -> Self {
        use PublicationState::*;
        match (self, publish) {
            (Draft, true) => PublishedFirstTime,
            (PublishedFirstTime | Republished, false) => Unpublished,
            (Unpublished, true) => Republished,
            (state, _) => state,
        }
    }

    pub fn is_published(self) -> bool {
        matches!(
            self,
            PublicationState::PublishedFirstTime | PublicationState::Republished
        )
    }

    pub fn has_first_publish_marker(self) -> bool {
        self != PublicationState::Draft
    }
}
