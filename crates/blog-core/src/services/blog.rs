use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{BlogPost, PostDraft};
use crate::error::{DomainError, RepoError};
use crate::policy::{
    DenialReason, Page, PageRequest, WriteDecision, apply_publication_transition,
    authorize_write, is_visible_to,
};
use crate::ports::BlogPostRepository;

/// Read and write flows for blog posts.
///
/// Reads filter through the visibility rule; a post the caller may not see is reported as
/// [`DomainError::NotFound`], the same as an unknown id. Writes require an identity, load
/// the current document and check ownership before anything is persisted.
#[derive(Clone)]
pub struct BlogService {
    posts: Arc<dyn BlogPostRepository>,
}

impl BlogService {
    pub fn new(posts: Arc<dyn BlogPostRepository>) -> Self {
        Self { posts }
    }

    /// Public listing of published posts.
    pub async fn list_published(&self, page: PageRequest) -> Result<Page<BlogPost>, DomainError> {
        Ok(self.posts.find_published(page).await?)
    }

    /// The author's own posts, drafts included.
    pub async fn list_authored(
        &self,
        author_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<BlogPost>, DomainError> {
        Ok(self.posts.find_by_author(author_id, page).await?)
    }

    /// A single post, if `caller` may see it.
    pub async fn get_visible(
        &self,
        id: Uuid,
        caller: Option<Uuid>,
    ) -> Result<BlogPost, DomainError> {
        match self.posts.find_by_id(id).await? {
            Some(post) if is_visible_to(&post, caller) => Ok(post),
            _ => Err(DomainError::post_not_found(id)),
        }
    }

    /// Create a post owned by `author_id`, optionally publishing it straight away.
    pub async fn create(
        &self,
        author_id: Uuid,
        draft: PostDraft,
        publish: bool,
    ) -> Result<BlogPost, DomainError> {
        let mut post = BlogPost::new(author_id, draft);
        if publish {
            apply_publication_transition(&mut post, true);
        }

        let post = self.posts.insert(post).await?;
        tracing::info!(
            post_id = %post.id,
            author_id = %post.author_id,
            is_published = post.is_published,
            "Blog post created"
        );
        Ok(post)
    }

    /// Replace a post's content and, when `publish` is given, its publication flag.
    pub async fn update(
        &self,
        id: Uuid,
        caller: Option<Uuid>,
        draft: PostDraft,
        publish: Option<bool>,
    ) -> Result<BlogPost, DomainError> {
        let mut post = self.load_for_write(id, caller).await?;
        post.replace_content(draft);
        let changed =
            publish.is_some_and(|publish| apply_publication_transition(&mut post, publish));

        let post = self.persist(post).await?;
        tracing::info!(post_id = %post.id, "Blog post updated");
        Self::log_transition(&post, changed);
        Ok(post)
    }

    /// Publish or unpublish a post.
    pub async fn set_published(
        &self,
        id: Uuid,
        caller: Option<Uuid>,
        publish: bool,
    ) -> Result<BlogPost, DomainError> {
        let mut post = self.load_for_write(id, caller).await?;
        if !apply_publication_transition(&mut post, publish) {
            return Ok(post);
        }

        let post = self.persist(post).await?;
        Self::log_transition(&post, true);
        Ok(post)
    }

    /// Permanently remove a post.
    pub async fn delete(&self, id: Uuid, caller: Option<Uuid>) -> Result<(), DomainError> {
        let post = self.load_for_write(id, caller).await?;
        match self.posts.delete(post.id).await {
            Ok(()) => {
                tracing::info!(post_id = %id, "Blog post deleted");
                Ok(())
            }
            Err(RepoError::NotFound) => Err(DomainError::post_not_found(id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn load_for_write(
        &self,
        id: Uuid,
        caller: Option<Uuid>,
    ) -> Result<BlogPost, DomainError> {
        if caller.is_none() {
            return Err(DomainError::WriteDenied(DenialReason::Unauthenticated));
        }

        let post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(id))?;

        match authorize_write(&post, caller) {
            WriteDecision::Allowed => Ok(post),
            WriteDecision::Denied(reason) => {
                tracing::warn!(post_id = %id, ?caller, %reason, "Write denied");
                Err(DomainError::WriteDenied(reason))
            }
        }
    }

    async fn persist(&self, post: BlogPost) -> Result<BlogPost, DomainError> {
        let id = post.id;
        self.posts.replace(post).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::post_not_found(id),
            other => other.into(),
        })
    }

    fn log_transition(post: &BlogPost, changed: bool) {
        if changed {
            tracing::info!(
                post_id = %post.id,
                is_published = post.is_published,
                published_at = ?post.published_at,
                "Publication state changed"
            );
        }
    }
}
