use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Admin, BlogPost};
use crate::error::RepoError;
use crate::policy::{Page, PageRequest};

/// Generic repository trait keyed by id.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Store a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite every field of an existing entity. Last writer wins.
    async fn replace(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Admin repository.
#[async_trait]
pub trait AdminRepository: BaseRepository<Admin, Uuid> {
    /// Find an admin by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, RepoError>;
}

/// Blog post repository.
#[async_trait]
pub trait BlogPostRepository: BaseRepository<BlogPost, Uuid> {
    /// Published posts, newest `published_at` first, ties by `id`.
    async fn find_published(&self, page: PageRequest) -> Result<Page<BlogPost>, RepoError>;

    /// Every post written by `author_id`, drafts included, most recently updated first.
    async fn find_by_author(
        &self,
        author_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<BlogPost>, RepoError>;
}
