//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Select};
use uuid::Uuid;

use blog_core::domain::{Admin, BlogPost};
use blog_core::error::RepoError;
use blog_core::policy::{Page, PageRequest};
use blog_core::ports::{AdminRepository, BlogPostRepository};

use super::entity::admin::{self, Entity as AdminEntity};
use super::entity::blog_post::{self, Entity as BlogPostEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL admin repository.
pub type PostgresAdminRepository = PostgresBaseRepository<AdminEntity>;

/// PostgreSQL blog post repository.
pub type PostgresBlogPostRepository = PostgresBaseRepository<BlogPostEntity>;

/// Mask an email for logging to avoid PII in logs.
fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => match local.chars().next() {
            Some(first) if local.chars().count() > 1 => format!("{first}***@{domain}"),
            _ => format!("***@{domain}"),
        },
        None => "***".to_string(),
    }
}

#[async_trait]
impl AdminRepository for PostgresAdminRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, RepoError> {
        tracing::debug!(admin_email = %mask_email(email), "Finding admin by email");

        let result = AdminEntity::find()
            .filter(admin::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

impl PostgresBlogPostRepository {
    async fn fetch_page(
        &self,
        query: Select<BlogPostEntity>,
        request: PageRequest,
    ) -> Result<Page<BlogPost>, RepoError> {
        let paginator = query.paginate(&self.db, request.page_size());
        let total_count = paginator.num_items().await.map_err(map_db_err)?;

        // Past the end: nothing to fetch, and the offset may not fit a SQL bigint.
        if request.offset() >= total_count {
            return Ok(Page::from_parts(Vec::new(), total_count, request));
        }

        let models = paginator
            .fetch_page(request.page() - 1)
            .await
            .map_err(map_db_err)?;

        Ok(Page::from_parts(
            models.into_iter().map(Into::into).collect(),
            total_count,
            request,
        ))
    }
}

#[async_trait]
impl BlogPostRepository for PostgresBlogPostRepository {
    async fn find_published(&self, page: PageRequest) -> Result<Page<BlogPost>, RepoError> {
        let query = BlogPostEntity::find()
            .filter(blog_post::Column::IsPublished.eq(true))
            .order_by_desc(blog_post::Column::PublishedAt)
            .order_by_asc(blog_post::Column::Id);

        self.fetch_page(query, page).await
    }

    async fn find_by_author(
        &self,
        author_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<BlogPost>, RepoError> {
        let query = BlogPostEntity::find()
            .filter(blog_post::Column::AuthorId.eq(author_id))
            .order_by_desc(blog_post::Column::UpdatedAt)
            .order_by_asc(blog_post::Column::Id);

        self.fetch_page(query, page).await
    }
}
