use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use blog_core::domain::BlogPost;
use blog_core::error::RepoError;
use blog_core::policy::{Page, PageRequest, list_visible, paginate};
use blog_core::ports::{BaseRepository, BlogPostRepository};

/// Blog posts kept in a `HashMap` behind an async `RwLock`.
///
/// A replace swaps the whole document under the write lock, so readers never observe a
/// half-updated section list.
#[derive(Default)]
pub struct InMemoryBlogPostRepository {
    store: RwLock<HashMap<Uuid, BlogPost>>,
}

impl InMemoryBlogPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<BlogPost, Uuid> for InMemoryBlogPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<BlogPost>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn insert(&self, post: BlogPost) -> Result<BlogPost, RepoError> {
        let mut store = self.store.write().await;
        if store.contains_key(&post.id) {
            return Err(RepoError::Constraint(format!(
                "blog post {} already exists",
                post.id
            )));
        }
        store.insert(post.id, post.clone());
        Ok(post)
    }

    async fn replace(&self, post: BlogPost) -> Result<BlogPost, RepoError> {
        let mut store = self.store.write().await;
        match store.get_mut(&post.id) {
            Some(slot) => {
                *slot = post.clone();
                Ok(post)
            }
            None => Err(RepoError::NotFound),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.store.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl BlogPostRepository for InMemoryBlogPostRepository {
    async fn find_published(&self, page: PageRequest) -> Result<Page<BlogPost>, RepoError> {
        let posts: Vec<BlogPost> = self.store.read().await.values().cloned().collect();
        Ok(list_visible(posts, page))
    }

    async fn find_by_author(
        &self,
        author_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<BlogPost>, RepoError> {
        let mut posts: Vec<BlogPost> = self
            .store
            .read()
            .await
            .values()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        Ok(paginate(posts, page))
    }
}

#[cfg(test)]
mod tests {
    use blog_core::domain::{PostDraft, Section};
    use blog_core::policy::apply_publication_transition;

    use super::*;

    fn post_by(author: Uuid, title: &str) -> BlogPost {
        let draft = PostDraft::new(title, "Intro", vec![Section::new("H", "C")]).unwrap();
        BlogPost::new(author, draft)
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = InMemoryBlogPostRepository::new();
        let post = post_by(Uuid::new_v4(), "First");

        repo.insert(post.clone()).await.unwrap();

        assert_eq!(repo.find_by_id(post.id).await.unwrap(), Some(post));
    }

    #[tokio::test]
    async fn test_insert_twice_is_a_constraint_violation() {
        let repo = InMemoryBlogPostRepository::new();
        let post = post_by(Uuid::new_v4(), "First");

        repo.insert(post.clone()).await.unwrap();
        let err = repo.insert(post).await.unwrap_err();

        assert!(matches!(err, RepoError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_replace_and_delete_unknown_id() {
        let repo = InMemoryBlogPostRepository::new();
        let post = post_by(Uuid::new_v4(), "Ghost");

        assert!(matches!(repo.replace(post.clone()).await, Err(RepoError::NotFound)));
        assert!(matches!(repo.delete(post.id).await, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_find_published_skips_drafts() {
        let repo = InMemoryBlogPostRepository::new();
        let author = Uuid::new_v4();

        let mut published = post_by(author, "Live");
        apply_publication_transition(&mut published, true);
        repo.insert(published.clone()).await.unwrap();
        repo.insert(post_by(author, "Draft")).await.unwrap();

        let page = repo
            .find_published(PageRequest::new(1, 6).unwrap())
            .await
            .unwrap();

        assert_eq!(page.total_count, 1);
        assert_eq!(page.items, vec![published]);
    }

    #[tokio::test]
    async fn test_find_by_author_includes_drafts_of_that_author_only() {
        let repo = InMemoryBlogPostRepository::new();
        let author = Uuid::new_v4();

        repo.insert(post_by(author, "Mine")).await.unwrap();
        repo.insert(post_by(Uuid::new_v4(), "Theirs")).await.unwrap();

        let page = repo
            .find_by_author(author, PageRequest::new(1, 6).unwrap())
            .await
            .unwrap();

        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].title, "Mine");
    }
}
