use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use blog_core::domain::Admin;
use blog_core::error::RepoError;
use blog_core::ports::{AdminRepository, BaseRepository};

/// Admin accounts kept in memory. Emails are unique.
#[derive(Default)]
pub struct InMemoryAdminRepository {
    store: RwLock<HashMap<Uuid, Admin>>,
}

impl InMemoryAdminRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Admin, Uuid> for InMemoryAdminRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Admin>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn insert(&self, admin: Admin) -> Result<Admin, RepoError> {
        let mut store = self.store.write().await;
        if store
            .values()
            .any(|a| a.id == admin.id || a.email == admin.email)
        {
            return Err(RepoError::Constraint("Admin already exists".to_string()));
        }
        store.insert(admin.id, admin.clone());
        Ok(admin)
    }

    async fn replace(&self, admin: Admin) -> Result<Admin, RepoError> {
        let mut store = self.store.write().await;
        match store.get_mut(&admin.id) {
            Some(slot) => {
                *slot = admin.clone();
                Ok(admin)
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
impl AdminRepository for InMemoryAdminRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, RepoError> {
        Ok(self
            .store
            .read()
            .await
            .values()
            .find(|a| a.email == email)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_find_by_email() {
        let repo = InMemoryAdminRepository::new();
        let admin = Admin::new("ada@example.com".to_string(), "hash".to_string());
        repo.insert(admin.clone()).await.unwrap();

        let found = repo.find_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, admin.id);
        assert!(repo.find_by_email("bob@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let repo = InMemoryAdminRepository::new();
        repo.insert(Admin::new("ada@example.com".to_string(), "a".to_string()))
            .await
            .unwrap();

        let err = repo
            .insert(Admin::new("ada@example.com".to_string(), "b".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
    }
}
