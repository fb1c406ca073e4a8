//! Application state - shared across all handlers.

use std::sync::Arc;

use blog_core::ports::{
    AdminRepository, BlogPostRepository, PasswordService, RateLimiter, TokenService,
};
use blog_core::services::BlogService;
use blog_infra::{
    Argon2PasswordService, InMemoryAdminRepository, InMemoryBlogPostRepository, JwtTokenService,
};

#[cfg(feature = "postgres")]
use blog_infra::database::{
    DatabaseConnections, PostgresAdminRepository, PostgresBlogPostRepository,
};

use crate::config::{AppConfig, BlogSettings};

/// Which document store backs the repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Postgres,
    Memory,
}

impl StorageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKind::Postgres => "postgres",
            StorageKind::Memory => "memory",
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub admins: Arc<dyn AdminRepository>,
    pub blog: BlogService,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub rate_limiter: Option<Arc<dyn RateLimiter>>,
    pub settings: BlogSettings,
    pub storage: StorageKind,
}

type Repositories = (
    Arc<dyn AdminRepository>,
    Arc<dyn BlogPostRepository>,
    StorageKind,
);

fn in_memory_repositories() -> Repositories {
    (
        Arc::new(InMemoryAdminRepository::new()),
        Arc::new(InMemoryBlogPostRepository::new()),
        StorageKind::Memory,
    )
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        let (admins, posts, storage): Repositories = match &config.database {
            Some(db_config) => match DatabaseConnections::init(db_config).await {
                Ok(connections) => (
                    Arc::new(PostgresAdminRepository::new(connections.main.clone())),
                    Arc::new(PostgresBlogPostRepository::new(connections.main)),
                    StorageKind::Postgres,
                ),
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    in_memory_repositories()
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                in_memory_repositories()
            }
        };

        #[cfg(not(feature = "postgres"))]
        let (admins, posts, storage): Repositories = {
            tracing::info!("Running without postgres feature - using in-memory repositories");
            in_memory_repositories()
        };

        #[cfg(feature = "rate-limit")]
        let rate_limiter: Option<Arc<dyn RateLimiter>> =
            match blog_infra::InMemoryRateLimiter::new(config.rate_limit.clone()) {
                Ok(limiter) => Some(Arc::new(limiter)),
                Err(e) => {
                    tracing::error!("Rate limiting disabled: {}", e);
                    None
                }
            };

        #[cfg(not(feature = "rate-limit"))]
        let rate_limiter: Option<Arc<dyn RateLimiter>> = None;

        let state = Self::from_parts(
            admins,
            posts,
            Arc::new(JwtTokenService::new(config.jwt.clone())),
            Arc::new(Argon2PasswordService::new()),
            rate_limiter,
            config.blog.clone(),
            storage,
        );

        tracing::info!(storage = state.storage.as_str(), "Application state initialized");
        state
    }

    /// Assemble state from already-built collaborators.
    pub fn from_parts(
        admins: Arc<dyn AdminRepository>,
        posts: Arc<dyn BlogPostRepository>,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
        rate_limiter: Option<Arc<dyn RateLimiter>>,
        settings: BlogSettings,
        storage: StorageKind,
    ) -> Self {
        Self {
            admins,
            blog: BlogService::new(posts),
            tokens,
            passwords,
            rate_limiter,
            settings,
            storage,
        }
    }
}
