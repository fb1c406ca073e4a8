//! In-memory document store - used when no database is configured, and in tests.
//!
//! Note: Data is lost on process restart.

mod admin;
mod blog_post;

pub use admin::InMemoryAdminRepository;
pub use blog_post::InMemoryBlogPostRepository;
