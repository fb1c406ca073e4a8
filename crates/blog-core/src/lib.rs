//! # Blog Core
//!
//! The domain layer of the Quill blog.
//! Blog posts, the publication state model and the ownership rules for writes live here,
//! with no infrastructure dependencies. Storage and credentials are reached through `ports`.

pub mod domain;
pub mod error;
pub mod policy;
pub mod ports;
pub mod services;

pub use error::DomainError;
