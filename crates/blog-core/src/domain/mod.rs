//! Domain entities - the core business objects.

mod admin;
mod post;

pub use admin::Admin;
pub use post::{BlogPost, PostDraft, Section, limits};
