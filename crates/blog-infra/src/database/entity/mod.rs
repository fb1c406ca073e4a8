//! SeaORM entities for the blog tables.

pub mod admin;
pub mod blog_post;
