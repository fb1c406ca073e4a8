//! # Blog Shared
//!
//! Request and response types of the blog REST API.
//! Kept free of domain dependencies so a client (e.g. a WASM dashboard) can compile it.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
