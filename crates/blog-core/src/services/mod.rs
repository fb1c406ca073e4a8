//! Services - request flows composing the policy rules with the repository ports.

mod blog;

pub use blog::BlogService;
