//! Policy - the rules deciding who sees a post and who may change it.
//!
//! Everything here is pure: values in, decisions out. Callers load documents from a
//! repository first and persist the result afterwards.

mod authorization;
mod pagination;
mod publication;

pub use authorization::{DenialReason, WriteDecision, authorize_write};
pub use pagination::{Page, PageRequest, paginate, total_pages};
pub use publication::{
    PublicationState, apply_publication_transition, apply_publication_transition_at,
    is_visible_to, list_visible,
};
