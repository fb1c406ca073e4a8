use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::BlogPost;

/// Why a write was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DenialReason {
    /// No caller identity, or the credential did not validate.
    Unauthenticated,
    /// The caller is authenticated but did not author the post.
    NotOwner,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialReason::Unauthenticated => write!(f, "authentication required"),
            DenialReason::NotOwner => write!(f, "only the author may modify this post"),
        }
    }
}

/// Outcome of [`authorize_write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteDecision {
    Allowed,
    Denied(DenialReason),
}

impl WriteDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, WriteDecision::Allowed)
    }
}

/// Decide whether `caller` may update, delete or (un)publish `post`.
///
/// Must be evaluated on every write against the freshly loaded post.
pub fn authorize_write(post: &BlogPost, caller: Option<Uuid>) -> WriteDecision {
    match caller {
        None => WriteDecision::Denied(DenialReason::Unauthenticated),
        Some(id) if id != post.author_id => WriteDecision::Denied(DenialReason::NotOwner),
        Some(_) => WriteDecision::Allowed,
    }
}
