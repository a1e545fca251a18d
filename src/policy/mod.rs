//! Ownership-based authorization.
//!
//! Every mutable record has exactly one owning user, fixed when the record is
//! created. Anyone may read; only an authenticated caller may create; only the
//! owner may update or delete.

pub mod permissions;

use crate::middleware::AuthUser;
use crate::types::Action;

pub use permissions::{check_object_permissions, check_permissions, Denial, Permission, OWNER_WRITES};

/// A record with a single owning user
pub trait Owned {
    /// Id of the owning user. `None` only for a draft with no caller behind it.
    fn owner_id(&self) -> Option<i64>;
}

/// A record that has not been persisted yet. Its owner is always the caller
/// creating it, whatever the request body claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Draft {
    owner_id: Option<i64>,
}

impl Draft {
    pub fn for_caller(caller: Option<&AuthUser>) -> Self {
        Self {
            owner_id: caller.map(|user| user.id),
        }
    }
}

impl Owned for Draft {
    fn owner_id(&self) -> Option<i64> {
        self.owner_id
    }
}

/// Decide whether `caller` may perform `action` on `target`.
pub fn is_permitted(caller: Option<&AuthUser>, action: Action, target: &dyn Owned) -> bool {
    match action {
        Action::Read => true,
        Action::Create => caller.is_some(),
        Action::Update | Action::PartialUpdate | Action::Delete => match caller {
            // Never compare ownership against a missing identity
            None => false,
            Some(user) => target.owner_id() == Some(user.id),
        },
    }
}
