use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::types::Action;

use super::{is_permitted, Owned};

/// A single check in a resource's permission chain.
///
/// `has_permission` runs before any record is loaded; `has_object_permission`
/// runs once the target record (or create draft) is known.
pub trait Permission: Send + Sync {
    fn name(&self) -> &'static str;

    fn has_permission(&self, _caller: Option<&AuthUser>, _action: Action) -> bool {
        true
    }

    fn has_object_permission(
        &self,
        _caller: Option<&AuthUser>,
        _action: Action,
        _target: &dyn Owned,
    ) -> bool {
        true
    }
}

/// Reads pass; anything else needs an authenticated caller.
pub struct IsAuthenticatedOrReadOnly;

impl Permission for IsAuthenticatedOrReadOnly {
    fn name(&self) -> &'static str {
        "IsAuthenticatedOrReadOnly"
    }

    fn has_permission(&self, caller: Option<&AuthUser>, action: Action) -> bool {
        action.is_safe() || caller.is_some()
    }
}

/// Object-level ownership check backed by the authorization policy.
pub struct IsOwnerOrReadOnly;

impl Permission for IsOwnerOrReadOnly {
    fn name(&self) -> &'static str {
        "IsOwnerOrReadOnly"
    }

    fn has_object_permission(&self, caller: Option<&AuthUser>, action: Action, target: &dyn Owned) -> bool {
        is_permitted(caller, action, target)
    }
}

/// Chain used by every owned resource: anyone reads, owners write.
pub const OWNER_WRITES: &[&dyn Permission] = &[&IsAuthenticatedOrReadOnly, &IsOwnerOrReadOnly];

/// Why a permission chain rejected the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// No caller identity was presented
    NotAuthenticated,
    /// The caller is known but not allowed
    Forbidden,
}

impl Denial {
    fn for_caller(caller: Option<&AuthUser>) -> Self {
        if caller.is_some() {
            Denial::Forbidden
        } else {
            Denial::NotAuthenticated
        }
    }
}

impl From<Denial> for ApiError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::NotAuthenticated => {
                ApiError::unauthorized("Authentication credentials were not provided.")
            }
            Denial::Forbidden => {
                ApiError::forbidden("You do not have permission to perform this action.")
            }
        }
    }
}

/// Run the collection-level checks in order, stopping at the first failure.
pub fn check_permissions(
    chain: &[&dyn Permission],
    caller: Option<&AuthUser>,
    action: Action,
) -> Result<(), Denial> {
    for permission in chain {
        if !permission.has_permission(caller, action) {
            tracing::warn!(
                permission = permission.name(),
                caller = ?caller.map(|user| user.id),
                ?action,
                "permission denied"
            );
            return Err(Denial::for_caller(caller));
        }
    }
    Ok(())
}

/// Run the object-level checks in order, stopping at the first failure.
pub fn check_object_permissions(
    chain: &[&dyn Permission],
    caller: Option<&AuthUser>,
    action: Action,
    target: &dyn Owned,
) -> Result<(), Denial> {
    for permission in chain {
        if !permission.has_object_permission(caller, action, target) {
            tracing::warn!(
                permission = permission.name(),
                caller = ?caller.map(|user| user.id),
                owner = ?target.owner_id(),
                ?action,
                "object permission denied"
            );
            return Err(Denial::for_caller(caller));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Draft;

    struct Record(i64);

    impl Owned for Record {
        fn owner_id(&self) -> Option<i64> {
            Some(self.0)
        }
    }

    struct Counting<'a>(&'a std::sync::atomic::AtomicUsize);

    impl Permission for Counting<'_> {
        fn name(&self) -> &'static str {
            "Counting"
        }

        fn has_permission(&self, _caller: Option<&AuthUser>, _action: Action) -> bool {
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            true
        }
    }

    const CHAIN: &[&dyn Permission] = OWNER_WRITES;

    fn caller(id: i64) -> AuthUser {
        AuthUser {
            id,
            email: "someone@example.com".to_string(),
            name: "Someone".to_string(),
            is_staff: false,
        }
    }

    #[test]
    fn anonymous_mutation_is_not_authenticated() {
        assert_eq!(check_permissions(CHAIN, None, Action::Delete), Err(Denial::NotAuthenticated));
        assert_eq!(check_permissions(CHAIN, None, Action::Create), Err(Denial::NotAuthenticated));
        assert_eq!(check_permissions(CHAIN, None, Action::Read), Ok(()));
    }

    #[test]
    fn non_owner_is_forbidden_at_object_level() {
        let user = caller(1);
        assert_eq!(check_permissions(CHAIN, Some(&user), Action::Update), Ok(()));
        assert_eq!(
            check_object_permissions(CHAIN, Some(&user), Action::Update, &Record(2)),
            Err(Denial::Forbidden)
        );
        assert_eq!(
            check_object_permissions(CHAIN, Some(&user), Action::Update, &Record(1)),
            Ok(())
        );
    }

    #[test]
    fn create_draft_passes_for_caller() {
        let user = caller(5);
        let draft = Draft::for_caller(Some(&user));
        assert_eq!(check_object_permissions(CHAIN, Some(&user), Action::Create, &draft), Ok(()));
    }

    #[test]
    fn chain_short_circuits() {
        let counter = std::sync::atomic::AtomicUsize::new(0);
        let counting = Counting(&counter);
        let chain: [&dyn Permission; 2] = [&IsAuthenticatedOrReadOnly, &counting];

        assert!(check_permissions(&chain, None, Action::Delete).is_err());
        assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 0);

        assert!(check_permissions(&chain, None, Action::Read).is_ok());
        assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn denials_map_to_status_codes() {
        assert_eq!(ApiError::from(Denial::NotAuthenticated).status_code(), 401);
        assert_eq!(ApiError::from(Denial::Forbidden).status_code(), 403);
    }
}
