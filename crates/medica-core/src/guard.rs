//! Access guard gating protected views by required role.

use crate::identity::{Identity, Role};
use log::warn;

/// Decision returned by [`authorize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// The protected view may render.
    Allow,
    /// The caller must be redirected to the unauthenticated entry point.
    RedirectToAuth,
}

/// Decide whether the current user may view a resource gated by
/// `required_roles`.
///
/// Pure function of its inputs; callers re-evaluate it on every render
/// rather than caching the decision, because session state can change
/// between renders. An empty role set is a configuration error and denies.
pub fn authorize(required_roles: &[Role], current_user: Option<&Identity>) -> AccessDecision {
    if required_roles.is_empty() {
        warn!("authorize called with an empty role set; denying");
        return AccessDecision::RedirectToAuth;
    }
    let Some(user) = current_user else {
        return AccessDecision::RedirectToAuth;
    };
    if required_roles.contains(&user.role) {
        AccessDecision::Allow
    } else {
        AccessDecision::RedirectToAuth
    }
}

#[cfg(test)]
mod tests {
    use super::{AccessDecision, authorize};
    use crate::identity::{Identity, Role};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn identity(role: Role) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            display_name: "Test".to_string(),
            email: "test@example.com".to_string(),
            role,
        }
    }

    #[test]
    fn absent_user_redirects() {
        assert_eq!(
            authorize(&[Role::Doctor], None),
            AccessDecision::RedirectToAuth
        );
    }

    #[test]
    fn matching_role_allows() {
        let user = identity(Role::Doctor);
        assert_eq!(
            authorize(&[Role::Doctor], Some(&user)),
            AccessDecision::Allow
        );
    }

    #[test]
    fn wrong_role_redirects() {
        let user = identity(Role::Patient);
        assert_eq!(
            authorize(&[Role::Doctor], Some(&user)),
            AccessDecision::RedirectToAuth
        );
    }

    #[test]
    fn empty_role_set_fails_closed() {
        let user = identity(Role::Doctor);
        assert_eq!(authorize(&[], Some(&user)), AccessDecision::RedirectToAuth);
        assert_eq!(authorize(&[], None), AccessDecision::RedirectToAuth);
    }

    #[test]
    fn multiple_roles_accept_any_member() {
        let user = identity(Role::Patient);
        assert_eq!(
            authorize(&[Role::Doctor, Role::Patient], Some(&user)),
            AccessDecision::Allow
        );
    }
}
