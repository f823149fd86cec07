//! Identity, credential, and routing types shared across the client.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Capability tag determining dashboard and feature access.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Doctor account.
    Doctor,
    /// Patient account.
    Patient,
}

/// Role string received from the backend was not recognized.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    /// Return the role as its lowercase wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Doctor => "doctor",
            Role::Patient => "patient",
        }
    }

    /// Parse a role from its lowercase wire string.
    ///
    /// Parsing is strict: an unrecognized role cannot be routed to a
    /// dashboard, so it is an error rather than a default.
    pub fn parse(value: &str) -> Result<Self, UnknownRole> {
        match value {
            "doctor" => Ok(Role::Doctor),
            "patient" => Ok(Role::Patient),
            other => Err(UnknownRole(other.to_string())),
        }
    }

    /// Dashboard route for this role.
    ///
    /// Single source for the role-to-route association used by both the
    /// post-auth redirect and the access guard.
    pub fn dashboard_route(&self) -> Route {
        match self {
            Role::Doctor => Route::DoctorDashboard,
            Role::Patient => Route::PatientDashboard,
        }
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Role::parse(value)
    }
}

/// Client-internal route surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Unauthenticated entry point.
    Auth,
    /// Doctor dashboard.
    DoctorDashboard,
    /// Patient dashboard.
    PatientDashboard,
    /// Wildcard fallback.
    NotFound,
}

impl Route {
    /// Resolve a path to a route. The root path redirects to auth.
    pub fn resolve(path: &str) -> Self {
        match path {
            "/" | "/auth" => Route::Auth,
            "/doctor" => Route::DoctorDashboard,
            "/patient" => Route::PatientDashboard,
            _ => Route::NotFound,
        }
    }

    /// Canonical path for the route.
    pub fn path(&self) -> &'static str {
        match self {
            Route::Auth => "/auth",
            Route::DoctorDashboard => "/doctor",
            Route::PatientDashboard => "/patient",
            Route::NotFound => "/404",
        }
    }

    /// Roles allowed to view the route, or `None` for public routes.
    pub fn required_roles(&self) -> Option<&'static [Role]> {
        match self {
            Route::DoctorDashboard => Some(&[Role::Doctor]),
            Route::PatientDashboard => Some(&[Role::Patient]),
            Route::Auth | Route::NotFound => None,
        }
    }
}

/// Authenticated user profile held for the lifetime of a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Identity {
    /// Account id issued by the backend.
    pub id: Uuid,
    /// Display name.
    pub display_name: String,
    /// Account email.
    pub email: String,
    /// Capability role.
    pub role: Role,
}

/// Opaque bearer token authorizing requests on behalf of an [`Identity`].
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token for the `Authorization` header.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens must not leak through debug logging.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::{Credential, Role, Route, UnknownRole};
    use pretty_assertions::assert_eq;

    #[test]
    fn role_parses_and_formats() {
        assert_eq!(Role::parse("doctor"), Ok(Role::Doctor));
        assert_eq!(Role::parse("patient"), Ok(Role::Patient));
        assert_eq!(Role::Doctor.as_str(), "doctor");
        assert_eq!(
            Role::parse("admin"),
            Err(UnknownRole("admin".to_string()))
        );
    }

    #[test]
    fn role_routes_are_single_sourced() {
        assert_eq!(Role::Doctor.dashboard_route(), Route::DoctorDashboard);
        assert_eq!(Role::Patient.dashboard_route(), Route::PatientDashboard);
        assert_eq!(
            Route::DoctorDashboard.required_roles(),
            Some(&[Role::Doctor][..])
        );
    }

    #[test]
    fn route_resolution_covers_the_surface() {
        assert_eq!(Route::resolve("/"), Route::Auth);
        assert_eq!(Route::resolve("/auth"), Route::Auth);
        assert_eq!(Route::resolve("/doctor"), Route::DoctorDashboard);
        assert_eq!(Route::resolve("/patient"), Route::PatientDashboard);
        assert_eq!(Route::resolve("/admin"), Route::NotFound);
        assert_eq!(Route::Auth.path(), "/auth");
    }

    #[test]
    fn credential_debug_redacts_token() {
        let credential = Credential::new("super-secret");
        assert_eq!(format!("{credential:?}"), "Credential([REDACTED])");
        assert_eq!(credential.as_str(), "super-secret");
    }
}
