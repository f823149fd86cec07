//! Session store: single source of truth for the authenticated identity.

mod persist;

pub use persist::{SessionDocument, SessionError, SessionFile, SessionPersistence};

use crate::identity::{Credential, Identity};
use log::{info, warn};
use parking_lot::RwLock;
use std::sync::Arc;

/// Process-wide store for the current identity and credential.
///
/// Clones share state, so every component reading session state observes
/// a mutation immediately. The identity/credential pair is held and
/// persisted atomically: there is never a credential without an identity.
#[derive(Clone)]
pub struct SessionStore {
    session: Arc<RwLock<Option<SessionDocument>>>,
    persistence: Option<Arc<dyn SessionPersistence>>,
}

impl SessionStore {
    /// Create a store with no durable backing; state lives for the
    /// process only.
    pub fn in_memory() -> Self {
        Self {
            session: Arc::new(RwLock::new(None)),
            persistence: None,
        }
    }

    /// Open a store backed by durable persistence, restoring any
    /// previously stored session.
    ///
    /// An unreadable or partial document restores as unauthenticated; it
    /// is never allowed to produce a half-session.
    pub fn open(persistence: Arc<dyn SessionPersistence>) -> Self {
        let restored = match persistence.load() {
            Ok(document) => document,
            Err(err) => {
                warn!("discarding unreadable session document (error={err})");
                None
            }
        };
        if let Some(document) = &restored {
            info!(
                "session restored (user_id={}, role={})",
                document.identity.id,
                document.identity.role.as_str()
            );
        }
        Self {
            session: Arc::new(RwLock::new(restored)),
            persistence: Some(persistence),
        }
    }

    /// Store identity and credential atomically, overwriting any prior
    /// session.
    ///
    /// The in-memory state always commits; the returned error reports a
    /// failed persistence write only.
    pub fn login(&self, identity: Identity, credential: Credential) -> Result<(), SessionError> {
        info!(
            "session established (user_id={}, role={})",
            identity.id,
            identity.role.as_str()
        );
        let document = SessionDocument {
            identity,
            credential,
        };
        *self.session.write() = Some(document.clone());
        if let Some(persistence) = &self.persistence {
            persistence.save(&document)?;
        }
        Ok(())
    }

    /// Clear identity and credential unconditionally. Idempotent.
    pub fn logout(&self) -> Result<(), SessionError> {
        let had_session = self.session.write().take().is_some();
        if had_session {
            info!("session cleared");
        }
        if let Some(persistence) = &self.persistence {
            persistence.clear()?;
        }
        Ok(())
    }

    /// The active identity, or `None` when unauthenticated.
    pub fn current_user(&self) -> Option<Identity> {
        self.session
            .read()
            .as_ref()
            .map(|document| document.identity.clone())
    }

    /// The token to attach to outbound requests, or `None`.
    pub fn current_credential(&self) -> Option<Credential> {
        self.session
            .read()
            .as_ref()
            .map(|document| document.credential.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::{SessionFile, SessionStore};
    use crate::identity::{Credential, Identity, Role};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::tempdir;
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
    fn current_user_tracks_most_recent_login() {
        let store = SessionStore::in_memory();
        assert_eq!(store.current_user(), None);
        assert_eq!(store.current_credential(), None);

        let first = identity(Role::Doctor);
        store
            .login(first.clone(), Credential::new("a"))
            .expect("login");
        assert_eq!(store.current_user(), Some(first));

        let second = identity(Role::Patient);
        store
            .login(second.clone(), Credential::new("b"))
            .expect("login overwrites");
        assert_eq!(store.current_user(), Some(second));
        assert_eq!(store.current_credential(), Some(Credential::new("b")));

        store.logout().expect("logout");
        assert_eq!(store.current_user(), None);
        assert_eq!(store.current_credential(), None);
        store.logout().expect("logout is idempotent");
    }

    #[test]
    fn clones_observe_mutations() {
        let store = SessionStore::in_memory();
        let reader = store.clone();
        store
            .login(identity(Role::Doctor), Credential::new("tok"))
            .expect("login");
        assert!(reader.current_user().is_some());
        reader.logout().expect("logout");
        assert_eq!(store.current_user(), None);
    }

    #[test]
    fn open_restores_persisted_session() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("session.json");

        let store = SessionStore::open(Arc::new(SessionFile::new(&path)));
        assert_eq!(store.current_user(), None);

        let user = identity(Role::Doctor);
        store
            .login(user.clone(), Credential::new("tok"))
            .expect("login");

        let restored = SessionStore::open(Arc::new(SessionFile::new(&path)));
        assert_eq!(restored.current_user(), Some(user));
        assert_eq!(restored.current_credential(), Some(Credential::new("tok")));

        restored.logout().expect("logout");
        let after_logout = SessionStore::open(Arc::new(SessionFile::new(&path)));
        assert_eq!(after_logout.current_user(), None);
    }

    #[test]
    fn corrupt_document_restores_as_unauthenticated() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("session.json");
        std::fs::write(&path, "not json").expect("write");

        let store = SessionStore::open(Arc::new(SessionFile::new(&path)));
        assert_eq!(store.current_user(), None);
        assert_eq!(store.current_credential(), None);
    }
}
