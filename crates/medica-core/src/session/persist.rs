//! On-disk persistence for the authenticated session.

use crate::identity::{Credential, Identity};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Persisted session document: identity and credential together, so a
/// restore is both-or-neither.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionDocument {
    /// Authenticated user profile.
    pub identity: Identity,
    /// Bearer token paired with the identity.
    pub credential: Credential,
}

/// Errors returned by session persistence.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Durable storage for the session document.
pub trait SessionPersistence: Send + Sync {
    /// Replace the stored document.
    fn save(&self, document: &SessionDocument) -> Result<(), SessionError>;
    /// Load the stored document, or `None` when no session is stored.
    fn load(&self) -> Result<Option<SessionDocument>, SessionError>;
    /// Remove the stored document; a no-op when nothing is stored.
    fn clear(&self) -> Result<(), SessionError>;
}

/// JSON-file session persistence.
///
/// The document is written to a temporary sibling and renamed into place
/// so a crash mid-write cannot leave a partial session on disk.
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    /// Create a persistence handle for the given document path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.as_os_str().to_owned();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

impl SessionPersistence for SessionFile {
    fn save(&self, document: &SessionDocument) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(document)?;
        let tmp = self.tmp_path();
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        info!(
            "session document saved (path={}, user_id={})",
            self.path.display(),
            document.identity.id
        );
        Ok(())
    }

    fn load(&self) -> Result<Option<SessionDocument>, SessionError> {
        if !self.path.exists() {
            debug!("no session document (path={})", self.path.display());
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        let document: SessionDocument = serde_json::from_str(&contents)?;
        debug!(
            "session document loaded (path={}, user_id={})",
            self.path.display(),
            document.identity.id
        );
        Ok(Some(document))
    }

    fn clear(&self) -> Result<(), SessionError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            info!("session document removed (path={})", self.path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{SessionDocument, SessionFile, SessionPersistence};
    use crate::identity::{Credential, Identity, Role};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;
    use uuid::Uuid;

    fn document() -> SessionDocument {
        SessionDocument {
            identity: Identity {
                id: Uuid::new_v4(),
                display_name: "Dr. Gregory".to_string(),
                email: "greg@example.com".to_string(),
                role: Role::Doctor,
            },
            credential: Credential::new("tok"),
        }
    }

    #[test]
    fn session_file_round_trip() {
        let temp = tempdir().expect("tempdir");
        let file = SessionFile::new(temp.path().join("session.json"));
        assert!(file.load().expect("load empty").is_none());

        let document = document();
        file.save(&document).expect("save");
        assert_eq!(file.load().expect("load"), Some(document));

        file.clear().expect("clear");
        assert!(file.load().expect("load after clear").is_none());
        file.clear().expect("clear is idempotent");
    }

    #[test]
    fn save_creates_missing_parent_dirs() {
        let temp = tempdir().expect("tempdir");
        let file = SessionFile::new(temp.path().join("nested").join("dir").join("session.json"));
        file.save(&document()).expect("save");
        assert!(file.load().expect("load").is_some());
    }

    #[test]
    fn partial_document_fails_to_load() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("session.json");
        // Identity without a credential is not a valid session.
        std::fs::write(&path, r#"{"identity": null}"#).expect("write");
        let file = SessionFile::new(&path);
        assert!(file.load().is_err());
    }
}
