//! The session object for the remote backend.
//!
//! The access token, user id, and currency live in an explicit [Session]
//! value rather than ambient mutable state. A session is created by a
//! successful login, saved to disk so later invocations can reuse it, and
//! deleted on logout.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Error;

/// The authentication context for the remote backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// The bearer token sent with every authenticated call.
    pub access_token: String,
    /// The id of the logged-in user, part of every operation path.
    pub user_id: i64,
    /// The currency symbol the server associates with the user, e.g. "€".
    pub currency: String,
}

impl Session {
    /// Read a previously saved session from `path`.
    ///
    /// A missing or unreadable file means no session; a corrupt one is
    /// treated the same way, since the only recovery is logging in again.
    pub fn load(path: &Path) -> Option<Session> {
        let text = fs::read_to_string(path).ok()?;

        match serde_json::from_str(&text) {
            Ok(session) => Some(session),
            Err(error) => {
                tracing::debug!(
                    "ignoring corrupt session file {}: {error}",
                    path.display()
                );
                None
            }
        }
    }

    /// Save the session to `path` for later invocations.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|error| Error::Unavailable(error.to_string()))?;

        fs::write(path, json)?;

        Ok(())
    }

    /// Delete the session saved at `path`, if any.
    pub fn clear(path: &Path) -> Result<(), Error> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

#[cfg(test)]
mod session_tests {
    use std::fs;

    use super::Session;

    fn sample() -> Session {
        Session {
            access_token: "token-123".to_string(),
            user_id: 7,
            currency: "€".to_string(),
        }
    }

    #[test]
    fn save_and_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        sample().save(&path).unwrap();

        assert_eq!(Session::load(&path), Some(sample()));
    }

    #[test]
    fn missing_file_loads_as_no_session() {
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(Session::load(&dir.path().join("session.json")), None);
    }

    #[test]
    fn corrupt_file_loads_as_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{").unwrap();

        assert_eq!(Session::load(&path), None);
    }

    #[test]
    fn clear_removes_the_file_and_tolerates_absence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        sample().save(&path).unwrap();

        assert_eq!(Session::clear(&path), Ok(()));
        assert!(!path.exists());
        assert_eq!(Session::clear(&path), Ok(()));
    }
}
