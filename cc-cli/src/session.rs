//! Sign-in state persisted between invocations
//!
//! The backend token and user record are written as JSON to
//! `<data folder>/session.json`. An unreadable or corrupt file is treated
//! as "signed out" rather than an error.

use std::path::{Path, PathBuf};

use cc_common::{Error, Result};
use cc_store::AuthState;
use tracing::{debug, warn};

pub const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn in_folder(data_folder: &Path) -> Self {
        Self {
            path: data_folder.join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saved state, if any
    pub fn load(&self) -> Option<AuthState> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read session file {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<AuthState>(&contents) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!("Ignoring corrupt session file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, state: &AuthState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(state).map_err(|e| Error::Internal(e.to_string()))?;
        std::fs::write(&self.path, json)?;
        restrict_permissions(&self.path)?;
        debug!("Saved session to {}", self.path.display());
        Ok(())
    }

    /// Remove the saved state; a missing file is not an error
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Save a signed-in state, clear anything else
    pub fn sync(&self, state: &AuthState) -> Result<()> {
        if state.is_valid() {
            self.save(state)
        } else {
            self.clear()
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
