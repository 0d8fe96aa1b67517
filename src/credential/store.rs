use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::Credential;
use crate::error::CredentialError;

/// File-backed credential persistence with full-replace, atomic writes.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted credential.
    ///
    /// Every error means "no usable credential"; a half-written file fails to parse and is
    /// reported as [`CredentialError::Invalid`], never as a partially valid credential.
    pub fn load(&self) -> Result<Credential, CredentialError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "credential file not found");
                return Err(CredentialError::NotFound(self.path.clone()));
            }
            Err(source) => {
                return Err(CredentialError::Unreadable {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let credential: Credential =
            serde_json::from_str(&data).map_err(|e| CredentialError::Invalid {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        if !credential.is_usable() {
            return Err(CredentialError::Invalid {
                path: self.path.clone(),
                message: "empty access_token".to_string(),
            });
        }

        debug!(path = %self.path.display(), "credential loaded");
        Ok(credential)
    }

    /// Replace the persisted credential via temp file + fsync + rename.
    pub fn save(&self, credential: &Credential) -> Result<(), CredentialError> {
        info!(path = %self.path.display(), "saving credential file");
        let write_err = |source| CredentialError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let data = serde_json::to_vec_pretty(credential)?;
        let tmp = self.tmp_path();
        // A leftover temp file would keep its old mode; start from a fresh owner-only one.
        match fs::remove_file(&tmp) {
            Ok(()) => debug!(path = %tmp.display(), "removed stale temp credential file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(write_err(e)),
        }
        {
            let mut file = Self::create_private(&tmp).map_err(write_err)?;
            file.write_all(&data).map_err(write_err)?;
            file.sync_all().map_err(write_err)?;
        }

        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(write_err(e));
        }
        Ok(())
    }

    #[cfg(unix)]
    fn create_private(path: &Path) -> std::io::Result<fs::File> {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(0o600)
            .open(path)
    }

    #[cfg(not(unix))]
    fn create_private(path: &Path) -> std::io::Result<fs::File> {
        fs::OpenOptions::new().write(true).create_new(true).open(path)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "token.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
