use haloaku_common::model::session::SessionId;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SessionFileError {
    #[error("Could not read session file {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("Could not write session file {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct SessionFile {
    path: PathBuf,
    session: SessionId,
}

impl SessionFile {
    /// Reads the stored id, or generates and stores a fresh one when the
    /// file is missing or holds something that is not a session id.
    pub fn load_or_create(path: impl Into<PathBuf>) -> Result<Self, SessionFileError> {
        let path = path.into();

        let stored = match fs::read_to_string(&path) {
            Ok(contents) => match contents.trim().parse::<SessionId>() {
                Ok(session) => Some(session),
                Err(err) => {
                    warn!(error = %err, path = %path.display(), "Replacing invalid session file");
                    None
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(source) => return Err(SessionFileError::Read { path, source }),
        };

        let session = match stored {
            Some(session) => session,
            None => {
                let session = SessionId::generate();
                store(&path, &session)?;
                info!(path = %path.display(), "Created new session");
                session
            }
        };

        Ok(Self { path, session })
    }

    #[must_use]
    pub fn session(&self) -> &SessionId {
        &self.session
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn store(path: &Path, session: &SessionId) -> Result<(), SessionFileError> {
    let write_error = |source| SessionFileError::Write {
        path: path.to_owned(),
        source,
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    fs::write(path, session.get()).map_err(write_error)
}
