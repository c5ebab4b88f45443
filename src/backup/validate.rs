//! Environment checks run while analyzing a backup definition.
//!
//! Field presence is declared on the definition structs with `validator`; the
//! functions here cover what depends on the machine the backup runs on.

use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;

use std::path::{Path, PathBuf};

/// Fails unless `path` exists. Never creates anything.
pub fn validate_path_exist<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    std::fs::metadata(path)
        .map(|_| ())
        .map_err(|e| Error::Precondition(format!("cannot access {:?}: {}", path, e)))
}

pub fn validate_dir_exist_or_created<P: AsRef<Path>>(dir: P) -> Result<()> {
    let dir = dir.as_ref();
    if dir.exists() {
        if !dir.is_dir() {
            return Err(Error::Precondition(format!("{:?} is not a directory", dir)));
        }
    } else {
        tracing::info!("Creating local storage directory {:?}", dir);
        std::fs::create_dir_all(dir).map_err(|e| {
            Error::Precondition(format!("could not create local storage path {:?}: {}", dir, e))
        })?;
    }

    Ok(())
}

/// Resolves `program` to an absolute executable path using `PATH`.
///
/// Names containing a path separator are checked in place.
pub fn resolve_executable<S: AsRef<str>>(program: S) -> Result<PathBuf> {
    let program = program.as_ref();
    which::which(program).map_err(|source| Error::ExecutableNotFound {
        program: program.to_string(),
        source,
    })
}
