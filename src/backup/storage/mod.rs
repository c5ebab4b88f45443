pub mod local;
pub mod sftp;

use crate::backup::definition::{LocalStorageDefinition, SftpStorageDefinition};
use crate::backup::options::RunOptions;
use crate::backup::result_error::result::Result;

use derive_more::From;
use std::path::Path;

/// Copies one artifact to a destination.
pub trait Store {
    fn store(&self, artifact: &Path, options: &RunOptions) -> Result<()>;
}

/// A storage backend bound during analysis.
#[derive(Clone, Debug, From, PartialEq, Eq)]
pub enum Storage {
    Local(LocalStorageDefinition),
    Sftp(SftpStorageDefinition),
}

impl Storage {
    pub fn backend(&self) -> &'static str {
        match self {
            Storage::Local(_) => "local",
            Storage::Sftp(_) => "sftp",
        }
    }
}

impl Store for Storage {
    fn store(&self, artifact: &Path, options: &RunOptions) -> Result<()> {
        match self {
            Storage::Local(local) => local.store(artifact, options),
            Storage::Sftp(sftp) => sftp.store(artifact, options),
        }
    }
}
