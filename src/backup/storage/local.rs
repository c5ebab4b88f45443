use crate::backup::definition::LocalStorageDefinition;
use crate::backup::options::RunOptions;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::WithMsg;
use crate::backup::storage::Store;

use std::path::Path;

impl Store for LocalStorageDefinition {
    fn store(&self, artifact: &Path, options: &RunOptions) -> Result<()> {
        let file_name = artifact
            .file_name()
            .ok_or_else(|| Error::Configuration(format!("{:?} has no file name", artifact)))?;
        let destination = self.path.join(file_name);

        tracing::debug!("Local: copying {:?} to {:?}", artifact, destination);
        if options.dry_run() {
            return Ok(());
        }

        let metadata = std::fs::metadata(artifact)?;
        if !metadata.is_file() {
            return Err(Error::Precondition(format!(
                "{:?} is not a regular file",
                artifact
            )));
        }

        std::fs::copy(artifact, &destination)
            .map(|_| ())
            .map_err(Error::from)
            .with_msg(format!("copying {:?} to {:?} failed", artifact, destination))
    }
}
