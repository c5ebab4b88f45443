//! A backup definition after analysis: every default filled in, every
//! provider bound to exactly one implementation.

use crate::backup::compress::{Compression, CompressionCommand};
use crate::backup::database::Database;
use crate::backup::definition::DockerDefinition;
use crate::backup::storage::Storage;

use crate::backup::file_ext::FileExtProvider;

use getset::Getters;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

#[derive(Clone, Debug, Getters)]
#[getset(get = "pub")]
pub struct BackupConfig {
    pub(crate) name: String,
    pub(crate) databases: Vec<DatabaseConfig>,
    pub(crate) volumes: Vec<VolumeConfig>,
    pub(crate) storages: Vec<StorageConfig>,
}

#[derive(Clone, Debug, Getters)]
#[getset(get = "pub")]
pub struct DatabaseConfig {
    pub(crate) name: String,
    pub(crate) format: Option<String>,
    pub(crate) compression: CompressionCommand,
    pub(crate) database: Database,
    pub(crate) docker: Option<DockerDefinition>,
}

#[derive(Clone, Debug, Getters)]
#[getset(get = "pub")]
pub struct VolumeConfig {
    pub(crate) name: String,
    pub(crate) path: PathBuf,
    pub(crate) format: Option<String>,
    pub(crate) compression: Compression,
}

#[derive(Clone, Debug, Getters)]
#[getset(get = "pub")]
pub struct StorageConfig {
    pub(crate) name: String,
    pub(crate) storage: Storage,
}

impl BackupConfig {
    pub fn artifact_count(&self) -> usize {
        self.databases.len() + self.volumes.len()
    }
}

/// One line per provider, as printed by `rika check`.
impl Display for BackupConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "backup: {}", self.name)?;
        for database in &self.databases {
            write!(
                f,
                "  database '{}': {}, compressed with {:?}",
                database.name,
                database.database.engine(),
                database.compression.program()
            )?;
            if let Some(docker) = &database.docker {
                write!(f, " in container {}", docker.container)?;
            }
            writeln!(f)?;
        }
        for volume in &self.volumes {
            let compression = volume
                .compression
                .file_ext()
                .map_or_else(|| "uncompressed".to_string(), |ext| format!("compressed to .{ext}"));
            writeln!(f, "  volume '{}': {:?}, {}", volume.name, volume.path, compression)?;
        }
        for storage in &self.storages {
            writeln!(f, "  storage '{}': {}", storage.name, storage.storage.backend())?;
        }
        Ok(())
    }
}
