//! Backup definitions as written by the operator.
//!
//! These types mirror the YAML document one to one and carry no behaviour
//! beyond parsing and field-level validation rules. Turning them into
//! something runnable is the job of [`crate::backup::analyze`].

pub mod compression;
pub mod database;
pub mod storage;

pub use compression::CompressionDefinition;
pub use database::{DatabaseDefinition, DockerDefinition, MysqlDefinition, PostgresDefinition};
pub use storage::{LocalStorageDefinition, SftpStorageDefinition, StorageDefinition};

use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::WithMsg;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use validator::{Validate, ValidationError};

/// The only schema version this build understands.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct BackupDefinition {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub backup: Backup,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct Backup {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "dataProviders")]
    pub data_providers: DataProviders,
    #[serde(default, rename = "storageProviders")]
    pub storage_providers: Vec<StorageDefinition>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct DataProviders {
    #[serde(default)]
    pub databases: Vec<DatabaseDefinition>,
    #[serde(default)]
    pub volumes: Vec<VolumeDefinition>,
}

/// A filesystem path archived with `tar`.
#[skip_serializing_none]
#[derive(Clone, Serialize, Deserialize, Debug, Default, Validate)]
pub struct VolumeDefinition {
    #[serde(default)]
    #[validate(length(min = 1, message = "missing name"))]
    pub name: String,
    #[serde(default)]
    #[validate(custom(function = validate_non_empty_path))]
    pub path: PathBuf,
    pub format: Option<String>,
    pub compression: Option<CompressionDefinition>,
}

pub(crate) fn validate_non_empty_path(path: &Path) -> std::result::Result<(), ValidationError> {
    if path.as_os_str().is_empty() {
        return Err(ValidationError::new("MissingPath").with_message("missing path".into()));
    }

    Ok(())
}

impl FromStr for BackupDefinition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        serde_yml::from_str(s)
            .map_err(Error::from)
            .with_msg("invalid backup file format")
    }
}

impl BackupDefinition {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        serde_yml::from_reader(reader)
            .map_err(Error::from)
            .with_msg("invalid backup file format")
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        std::fs::File::open(path)
            .map_err(Error::from)
            .and_then(Self::from_reader)
            .with_msg(format!("failed reading backup definition {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITE_BACKUP: &str = r#"
version: 1
backup:
  name: Site Backup
  dataProviders:
    databases:
    - name: WordPress Database
      format: wp-{date}
      mysql:
        host: localhost
        port: 5432
        user: wordpress
        password: wordpress
      compression:
        type: xz
        args: -9
    volumes:
    - name: WordPress Uploads
      path: /home/nuke/uploads
      compression:
        type: gz
  storageProviders:
  - name: Test
    local:
      path: /home/nuke/backups
"#;

    #[test]
    fn test_parse_site_backup() {
        let definition: BackupDefinition = SITE_BACKUP.parse().unwrap();
        assert_eq!(definition.version, 1);

        let backup = &definition.backup;
        assert_eq!(backup.name, "Site Backup");
        assert_eq!(backup.data_providers.databases.len(), 1);
        assert_eq!(backup.data_providers.volumes.len(), 1);
        assert_eq!(backup.storage_providers.len(), 1);

        let database = &backup.data_providers.databases[0];
        assert_eq!(database.name, "WordPress Database");
        assert_eq!(database.format.as_deref(), Some("wp-{date}"));
        let mysql = database.mysql.as_ref().unwrap();
        assert_eq!(mysql.host, "localhost");
        assert_eq!(mysql.port, 5432);
        assert_eq!(mysql.password.inner(), "wordpress");
        assert!(database.postgres.is_none());
        let compression = database.compression.as_ref().unwrap();
        assert_eq!(compression.command, "xz");
        assert_eq!(compression.args, "-9");

        let volume = &backup.data_providers.volumes[0];
        assert_eq!(volume.path, PathBuf::from("/home/nuke/uploads"));
        assert_eq!(volume.compression.as_ref().unwrap().command, "gz");

        let storage = &backup.storage_providers[0];
        assert_eq!(storage.name, "Test");
        assert_eq!(
            storage.local.as_ref().unwrap().path,
            PathBuf::from("/home/nuke/backups")
        );
    }

    #[test]
    fn test_parse_ignores_unknown_fields() {
        let definition: BackupDefinition = r#"
version: 1
schedule: nightly
backup:
  name: Site Backup
  owner: ops
"#
        .parse()
        .unwrap();
        assert_eq!(definition.backup.name, "Site Backup");
        assert!(definition.backup.data_providers.databases.is_empty());
    }

    #[test]
    fn test_parse_missing_version_is_zero() {
        let definition: BackupDefinition = "backup:\n  name: x\n".parse().unwrap();
        assert_eq!(definition.version, 0);
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let err = "version: [1".parse::<BackupDefinition>().unwrap_err();
        assert!(err.to_string().contains("invalid backup file format"));
    }

    #[test]
    fn test_from_file_missing() {
        let err = BackupDefinition::from_file("/nonexistent/backup.yml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/backup.yml"));
    }

    #[test]
    fn test_volume_definition_validation() {
        let volume = VolumeDefinition::default();
        let errors = volume.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("path"));
    }
}
