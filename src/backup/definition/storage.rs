use crate::backup::definition::validate_non_empty_path;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::path::PathBuf;
use validator::Validate;

pub const DEFAULT_SSH_PORT: u16 = 22;

/// A destination for artifacts. The first configured backend is used.
#[skip_serializing_none]
#[derive(Clone, Serialize, Deserialize, Debug, Default, Validate)]
pub struct StorageDefinition {
    #[serde(default)]
    #[validate(length(min = 1, message = "missing name"))]
    pub name: String,
    pub local: Option<LocalStorageDefinition>,
    pub sftp: Option<SftpStorageDefinition>,
}

impl StorageDefinition {
    /// Names of every backend section present, in resolution order.
    pub fn configured_backends(&self) -> Vec<&'static str> {
        [
            self.local.as_ref().map(|_| "local"),
            self.sftp.as_ref().map(|_| "sftp"),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Default, Validate, PartialEq, Eq)]
pub struct LocalStorageDefinition {
    #[serde(default)]
    #[validate(custom(function = validate_non_empty_path))]
    pub path: PathBuf,
}

/// Remote copy over `scp`.
#[skip_serializing_none]
#[derive(Clone, Serialize, Deserialize, Debug, Default, Validate, PartialEq, Eq)]
pub struct SftpStorageDefinition {
    #[serde(default)]
    #[validate(length(min = 1, message = "missing user"))]
    pub user: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "missing host"))]
    pub host: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "missing remote path"))]
    pub path: String,
    /// 0 means unset and resolves to 22.
    #[serde(default)]
    pub port: u16,
    /// Identity file passed to `scp -i`.
    pub key: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_backends_order() {
        let definition: StorageDefinition = serde_yml::from_str(
            "name: both\nsftp:\n  user: u\n  host: h\n  path: /p\nlocal:\n  path: /tmp/x\n",
        )
        .unwrap();
        assert_eq!(definition.configured_backends(), vec!["local", "sftp"]);
    }

    #[test]
    fn test_sftp_validation() {
        let definition = SftpStorageDefinition::default();
        let errors = definition.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("user"));
        assert!(fields.contains_key("host"));
        assert!(fields.contains_key("path"));
        assert!(!fields.contains_key("port"));
    }

    #[test]
    fn test_local_requires_path() {
        assert!(LocalStorageDefinition::default().validate().is_err());
    }
}
