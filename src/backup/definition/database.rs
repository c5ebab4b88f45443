use crate::backup::definition::CompressionDefinition;
use crate::backup::redacted::RedactedString;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use validator::{Validate, ValidationError};

/// A database to dump. Exactly one engine section must be present.
#[skip_serializing_none]
#[derive(Clone, Serialize, Deserialize, Debug, Default, Validate)]
pub struct DatabaseDefinition {
    #[serde(default)]
    #[validate(length(min = 1, message = "database definition is missing name"))]
    pub name: String,
    pub format: Option<String>,
    pub compression: Option<CompressionDefinition>,
    pub docker: Option<DockerDefinition>,
    pub mysql: Option<MysqlDefinition>,
    pub postgres: Option<PostgresDefinition>,
}

/// Run the dump tool inside an already running container.
#[derive(Clone, Serialize, Deserialize, Debug, Default, Validate, PartialEq, Eq)]
pub struct DockerDefinition {
    #[serde(default)]
    #[validate(length(min = 1, message = "missing container"))]
    pub container: String,
}

/// `mysqldump` connection settings. Without `database` every database is dumped.
#[skip_serializing_none]
#[derive(Clone, Serialize, Deserialize, Debug, Default, Validate, PartialEq, Eq)]
pub struct MysqlDefinition {
    #[serde(default)]
    #[validate(length(min = 1, message = "missing host"))]
    pub host: String,
    #[serde(default)]
    #[validate(range(min = 1, message = "missing port"))]
    pub port: u16,
    #[serde(default)]
    #[validate(length(min = 1, message = "missing user"))]
    pub user: String,
    #[serde(default)]
    #[validate(custom(function = validate_secret_present))]
    pub password: RedactedString,
    pub database: Option<String>,
}

/// `pg_dump` / `pg_dumpall` connection settings. Without `database` the whole
/// cluster is dumped.
///
/// The password is optional: peer or `.pgpass` authentication is common.
#[skip_serializing_none]
#[derive(Clone, Serialize, Deserialize, Debug, Default, Validate, PartialEq, Eq)]
pub struct PostgresDefinition {
    #[serde(default)]
    #[validate(length(min = 1, message = "missing host"))]
    pub host: String,
    #[serde(default)]
    #[validate(range(min = 1, message = "missing port"))]
    pub port: u16,
    #[serde(default)]
    #[validate(length(min = 1, message = "missing user"))]
    pub user: String,
    #[serde(default)]
    pub password: RedactedString,
    pub database: Option<String>,
}

fn validate_secret_present(secret: &RedactedString) -> Result<(), ValidationError> {
    if secret.is_empty() {
        return Err(ValidationError::new("MissingPassword").with_message("missing password".into()));
    }

    Ok(())
}
