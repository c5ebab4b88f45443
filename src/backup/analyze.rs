//! Turns a parsed [`BackupDefinition`] into a runnable [`BackupConfig`].
//!
//! Checks run in a fixed order and the first failure wins: schema version,
//! backup name, presence of data providers, then every database, volume and
//! storage definition in declaration order. Each error is wrapped with the
//! name of the definition it came from.

use crate::backup::artifact::{ArtifactKind, ArtifactNamer};
use crate::backup::backup_config::{BackupConfig, DatabaseConfig, StorageConfig, VolumeConfig};
use crate::backup::compress::{Compression, CompressionCommand};
use crate::backup::database::Database;
use crate::backup::definition::{
    BackupDefinition, CompressionDefinition, DatabaseDefinition, StorageDefinition,
    VolumeDefinition, SCHEMA_VERSION,
};
use crate::backup::definition::storage::DEFAULT_SSH_PORT;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::WithMsg;
use crate::backup::storage::Storage;
use crate::backup::validate::{
    resolve_executable, validate_dir_exist_or_created, validate_path_exist,
};

use chrono::Local;
use itertools::Itertools;
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;
use validator::Validate;

impl BackupDefinition {
    pub fn analyze(self) -> Result<BackupConfig> {
        if self.version != SCHEMA_VERSION {
            return Err(Error::Configuration(format!(
                "invalid version {} (supported: {})",
                self.version, SCHEMA_VERSION
            )));
        }

        let backup = self.backup;
        if backup.name.is_empty() {
            return Err(Error::Configuration("backup is missing name".into()));
        }

        let providers = backup.data_providers;
        if providers.databases.is_empty() && providers.volumes.is_empty() {
            return Err(Error::Configuration(
                "you have neither specified a database or a volume: there is nothing to back up"
                    .into(),
            ));
        }

        let databases = providers
            .databases
            .into_iter()
            .map(|def| {
                let name = def.name.clone();
                analyze_database(def).with_msg(format!("database '{name}' has invalid definition"))
            })
            .collect::<Result<Vec<_>>>()?;

        let volumes = providers
            .volumes
            .into_iter()
            .map(|def| {
                let name = def.name.clone();
                analyze_volume(def).with_msg(format!("volume '{name}' has invalid definition"))
            })
            .collect::<Result<Vec<_>>>()?;

        check_unique_artifact_names(&databases, &volumes)?;

        let storages = backup
            .storage_providers
            .into_iter()
            .map(|def| {
                let name = def.name.clone();
                analyze_storage(def).with_msg(format!("storage '{name}' has invalid definition"))
            })
            .collect::<Result<Vec<_>>>()?;

        if storages.is_empty() {
            warn!(
                "Backup '{}' has no storage providers, artifacts will be discarded",
                backup.name
            );
        }

        Ok(BackupConfig {
            name: backup.name,
            databases,
            volumes,
            storages,
        })
    }
}

fn analyze_compression(def: Option<CompressionDefinition>) -> Result<Compression> {
    let Some(def) = def else {
        return Ok(Compression::default());
    };

    def.validate()?;
    if def.is_disabled() {
        return Ok(Compression::None);
    }

    let program = resolve_executable(&def.command)?;
    let extension = if def.extension.is_empty() {
        Path::new(&def.command)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| def.command.clone())
    } else {
        def.extension
    };

    Ok(CompressionCommand::builder()
        .program(program)
        .extension(extension)
        .args(def.args.split_whitespace().map(String::from).collect())
        .build()
        .into())
}

/// Rejects providers whose artifacts would be written to the same file.
fn check_unique_artifact_names(databases: &[DatabaseConfig], volumes: &[VolumeConfig]) -> Result<()> {
    let namer = ArtifactNamer::new(Local::now());
    let databases = databases.iter().map(|database| {
        (
            format!("database '{}'", database.name),
            namer.artifact_name(
                &database.name,
                database.format.as_deref(),
                ArtifactKind::Sql,
                &database.compression,
            ),
        )
    });
    let volumes = volumes.iter().map(|volume| {
        (
            format!("volume '{}'", volume.name),
            namer.artifact_name(
                &volume.name,
                volume.format.as_deref(),
                ArtifactKind::Tar,
                &volume.compression,
            ),
        )
    });

    let mut seen: HashMap<String, String> = HashMap::new();
    for (provider, file_name) in databases.chain(volumes) {
        if let Some(first) = seen.get(&file_name) {
            return Err(Error::Configuration(format!(
                "{} and {} would write the same artifact {:?}",
                first, provider, file_name
            )));
        }
        seen.insert(file_name, provider);
    }

    Ok(())
}

/// Binds `database` into an empty slot; a second engine is rejected.
fn bind_database(slot: &mut Option<Database>, database: Database) -> Result<()> {
    if slot.is_some() {
        return Err(Error::Configuration("cannot define multiple databases".into()));
    }

    *slot = Some(database);
    Ok(())
}

fn validate_engine(database: &Database) -> Result<()> {
    let validation = match database {
        Database::MySql(mysql) => mysql.validate(),
        Database::Postgres(postgres) => postgres.validate(),
    };
    validation
        .map_err(Error::from)
        .with_msg(format!("invalid {} definition", database.engine()))
}

fn analyze_database(def: DatabaseDefinition) -> Result<DatabaseConfig> {
    def.validate()?;

    let compression = match analyze_compression(def.compression)
        .with_msg("invalid compression definition")?
    {
        Compression::Command(command) => command,
        Compression::None => {
            return Err(Error::Configuration(
                "compression cannot be disabled for database dumps".into(),
            ))
        }
    };

    let mut database = None;
    let engines = [
        def.mysql.map(Database::from),
        def.postgres.map(Database::from),
    ];
    for engine in engines.into_iter().flatten() {
        bind_database(&mut database, engine)?;
    }
    let database = database.ok_or_else(|| Error::Configuration("no database specified".into()))?;
    validate_engine(&database)?;

    if let Some(docker) = &def.docker {
        docker
            .validate()
            .map_err(Error::from)
            .with_msg("invalid docker definition")?;
    }

    Ok(DatabaseConfig {
        name: def.name,
        format: def.format,
        compression,
        database,
        docker: def.docker,
    })
}

fn analyze_volume(def: VolumeDefinition) -> Result<VolumeConfig> {
    def.validate()?;
    validate_path_exist(&def.path)?;

    let compression =
        analyze_compression(def.compression).with_msg("invalid compression definition")?;

    Ok(VolumeConfig {
        name: def.name,
        path: def.path,
        format: def.format,
        compression,
    })
}

fn analyze_storage(def: StorageDefinition) -> Result<StorageConfig> {
    def.validate()?;

    let backends = def.configured_backends();
    if backends.len() > 1 {
        warn!(
            "Storage '{}' defines several backends ({}), only '{}' is used",
            def.name,
            backends.iter().join(", "),
            backends[0]
        );
    }

    let storage = if let Some(local) = def.local {
        local
            .validate()
            .map_err(Error::from)
            .and_then(|_| validate_dir_exist_or_created(&local.path))
            .with_msg("invalid local storage definition")?;
        Storage::Local(local)
    } else if let Some(mut sftp) = def.sftp {
        sftp.validate()
            .map_err(Error::from)
            .with_msg("invalid SFTP storage definition")?;
        if sftp.port == 0 {
            sftp.port = DEFAULT_SSH_PORT;
        }
        Storage::Sftp(sftp)
    } else {
        return Err(Error::Configuration("no storage backend specified".into()));
    };

    Ok(StorageConfig {
        name: def.name,
        storage,
    })
}
