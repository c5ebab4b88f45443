//! Sequences one backup run: generate every artifact into a temporary
//! working directory, copy them to every storage, then clean up.

use crate::backup::artifact::ArtifactNamer;
use crate::backup::backup_config::BackupConfig;
use crate::backup::options::RunOptions;
use crate::backup::pipeline::ArtifactPipeline;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::WithMsg;
use crate::backup::storage::Store;

use chrono::{DateTime, Local};
use derive_more::Display;
use getset::Getters;
use std::path::Path;
use tempfile::TempDir;
use tracing::{info, warn};

static WORK_DIR_PREFIX: &str = "rika-";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum RunStage {
    #[display("generating database artifacts")]
    GenerateDatabaseArtifacts,
    #[display("generating volume artifacts")]
    GenerateVolumeArtifacts,
    #[display("distributing artifacts")]
    DistributeArtifacts,
    #[display("cleaning up")]
    Cleanup,
}

impl RunStage {
    fn run<T, F: FnOnce() -> Result<T>>(self, f: F) -> Result<T> {
        info!("Stage: {}", self);
        f().with_msg(format!("backup failed while {}", self))
    }
}

/// Outcome of a successful run.
#[derive(Clone, Debug, PartialEq, Eq, Getters)]
#[getset(get = "pub")]
pub struct RunReport {
    backup: String,
    /// Artifact file names in generation order.
    artifacts: Vec<String>,
    /// Storage name and number of artifacts copied there.
    stored: Vec<(String, usize)>,
}

pub struct BackupRunner {
    config: BackupConfig,
    options: RunOptions,
    started_at: DateTime<Local>,
}

impl BackupRunner {
    pub fn new(config: BackupConfig, options: RunOptions) -> Self {
        Self::with_start_time(config, options, Local::now())
    }

    /// Artifact names carry `started_at` instead of the current time.
    pub fn with_start_time(
        config: BackupConfig,
        options: RunOptions,
        started_at: DateTime<Local>,
    ) -> Self {
        Self {
            config,
            options,
            started_at,
        }
    }

    pub fn run(self) -> Result<RunReport> {
        info!(
            "Starting backup '{}': {} artifact(s), {} storage(s){}",
            self.config.name(),
            self.config.artifact_count(),
            self.config.storages().len(),
            if self.options.dry_run() { ", dry run" } else { "" }
        );

        let work_dir = self.create_work_dir()?;
        let result = self.run_stages(work_dir.path());
        let cleanup = RunStage::Cleanup.run(|| self.cleanup(work_dir));

        match (result, cleanup) {
            (Ok(report), Ok(())) => {
                info!(
                    "Backup '{}' finished with {} artifact(s)",
                    report.backup,
                    report.artifacts.len()
                );
                Ok(report)
            }
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(cleanup_error)) => {
                warn!("{}", cleanup_error);
                Err(e)
            }
        }
    }

    fn create_work_dir(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORK_DIR_PREFIX);
        match self.options.work_dir() {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        }
        .map_err(Error::from)
        .with_msg("failed creating working directory")
    }

    fn run_stages(&self, work_dir: &Path) -> Result<RunReport> {
        let namer = ArtifactNamer::new(self.started_at);
        let pipeline = ArtifactPipeline::new(&namer, &self.options, work_dir);
        let mut artifacts = Vec::with_capacity(self.config.artifact_count());

        RunStage::GenerateDatabaseArtifacts.run(|| {
            for database in self.config.databases() {
                artifacts.push(pipeline.generate_database_artifact(database)?);
            }
            Ok(())
        })?;

        RunStage::GenerateVolumeArtifacts.run(|| {
            for volume in self.config.volumes() {
                artifacts.push(pipeline.generate_volume_artifact(volume)?);
            }
            Ok(())
        })?;

        artifacts.retain(|name| !name.is_empty());

        let stored = RunStage::DistributeArtifacts
            .run(|| self.distribute(work_dir, &artifacts))?;

        Ok(RunReport {
            backup: self.config.name().clone(),
            artifacts,
            stored,
        })
    }

    /// Copies every artifact to every storage, stopping at the first failure.
    fn distribute(&self, work_dir: &Path, artifacts: &[String]) -> Result<Vec<(String, usize)>> {
        self.config
            .storages()
            .iter()
            .map(|storage| {
                for artifact in artifacts {
                    storage
                        .storage()
                        .store(&work_dir.join(artifact), &self.options)
                        .map_err(|e| Error::Distribution {
                            storage: storage.name().clone(),
                            artifact: artifact.clone(),
                            error: Box::new(e),
                        })?;
                }
                info!(
                    "Stored {} artifact(s) in '{}' ({})",
                    artifacts.len(),
                    storage.name(),
                    storage.storage().backend()
                );
                Ok((storage.name().clone(), artifacts.len()))
            })
            .collect()
    }

    fn cleanup(&self, work_dir: TempDir) -> Result<()> {
        if self.options.keep_work_dir() {
            let kept = work_dir.keep();
            info!("Keeping working directory {:?}", kept);
            return Ok(());
        }

        let path = work_dir.path().to_path_buf();
        work_dir
            .close()
            .map_err(Error::from)
            .with_msg(format!("failed removing working directory {:?}", path))
    }
}
