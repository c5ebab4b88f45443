//! Produces artifact files: a source program streamed through a compressor
//! into the run's working directory.

use crate::backup::artifact::{ArtifactKind, ArtifactNamer};
use crate::backup::backup_config::{DatabaseConfig, VolumeConfig};
use crate::backup::compress::Compression;
use crate::backup::database::{DumpCommand, DumpCommandProvider};
use crate::backup::function_path;
use crate::backup::options::RunOptions;
use crate::backup::process::{
    check_status, collect_stderr, describe, join_scoped, program_name, run_to_completion, spawn,
};
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::{convert_error_vec, Result};
use crate::backup::result_error::{AddFunctionName, WithMsg};

use function_name::named;
use itertools::Itertools;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, IntoInnerError, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

pub static TAR_PROGRAM: &str = "tar";
static STDOUT_TARGET: &str = "-";

pub struct ArtifactPipeline<'a> {
    namer: &'a ArtifactNamer,
    options: &'a RunOptions,
    dest_dir: &'a Path,
}

impl<'a> ArtifactPipeline<'a> {
    pub fn new(namer: &'a ArtifactNamer, options: &'a RunOptions, dest_dir: &'a Path) -> Self {
        Self {
            namer,
            options,
            dest_dir,
        }
    }

    /// Dumps a database through its compressor; returns the artifact file name.
    pub fn generate_database_artifact(&self, database: &DatabaseConfig) -> Result<String> {
        let file_name = self.namer.artifact_name(
            database.name(),
            database.format().as_deref(),
            ArtifactKind::Sql,
            database.compression(),
        );

        let dump = database.database().construct_dump_command();
        let dump = match database.docker() {
            Some(docker) => dump.in_container(docker),
            None => dump,
        };

        info!(
            "Dumping {} database '{}' to {}",
            database.database().engine(),
            database.name(),
            file_name
        );
        self.generate_artifact(
            &dump,
            &Compression::from(database.compression().clone()),
            &self.dest_dir.join(&file_name),
        )
        .with_msg(format!(
            "failed generating artifact for database '{}'",
            database.name()
        ))?;

        Ok(file_name)
    }

    /// Archives a volume with `tar`; returns the artifact file name.
    pub fn generate_volume_artifact(&self, volume: &VolumeConfig) -> Result<String> {
        let file_name = self.namer.artifact_name(
            volume.name(),
            volume.format().as_deref(),
            ArtifactKind::Tar,
            volume.compression(),
        );
        let dest = self.dest_dir.join(&file_name);

        // Without a compressor tar writes the artifact itself.
        let target = match volume.compression() {
            Compression::None => dest.as_path(),
            Compression::Command(_) => Path::new(STDOUT_TARGET),
        };
        let tar = self.tar_command(target, volume.path());

        info!("Archiving volume '{}' to {}", volume.name(), file_name);
        self.generate_artifact(&tar, volume.compression(), &dest)
            .with_msg(format!(
                "failed generating artifact for volume '{}'",
                volume.name()
            ))?;

        Ok(file_name)
    }

    fn tar_command(&self, target: &Path, path: &Path) -> DumpCommand {
        let flags = if self.options.verbose() { "cvf" } else { "cf" };
        DumpCommand::new(
            TAR_PROGRAM,
            vec![
                flags.to_string(),
                target.to_string_lossy().into_owned(),
                path.to_string_lossy().into_owned(),
            ],
        )
    }

    /// Runs `source` and writes the result to `dest`.
    ///
    /// With a compressor the source's stdout is piped through it. With
    /// [`Compression::None`] the source is expected to write `dest` on its own.
    /// An existing `dest` is never overwritten. A partial `dest` is removed on
    /// failure.
    pub fn generate_artifact(
        &self,
        source: &DumpCommand,
        compression: &Compression,
        dest: &Path,
    ) -> Result<()> {
        let result = match compression {
            Compression::Command(compression) => {
                let compressor = compression.command(self.options);
                if self.options.dry_run() {
                    info!(
                        "Dry run: {} | {} > {:?}",
                        source,
                        describe(&compressor),
                        dest
                    );
                    return Ok(());
                }

                let file = create_artifact_file(dest)?;
                debug!("Running {} | {} > {:?}", source, describe(&compressor), dest);
                pipe_through_compressor(
                    source.to_command(self.options),
                    compressor,
                    file,
                    dest,
                    self.options.verbose(),
                )
            }
            Compression::None => {
                if self.options.dry_run() {
                    info!("Dry run: {}", source);
                    return Ok(());
                }

                if dest.exists() {
                    return Err(artifact_exists(dest));
                }
                debug!("Running {}", source);
                run_to_completion(source.to_command(self.options), self.options.verbose())
            }
        };

        if result.is_err() {
            remove_partial(dest);
        }
        result
    }
}

fn remove_partial(dest: &Path) {
    match std::fs::remove_file(dest) {
        Ok(()) => debug!("Removed partial artifact {:?}", dest),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed removing partial artifact {:?}: {}", dest, e),
    }
}

fn artifact_exists(dest: &Path) -> Error {
    Error::Precondition(format!("artifact {:?} already exists", dest))
}

fn create_artifact_file(dest: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dest)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => artifact_exists(dest),
            _ => Error::from(e).with_msg(format!("failed creating artifact {:?}", dest)),
        })
}

fn take_pipe<T>(pipe: Option<T>, program: &str, what: &str) -> Result<T> {
    pipe.ok_or_else(|| Error::Io(std::io::Error::other(format!("{program:?} has no {what} pipe"))))
}

/// Copies `output` into `file`, flushed and synced before returning.
fn drain_to_file<R: Read>(mut output: R, file: File) -> Result<u64> {
    let mut writer = BufWriter::new(file);
    let written = std::io::copy(&mut output, &mut writer)?;
    writer
        .into_inner()
        .map_err(IntoInnerError::into_error)?
        .sync_all()?;
    Ok(written)
}

/// `source | compressor > file`, where `file` was opened at `dest`.
///
/// The compressor is started first so its stdin can become the source's
/// stdout. Succeeds only once both processes exited successfully and the
/// drain thread has been joined.
#[named]
fn pipe_through_compressor(
    mut source: Command,
    mut compressor: Command,
    file: File,
    dest: &Path,
    verbose: bool,
) -> Result<()> {
    let source_name = program_name(&source);
    let compressor_name = program_name(&compressor);

    compressor
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut compressor_child = spawn(&mut compressor)?;
    let compressor_in = take_pipe(compressor_child.stdin.take(), &compressor_name, "stdin")?;
    let compressor_out = take_pipe(compressor_child.stdout.take(), &compressor_name, "stdout")?;
    let compressor_err = take_pipe(compressor_child.stderr.take(), &compressor_name, "stderr")?;

    source
        .stdin(Stdio::null())
        .stdout(Stdio::from(compressor_in))
        .stderr(Stdio::piped());
    let source_child = spawn(&mut source);
    // Our copy of the pipe's write end lives in `source`; the compressor only
    // sees EOF once it is gone.
    drop(source);

    std::thread::scope(|scope| {
        let source_name = source_name.as_str();
        let compressor_name = compressor_name.as_str();

        let drain = scope.spawn(move || drain_to_file(compressor_out, file));
        let compressor_stderr =
            scope.spawn(move || collect_stderr(compressor_name, compressor_err, verbose));

        let source_result = source_child.and_then(|mut child| {
            let stderr = child
                .stderr
                .take()
                .map(|stderr| scope.spawn(move || collect_stderr(source_name, stderr, verbose)));
            let status = child.wait();
            let stderr = stderr
                .map(|handle| handle.join().unwrap_or_default())
                .unwrap_or_default();
            check_status(source_name, status?, stderr)
        });

        let drain_result = join_scoped(drain, "artifact drain").map(|written| {
            debug!("Wrote {} bytes to {:?}", written, dest);
        });

        let compressor_status = compressor_child.wait();
        let compressor_stderr = compressor_stderr.join().unwrap_or_default();
        let compressor_result = compressor_status
            .map_err(Error::from)
            .and_then(|status| check_status(compressor_name, status, compressor_stderr));

        convert_error_vec(
            [source_result, compressor_result, drain_result]
                .into_iter()
                .filter_map(Result::err)
                .collect_vec(),
        )
    })
    .add_fn_name(function_path!())
}
