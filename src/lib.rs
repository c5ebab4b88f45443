//! # rika
//!
//! Runs declarative backup jobs: dumps databases and archives directories,
//! streams each through a compressor into a timestamped artifact, and copies
//! the artifacts to local or SFTP storage.
//!
//! ## Features
//!
//! - **Databases**: MySQL (`mysqldump`) and PostgreSQL (`pg_dump`/`pg_dumpall`),
//!   optionally inside a Docker container
//! - **Volumes**: `tar` archives of files and directories
//! - **Compression**: any compressor that streams with `--stdout`, `xz` by default
//! - **Storage**: local directories and `scp` targets
//! - **Dry run**: logs every command without running it
//!
//! ## Quick Start
//!
//! ```no_run
//! use rika::backup::definition::BackupDefinition;
//! use rika::backup::options::RunOptions;
//! use rika::backup::runner::BackupRunner;
//!
//! // Parse and resolve the backup definition
//! let config = BackupDefinition::from_file("backup.yml")?.analyze()?;
//!
//! // Generate and distribute every artifact
//! let report = BackupRunner::new(config, RunOptions::default()).run()?;
//! println!("stored {:?}", report.stored());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod backup;
