use crate::backup::definition::compression::DEFAULT_COMPRESSION_COMMAND;
use crate::backup::file_ext::FileExtProvider;
use crate::backup::options::RunOptions;

use bon::Builder;
use derive_more::From;
use getset::Getters;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;

/// Flag every supported compressor understands for streaming to stdout.
pub static STDOUT_FLAG: &str = "--stdout";

/// A resolved streaming compressor.
#[derive(Clone, Debug, PartialEq, Eq, Builder, Getters)]
#[getset(get = "pub")]
pub struct CompressionCommand {
    /// Absolute path after analysis, except for the built-in default which is
    /// left to the OS to find.
    #[builder(into)]
    program: PathBuf,
    #[builder(into)]
    extension: Arc<str>,
    #[builder(default)]
    args: Vec<String>,
}

impl Default for CompressionCommand {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_COMPRESSION_COMMAND),
            extension: DEFAULT_COMPRESSION_COMMAND.into(),
            args: Vec::new(),
        }
    }
}

impl CompressionCommand {
    /// `<program> --stdout <args...>`, reading from stdin.
    pub fn command(&self, options: &RunOptions) -> Command {
        let mut command = Command::new(options.program(&self.program.to_string_lossy()));
        command.arg(STDOUT_FLAG).args(&self.args);
        command
    }
}

impl FileExtProvider for CompressionCommand {
    fn file_ext(&self) -> Option<Arc<str>> {
        Some(self.extension.clone())
    }
}

/// Compression applied to an artifact. Only volumes may use `None`.
#[derive(Clone, Debug, PartialEq, Eq, From)]
pub enum Compression {
    None,
    Command(CompressionCommand),
}

impl Default for Compression {
    fn default() -> Self {
        CompressionCommand::default().into()
    }
}

impl FileExtProvider for Compression {
    fn file_ext(&self) -> Option<Arc<str>> {
        match self {
            Compression::None => None,
            Compression::Command(command) => command.file_ext(),
        }
    }
}
