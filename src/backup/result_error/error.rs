use crate::backup::result_error::{AddFunctionName, WithMsg};
use itertools::Itertools;
use std::fmt::Debug;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    ValidationError(#[from] validator::ValidationErrors),
    #[error(transparent)]
    SerdeYml(#[from] serde_yml::Error),
    #[error("{0}")]
    Configuration(String),
    #[error("{0}")]
    Precondition(String),
    #[error("could not find executable {program:?}: {source}")]
    ExecutableNotFound {
        program: String,
        #[source]
        source: which::Error,
    },
    #[error("failed to start {program:?}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program:?} exited unsuccessfully ({status}){}", format_stderr(.stderr))]
    ExitStatus {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("storage {storage:?} failed storing {artifact}:\n{}", indent::indent_all_with("  ", error.to_string()))]
    Distribution {
        storage: String,
        artifact: String,
        error: Box<Error>,
    },
    #[error("{}:\n{}", msg, indent::indent_all_with("  ", error.to_string()))]
    WithMsg { msg: String, error: Box<Error> },
    #[error("{} failed:\n{}", fn_name, indent::indent_all_with("  ", error.to_string()))]
    WithFnName { error: Box<Error>, fn_name: String },
    #[error("{}", itertools::join(.0, "\n\n"))]
    LotsOfError(Vec<Error>),
}

/// Broad failure category, independent of how much context was wrapped around
/// the underlying error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or incomplete backup definition.
    Configuration,
    /// The environment does not satisfy the definition (missing path or executable).
    Precondition,
    /// A subprocess could not be started or exited unsuccessfully.
    Execution,
    /// Copying an artifact to a storage provider failed.
    Distribution,
    Io,
}

fn format_stderr(stderr: &str) -> String {
    let stderr = stderr.trim_end();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(":\n{}", indent::indent_all_with("  ", stderr))
    }
}

impl<S: Into<String>> AddFunctionName<S> for Error {
    fn add_fn_name(self, fn_name: S) -> Self {
        Error::WithFnName {
            error: Box::new(self),
            fn_name: fn_name.into(),
        }
    }
}

impl<S: Into<String>> WithMsg<S> for Error {
    fn with_msg(self, msg: S) -> Self {
        Self::WithMsg {
            msg: msg.into(),
            error: Box::new(self),
        }
    }
}

impl From<Vec<Error>> for Error {
    fn from(errors: Vec<Error>) -> Self {
        if errors.is_empty() {
            panic!("Should not create lots of errors when error is empty")
        }
        Self::LotsOfError(
            errors
                .into_iter()
                .flat_map(|e| e.into_iter())
                .collect_vec(),
        )
    }
}

impl Error {
    pub fn into_iter(self) -> Box<dyn Iterator<Item = Error>> {
        match self {
            Error::LotsOfError(v) => Box::new(v.into_iter().flat_map(|e| e.into_iter())),
            e => Box::new(std::iter::once(e)),
        }
    }

    pub fn chain(self, other: Error) -> Error {
        Error::LotsOfError(self.into_iter().chain(other.into_iter()).collect_vec())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_) | Error::ValidationError(_) | Error::SerdeYml(_) => {
                ErrorKind::Configuration
            }
            Error::Precondition(_) | Error::ExecutableNotFound { .. } => ErrorKind::Precondition,
            Error::Spawn { .. } | Error::ExitStatus { .. } => ErrorKind::Execution,
            Error::Distribution { .. } => ErrorKind::Distribution,
            Error::Io(_) => ErrorKind::Io,
            Error::WithMsg { error, .. } | Error::WithFnName { error, .. } => error.kind(),
            Error::LotsOfError(errors) => errors.first().map_or(ErrorKind::Io, Error::kind),
        }
    }
}
