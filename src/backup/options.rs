//! Operator switches for a single run.
//!
//! Passed explicitly into the pipeline and the storage backends.

use bon::Builder;
use getset::{CopyGetters, Getters};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Clone, Debug, Default, Builder, Getters, CopyGetters)]
pub struct RunOptions {
    /// Log every command instead of running it; no artifact is written or copied.
    #[builder(default)]
    #[getset(get_copy = "pub")]
    dry_run: bool,
    /// Echo subprocess stderr while it runs.
    #[builder(default)]
    #[getset(get_copy = "pub")]
    verbose: bool,
    /// Leave the run's working directory behind for inspection.
    #[builder(default)]
    #[getset(get_copy = "pub")]
    keep_work_dir: bool,
    /// Parent of the run's working directory, the system temp dir when unset.
    #[builder(into)]
    #[getset(get = "pub")]
    work_dir: Option<PathBuf>,
    /// Program name to executable path overrides.
    #[builder(default)]
    #[getset(get = "pub")]
    programs: BTreeMap<String, PathBuf>,
}

impl RunOptions {
    /// Executable to spawn for `name`, honouring overrides.
    pub fn program(&self, name: &str) -> PathBuf {
        self.programs
            .get(name)
            .cloned()
            .unwrap_or_else(|| PathBuf::from(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RunOptions::builder().build();
        assert!(!options.dry_run());
        assert!(!options.verbose());
        assert!(!options.keep_work_dir());
        assert!(options.work_dir().is_none());
        assert_eq!(options.program("tar"), PathBuf::from("tar"));
    }

    #[test]
    fn test_program_override() {
        let options = RunOptions::builder()
            .programs([("scp".to_string(), PathBuf::from("/usr/local/bin/scp"))].into())
            .build();
        assert_eq!(options.program("scp"), PathBuf::from("/usr/local/bin/scp"));
        assert_eq!(options.program("tar"), PathBuf::from("tar"));
    }
}
