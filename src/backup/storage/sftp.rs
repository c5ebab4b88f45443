use crate::backup::definition::storage::DEFAULT_SSH_PORT;
use crate::backup::definition::SftpStorageDefinition;
use crate::backup::options::RunOptions;
use crate::backup::process::{describe, run_to_completion};
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::storage::Store;

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

pub static SCP_PROGRAM: &str = "scp";

impl SftpStorageDefinition {
    /// `user@host:path/file_name`
    pub fn remote_target(&self, file_name: &str) -> String {
        format!(
            "{}@{}:{}/{}",
            self.user,
            self.host,
            self.path.trim_end_matches('/'),
            file_name
        )
    }

    pub fn scp_args(&self, artifact: &Path) -> Result<Vec<OsString>> {
        let file_name = artifact
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::Configuration(format!("{:?} has no usable file name", artifact)))?;

        let mut args: Vec<OsString> = Vec::new();
        if self.port != 0 && self.port != DEFAULT_SSH_PORT {
            args.push(format!("-P{}", self.port).into());
        }
        if let Some(key) = &self.key {
            args.push("-i".into());
            args.push(key.into());
        }
        args.push(artifact.into());
        args.push(self.remote_target(file_name).into());
        Ok(args)
    }
}

impl Store for SftpStorageDefinition {
    fn store(&self, artifact: &Path, options: &RunOptions) -> Result<()> {
        let mut command = Command::new(options.program(SCP_PROGRAM));
        command.args(self.scp_args(artifact)?);

        tracing::debug!("SFTP: {}", describe(&command));
        if options.dry_run() {
            return Ok(());
        }

        run_to_completion(command, options.verbose())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::result_error::error::ErrorKind;
    use std::path::PathBuf;

    fn definition() -> SftpStorageDefinition {
        SftpStorageDefinition {
            user: "backup".into(),
            host: "vault.example.com".into(),
            path: "/srv/backups/".into(),
            port: 22,
            key: None,
        }
    }

    #[test]
    fn test_scp_args_default_port() {
        let args = definition()
            .scp_args(Path::new("/tmp/run/site-1.sql.xz"))
            .unwrap();
        assert_eq!(
            args,
            vec![
                OsString::from("/tmp/run/site-1.sql.xz"),
                OsString::from("backup@vault.example.com:/srv/backups/site-1.sql.xz"),
            ]
        );
    }

    #[test]
    fn test_scp_args_port_and_key() {
        let definition = SftpStorageDefinition {
            port: 2222,
            key: Some(PathBuf::from("/home/backup/.ssh/id_ed25519")),
            ..definition()
        };
        let args = definition.scp_args(Path::new("/tmp/a.tar")).unwrap();
        assert_eq!(
            args,
            vec![
                OsString::from("-P2222"),
                OsString::from("-i"),
                OsString::from("/home/backup/.ssh/id_ed25519"),
                OsString::from("/tmp/a.tar"),
                OsString::from("backup@vault.example.com:/srv/backups/a.tar"),
            ]
        );
    }

    #[test]
    fn test_dry_run_spawns_nothing() {
        let options = RunOptions::builder()
            .dry_run(true)
            .programs([(SCP_PROGRAM.to_string(), PathBuf::from("/nonexistent/scp"))].into())
            .build();
        assert!(definition().store(Path::new("/tmp/a.tar"), &options).is_ok());
    }

    #[test]
    fn test_missing_scp_is_execution_error() {
        let options = RunOptions::builder()
            .programs([(SCP_PROGRAM.to_string(), PathBuf::from("/nonexistent/scp"))].into())
            .build();
        let err = definition()
            .store(Path::new("/tmp/a.tar"), &options)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Execution);
    }
}
