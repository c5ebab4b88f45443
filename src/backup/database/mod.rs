pub mod mysql;
pub mod postgres;

use crate::backup::definition::{DockerDefinition, MysqlDefinition, PostgresDefinition};
use crate::backup::options::RunOptions;
use crate::backup::redacted::RedactedString;

use derive_more::From;
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use std::process::Command;

/// A database engine bound during analysis.
#[derive(Clone, Debug, From, PartialEq, Eq)]
pub enum Database {
    MySql(MysqlDefinition),
    Postgres(PostgresDefinition),
}

impl Database {
    pub fn engine(&self) -> &'static str {
        match self {
            Database::MySql(_) => "MySQL",
            Database::Postgres(_) => "PostgreSQL",
        }
    }
}

/// External program plus arguments that writes a dump to stdout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DumpCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Set on the spawned process, never placed on the command line.
    pub env: Vec<(String, RedactedString)>,
}

pub trait DumpCommandProvider {
    fn construct_dump_command(&self) -> DumpCommand;
}

impl DumpCommandProvider for Database {
    fn construct_dump_command(&self) -> DumpCommand {
        match self {
            Database::MySql(mysql) => mysql.construct_dump_command(),
            Database::Postgres(postgres) => postgres.construct_dump_command(),
        }
    }
}

pub static DOCKER_PROGRAM: &str = "docker";
static MASKED_ARG_PREFIXES: &[&str] = &["--password="];

impl DumpCommand {
    pub fn new<S: Into<String>>(program: S, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            env: Vec::new(),
        }
    }

    pub fn with_env<S: Into<String>>(mut self, name: S, value: RedactedString) -> Self {
        self.env.push((name.into(), value));
        self
    }

    /// Wraps the command in `docker exec -t <container> ...`.
    ///
    /// Environment variables are forwarded by name so their values stay off
    /// the command line.
    pub fn in_container(self, docker: &DockerDefinition) -> DumpCommand {
        let mut args = vec!["exec".to_string(), "-t".to_string()];
        for (name, _) in &self.env {
            args.push("-e".to_string());
            args.push(name.clone());
        }
        args.push(docker.container.clone());
        args.push(self.program);
        args.extend(self.args);

        DumpCommand {
            program: DOCKER_PROGRAM.to_string(),
            args,
            env: self.env,
        }
    }

    pub fn to_command(&self, options: &RunOptions) -> Command {
        let mut command = Command::new(options.program(&self.program));
        command.args(&self.args);
        for (name, value) in &self.env {
            command.env(name, value.inner());
        }
        command
    }
}

impl Display for DumpCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let args = self.args.iter().map(|arg| {
            MASKED_ARG_PREFIXES
                .iter()
                .find(|prefix| arg.starts_with(*prefix))
                .map_or_else(|| arg.clone(), |prefix| format!("{prefix}***"))
        });
        write!(f, "{}", std::iter::once(self.program.clone()).chain(args).join(" "))
    }
}
