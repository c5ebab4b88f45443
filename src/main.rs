use clap::{Parser, Subcommand};
use rika::backup::definition::BackupDefinition;
use rika::backup::options::RunOptions;
use rika::backup::result_error::result::Result;
use rika::backup::runner::BackupRunner;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::exit;
use tracing::{error, info, Level};

/// Back up databases and volumes to local or remote storage
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Log commands instead of running them
    #[arg(long, global = true)]
    dry_run: bool,

    /// Debug logging and subprocess output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Keep the temporary working directory after the run
    #[arg(long = "keep-workdir", global = true)]
    keep_work_dir: bool,

    /// Parent directory for the temporary working directory
    #[arg(long = "workdir", value_name = "DIR", global = true)]
    work_dir: Option<PathBuf>,

    /// Use PATH whenever NAME would be run, e.g. `--program tar=/usr/bin/gtar`
    #[arg(long = "program", value_name = "NAME=PATH", value_parser = parse_program, global = true)]
    programs: Vec<(String, PathBuf)>,

    #[command(subcommand)]
    command: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Run the backup described by FILE
    Run { file: PathBuf },
    /// Parse and analyze FILE without running anything
    Check { file: PathBuf },
}

fn parse_program(s: &str) -> std::result::Result<(String, PathBuf), String> {
    match s.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected NAME=PATH, got {s:?}")),
    }
}

fn execute(args: Args) -> Result<()> {
    let options = RunOptions::builder()
        .dry_run(args.dry_run)
        .verbose(args.verbose)
        .keep_work_dir(args.keep_work_dir)
        .maybe_work_dir(args.work_dir)
        .programs(args.programs.into_iter().collect::<BTreeMap<_, _>>())
        .build();

    match args.command {
        Action::Check { file } => {
            let config = BackupDefinition::from_file(&file)?.analyze()?;
            print!("{config}");
        }
        Action::Run { file } => {
            let config = BackupDefinition::from_file(&file)?.analyze()?;
            let report = BackupRunner::new(config, options).run()?;
            for (storage, count) in report.stored() {
                info!("{}: {} artifact(s) stored", storage, count);
            }
            for artifact in report.artifacts() {
                println!("{artifact}");
            }
        }
    }

    Ok(())
}

fn main() {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    if let Err(e) = execute(args) {
        error!("{e}");
        exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_program() {
        assert_eq!(
            parse_program("tar=/usr/bin/gtar").unwrap(),
            ("tar".to_string(), PathBuf::from("/usr/bin/gtar"))
        );
        assert!(parse_program("tar").is_err());
        assert!(parse_program("=/usr/bin/gtar").is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "rika",
            "run",
            "backup.yml",
            "--dry-run",
            "--program",
            "scp=/opt/bin/scp",
        ])
        .unwrap();
        assert!(args.dry_run);
        assert_eq!(args.programs, vec![("scp".to_string(), PathBuf::from("/opt/bin/scp"))]);
        assert!(matches!(args.command, Action::Run { .. }));
    }
}
