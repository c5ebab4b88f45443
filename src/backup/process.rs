//! Spawning external tools and collecting what they print on stderr.

use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;

use itertools::Itertools;
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::ScopedJoinHandle;

/// Lines of stderr kept for error messages.
static STDERR_TAIL_LINES: usize = 20;

pub fn program_name(command: &Command) -> String {
    command.get_program().to_string_lossy().into_owned()
}

/// Renders a command for log output.
pub fn describe(command: &Command) -> String {
    std::iter::once(command.get_program())
        .chain(command.get_args())
        .map(|s| s.to_string_lossy())
        .join(" ")
}

pub fn spawn(command: &mut Command) -> Result<Child> {
    command.spawn().map_err(|source| Error::Spawn {
        program: program_name(command),
        source,
    })
}

pub fn check_status(program: &str, status: ExitStatus, stderr: String) -> Result<()> {
    if status.success() {
        Ok(())
    } else {
        Err(Error::ExitStatus {
            program: program.to_string(),
            status,
            stderr,
        })
    }
}

/// Reads `stderr` to the end and returns its last lines.
///
/// With `verbose` every line is also logged as it arrives.
pub fn collect_stderr<R: Read>(program: &str, stderr: R, verbose: bool) -> String {
    let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
    for line in BufReader::new(stderr).split(b'\n') {
        let Ok(line) = line else { break };
        let line = String::from_utf8_lossy(&line).trim_end().to_string();
        if verbose {
            tracing::info!("[{}] {}", program, line);
        }
        if tail.len() == STDERR_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line);
    }
    tail.into_iter().join("\n")
}

pub fn join_scoped<T>(handle: ScopedJoinHandle<'_, Result<T>>, what: &str) -> Result<T> {
    handle
        .join()
        .unwrap_or_else(|_| Err(Error::Io(std::io::Error::other(format!("{what} panicked")))))
}

/// Runs `command` to completion with stdin and stdout closed.
pub fn run_to_completion(mut command: Command, verbose: bool) -> Result<()> {
    let program = program_name(&command);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

    let mut child = spawn(&mut command)?;
    let stderr = child
        .stderr
        .take()
        .map(|stderr| collect_stderr(&program, stderr, verbose))
        .unwrap_or_default();
    let status = child.wait()?;
    check_status(&program, status, stderr)
}
