//! Shell scripts standing in for external tools in tests.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

pub fn write_executable(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut permissions = std::fs::metadata(&path).unwrap().permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(&path, permissions).unwrap();
    path
}

/// Ignores its flags and copies stdin to stdout.
pub fn fake_compressor(dir: &Path, name: &str) -> PathBuf {
    write_executable(dir, name, "exec cat")
}
