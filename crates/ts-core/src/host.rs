//! Access to the process environment and filesystem during resolution.
//!
//! Resolution only talks to the outside world through [`Host`], so it can be
//! exercised against an in-memory fake. [`SystemHost`] snapshots the real
//! environment once and reads the real filesystem.

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Environment and filesystem queries needed to resolve the delegate.
pub trait Host {
    /// Every match for `name` on the executable-search path, in search order.
    fn search_path(&self, name: &str) -> Vec<PathBuf>;

    /// Home directory used to expand `~` in probe paths.
    fn home_dir(&self) -> Option<PathBuf>;

    /// Whether `path` is a regular file the current user may execute.
    fn is_executable_file(&self, path: &Path) -> bool;

    /// Reads at most `len` leading bytes of `path`.
    fn read_prefix(&self, path: &Path, len: usize) -> io::Result<Vec<u8>>;

    /// Whether `path` refers to the running launcher binary.
    fn is_launcher(&self, path: &Path) -> bool;
}

/// Snapshot of the real process environment.
#[derive(Debug, Clone)]
pub struct SystemHost {
    search_path: Option<OsString>,
    cwd: PathBuf,
    home: Option<PathBuf>,
    launcher: Option<PathBuf>,
}

impl SystemHost {
    /// Captures `PATH`, the working directory, the home directory and the
    /// canonical path of the running executable.
    pub fn from_env() -> Self {
        Self {
            search_path: std::env::var_os("PATH"),
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            home: dirs::home_dir(),
            launcher: std::env::current_exe()
                .and_then(|exe| exe.canonicalize())
                .ok(),
        }
    }

    /// Replaces the executable-search path.
    #[must_use]
    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    /// Replaces the home directory.
    #[must_use]
    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }
}

impl Host for SystemHost {
    fn search_path(&self, name: &str) -> Vec<PathBuf> {
        match which::which_in_all(name, self.search_path.as_ref(), &self.cwd) {
            Ok(hits) => hits
                .map(|hit| {
                    if hit.is_absolute() {
                        hit
                    } else {
                        self.cwd.join(hit)
                    }
                })
                .collect(),
            Err(err) => {
                tracing::trace!(name, error = %err, "no search path match");
                Vec::new()
            }
        }
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home.clone()
    }

    fn is_executable_file(&self, path: &Path) -> bool {
        match std::fs::metadata(path) {
            Ok(meta) => meta.is_file() && is_executable(path),
            Err(_) => false,
        }
    }

    fn read_prefix(&self, path: &Path, len: usize) -> io::Result<Vec<u8>> {
        // `len` is user-configurable, so let the buffer grow with the file.
        let mut buf = Vec::new();
        File::open(path)?.take(len as u64).read_to_end(&mut buf)?;
        Ok(buf)
    }

    fn is_launcher(&self, path: &Path) -> bool {
        let Some(launcher) = &self.launcher else {
            return false;
        };
        path.canonicalize().is_ok_and(|p| &p == launcher)
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use nix::unistd::{AccessFlags, access};
    access(path, AccessFlags::X_OK).is_ok()
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    true
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    use std::os::unix::fs::PermissionsExt;

    fn write_file(path: &Path, contents: &str, mode: u32) {
        std::fs::write(path, contents).unwrap();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).unwrap();
    }

    #[test]
    fn test_search_path_finds_executable() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("tempo-bin");
        write_file(&bin, "#!/bin/sh\n", 0o755);

        let host = SystemHost::from_env().with_search_path(dir.path().as_os_str());
        assert_eq!(host.search_path("tempo-bin"), vec![bin]);
        assert!(host.search_path("tempo-rs").is_empty());
    }

    #[test]
    fn test_search_path_keeps_order_across_dirs() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        write_file(&first.path().join("tempo-bin"), "#!/bin/sh\n", 0o755);
        write_file(&second.path().join("tempo-bin"), "#!/bin/sh\n", 0o755);

        let joined = std::env::join_paths([first.path(), second.path()]).unwrap();
        let host = SystemHost::from_env().with_search_path(joined);
        assert_eq!(
            host.search_path("tempo-bin"),
            vec![
                first.path().join("tempo-bin"),
                second.path().join("tempo-bin")
            ]
        );
    }

    #[test]
    fn test_is_executable_file() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("exe");
        let plain = dir.path().join("plain");
        write_file(&exe, "", 0o755);
        write_file(&plain, "", 0o644);

        let host = SystemHost::from_env();
        assert!(host.is_executable_file(&exe));
        assert!(!host.is_executable_file(dir.path()));
        assert!(!host.is_executable_file(&dir.path().join("missing")));
        // access(2) refuses X_OK even for root when no execute bit is set.
        assert!(!host.is_executable_file(&plain));
    }

    #[test]
    fn test_read_prefix_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script");
        let contents = "#!/usr/bin/env python3\nprint('hi')\n";
        write_file(&path, contents, 0o755);

        let host = SystemHost::from_env();
        assert_eq!(host.read_prefix(&path, 9).unwrap(), b"#!/usr/bi");
        assert_eq!(host.read_prefix(&path, 1000).unwrap().len(), contents.len());
    }

    #[test]
    fn test_read_prefix_with_unbounded_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tempo-bin");
        write_file(&path, "#!/bin/sh\nexit 0\n", 0o755);

        let host = SystemHost::from_env();
        assert_eq!(
            host.read_prefix(&path, usize::MAX).unwrap(),
            b"#!/bin/sh\nexit 0\n"
        );
    }

    #[test]
    fn test_running_test_binary_is_launcher() {
        let host = SystemHost::from_env();
        let exe = std::env::current_exe().unwrap();
        assert!(host.is_launcher(&exe));

        let dir = tempfile::tempdir().unwrap();
        assert!(!host.is_launcher(dir.path()));
    }
}
