//! Running the resolved delegate in place of the launcher.
//!
//! The child inherits stdin, stdout and stderr untouched and its exit code
//! becomes the launcher's. An interrupt reaches the child directly through
//! the terminal's process group; the launcher only listens for it so it can
//! report 130 instead of dying mid-wait.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;

use ts_core::ResolvedExecutable;

/// Exit code after an interrupt (128 + SIGINT).
pub const INTERRUPT_EXIT_CODE: i32 = 130;

/// Exit code for resolution and delegation failures.
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Failures while running the delegate.
#[derive(Debug, Error)]
pub enum DelegateError {
    #[error("failed to start runtime: {0}")]
    Runtime(#[source] io::Error),
    #[error("failed to listen for interrupts: {0}")]
    Signal(#[source] io::Error),
    #[error("failed to run {}: {source}", .path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed waiting for {}: {source}", .path.display())]
    Wait {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// How the delegate finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Ran to completion; carries the code the launcher should exit with.
    Exited(i32),
    /// The user interrupted the launcher while the delegate was running.
    Interrupted,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Exited(code) => code,
            Self::Interrupted => INTERRUPT_EXIT_CODE,
        }
    }
}

/// Spawns `target` with `args` and blocks until it exits.
///
/// After an interrupt the delegate gets `grace` to exit on its own before it
/// is killed. The kill is not graceful: a delegate that needs longer than
/// `grace` to shut down cleanly (e.g. the daemon flushing state) loses that
/// work. Raise `interrupt_grace_ms` for such delegates.
pub fn delegate(
    target: &ResolvedExecutable,
    args: &[OsString],
    grace: Duration,
) -> Result<Outcome, DelegateError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(DelegateError::Runtime)?;
    runtime.block_on(run_child(target.path(), args, grace))
}

async fn run_child(
    path: &Path,
    args: &[OsString],
    grace: Duration,
) -> Result<Outcome, DelegateError> {
    // Registered before spawning so an early Ctrl-C cannot kill the launcher outright.
    let mut interrupt = Interrupt::listen().map_err(DelegateError::Signal)?;

    let mut child = Command::new(path)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| DelegateError::Spawn {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!(path = ?path, pid = ?child.id(), args = args.len(), "spawned delegate");

    tokio::select! {
        status = child.wait() => {
            let status = status.map_err(|source| DelegateError::Wait {
                path: path.to_path_buf(),
                source,
            })?;
            tracing::debug!(%status, "delegate exited");
            Ok(Outcome::Exited(exit_code(status)))
        }
        () = interrupt.recv() => {
            tracing::debug!("interrupted while delegate running");
            match tokio::time::timeout(grace, child.wait()).await {
                Ok(Ok(status)) => tracing::debug!(%status, "delegate exited after interrupt"),
                Ok(Err(err)) => tracing::warn!(error = %err, "failed waiting for delegate"),
                Err(_) => {
                    tracing::warn!(?grace, "delegate still running after interrupt, killing it");
                    if let Err(err) = child.kill().await {
                        tracing::warn!(error = %err, "failed to kill delegate");
                    }
                }
            }
            Ok(Outcome::Interrupted)
        }
    }
}

/// Maps a child's exit status to the launcher's exit code.
///
/// A child killed by signal `n` maps to `128 + n`, as shells report it.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    FAILURE_EXIT_CODE
}

#[cfg(unix)]
struct Interrupt(tokio::signal::unix::Signal);

#[cfg(unix)]
impl Interrupt {
    fn listen() -> io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};
        signal(SignalKind::interrupt()).map(Self)
    }

    async fn recv(&mut self) {
        if self.0.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(windows)]
struct Interrupt(tokio::signal::windows::CtrlC);

#[cfg(windows)]
impl Interrupt {
    fn listen() -> io::Result<Self> {
        tokio::signal::windows::ctrl_c().map(Self)
    }

    async fn recv(&mut self) {
        if self.0.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    use std::os::unix::fs::PermissionsExt;
    use std::os::unix::process::ExitStatusExt;

    use ts_core::{SearchPlan, SystemHost, WrapperSignature};

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn resolve(path: &Path) -> ResolvedExecutable {
        SearchPlan::new(
            Vec::new(),
            vec![path.to_path_buf()],
            WrapperSignature::default(),
        )
        .resolve(&SystemHost::from_env())
        .unwrap()
    }

    fn run(path: &Path, args: &[&str]) -> Result<Outcome, DelegateError> {
        let args: Vec<OsString> = args.iter().map(OsString::from).collect();
        delegate(&resolve(path), &args, Duration::from_millis(250))
    }

    #[test]
    fn test_exit_codes_propagate() {
        let dir = tempfile::tempdir().unwrap();
        for code in [0, 1, 2] {
            let script = write_script(dir.path(), &format!("exit{code}"), &format!("exit {code}"));
            assert_eq!(run(&script, &[]).unwrap(), Outcome::Exited(code));
        }
    }

    #[test]
    fn test_arguments_forwarded_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("args.txt");
        let script = write_script(
            dir.path(),
            "record",
            &format!(
                "for arg in \"$@\"; do printf '%s\\n' \"$arg\"; done > '{}'",
                out.display()
            ),
        );

        let args = ["session", "start", "--", "-h", "two words", ""];
        assert_eq!(run(&script, &args).unwrap(), Outcome::Exited(0));

        let recorded = std::fs::read_to_string(&out).unwrap();
        let recorded: Vec<&str> = recorded.split_terminator('\n').collect();
        assert_eq!(recorded, args);
    }

    #[test]
    fn test_vanished_executable_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "gone", "exit 0");
        let target = resolve(&script);
        std::fs::remove_file(&script).unwrap();

        let err = delegate(&target, &[], Duration::from_millis(250)).unwrap_err();
        assert!(matches!(err, DelegateError::Spawn { .. }));
        assert!(err.to_string().starts_with("failed to run "));
    }

    #[test]
    fn test_exit_code_mapping() {
        assert_eq!(exit_code(ExitStatus::from_raw(0)), 0);
        assert_eq!(exit_code(ExitStatus::from_raw(3 << 8)), 3);
        // Killed by SIGINT / SIGKILL.
        assert_eq!(exit_code(ExitStatus::from_raw(2)), 130);
        assert_eq!(exit_code(ExitStatus::from_raw(9)), 137);
    }

    #[test]
    fn test_outcome_exit_codes() {
        assert_eq!(Outcome::Exited(2).exit_code(), 2);
        assert_eq!(Outcome::Interrupted.exit_code(), INTERRUPT_EXIT_CODE);
    }
}
