//! Priority-ordered lookup of the native delegate executable.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::host::Host;
use crate::signature::WrapperSignature;

/// Alternate names the delegate may be installed under, in priority order.
pub const DEFAULT_ALIASES: &[&str] = &["tempo-bin", "tempo-rs"];

/// Well-known install locations probed when the search path has no match.
pub const DEFAULT_PROBE_PATHS: &[&str] = &[
    "~/.cargo/bin/tempo",
    "/usr/local/bin/tempo-bin",
    "/opt/homebrew/bin/tempo-bin",
];

/// Where a candidate came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Found on the executable-search path under `alias`.
    SearchPath { alias: String },
    /// One of the configured well-known install paths.
    WellKnown,
}

/// A path under consideration during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub origin: Origin,
}

/// Why a candidate was skipped.
#[derive(Debug, Error)]
pub enum Rejection {
    #[error("not an executable regular file")]
    NotExecutable,
    #[error("is the running launcher")]
    Launcher,
    #[error("looks like a wrapper script (found {signature:?})")]
    WrapperScript { signature: String },
    #[error("unreadable: {0}")]
    Unreadable(#[from] io::Error),
}

/// A validated delegate executable.
///
/// Only [`SearchPlan::resolve`] constructs these, so holding one means the
/// path passed every check at resolution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedExecutable {
    path: PathBuf,
    origin: Origin,
}

impl ResolvedExecutable {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.path
    }
}

impl AsRef<Path> for ResolvedExecutable {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// Ordered aliases, well-known probe paths, and the wrapper check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPlan {
    aliases: Vec<String>,
    probe_paths: Vec<PathBuf>,
    signature: WrapperSignature,
}

impl Default for SearchPlan {
    fn default() -> Self {
        Self::new(
            DEFAULT_ALIASES.iter().map(|a| (*a).to_string()).collect(),
            DEFAULT_PROBE_PATHS.iter().map(PathBuf::from).collect(),
            WrapperSignature::default(),
        )
    }
}

impl SearchPlan {
    pub fn new(
        aliases: Vec<String>,
        probe_paths: Vec<PathBuf>,
        signature: WrapperSignature,
    ) -> Self {
        Self {
            aliases,
            probe_paths,
            signature,
        }
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn probe_paths(&self) -> &[PathBuf] {
        &self.probe_paths
    }

    /// Returns the first candidate that passes validation.
    ///
    /// Candidates are produced lazily: search-path hits for each alias in
    /// order, then the well-known paths. Nothing past the accepted candidate
    /// is touched.
    pub fn resolve<H: Host>(&self, host: &H) -> Option<ResolvedExecutable> {
        self.candidates(host).find_map(|candidate| {
            match self.validate(host, &candidate.path) {
                Ok(()) => {
                    tracing::debug!(
                        path = ?candidate.path,
                        origin = ?candidate.origin,
                        "resolved delegate"
                    );
                    Some(ResolvedExecutable {
                        path: candidate.path,
                        origin: candidate.origin,
                    })
                }
                Err(rejection) => {
                    tracing::debug!(
                        path = ?candidate.path,
                        reason = %rejection,
                        "skipping candidate"
                    );
                    None
                }
            }
        })
    }

    /// Lazily enumerates candidates in priority order.
    pub fn candidates<'a, H: Host>(
        &'a self,
        host: &'a H,
    ) -> impl Iterator<Item = Candidate> + 'a {
        let on_path = self.aliases.iter().flat_map(move |alias| {
            host.search_path(alias)
                .into_iter()
                .map(move |path| Candidate {
                    path,
                    origin: Origin::SearchPath {
                        alias: alias.clone(),
                    },
                })
        });

        let well_known = self.probe_paths.iter().filter_map(move |probe| {
            let path = expand_home(probe, host.home_dir().as_deref())?;
            if !path.is_absolute() {
                tracing::debug!(path = ?probe, "ignoring relative probe path");
                return None;
            }
            Some(Candidate {
                path,
                origin: Origin::WellKnown,
            })
        });

        on_path.chain(well_known)
    }

    /// Checks one candidate against every rule.
    pub fn validate<H: Host>(&self, host: &H, path: &Path) -> Result<(), Rejection> {
        if !host.is_executable_file(path) {
            return Err(Rejection::NotExecutable);
        }
        if host.is_launcher(path) {
            return Err(Rejection::Launcher);
        }
        let prefix = host.read_prefix(path, self.signature.window())?;
        if let Some(signature) = self.signature.find_in(&prefix) {
            return Err(Rejection::WrapperScript {
                signature: signature.to_string(),
            });
        }
        Ok(())
    }
}

/// Expands a leading `~` component. Returns `None` when one is present but
/// no home directory is known.
pub fn expand_home(path: &Path, home: Option<&Path>) -> Option<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) => home.map(|home| home.join(rest)),
        Err(_) => Some(path.to_path_buf()),
    }
}
