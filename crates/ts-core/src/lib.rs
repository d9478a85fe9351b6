//! Core logic for the tempo launcher.
//!
//! This crate decides which executable the launcher hands control to:
//! - Host: snapshot of `PATH`, home directory and the running executable
//! - Resolution: alias lookup on the search path, then well-known install paths
//! - Signature: rejecting script wrappers that share the delegate's name
//!
//! Resolution is a pure function of a [`Host`]; nothing here spawns processes.

pub mod host;
mod resolve;
pub mod signature;

pub use host::{Host, SystemHost};
pub use resolve::{
    Candidate, DEFAULT_ALIASES, DEFAULT_PROBE_PATHS, Origin, Rejection, ResolvedExecutable,
    SearchPlan, expand_home,
};
pub use signature::WrapperSignature;
