//! Tempo launcher library.
//!
//! Shared pieces of the `tempo` launcher and the `tempo-install` installer.

mod cli;
pub mod config;
pub mod delegate;
pub mod guidance;
pub mod install;
pub mod logging;

pub use cli::InstallCli;
pub use config::Config;
pub use delegate::{DelegateError, Outcome};
