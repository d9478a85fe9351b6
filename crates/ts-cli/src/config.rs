//! Configuration loading and management.
//!
//! The launcher has no config file. Compiled defaults are overridden by
//! `TEMPO_LAUNCHER_*` environment variables, e.g.
//! `TEMPO_LAUNCHER_ALIASES='["tempo-bin"]'`.

use std::path::PathBuf;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Serialized};
use serde::{Deserialize, Serialize};

use ts_core::signature::{DEFAULT_SIGNATURES, DEFAULT_WINDOW};
use ts_core::{DEFAULT_ALIASES, DEFAULT_PROBE_PATHS, SearchPlan, WrapperSignature};

/// Prefix of every environment override.
pub const ENV_PREFIX: &str = "TEMPO_LAUNCHER_";

/// Log filter variable, kept apart from `RUST_LOG` which the delegate reads.
pub const LOG_ENV: &str = "TEMPO_LAUNCHER_LOG";

/// Launcher configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Names looked up on `PATH`, in order.
    pub aliases: Vec<String>,
    /// Install locations probed after `PATH`. A leading `~` is the home directory.
    pub probe_paths: Vec<PathBuf>,
    /// Case-insensitive markers of a script wrapper.
    pub wrapper_signatures: Vec<String>,
    /// Leading bytes inspected for a wrapper marker.
    pub signature_window: usize,
    /// How long to wait for the delegate after an interrupt before killing it.
    pub interrupt_grace_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            aliases: DEFAULT_ALIASES.iter().map(|a| (*a).to_string()).collect(),
            probe_paths: DEFAULT_PROBE_PATHS.iter().map(PathBuf::from).collect(),
            wrapper_signatures: DEFAULT_SIGNATURES.iter().map(|s| (*s).to_string()).collect(),
            signature_window: DEFAULT_WINDOW,
            interrupt_grace_ms: 250,
        }
    }
}

impl Config {
    /// Loads configuration from defaults and the environment.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    /// The provider stack used by [`Config::load`].
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["log"]))
    }

    pub fn search_plan(&self) -> SearchPlan {
        SearchPlan::new(
            self.aliases.clone(),
            self.probe_paths.clone(),
            WrapperSignature::new(&self.wrapper_signatures, self.signature_window),
        )
    }

    pub fn interrupt_grace(&self) -> Duration {
        Duration::from_millis(self.interrupt_grace_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use figment::providers::{Format, Toml};

    #[test]
    fn test_default_plan_matches_core_defaults() {
        assert_eq!(Config::default().search_plan(), SearchPlan::default());
    }

    #[test]
    fn test_defaults_extract_unchanged() {
        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .extract()
            .unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.interrupt_grace(), Duration::from_millis(250));
    }

    #[test]
    fn test_overrides_merge_over_defaults() {
        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::string(
                r#"
                aliases = ["tt-real"]
                signature_window = 128
                "#,
            ))
            .extract()
            .unwrap();

        assert_eq!(config.aliases, vec!["tt-real".to_string()]);
        assert_eq!(config.signature_window, 128);
        assert_eq!(config.probe_paths, Config::default().probe_paths);
        assert_eq!(config.search_plan().aliases(), ["tt-real".to_string()]);
    }

    #[test]
    fn test_invalid_override_is_an_error() {
        let result: Result<Config, _> = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::string(r#"interrupt_grace_ms = "soon""#))
            .extract();
        assert!(result.is_err());
    }
}
