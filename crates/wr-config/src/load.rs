//! Resolve, read, parse and validate both config files in one step.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::resolve::{resolve_config, ConfigPaths};
use crate::snapshot::ConfigSnapshot;
use crate::validate::{validate_policy, validate_priors, ValidationError};
use crate::{Policy, Priors};

/// Which configuration file an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    Priors,
    Policy,
}

impl std::fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigKind::Priors => write!(f, "priors"),
            ConfigKind::Policy => write!(f, "policy"),
        }
    }
}

/// Errors from loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error reading {kind} file {path}: {source}")]
    Io {
        kind: ConfigKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {kind} file {path}: {source}")]
    Parse {
        kind: ConfigKind,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{kind} validation failed: {source}")]
    Invalid {
        kind: ConfigKind,
        #[source]
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn kind(&self) -> ConfigKind {
        match self {
            ConfigError::Io { kind, .. }
            | ConfigError::Parse { kind, .. }
            | ConfigError::Invalid { kind, .. } => *kind,
        }
    }
}

impl From<ConfigError> for wr_common::Error {
    fn from(err: ConfigError) -> Self {
        let message = err.to_string();
        match err {
            ConfigError::Io { .. } => wr_common::Error::Config(message),
            _ => match err.kind() {
                ConfigKind::Priors => wr_common::Error::InvalidPriors(message),
                ConfigKind::Policy => wr_common::Error::InvalidPolicy(message),
            },
        }
    }
}

/// Validated configuration with provenance.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub priors: Priors,
    pub policy: Policy,
    pub paths: ConfigPaths,
    pub snapshot: ConfigSnapshot,
}

impl Default for LoadedConfig {
    fn default() -> Self {
        Self {
            priors: Priors::default(),
            policy: Policy::default(),
            paths: ConfigPaths::default(),
            snapshot: ConfigSnapshot::defaults_only(),
        }
    }
}

/// Resolve and load priors and policy.
///
/// Files that are not found anywhere fall back to defaults; a file that is
/// found but unreadable, malformed or invalid is an error.
pub fn load_config(
    cli_priors: Option<&Path>,
    cli_policy: Option<&Path>,
) -> Result<LoadedConfig, ConfigError> {
    let paths = resolve_config(cli_priors, cli_policy);

    let (priors, priors_json) = match &paths.priors {
        Some(path) => {
            let text = read(ConfigKind::Priors, path)?;
            let priors: Priors = parse(ConfigKind::Priors, path, &text)?;
            (priors, Some(text))
        }
        None => (Priors::default(), None),
    };
    let (policy, policy_json) = match &paths.policy {
        Some(path) => {
            let text = read(ConfigKind::Policy, path)?;
            let policy: Policy = parse(ConfigKind::Policy, path, &text)?;
            (policy, Some(text))
        }
        None => (Policy::default(), None),
    };

    validate_priors(&priors).map_err(|source| ConfigError::Invalid {
        kind: ConfigKind::Priors,
        source,
    })?;
    validate_policy(&policy).map_err(|source| ConfigError::Invalid {
        kind: ConfigKind::Policy,
        source,
    })?;

    let snapshot = ConfigSnapshot::new(
        &priors,
        &policy,
        &paths,
        priors_json.as_deref(),
        policy_json.as_deref(),
    );

    Ok(LoadedConfig {
        priors,
        policy,
        paths,
        snapshot,
    })
}

fn read(kind: ConfigKind, path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        kind,
        path: path.to_path_buf(),
        source,
    })
}

fn parse<T: serde::de::DeserializeOwned>(
    kind: ConfigKind,
    path: &Path,
    text: &str,
) -> Result<T, ConfigError> {
    serde_json::from_str(text).map_err(|source| ConfigError::Parse {
        kind,
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_maps_to_common_taxonomy() {
        let err = ConfigError::Invalid {
            kind: ConfigKind::Policy,
            source: ValidationError::SemanticError("bad".into()),
        };
        let common: wr_common::Error = err.into();
        assert_eq!(common.code(), 22);

        let err = ConfigError::Io {
            kind: ConfigKind::Priors,
            path: PathBuf::from("/missing"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        let common: wr_common::Error = err.into();
        assert_eq!(common.code(), 20);
    }

    #[test]
    fn test_missing_cli_file_is_io_error() {
        let err = load_config(Some(Path::new("/nonexistent/priors.json")), None).unwrap_err();
        assert!(matches!(err, ConfigError::Io { kind: ConfigKind::Priors, .. }));
    }
}
