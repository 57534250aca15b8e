//! Error types for the rabeflow pipeline.
//!
//! Every variant here is fatal to the run: the executor stops at the first
//! failing chain and the binary maps the error to a process exit status.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for pipeline runs.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The sample type argument was not one of the supported values.
    #[error("unsupported sample type '{0}' (expected 'dna' or 'rna')")]
    UnsupportedSampleType(String),

    /// The input alignment file does not exist or cannot be read.
    #[error("sample BAM is not readable: {path}")]
    InputUnreadable {
        /// The unreadable input path.
        path: PathBuf,
    },

    /// The output directory could not be created.
    ///
    /// An already-existing directory is not an error and never produces
    /// this variant.
    #[error("could not create output directory {path}: {source}")]
    DirectoryCreate {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Tool or reference configuration could not be resolved.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// A stage in a chain could not be started.
    #[error("stage '{stage}' could not be launched: {reason}")]
    ProcessLaunch {
        /// The stage that failed to start.
        stage: String,
        /// The launch failure description.
        reason: String,
    },

    /// A chain's terminal stage exited with a non-zero status.
    #[error("chain '{chain}' failed with exit status {code}")]
    StageExitNonZero {
        /// The failing chain's name.
        chain: String,
        /// The terminal stage's exit code.
        code: i32,
    },
}

impl PipelineError {
    /// Maps the error to the process exit status of the CLI contract.
    ///
    /// Exit 1 covers argument problems and stage/chain failures; exit 2
    /// covers an unusable environment (unreadable input, directory
    /// creation failure, unresolvable configuration).
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UnsupportedSampleType(_)
            | Self::ProcessLaunch { .. }
            | Self::StageExitNonZero { .. } => 1,
            Self::InputUnreadable { .. } | Self::DirectoryCreate { .. } | Self::Config(_) => 2,
        }
    }
}

/// Errors raised while resolving the tool configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("could not read config file {path}: {source}")]
    Unreadable {
        /// The config file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file could not be parsed.
    #[error("could not parse config file {path}: {source}")]
    Parse {
        /// The config file path.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A required setting has no value from any source.
    #[error("missing required setting '{key}' (set it in the config file or via {env_var})")]
    MissingSetting {
        /// The config file key.
        key: &'static str,
        /// The environment variable that can supply the value.
        env_var: &'static str,
    },
}
