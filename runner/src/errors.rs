//! Error type for the `runner` crate.
//!
//! Every pipeline failure is represented here and propagated to `main`, which
//! returns `Result` and therefore exits non-zero. Nothing is swallowed.

use std::path::PathBuf;

use engine::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
  /// The error is a std::io::Error, annotated with the file it hit
  #[error("i/o error on {}: {source}", path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The error is an engine::EngineError
  #[error(transparent)]
  Engine(#[from] EngineError),

  /// The error is a serde_json::Error
  #[error(transparent)]
  Serde(#[from] serde_json::Error),

  /// A loaded artifact failed the backend's validator
  #[error("invalid {0} artifact")]
  InvalidArtifact(&'static str),

  /// The input file failed validation before witness generation
  #[error("Invalid input format")]
  InvalidInput,

  /// The proof did not verify against the verification key
  #[error("Proof verification failed")]
  ProofVerification,

  /// A `--seed` flag value was not 32 hex-encoded bytes
  #[error("invalid seed: {0}")]
  InvalidSeed(String),
}
