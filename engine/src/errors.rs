//! Error type for the `engine` crate.
//!
//! Every fallible engine operation returns [`EngineError`]. Artifact decode
//! failures carry the artifact kind and a reason so the runner can report
//! which file on disk is bad; mismatches between an artifact and its declared
//! upstream inputs get their own variants because they indicate mis-wired
//! files rather than corrupt ones.
use thiserror::Error;

#[derive(Debug, Error)]
/// Wrapper for dusk_plonk::prelude::Error since it doesn't implement Display
pub enum PlonkBackendError {
  /// The error is a dusk_plonk::prelude::Error
  Plonk(dusk_plonk::prelude::Error),
}

impl std::fmt::Display for PlonkBackendError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{:?}", self) }
}

impl From<dusk_plonk::prelude::Error> for EngineError {
  fn from(err: dusk_plonk::prelude::Error) -> EngineError {
    EngineError::PlonkBackend(PlonkBackendError::Plonk(err))
  }
}

impl From<Box<bincode::ErrorKind>> for EngineError {
  fn from(err: Box<bincode::ErrorKind>) -> EngineError { EngineError::Bincode(*err) }
}

/// Represents the various error conditions that can occur within the `engine` crate.
#[derive(Debug, Error)]
pub enum EngineError {
  /// An artifact envelope or payload failed to decode
  #[error("malformed {kind} artifact: {reason}")]
  Malformed { kind: String, reason: String },

  /// The gate program violates a structural rule (SSA order, wire range, ...)
  #[error("invalid circuit structure: {0}")]
  CircuitStructure(String),

  /// The input file does not carry one value per circuit input wire
  #[error("input has {found} values, circuit expects {expected}")]
  InputLength { expected: usize, found: usize },

  /// An `assert_eq` gate did not hold under the supplied inputs
  #[error("assert_eq gate at index {0} is unsatisfied")]
  UnsatisfiedAssertion(usize),

  /// A requested SRS size is outside the supported range
  #[error("logrows {found} out of range (must be between 1 and {max})")]
  SrsSize { found: u32, max: u32 },

  /// An artifact's recorded upstream digest does not match the supplied file
  #[error("{artifact} artifact does not match the supplied {upstream} (digest mismatch)")]
  DigestMismatch { artifact: &'static str, upstream: &'static str },

  /// Recompilation produced a verifier different from the supplied verification key
  #[error("regenerated verifier does not match the supplied verification key")]
  KeyMismatch,

  /// The prover returned public inputs that differ from the witness instance
  #[error("prover public inputs do not match the witness instance")]
  InstanceMismatch,

  /// Settings and proof disagree on the public instance size
  #[error("settings expect an instance of {expected} values, proof carries {found}")]
  ShapeMismatch { expected: usize, found: usize },

  /// The error is a wrapped dusk_plonk::Error
  #[error(transparent)]
  PlonkBackend(#[from] PlonkBackendError),

  /// The error is a serde_json::Error
  #[error(transparent)]
  Serde(#[from] serde_json::Error),

  /// The error is a bincode::ErrorKind
  #[error(transparent)]
  Bincode(bincode::ErrorKind),

  /// The error is a rand::Error
  #[error(transparent)]
  Rand(#[from] rand::Error),
}
