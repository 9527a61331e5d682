//! # Artifact envelope
//!
//! Every binary artifact the pipeline persists shares one framed encoding:
//! a 4-byte magic number, one byte naming the artifact kind, one byte for the
//! format version, then a bincode payload. The header check is the structural
//! validation the pipeline applies before handing bytes to the backend, and
//! the kind byte stops a proving key from being fed where a witness belongs.

use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::EngineError;

pub const MAGIC: [u8; 4] = *b"ZKRN";
pub const FORMAT_VERSION: u8 = 1;
pub const HEADER_LEN: usize = 6;

/// Kind byte carried in every artifact header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ArtifactKind {
  Circuit         = 1,
  Srs             = 2,
  VerificationKey = 3,
  ProvingKey      = 4,
  Witness         = 5,
  Proof           = 6,
}

impl ArtifactKind {
  pub fn label(self) -> &'static str {
    match self {
      ArtifactKind::Circuit => "compiled circuit",
      ArtifactKind::Srs => "SRS",
      ArtifactKind::VerificationKey => "verification key",
      ArtifactKind::ProvingKey => "proving key",
      ArtifactKind::Witness => "witness",
      ArtifactKind::Proof => "proof",
    }
  }

  fn from_u8(value: u8) -> Option<ArtifactKind> {
    match value {
      1 => Some(ArtifactKind::Circuit),
      2 => Some(ArtifactKind::Srs),
      3 => Some(ArtifactKind::VerificationKey),
      4 => Some(ArtifactKind::ProvingKey),
      5 => Some(ArtifactKind::Witness),
      6 => Some(ArtifactKind::Proof),
      _ => None,
    }
  }
}

impl std::fmt::Display for ArtifactKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.label()) }
}

fn malformed(kind: &str, reason: impl Into<String>) -> EngineError {
  EngineError::Malformed { kind: kind.to_string(), reason: reason.into() }
}

/// Frame `payload` as a `kind` artifact.
pub fn encode<T: Serialize>(kind: ArtifactKind, payload: &T) -> Result<Vec<u8>, EngineError> {
  let mut out = Vec::with_capacity(HEADER_LEN + 128);
  out.extend_from_slice(&MAGIC);
  out.push(kind as u8);
  out.push(FORMAT_VERSION);
  bincode::serialize_into(&mut out, payload)?;
  Ok(out)
}

/// Check the envelope header and return the artifact kind without decoding
/// the payload.
pub fn peek_kind(bytes: &[u8]) -> Result<ArtifactKind, EngineError> {
  if bytes.len() < HEADER_LEN {
    return Err(malformed("artifact", format!("truncated header ({} bytes)", bytes.len())));
  }
  if bytes[..4] != MAGIC {
    return Err(malformed("artifact", "bad magic number"));
  }
  let kind = ArtifactKind::from_u8(bytes[4])
    .ok_or_else(|| malformed("artifact", format!("unknown kind byte {:#04x}", bytes[4])))?;
  if bytes[5] != FORMAT_VERSION {
    return Err(malformed(
      kind.label(),
      format!("unsupported format version {} (expected {})", bytes[5], FORMAT_VERSION),
    ));
  }
  Ok(kind)
}

/// Decode the payload of a `kind` artifact.
pub fn decode<T: DeserializeOwned>(kind: ArtifactKind, bytes: &[u8]) -> Result<T, EngineError> {
  let found = peek_kind(bytes)?;
  if found != kind {
    return Err(malformed(kind.label(), format!("file contains a {} artifact", found)));
  }
  bincode::deserialize(&bytes[HEADER_LEN..])
    .map_err(|err| malformed(kind.label(), err.to_string()))
}

/// SHA-256 over complete artifact file bytes. Later-stage artifacts record
/// the digests of their upstream inputs under this function.
pub fn digest(bytes: &[u8]) -> [u8; 32] {
  let mut out = [0u8; 32];
  out.copy_from_slice(&Sha256::digest(bytes));
  out
}
