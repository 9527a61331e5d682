//! KZG structured reference string artifact. The parameters are generated
//! locally with a seedable RNG for testing and development; a production
//! deployment would import the output of a real trusted-setup ceremony
//! instead.

use dusk_plonk::prelude::PublicParameters;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::{
  artifact::{self, ArtifactKind},
  errors::EngineError,
};

/// Largest supported circuit capacity exponent. Keeps the `1 << logrows`
/// degree computation well inside `usize` and the parameter set inside
/// memory.
pub const MAX_LOGROWS: u32 = 26;

/// Payload of the SRS artifact (`kzg` on disk).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SrsData {
  pub max_degree: usize,
  pub params:     Vec<u8>,
}

/// Generate commitment parameters supporting circuits of up to `2^logrows`
/// gates. A fixed seed gives reproducible parameters.
pub fn generate(logrows: u32, seed: Option<[u8; 32]>) -> Result<Vec<u8>, EngineError> {
  if logrows == 0 || logrows > MAX_LOGROWS {
    return Err(EngineError::SrsSize { found: logrows, max: MAX_LOGROWS });
  }
  let max_degree = 1usize << logrows;
  let mut rng = match seed {
    Some(seed) => ChaCha20Rng::from_seed(seed),
    None => ChaCha20Rng::from_rng(rand::thread_rng())?,
  };
  let pp = PublicParameters::setup(max_degree, &mut rng)?;
  artifact::encode(ArtifactKind::Srs, &SrsData { max_degree, params: pp.to_var_bytes() })
}

/// Decode an SRS artifact and parse its parameters with checked point
/// decoding.
pub fn load(bytes: &[u8]) -> Result<(SrsData, PublicParameters), EngineError> {
  let data: SrsData = artifact::decode(ArtifactKind::Srs, bytes)?;
  let pp = PublicParameters::from_slice(&data.params)?;
  Ok((data, pp))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn seeded_generation_is_reproducible() {
    let a = generate(4, Some([7u8; 32])).unwrap();
    let b = generate(4, Some([7u8; 32])).unwrap();
    assert_eq!(a, b);
    assert!(load(&a).is_ok());
  }

  #[test]
  fn rejects_out_of_range_logrows() {
    for logrows in [0, MAX_LOGROWS + 1, 64, u32::MAX] {
      assert!(matches!(
        generate(logrows, Some([7u8; 32])),
        Err(EngineError::SrsSize { found, .. }) if found == logrows
      ));
    }
  }

  #[test]
  fn rejects_truncated_parameters() {
    let bytes = generate(4, Some([7u8; 32])).unwrap();
    assert!(load(&bytes[..bytes.len() - 8]).is_err());
  }
}
