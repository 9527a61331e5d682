//! Pipeline configuration: a base directory plus the artifact file names,
//! passed explicitly to every load and save instead of being derived from
//! ambient process state.

use std::path::{Path, PathBuf};

use crate::errors::RunnerError;

/// Where the pipeline reads and writes its artifacts. The defaults mirror the
/// conventional file set: `model.compiled`, `settings.json`, `kzg`,
/// `input.json`, `vk.key`, `pk.key`, `witness.json`, `proof.json`. The
/// witness and proof files carry framed binary payloads despite their `.json`
/// extensions.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
  pub dir:           PathBuf,
  pub circuit_file:  String,
  pub settings_file: String,
  pub srs_file:      String,
  pub input_file:    String,
  pub vk_file:       String,
  pub pk_file:       String,
  pub witness_file:  String,
  pub proof_file:    String,
}

impl PipelineConfig {
  pub fn new(dir: impl Into<PathBuf>) -> PipelineConfig {
    PipelineConfig {
      dir:           dir.into(),
      circuit_file:  "model.compiled".into(),
      settings_file: "settings.json".into(),
      srs_file:      "kzg".into(),
      input_file:    "input.json".into(),
      vk_file:       "vk.key".into(),
      pk_file:       "pk.key".into(),
      witness_file:  "witness.json".into(),
      proof_file:    "proof.json".into(),
    }
  }

  pub fn path(&self, file: &str) -> PathBuf { self.dir.join(file) }

  pub fn load(&self, file: &str) -> Result<Vec<u8>, RunnerError> {
    let path = self.path(file);
    std::fs::read(&path).map_err(|source| RunnerError::Io { path, source })
  }

  pub fn save(&self, file: &str, bytes: &[u8]) -> Result<(), RunnerError> {
    std::fs::create_dir_all(&self.dir)
      .map_err(|source| RunnerError::Io { path: self.dir.clone(), source })?;
    let path = self.path(file);
    std::fs::write(&path, bytes).map_err(|source| RunnerError::Io { path, source })
  }

  pub fn exists(&self, file: &str) -> bool { Path::exists(&self.path(file)) }
}

impl Default for PipelineConfig {
  fn default() -> Self { PipelineConfig::new(".") }
}
