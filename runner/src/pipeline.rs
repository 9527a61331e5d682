//! # Pipeline
//!
//! The fixed call sequence over the proving backend: load and validate the
//! on-disk artifacts, generate keys, generate a witness, prove, verify. Each
//! stage persists its artifact before the next stage starts, and the prove
//! stage reloads the witness and proving key from disk rather than reusing
//! them from memory, so every run exercises the durability of the persisted
//! state. A `false` from any validator aborts the pipeline.

use engine::ProofSystem;
use tracing::{debug, error, info};

use crate::{config::PipelineConfig, errors::RunnerError};

pub struct Pipeline<'a> {
  system: &'a dyn ProofSystem,
  config: &'a PipelineConfig,
}

impl<'a> Pipeline<'a> {
  pub fn new(system: &'a dyn ProofSystem, config: &'a PipelineConfig) -> Pipeline<'a> {
    Pipeline { system, config }
  }

  fn load_circuit(&self) -> Result<Vec<u8>, RunnerError> {
    let bytes = self.config.load(&self.config.circuit_file)?;
    if !self.system.validate_circuit(&bytes) {
      return Err(RunnerError::InvalidArtifact("compiled circuit"));
    }
    debug!("loaded compiled circuit ({} bytes)", bytes.len());
    Ok(bytes)
  }

  fn load_settings(&self) -> Result<Vec<u8>, RunnerError> {
    let bytes = self.config.load(&self.config.settings_file)?;
    if !self.system.validate_settings(&bytes) {
      return Err(RunnerError::InvalidArtifact("settings"));
    }
    debug!("loaded settings ({} bytes)", bytes.len());
    Ok(bytes)
  }

  fn load_srs(&self) -> Result<Vec<u8>, RunnerError> {
    let bytes = self.config.load(&self.config.srs_file)?;
    if !self.system.validate_srs(&bytes) {
      return Err(RunnerError::InvalidArtifact("SRS"));
    }
    debug!("loaded SRS ({} bytes)", bytes.len());
    Ok(bytes)
  }

  fn load_input(&self) -> Result<Vec<u8>, RunnerError> {
    let bytes = self.config.load(&self.config.input_file)?;
    if !self.system.validate_input(&bytes) {
      return Err(RunnerError::InvalidInput);
    }
    debug!("loaded input ({} bytes)", bytes.len());
    Ok(bytes)
  }

  /// Generate and persist the verification and proving keys.
  pub async fn keygen(&self) -> Result<(), RunnerError> {
    let circuit = self.load_circuit()?;
    let srs = self.load_srs()?;
    info!("generating verification key");
    let vk = self.system.gen_vk(&circuit, &srs).await?;
    self.config.save(&self.config.vk_file, &vk)?;
    info!("wrote {} ({} bytes)", self.config.vk_file, vk.len());
    info!("generating proving key");
    let pk = self.system.gen_pk(&circuit, &srs, &vk).await?;
    self.config.save(&self.config.pk_file, &pk)?;
    info!("wrote {} ({} bytes)", self.config.pk_file, pk.len());
    Ok(())
  }

  /// Generate and persist the witness from the input file.
  pub async fn witness(&self) -> Result<(), RunnerError> {
    let circuit = self.load_circuit()?;
    let input = self.load_input()?;
    info!("generating witness");
    let witness = self.system.gen_witness(&circuit, &input).await?;
    self.config.save(&self.config.witness_file, &witness)?;
    info!("wrote {} ({} bytes)", self.config.witness_file, witness.len());
    match self.system.describe(&witness) {
      Ok(summary) => debug!(%summary, "witness artifact"),
      Err(err) => debug!("could not describe witness artifact: {err}"),
    }
    Ok(())
  }

  /// Generate and persist the proof. The witness and proving key are read
  /// back from disk, not reused from memory.
  pub async fn prove(&self) -> Result<(), RunnerError> {
    let circuit = self.load_circuit()?;
    let srs = self.load_srs()?;
    let witness = self.config.load(&self.config.witness_file)?;
    let pk = self.config.load(&self.config.pk_file)?;
    info!("generating proof");
    let proof = match self.system.prove(&witness, &pk, &circuit, &srs).await {
      Ok(proof) => proof,
      Err(err) => {
        error!("proof generation failed: {err}");
        return Err(err.into());
      },
    };
    self.config.save(&self.config.proof_file, &proof)?;
    info!("wrote {} ({} bytes)", self.config.proof_file, proof.len());
    match self.system.describe(&proof) {
      Ok(summary) => debug!(%summary, "proof artifact"),
      Err(err) => debug!("could not describe proof artifact: {err}"),
    }
    Ok(())
  }

  /// Verify the persisted proof against the verification key, settings, and
  /// SRS.
  pub async fn verify(&self) -> Result<(), RunnerError> {
    let settings = self.load_settings()?;
    let srs = self.load_srs()?;
    let vk = self.config.load(&self.config.vk_file)?;
    let proof = self.config.load(&self.config.proof_file)?;
    info!("verifying proof");
    match self.system.verify(&proof, &vk, &settings, &srs).await {
      Ok(true) => {
        info!("proof verified");
        Ok(())
      },
      Ok(false) => {
        error!("Proof verification failed");
        Err(RunnerError::ProofVerification)
      },
      Err(err) => {
        error!("proof verification failed: {err}");
        Err(err.into())
      },
    }
  }

  /// The full pipeline: keygen, witness, prove, verify, strictly in sequence.
  pub async fn run(&self) -> Result<(), RunnerError> {
    // Settings are only consumed at the verify stage, but a bad file should
    // fail the run before any key generation work starts.
    self.load_settings()?;
    self.keygen().await?;
    self.witness().await?;
    self.prove().await?;
    self.verify().await
  }
}

#[cfg(test)]
mod tests {
  use engine::MockSystem;
  use tempdir::TempDir;

  use super::*;

  fn fixture(dir: &TempDir) -> PipelineConfig {
    let config = PipelineConfig::new(dir.path());
    config.save(&config.circuit_file, b"circuit").unwrap();
    config.save(&config.settings_file, b"settings").unwrap();
    config.save(&config.srs_file, b"srs").unwrap();
    config.save(&config.input_file, b"input").unwrap();
    config
  }

  #[tokio::test]
  #[tracing_test::traced_test]
  async fn run_persists_every_artifact() {
    let dir = TempDir::new("zkrun-pipeline").unwrap();
    let config = fixture(&dir);
    let mock = MockSystem::new();
    Pipeline::new(&mock, &config).run().await.unwrap();
    for file in [&config.vk_file, &config.pk_file, &config.witness_file, &config.proof_file] {
      assert!(!config.load(file).unwrap().is_empty(), "{file} missing or empty");
    }
    let calls = mock.calls();
    let stages: Vec<_> = calls
      .iter()
      .filter(|call| !call.starts_with("validate") && **call != "describe")
      .collect();
    assert_eq!(stages, vec![&"gen_vk", &"gen_pk", &"gen_witness", &"prove", &"verify"]);
  }

  #[tokio::test]
  async fn invalid_input_aborts_before_witness_generation() {
    let dir = TempDir::new("zkrun-pipeline").unwrap();
    let config = fixture(&dir);
    let mock = MockSystem::rejecting("validate_input");
    let err = Pipeline::new(&mock, &config).witness().await.unwrap_err();
    assert!(matches!(err, RunnerError::InvalidInput));
    assert_eq!(err.to_string(), "Invalid input format");
    assert!(!mock.calls().contains(&"gen_witness"));
    assert!(!config.exists(&config.witness_file));
  }

  #[tokio::test]
  async fn any_rejected_validator_aborts() {
    for (validator, artifact) in [
      ("validate_circuit", "compiled circuit"),
      ("validate_settings", "settings"),
      ("validate_srs", "SRS"),
    ] {
      let dir = TempDir::new("zkrun-pipeline").unwrap();
      let config = fixture(&dir);
      let mock = MockSystem::rejecting(validator);
      let err = Pipeline::new(&mock, &config).run().await.unwrap_err();
      match err {
        RunnerError::InvalidArtifact(name) => assert_eq!(name, artifact),
        other => panic!("expected InvalidArtifact, got {other}"),
      }
    }
  }

  #[tokio::test]
  async fn bad_settings_fail_before_key_generation() {
    let dir = TempDir::new("zkrun-pipeline").unwrap();
    let config = fixture(&dir);
    let mock = MockSystem::rejecting("validate_settings");
    let err = Pipeline::new(&mock, &config).run().await.unwrap_err();
    assert!(matches!(err, RunnerError::InvalidArtifact("settings")));
    assert!(!mock.calls().contains(&"gen_vk"));
    assert!(!config.exists(&config.vk_file));
  }

  #[tokio::test]
  #[tracing_test::traced_test]
  async fn describe_failure_is_logged_but_not_fatal() {
    let dir = TempDir::new("zkrun-pipeline").unwrap();
    let config = fixture(&dir);
    let mock = MockSystem::failing_describe();
    Pipeline::new(&mock, &config).witness().await.unwrap();
    assert!(config.exists(&config.witness_file));
    assert!(logs_contain("could not describe witness artifact"));
  }

  #[tokio::test]
  async fn failed_verification_surfaces_as_error() {
    let dir = TempDir::new("zkrun-pipeline").unwrap();
    let config = fixture(&dir);
    let mock = MockSystem::verifying(false);
    let err = Pipeline::new(&mock, &config).run().await.unwrap_err();
    assert!(matches!(err, RunnerError::ProofVerification));
    assert_eq!(err.to_string(), "Proof verification failed");
  }

  #[tokio::test]
  async fn missing_artifact_is_an_io_error() {
    let dir = TempDir::new("zkrun-pipeline").unwrap();
    let config = PipelineConfig::new(dir.path());
    let mock = MockSystem::new();
    let err = Pipeline::new(&mock, &config).keygen().await.unwrap_err();
    assert!(matches!(err, RunnerError::Io { .. }));
  }
}
