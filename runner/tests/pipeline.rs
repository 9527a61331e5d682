//! End-to-end pipeline tests over the real PLONK backend.

use engine::{
  circuit::{CircuitDescription, CircuitProgram, Gate, InputSpec, Visibility},
  plonk::PlonkSystem,
  settings::Settings,
  srs,
};
use runner::{config::PipelineConfig, errors::RunnerError, pipeline::Pipeline};
use tempdir::TempDir;

const LOGROWS: u32 = 6;

/// x private, y public; proves knowledge of x with x^2 + y as public output.
fn compiled_circuit() -> CircuitProgram {
  CircuitProgram::compile(&CircuitDescription {
    name:    "square-plus".into(),
    inputs:  vec![
      InputSpec { name: "x".into(), visibility: Visibility::Private },
      InputSpec { name: "y".into(), visibility: Visibility::Public },
    ],
    gates:   vec![Gate::Mul { a: 0, b: 0 }, Gate::Add { a: 2, b: 1 }],
    outputs: vec![3],
  })
  .unwrap()
}

fn fixture(dir: &TempDir) -> PipelineConfig {
  let config = PipelineConfig::new(dir.path());
  let program = compiled_circuit();
  config.save(&config.circuit_file, &program.to_artifact().unwrap()).unwrap();
  let settings = Settings::for_circuit(&program, LOGROWS);
  config.save(&config.settings_file, &settings.to_json().unwrap()).unwrap();
  config.save(&config.srs_file, &srs::generate(LOGROWS, Some([1u8; 32])).unwrap()).unwrap();
  config.save(&config.input_file, br#"[3, 4]"#).unwrap();
  config
}

#[tokio::test]
async fn full_pipeline_produces_verifiable_artifacts() {
  let dir = TempDir::new("zkrun").unwrap();
  let config = fixture(&dir);
  let system = PlonkSystem::new();
  Pipeline::new(&system, &config).run().await.unwrap();
  for file in [&config.vk_file, &config.pk_file, &config.witness_file, &config.proof_file] {
    assert!(!config.load(file).unwrap().is_empty(), "{file} missing or empty");
  }
}

#[tokio::test]
async fn corrupted_proof_fails_verification() {
  let dir = TempDir::new("zkrun").unwrap();
  let config = fixture(&dir);
  let system = PlonkSystem::new();
  let pipeline = Pipeline::new(&system, &config);
  pipeline.run().await.unwrap();

  let mut proof = config.load(&config.proof_file).unwrap();
  let index = proof.len() / 2;
  proof[index] ^= 0xff;
  config.save(&config.proof_file, &proof).unwrap();

  let err = pipeline.verify().await.unwrap_err();
  assert!(matches!(err, RunnerError::ProofVerification));
}

#[tokio::test]
async fn key_generation_is_deterministic_across_runs() {
  let dir_a = TempDir::new("zkrun").unwrap();
  let dir_b = TempDir::new("zkrun").unwrap();
  let config_a = fixture(&dir_a);
  let config_b = fixture(&dir_b);
  let system = PlonkSystem::new();
  Pipeline::new(&system, &config_a).keygen().await.unwrap();
  Pipeline::new(&system, &config_b).keygen().await.unwrap();
  assert_eq!(config_a.load(&config_a.vk_file).unwrap(), config_b.load(&config_b.vk_file).unwrap());
  assert_eq!(config_a.load(&config_a.pk_file).unwrap(), config_b.load(&config_b.pk_file).unwrap());
}

#[tokio::test]
async fn malformed_input_raises_invalid_input_format() {
  let dir = TempDir::new("zkrun").unwrap();
  let config = fixture(&dir);
  config.save(&config.input_file, br#"{"x": 3}"#).unwrap();
  let system = PlonkSystem::new();
  let err = Pipeline::new(&system, &config).witness().await.unwrap_err();
  assert_eq!(err.to_string(), "Invalid input format");
  assert!(!config.exists(&config.witness_file));
}

#[tokio::test]
async fn corrupted_circuit_artifact_is_rejected() {
  let dir = TempDir::new("zkrun").unwrap();
  let config = fixture(&dir);
  let mut circuit = config.load(&config.circuit_file).unwrap();
  circuit[0] ^= 0xff;
  config.save(&config.circuit_file, &circuit).unwrap();
  let system = PlonkSystem::new();
  let err = Pipeline::new(&system, &config).keygen().await.unwrap_err();
  assert!(matches!(err, RunnerError::InvalidArtifact("compiled circuit")));
}
