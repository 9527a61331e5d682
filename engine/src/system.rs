//! Capability interface between the pipeline runner and the proving backend.
//!
//! The runner only ever talks to a `dyn ProofSystem`, so its sequencing and
//! abort behavior can be exercised against [`MockSystem`] without touching
//! any cryptography.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::EngineError;

/// Everything the pipeline consumes from the proving backend. Byte slices in,
/// artifact bytes out; the backend decides what the bytes mean.
#[async_trait]
pub trait ProofSystem: Send + Sync {
  /// Structural validation of a compiled circuit artifact.
  fn validate_circuit(&self, circuit: &[u8]) -> bool;
  /// Structural validation of a settings document.
  fn validate_settings(&self, settings: &[u8]) -> bool;
  /// Well-formedness check of an SRS artifact.
  fn validate_srs(&self, srs: &[u8]) -> bool;
  /// Format check of an input file.
  fn validate_input(&self, input: &[u8]) -> bool;

  /// Derive the verification key artifact from a compiled circuit and SRS.
  async fn gen_vk(&self, circuit: &[u8], srs: &[u8]) -> Result<Vec<u8>, EngineError>;
  /// Derive the proving key artifact; it must agree with the supplied
  /// verification key.
  async fn gen_pk(&self, circuit: &[u8], srs: &[u8], vk: &[u8]) -> Result<Vec<u8>, EngineError>;
  /// Evaluate the circuit over an input file into a witness artifact.
  async fn gen_witness(&self, circuit: &[u8], input: &[u8]) -> Result<Vec<u8>, EngineError>;
  /// Produce a proof artifact from a witness and proving key.
  async fn prove(
    &self,
    witness: &[u8],
    pk: &[u8],
    circuit: &[u8],
    srs: &[u8],
  ) -> Result<Vec<u8>, EngineError>;
  /// Check a proof. `Ok(false)` means a well-formed-but-invalid proof;
  /// `Err` means the operator supplied mismatched or malformed key material.
  async fn verify(
    &self,
    proof: &[u8],
    vk: &[u8],
    settings: &[u8],
    srs: &[u8],
  ) -> Result<bool, EngineError>;

  /// Render an artifact as a JSON summary for debug logging.
  fn describe(&self, artifact: &[u8]) -> Result<Value, EngineError>;
}

/// Scripted backend recording the call sequence, used to test pipeline
/// ordering and abort behavior.
#[cfg(any(test, feature = "mock"))]
pub struct MockSystem {
  calls:       std::sync::Mutex<Vec<&'static str>>,
  rejected:    std::collections::HashSet<&'static str>,
  verify_ok:   bool,
  describe_ok: bool,
}

#[cfg(any(test, feature = "mock"))]
impl MockSystem {
  pub fn new() -> MockSystem {
    MockSystem {
      calls:       std::sync::Mutex::new(Vec::new()),
      rejected:    std::collections::HashSet::new(),
      verify_ok:   true,
      describe_ok: true,
    }
  }

  /// A mock whose named validator reports `false`.
  pub fn rejecting(validator: &'static str) -> MockSystem {
    let mut mock = MockSystem::new();
    mock.rejected.insert(validator);
    mock
  }

  /// A mock whose `verify` reports the given result.
  pub fn verifying(verify_ok: bool) -> MockSystem {
    let mut mock = MockSystem::new();
    mock.verify_ok = verify_ok;
    mock
  }

  /// A mock whose `describe` errors.
  pub fn failing_describe() -> MockSystem {
    let mut mock = MockSystem::new();
    mock.describe_ok = false;
    mock
  }

  /// The calls made so far, in order.
  pub fn calls(&self) -> Vec<&'static str> { self.calls.lock().unwrap().clone() }

  fn record(&self, name: &'static str) { self.calls.lock().unwrap().push(name); }

  fn validate(&self, name: &'static str) -> bool {
    self.record(name);
    !self.rejected.contains(name)
  }

  fn canned(&self, name: &'static str) -> Vec<u8> {
    self.record(name);
    format!("mock:{name}").into_bytes()
  }
}

#[cfg(any(test, feature = "mock"))]
impl Default for MockSystem {
  fn default() -> Self { MockSystem::new() }
}

#[cfg(any(test, feature = "mock"))]
#[async_trait]
impl ProofSystem for MockSystem {
  fn validate_circuit(&self, _circuit: &[u8]) -> bool { self.validate("validate_circuit") }

  fn validate_settings(&self, _settings: &[u8]) -> bool { self.validate("validate_settings") }

  fn validate_srs(&self, _srs: &[u8]) -> bool { self.validate("validate_srs") }

  fn validate_input(&self, _input: &[u8]) -> bool { self.validate("validate_input") }

  async fn gen_vk(&self, _circuit: &[u8], _srs: &[u8]) -> Result<Vec<u8>, EngineError> {
    Ok(self.canned("gen_vk"))
  }

  async fn gen_pk(
    &self,
    _circuit: &[u8],
    _srs: &[u8],
    _vk: &[u8],
  ) -> Result<Vec<u8>, EngineError> {
    Ok(self.canned("gen_pk"))
  }

  async fn gen_witness(&self, _circuit: &[u8], _input: &[u8]) -> Result<Vec<u8>, EngineError> {
    Ok(self.canned("gen_witness"))
  }

  async fn prove(
    &self,
    _witness: &[u8],
    _pk: &[u8],
    _circuit: &[u8],
    _srs: &[u8],
  ) -> Result<Vec<u8>, EngineError> {
    Ok(self.canned("prove"))
  }

  async fn verify(
    &self,
    _proof: &[u8],
    _vk: &[u8],
    _settings: &[u8],
    _srs: &[u8],
  ) -> Result<bool, EngineError> {
    self.record("verify");
    Ok(self.verify_ok)
  }

  fn describe(&self, _artifact: &[u8]) -> Result<Value, EngineError> {
    self.record("describe");
    if !self.describe_ok {
      return Err(EngineError::Malformed { kind: "mock".into(), reason: "canned failure".into() });
    }
    Ok(serde_json::json!({ "kind": "mock" }))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn mock_records_call_order() {
    let mock = MockSystem::new();
    assert!(mock.validate_circuit(b""));
    let vk = mock.gen_vk(b"", b"").await.unwrap();
    assert_eq!(vk, b"mock:gen_vk");
    assert_eq!(mock.calls(), vec!["validate_circuit", "gen_vk"]);
  }

  #[tokio::test]
  async fn rejecting_mock_fails_only_named_validator() {
    let mock = MockSystem::rejecting("validate_input");
    assert!(mock.validate_circuit(b""));
    assert!(!mock.validate_input(b""));
    assert!(mock.verify(b"", b"", b"", b"").await.unwrap());
  }
}
