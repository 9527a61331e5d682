//! # PLONK backend
//!
//! [`PlonkSystem`] implements the [`ProofSystem`] capability over
//! [`dusk_plonk`]'s KZG-committed PLONK. A compiled [`CircuitProgram`] is
//! synthesized into a dusk-plonk circuit twice: once zero-assigned for key
//! generation (the constraint structure does not depend on values) and once
//! witness-assigned for proving. Key generation is deterministic, and the
//! prover RNG is seeded from the witness and proving key artifacts, so every
//! artifact is a pure function of its declared upstream inputs.

use async_trait::async_trait;
use dusk_bytes::Serializable;
use dusk_plonk::prelude::{
  BlsScalar, Circuit, Compiler, Composer, Constraint, Error as PlonkError, Proof, Prover,
  PublicParameters, Verifier,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::{
  artifact::{self, ArtifactKind},
  circuit::{CircuitProgram, Gate},
  errors::EngineError,
  settings::Settings,
  srs,
  system::ProofSystem,
  witness::{self, WitnessData},
};

/// Payload of the verification key artifact (`vk.key`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VkData {
  pub verifier:       Vec<u8>,
  pub circuit_digest: [u8; 32],
  pub srs_digest:     [u8; 32],
}

/// Payload of the proving key artifact (`pk.key`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PkData {
  pub prover:         Vec<u8>,
  pub circuit_digest: [u8; 32],
  pub srs_digest:     [u8; 32],
  pub vk_digest:      [u8; 32],
}

/// Payload of the proof artifact (`proof.json`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProofData {
  pub proof:          Vec<u8>,
  pub instance:       Vec<[u8; 32]>,
  pub circuit_digest: [u8; 32],
}

/// A gate program synthesized for dusk-plonk. Only the input wire values are
/// assigned here; gate outputs are recomputed by the composer, which keeps
/// synthesis and witness evaluation in lockstep.
#[derive(Clone, Default)]
struct GateCircuit {
  program:  CircuitProgram,
  inputs:   Vec<BlsScalar>,
  instance: Vec<BlsScalar>,
}

impl GateCircuit {
  /// Zero assignment, used for key generation where only the constraint
  /// structure matters.
  fn zeroed(program: &CircuitProgram) -> GateCircuit {
    GateCircuit {
      program:  program.clone(),
      inputs:   vec![BlsScalar::zero(); program.inputs.len()],
      instance: vec![BlsScalar::zero(); program.instance_size()],
    }
  }

  fn assigned(program: &CircuitProgram, wires: &[BlsScalar], instance: Vec<BlsScalar>) -> GateCircuit {
    GateCircuit {
      program: program.clone(),
      inputs: wires[..program.inputs.len()].to_vec(),
      instance,
    }
  }
}

impl Circuit for GateCircuit {
  fn circuit(&self, composer: &mut Composer) -> core::result::Result<(), PlonkError> {
    let mut wires = Vec::with_capacity(self.program.wire_count);
    for value in &self.inputs {
      wires.push(composer.append_witness(*value));
    }
    for gate in &self.program.gates {
      match *gate {
        Gate::Add { a, b } => wires.push(
          composer.gate_add(Constraint::new().left(1).right(1).a(wires[a]).b(wires[b])),
        ),
        Gate::Sub { a, b } => wires.push(composer.gate_add(
          Constraint::new().left(1).right(-BlsScalar::one()).a(wires[a]).b(wires[b]),
        )),
        Gate::Mul { a, b } =>
          wires.push(composer.gate_mul(Constraint::new().mult(1).a(wires[a]).b(wires[b]))),
        Gate::AddConst { a, value } => wires.push(composer.gate_add(
          Constraint::new().left(1).a(wires[a]).constant(BlsScalar::from(value)),
        )),
        Gate::MulConst { a, value } => wires.push(
          composer.gate_add(Constraint::new().left(BlsScalar::from(value)).a(wires[a])),
        ),
        Gate::AssertEq { a, b } => composer.assert_equal(wires[a], wires[b]),
      }
    }
    for (wire, value) in self.program.instance_wires().iter().zip(self.instance.iter()) {
      composer.assert_equal_constant(wires[*wire], BlsScalar::zero(), Some(*value));
    }
    Ok(())
  }
}

/// The real proving backend.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlonkSystem;

impl PlonkSystem {
  pub fn new() -> PlonkSystem { PlonkSystem }
}

fn compile(
  pp: &PublicParameters,
  program: &CircuitProgram,
) -> Result<(Prover, Verifier), EngineError> {
  let circuit = GateCircuit::zeroed(program);
  let label = program.transcript_label();
  debug!("compiling circuit {} ({} gates)", program.name, program.gates.len());
  Ok(Compiler::compile_with_circuit(pp, label.as_bytes(), &circuit)?)
}

/// Prover RNG seed: SHA-256 over the witness and proving key artifact bytes,
/// so the proof is a pure function of its declared inputs.
fn prove_seed(witness: &[u8], pk: &[u8]) -> [u8; 32] {
  let mut hasher = Sha256::new();
  hasher.update(witness);
  hasher.update(pk);
  let mut seed = [0u8; 32];
  seed.copy_from_slice(&hasher.finalize());
  seed
}

fn check_digest(
  recorded: [u8; 32],
  supplied: &[u8],
  artifact: &'static str,
  upstream: &'static str,
) -> Result<(), EngineError> {
  if recorded != artifact::digest(supplied) {
    return Err(EngineError::DigestMismatch { artifact, upstream });
  }
  Ok(())
}

#[async_trait]
impl ProofSystem for PlonkSystem {
  fn validate_circuit(&self, circuit: &[u8]) -> bool {
    CircuitProgram::from_artifact(circuit).is_ok()
  }

  fn validate_settings(&self, settings: &[u8]) -> bool { Settings::from_json(settings).is_ok() }

  fn validate_srs(&self, srs: &[u8]) -> bool { srs::load(srs).is_ok() }

  fn validate_input(&self, input: &[u8]) -> bool { witness::parse_input(input).is_ok() }

  async fn gen_vk(&self, circuit: &[u8], srs: &[u8]) -> Result<Vec<u8>, EngineError> {
    let program = CircuitProgram::from_artifact(circuit)?;
    let (_, pp) = srs::load(srs)?;
    let (_prover, verifier) = compile(&pp, &program)?;
    artifact::encode(ArtifactKind::VerificationKey, &VkData {
      verifier:       verifier.to_bytes(),
      circuit_digest: artifact::digest(circuit),
      srs_digest:     artifact::digest(srs),
    })
  }

  async fn gen_pk(&self, circuit: &[u8], srs: &[u8], vk: &[u8]) -> Result<Vec<u8>, EngineError> {
    let program = CircuitProgram::from_artifact(circuit)?;
    let (_, pp) = srs::load(srs)?;
    let vk_data: VkData = artifact::decode(ArtifactKind::VerificationKey, vk)?;
    check_digest(vk_data.circuit_digest, circuit, "verification key", "compiled circuit")?;
    check_digest(vk_data.srs_digest, srs, "verification key", "SRS")?;
    let (prover, verifier) = compile(&pp, &program)?;
    // The proving key is derived from the vk: recompilation must reproduce it.
    if verifier.to_bytes() != vk_data.verifier {
      return Err(EngineError::KeyMismatch);
    }
    artifact::encode(ArtifactKind::ProvingKey, &PkData {
      prover:         prover.to_bytes(),
      circuit_digest: vk_data.circuit_digest,
      srs_digest:     vk_data.srs_digest,
      vk_digest:      artifact::digest(vk),
    })
  }

  async fn gen_witness(&self, circuit: &[u8], input: &[u8]) -> Result<Vec<u8>, EngineError> {
    let program = CircuitProgram::from_artifact(circuit)?;
    let values = witness::parse_input(input)?;
    let (wires, instance) = witness::evaluate(&program, &values)?;
    artifact::encode(
      ArtifactKind::Witness,
      &WitnessData::new(&wires, &instance, artifact::digest(circuit)),
    )
  }

  async fn prove(
    &self,
    witness: &[u8],
    pk: &[u8],
    circuit: &[u8],
    srs: &[u8],
  ) -> Result<Vec<u8>, EngineError> {
    let program = CircuitProgram::from_artifact(circuit)?;
    let pk_data: PkData = artifact::decode(ArtifactKind::ProvingKey, pk)?;
    check_digest(pk_data.circuit_digest, circuit, "proving key", "compiled circuit")?;
    check_digest(pk_data.srs_digest, srs, "proving key", "SRS")?;
    let witness_data: WitnessData = artifact::decode(ArtifactKind::Witness, witness)?;
    check_digest(witness_data.circuit_digest, circuit, "witness", "compiled circuit")?;

    let prover = Prover::try_from_bytes(&pk_data.prover)?;
    let wires = witness_data.wire_scalars()?;
    let instance = witness_data.instance_scalars()?;
    let gate_circuit = GateCircuit::assigned(&program, &wires, instance.clone());
    let mut rng = ChaCha20Rng::from_seed(prove_seed(witness, pk));
    debug!("proving {} with an instance of {} values", program.name, instance.len());
    let (proof, public_inputs) = prover.prove(&mut rng, &gate_circuit)?;
    if public_inputs != instance {
      return Err(EngineError::InstanceMismatch);
    }
    artifact::encode(ArtifactKind::Proof, &ProofData {
      proof:          proof.to_bytes().to_vec(),
      instance:       witness_data.instance,
      circuit_digest: witness_data.circuit_digest,
    })
  }

  async fn verify(
    &self,
    proof: &[u8],
    vk: &[u8],
    settings: &[u8],
    srs: &[u8],
  ) -> Result<bool, EngineError> {
    let vk_data: VkData = artifact::decode(ArtifactKind::VerificationKey, vk)?;
    let settings = Settings::from_json(settings)?;
    check_digest(vk_data.srs_digest, srs, "verification key", "SRS")?;
    let verifier = Verifier::try_from_bytes(&vk_data.verifier)?;

    // From here on the bytes under scrutiny came from the proof file, which
    // may be attacker-controlled: malformation reports false, not an error.
    let proof_data: ProofData = match artifact::decode(ArtifactKind::Proof, proof) {
      Ok(data) => data,
      Err(_) => return Ok(false),
    };
    if proof_data.circuit_digest != vk_data.circuit_digest {
      return Err(EngineError::DigestMismatch {
        artifact: "proof",
        upstream: "verification key circuit",
      });
    }
    if proof_data.instance.len() != settings.instance_size() {
      return Err(EngineError::ShapeMismatch {
        expected: settings.instance_size(),
        found:    proof_data.instance.len(),
      });
    }
    if proof_data.proof.len() != Proof::SIZE {
      return Ok(false);
    }
    let mut proof_bytes = [0u8; Proof::SIZE];
    proof_bytes.copy_from_slice(&proof_data.proof);
    let Ok(plonk_proof) = Proof::from_bytes(&proof_bytes) else {
      return Ok(false);
    };
    let Ok(instance) = witness::scalars_from_bytes(&proof_data.instance, "proof") else {
      return Ok(false);
    };
    Ok(verifier.verify(&plonk_proof, &instance).is_ok())
  }

  fn describe(&self, bytes: &[u8]) -> Result<Value, EngineError> {
    let kind = artifact::peek_kind(bytes)?;
    let summary = match kind {
      ArtifactKind::Circuit => {
        let program: CircuitProgram = artifact::decode(kind, bytes)?;
        json!({
          "kind": "compiled circuit",
          "name": program.name,
          "inputs": program.inputs.len(),
          "gates": program.gates.len(),
          "wires": program.wire_count,
          "instance": program.instance_size(),
        })
      },
      ArtifactKind::Srs => {
        let data: srs::SrsData = artifact::decode(kind, bytes)?;
        json!({ "kind": "SRS", "max_degree": data.max_degree, "bytes": data.params.len() })
      },
      ArtifactKind::VerificationKey => {
        let data: VkData = artifact::decode(kind, bytes)?;
        json!({
          "kind": "verification key",
          "circuit_digest": hex::encode(data.circuit_digest),
          "srs_digest": hex::encode(data.srs_digest),
        })
      },
      ArtifactKind::ProvingKey => {
        let data: PkData = artifact::decode(kind, bytes)?;
        json!({
          "kind": "proving key",
          "circuit_digest": hex::encode(data.circuit_digest),
          "vk_digest": hex::encode(data.vk_digest),
        })
      },
      ArtifactKind::Witness => {
        let data: WitnessData = artifact::decode(kind, bytes)?;
        json!({
          "kind": "witness",
          "wires": data.wires.len(),
          "instance": data.instance.iter().map(hex::encode).collect::<Vec<_>>(),
          "circuit_digest": hex::encode(data.circuit_digest),
        })
      },
      ArtifactKind::Proof => {
        let data: ProofData = artifact::decode(kind, bytes)?;
        json!({
          "kind": "proof",
          "proof_bytes": data.proof.len(),
          "instance": data.instance.iter().map(hex::encode).collect::<Vec<_>>(),
          "circuit_digest": hex::encode(data.circuit_digest),
        })
      },
    };
    Ok(summary)
  }
}
