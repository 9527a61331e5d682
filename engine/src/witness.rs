//! # Witness evaluation
//!
//! Runs the gate program over the values supplied in `input.json` and
//! produces the full wire assignment plus the public instance. `assert_eq`
//! gates are checked here, so an unsatisfiable input fails witness generation
//! rather than surfacing later as an invalid proof.

use dusk_bytes::Serializable;
use dusk_plonk::prelude::BlsScalar;
use serde::{Deserialize, Serialize};

use crate::{
  circuit::{CircuitProgram, Gate},
  errors::EngineError,
};

/// Payload of the witness artifact. Field elements are stored in their
/// canonical 32-byte encoding to keep the payload bincode-friendly.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WitnessData {
  pub wires:          Vec<[u8; 32]>,
  pub instance:       Vec<[u8; 32]>,
  pub circuit_digest: [u8; 32],
}

impl WitnessData {
  pub fn new(wires: &[BlsScalar], instance: &[BlsScalar], circuit_digest: [u8; 32]) -> WitnessData {
    WitnessData {
      wires: wires.iter().map(|scalar| scalar.to_bytes()).collect(),
      instance: instance.iter().map(|scalar| scalar.to_bytes()).collect(),
      circuit_digest,
    }
  }

  pub fn wire_scalars(&self) -> Result<Vec<BlsScalar>, EngineError> {
    scalars_from_bytes(&self.wires, "witness")
  }

  pub fn instance_scalars(&self) -> Result<Vec<BlsScalar>, EngineError> {
    scalars_from_bytes(&self.instance, "witness")
  }
}

pub(crate) fn scalars_from_bytes(
  values: &[[u8; 32]],
  kind: &str,
) -> Result<Vec<BlsScalar>, EngineError> {
  values
    .iter()
    .map(|bytes| {
      <BlsScalar as Serializable<32>>::from_bytes(bytes).map_err(|_| EngineError::Malformed {
        kind:   kind.to_string(),
        reason: "non-canonical field element".into(),
      })
    })
    .collect()
}

/// Parse `input.json`: a JSON array holding one u64 per circuit input wire.
pub fn parse_input(bytes: &[u8]) -> Result<Vec<u64>, EngineError> {
  Ok(serde_json::from_slice(bytes)?)
}

/// Evaluate the program, returning the full wire assignment and the public
/// instance.
pub fn evaluate(
  program: &CircuitProgram,
  inputs: &[u64],
) -> Result<(Vec<BlsScalar>, Vec<BlsScalar>), EngineError> {
  if inputs.len() != program.inputs.len() {
    return Err(EngineError::InputLength {
      expected: program.inputs.len(),
      found:    inputs.len(),
    });
  }
  let mut wires: Vec<BlsScalar> = inputs.iter().map(|value| BlsScalar::from(*value)).collect();
  for (index, gate) in program.gates.iter().enumerate() {
    match *gate {
      Gate::Add { a, b } => wires.push(wires[a] + wires[b]),
      Gate::Sub { a, b } => wires.push(wires[a] - wires[b]),
      Gate::Mul { a, b } => wires.push(wires[a] * wires[b]),
      Gate::AddConst { a, value } => wires.push(wires[a] + BlsScalar::from(value)),
      Gate::MulConst { a, value } => wires.push(wires[a] * BlsScalar::from(value)),
      Gate::AssertEq { a, b } =>
        if wires[a] != wires[b] {
          return Err(EngineError::UnsatisfiedAssertion(index));
        },
    }
  }
  let instance = program.instance_wires().iter().map(|wire| wires[*wire]).collect();
  Ok((wires, instance))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::circuit::{CircuitDescription, InputSpec, Visibility};

  fn program(gates: Vec<Gate>, outputs: Vec<usize>) -> CircuitProgram {
    CircuitProgram::compile(&CircuitDescription {
      name: "eval".into(),
      inputs: vec![
        InputSpec { name: "x".into(), visibility: Visibility::Private },
        InputSpec { name: "y".into(), visibility: Visibility::Public },
      ],
      gates,
      outputs,
    })
    .unwrap()
  }

  #[test]
  fn evaluates_gate_semantics() {
    let program = program(
      vec![
        Gate::Mul { a: 0, b: 0 },      // wire 2 = x^2
        Gate::Add { a: 2, b: 1 },      // wire 3 = x^2 + y
        Gate::Sub { a: 3, b: 0 },      // wire 4 = x^2 + y - x
        Gate::AddConst { a: 4, value: 10 },
        Gate::MulConst { a: 5, value: 3 },
      ],
      vec![6],
    );
    let (wires, instance) = evaluate(&program, &[3, 4]).unwrap();
    // ((9 + 4 - 3) + 10) * 3 = 60
    assert_eq!(wires[6], BlsScalar::from(60u64));
    assert_eq!(instance, vec![BlsScalar::from(4u64), BlsScalar::from(60u64)]);
  }

  #[test]
  fn assert_eq_violation_fails_evaluation() {
    let program = program(vec![Gate::Mul { a: 0, b: 0 }, Gate::AssertEq { a: 2, b: 1 }], vec![2]);
    assert!(evaluate(&program, &[2, 4]).is_ok());
    assert!(matches!(
      evaluate(&program, &[2, 5]),
      Err(EngineError::UnsatisfiedAssertion(1))
    ));
  }

  #[test]
  fn rejects_wrong_input_length() {
    let program = program(vec![Gate::Add { a: 0, b: 1 }], vec![2]);
    assert!(matches!(
      evaluate(&program, &[1]),
      Err(EngineError::InputLength { expected: 2, found: 1 })
    ));
  }

  #[test]
  fn witness_data_roundtrips_scalars() {
    let wires = vec![BlsScalar::from(1u64), BlsScalar::from(2u64)];
    let data = WitnessData::new(&wires, &wires[1..], [0u8; 32]);
    assert_eq!(data.wire_scalars().unwrap(), wires);
    assert_eq!(data.instance_scalars().unwrap(), &wires[1..]);
  }
}
