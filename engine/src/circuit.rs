//! # Circuit representation
//!
//! Circuits enter the system as a gate-level JSON description and are
//! compiled into a [`CircuitProgram`], the payload of the `model.compiled`
//! artifact. The program is an SSA-style arithmetic straight line over the
//! BLS12-381 scalar field: input wires come first, every value-producing gate
//! defines exactly the next fresh wire index, and `assert_eq` adds a
//! constraint without defining a wire. The public instance of an execution is
//! the public-visibility input wires in declaration order followed by the
//! declared output wires.

use serde::{Deserialize, Serialize};

use crate::{
  artifact::{self, ArtifactKind},
  errors::EngineError,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
  Public,
  #[default]
  Private,
}

/// One declared circuit input wire.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputSpec {
  pub name:       String,
  pub visibility: Visibility,
}

/// Arithmetic gates of the program. All but `assert_eq` produce exactly one
/// fresh wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Gate {
  Add { a: usize, b: usize },
  Sub { a: usize, b: usize },
  Mul { a: usize, b: usize },
  AddConst { a: usize, value: u64 },
  MulConst { a: usize, value: u64 },
  AssertEq { a: usize, b: usize },
}

impl Gate {
  pub fn produces_wire(self) -> bool { !matches!(self, Gate::AssertEq { .. }) }

  fn operands(self) -> (usize, Option<usize>) {
    match self {
      Gate::Add { a, b } | Gate::Sub { a, b } | Gate::Mul { a, b } | Gate::AssertEq { a, b } =>
        (a, Some(b)),
      Gate::AddConst { a, .. } | Gate::MulConst { a, .. } => (a, None),
    }
  }
}

/// JSON circuit description accepted by the `compile` command.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CircuitDescription {
  pub name:    String,
  pub inputs:  Vec<InputSpec>,
  pub gates:   Vec<Gate>,
  pub outputs: Vec<usize>,
}

/// Validated gate program, the payload of the compiled circuit artifact.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CircuitProgram {
  pub name:       String,
  pub inputs:     Vec<InputSpec>,
  pub gates:      Vec<Gate>,
  pub outputs:    Vec<usize>,
  pub wire_count: usize,
}

impl CircuitProgram {
  /// Compile a description into a validated program.
  pub fn compile(description: &CircuitDescription) -> Result<CircuitProgram, EngineError> {
    let producing = description.gates.iter().filter(|gate| gate.produces_wire()).count();
    let program = CircuitProgram {
      name:       description.name.clone(),
      inputs:     description.inputs.clone(),
      gates:      description.gates.clone(),
      outputs:    description.outputs.clone(),
      wire_count: description.inputs.len() + producing,
    };
    program.validate()?;
    Ok(program)
  }

  /// Structural validation: SSA gate order, in-range wire references,
  /// consistent wire count.
  pub fn validate(&self) -> Result<(), EngineError> {
    if self.name.is_empty() {
      return Err(EngineError::CircuitStructure("circuit name is empty".into()));
    }
    if self.inputs.is_empty() {
      return Err(EngineError::CircuitStructure("circuit declares no input wires".into()));
    }
    let mut defined = self.inputs.len();
    for (index, gate) in self.gates.iter().enumerate() {
      let (a, b) = gate.operands();
      for operand in std::iter::once(a).chain(b) {
        if operand >= defined {
          return Err(EngineError::CircuitStructure(format!(
            "gate {} references wire {} before it is defined",
            index, operand
          )));
        }
      }
      if gate.produces_wire() {
        defined += 1;
      }
    }
    if defined != self.wire_count {
      return Err(EngineError::CircuitStructure(format!(
        "wire count {} does not match {} defined wires",
        self.wire_count, defined
      )));
    }
    if self.outputs.is_empty() {
      return Err(EngineError::CircuitStructure("circuit declares no output wires".into()));
    }
    for output in &self.outputs {
      if *output >= self.wire_count {
        return Err(EngineError::CircuitStructure(format!(
          "output wire {} is out of range",
          output
        )));
      }
    }
    Ok(())
  }

  /// Fiat-Shamir transcript label shared by compile, prove, and verify.
  pub fn transcript_label(&self) -> String { format!("zkrun:{}", self.name) }

  /// Wires of the public instance: public inputs in declaration order, then
  /// the declared outputs.
  pub fn instance_wires(&self) -> Vec<usize> {
    let mut wires: Vec<usize> = self
      .inputs
      .iter()
      .enumerate()
      .filter(|(_, input)| input.visibility == Visibility::Public)
      .map(|(wire, _)| wire)
      .collect();
    wires.extend_from_slice(&self.outputs);
    wires
  }

  pub fn instance_size(&self) -> usize { self.instance_wires().len() }

  pub fn to_artifact(&self) -> Result<Vec<u8>, EngineError> {
    artifact::encode(ArtifactKind::Circuit, self)
  }

  /// Decode and structurally validate a compiled circuit artifact.
  pub fn from_artifact(bytes: &[u8]) -> Result<CircuitProgram, EngineError> {
    let program: CircuitProgram = artifact::decode(ArtifactKind::Circuit, bytes)?;
    program.validate()?;
    Ok(program)
  }
}
