//! Settings document derived from a compiled circuit. Written as
//! `settings.json` next to the circuit artifact and consumed again at
//! verification time, where its shape is checked against the proof instance.

use serde::{Deserialize, Serialize};

use crate::{
  circuit::{CircuitProgram, Visibility},
  errors::EngineError,
};

pub const SETTINGS_VERSION: u8 = 1;

/// Public shape of a circuit: how many values the instance carries and how
/// many private wires feed it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitShape {
  pub public_inputs:  usize,
  pub private_inputs: usize,
  pub outputs:        usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
  pub version: u8,
  pub logrows: u32,
  pub label:   String,
  pub shape:   CircuitShape,
}

impl Settings {
  pub fn for_circuit(program: &CircuitProgram, logrows: u32) -> Settings {
    let public_inputs = program
      .inputs
      .iter()
      .filter(|input| input.visibility == Visibility::Public)
      .count();
    Settings {
      version: SETTINGS_VERSION,
      logrows,
      label: program.transcript_label(),
      shape: CircuitShape {
        public_inputs,
        private_inputs: program.inputs.len() - public_inputs,
        outputs: program.outputs.len(),
      },
    }
  }

  pub fn from_json(bytes: &[u8]) -> Result<Settings, EngineError> {
    let settings: Settings = serde_json::from_slice(bytes)?;
    if settings.version != SETTINGS_VERSION {
      return Err(EngineError::Malformed {
        kind:   "settings".into(),
        reason: format!("unsupported settings version {}", settings.version),
      });
    }
    Ok(settings)
  }

  pub fn to_json(&self) -> Result<Vec<u8>, EngineError> {
    Ok(serde_json::to_vec_pretty(self)?)
  }

  /// Number of values the public instance carries.
  pub fn instance_size(&self) -> usize { self.shape.public_inputs + self.shape.outputs }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::circuit::{CircuitDescription, Gate, InputSpec};

  #[test]
  fn derives_shape_from_circuit() {
    let program = CircuitProgram::compile(&CircuitDescription {
      name:    "shape".into(),
      inputs:  vec![
        InputSpec { name: "a".into(), visibility: Visibility::Public },
        InputSpec { name: "b".into(), visibility: Visibility::Private },
      ],
      gates:   vec![Gate::Add { a: 0, b: 1 }],
      outputs: vec![2],
    })
    .unwrap();
    let settings = Settings::for_circuit(&program, 8);
    assert_eq!(settings.shape, CircuitShape { public_inputs: 1, private_inputs: 1, outputs: 1 });
    assert_eq!(settings.instance_size(), 2);
    assert_eq!(settings.label, "zkrun:shape");

    let restored = Settings::from_json(&settings.to_json().unwrap()).unwrap();
    assert_eq!(restored.shape, settings.shape);
  }

  #[test]
  fn rejects_unknown_version() {
    let json = br#"{"version":9,"logrows":8,"label":"zkrun:x","shape":{"public_inputs":0,"private_inputs":1,"outputs":1}}"#;
    assert!(Settings::from_json(json).is_err());
  }
}
