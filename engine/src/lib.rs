//! # Engine
//!
//! KZG/PLONK proving engine behind the `zkrun` pipeline. The crate owns the
//! on-disk artifact formats (framed binary envelopes plus JSON documents), the
//! gate-level circuit representation, witness evaluation, and the PLONK backend
//! built on [`dusk_plonk`]. Everything the pipeline runner consumes goes
//! through the [`ProofSystem`] capability trait so orchestration can be tested
//! against a mock backend.

pub mod artifact;
pub mod circuit;
pub mod errors;
pub mod plonk;
pub mod settings;
pub mod srs;
pub mod system;
pub mod witness;

pub use errors::EngineError;
#[cfg(any(test, feature = "mock"))] pub use system::MockSystem;
pub use system::ProofSystem;
