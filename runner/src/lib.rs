//! # Runner
//!
//! Pipeline orchestration for the `zkrun` binary: an explicit configuration
//! struct naming the artifact directory and file names, the fixed
//! load-validate-generate-persist call sequence over a [`engine::ProofSystem`]
//! backend, and an error type that reaches `main` so every failure exits
//! non-zero.

pub mod config;
pub mod errors;
pub mod pipeline;

pub use config::PipelineConfig;
pub use errors::RunnerError;
pub use pipeline::Pipeline;
