use clap::{Parser, Subcommand};
use engine::{
  circuit::{CircuitDescription, CircuitProgram},
  plonk::PlonkSystem,
  settings::Settings,
  srs,
};
use runner::{config::PipelineConfig, errors::RunnerError, pipeline::Pipeline};
use tracing::{info, Level};

#[derive(Parser)]
#[clap(name = "zkrun")]
#[clap(about = "Runs a KZG proving pipeline over on-disk artifacts.", long_about = None)]
struct Args {
  #[clap(short, long, required = false, default_value = "INFO")]
  log_level: String,

  /// Directory holding the pipeline artifacts
  #[clap(short, long, required = false, default_value = ".")]
  dir: String,

  #[clap(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Generate a structured reference string (`kzg`)
  Setup {
    /// Support circuits of up to 2^logrows gates
    #[clap(long, default_value_t = 12)]
    logrows: u32,
    /// 32-byte hex seed for reproducible parameters
    #[clap(long)]
    seed:    Option<String>,
  },
  /// Compile a JSON circuit description into `model.compiled` and `settings.json`
  Compile {
    /// Path to the circuit description JSON
    #[clap(long)]
    circuit: String,
    #[clap(long, default_value_t = 12)]
    logrows: u32,
  },
  /// Generate `vk.key` and `pk.key` from the compiled circuit and SRS
  Keygen,
  /// Generate `witness.json` from the compiled circuit and `input.json`
  Witness,
  /// Generate `proof.json` from the persisted witness and proving key
  Prove,
  /// Verify `proof.json` against `vk.key`, `settings.json`, and the SRS
  Verify,
  /// The full pipeline: keygen, witness, prove, verify
  Run,
}

fn parse_seed(seed: &str) -> Result<[u8; 32], RunnerError> {
  let bytes = hex::decode(seed).map_err(|err| RunnerError::InvalidSeed(err.to_string()))?;
  bytes
    .try_into()
    .map_err(|bytes: Vec<u8>| RunnerError::InvalidSeed(format!("{} bytes, expected 32", bytes.len())))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), RunnerError> {
  let args = Args::parse();

  let log_level = match args.log_level.to_lowercase().as_str() {
    "error" => Level::ERROR,
    "warn" => Level::WARN,
    "info" => Level::INFO,
    "debug" => Level::DEBUG,
    "trace" => Level::TRACE,
    _ => Level::TRACE,
  };
  tracing_subscriber::fmt().with_max_level(log_level).with_line_number(true).init();
  std::panic::set_hook(Box::new(|panic| {
    tracing::error!("{panic}");
  }));

  let config = PipelineConfig::new(&args.dir);
  let system = PlonkSystem::new();
  let pipeline = Pipeline::new(&system, &config);

  match args.command {
    Command::Setup { logrows, seed } => {
      let seed = seed.as_deref().map(parse_seed).transpose()?;
      info!("generating SRS (logrows={logrows})");
      let srs = srs::generate(logrows, seed)?;
      config.save(&config.srs_file, &srs)?;
      info!("wrote {} ({} bytes)", config.srs_file, srs.len());
    },
    Command::Compile { circuit, logrows } => {
      let path = std::path::PathBuf::from(&circuit);
      let description =
        std::fs::read(&path).map_err(|source| RunnerError::Io { path, source })?;
      let description: CircuitDescription = serde_json::from_slice(&description)?;
      let program = CircuitProgram::compile(&description)?;
      config.save(&config.circuit_file, &program.to_artifact()?)?;
      info!("wrote {} ({} gates)", config.circuit_file, program.gates.len());
      let settings = Settings::for_circuit(&program, logrows);
      config.save(&config.settings_file, &settings.to_json()?)?;
      info!("wrote {}", config.settings_file);
    },
    Command::Keygen => pipeline.keygen().await?,
    Command::Witness => pipeline.witness().await?,
    Command::Prove => pipeline.prove().await?,
    Command::Verify => pipeline.verify().await?,
    Command::Run => pipeline.run().await?,
  }
  Ok(())
}
