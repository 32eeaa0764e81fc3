use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::error::Result;
use crate::replay::{ReplayArgs, VerifyArgs, run_replay, run_verify};
use crate::synth::{Scenario, SynthArgs, run_synth};

#[derive(Debug, Parser)]
#[command(
    name = "orbitcam-harness",
    about = "Record, synthesize, and replay orbitcam gesture traces",
    version
)]
pub struct Cli {
    /// Emit logs as JSON lines on stderr.
    #[arg(long = "log-json", global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a deterministic synthetic gesture trace.
    Synth(SynthArgs),

    /// Replay a trace and print the resolved gestures and digest.
    Replay(ReplayArgs),

    /// Check a trace replays to a known (or self-consistent) digest.
    Verify(VerifyArgs),

    /// Print the built-in scenario names.
    #[command(name = "list-scenarios")]
    ListScenarios,
}

/// Install the global subscriber. Filter comes from `RUST_LOG` (default
/// `warn`).
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    // Already installed (tests, embedding) is fine.
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Synth(args) => run_synth(args),
        Commands::Replay(args) => run_replay(args),
        Commands::Verify(args) => run_verify(args),
        Commands::ListScenarios => {
            for scenario in Scenario::ALL {
                println!("{}", scenario.name());
            }
            Ok(())
        }
    }
}
