// contract-fuzz/src/bin/contract_fuzz.rs
//! Fuzz one API operation against a running service

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use contract_fuzz::{
    resolve_mutators, DictionaryRunner, FuzzConfig, FuzzerRegistry, HttpExecutor, PathVersionCheck,
    RandomFuzzer, RecordingListener, SecurityConfig, SecurityFuzzer,
};
use contract_fuzz_types::FuzzingData;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Units,
    Random,
    Security,
    Contract,
    All,
}

impl Mode {
    fn includes(&self, other: Mode) -> bool {
        *self == Mode::All || *self == other
    }
}

#[derive(Debug, Parser)]
#[command(name = "contract_fuzz", about = "Fuzz an API operation against a running service")]
struct Args {
    /// Base URL of the service under test
    #[arg(long)]
    url: String,

    /// Operation description (FuzzingData as JSON)
    #[arg(long)]
    data: PathBuf,

    /// Engine configuration (YAML)
    #[arg(long, default_value = "contract-fuzz.yml")]
    config: PathBuf,

    #[arg(long, value_enum, default_value = "units")]
    mode: Mode,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    contract_fuzz::init();
    let args = Args::parse();

    let config = FuzzConfig::load(&args.config)?.with_env_overrides();
    let raw = fs::read_to_string(&args.data).with_context(|| format!("reading {}", args.data.display()))?;
    let data: FuzzingData = serde_json::from_str(&raw).with_context(|| format!("parsing {}", args.data.display()))?;

    let executor = Arc::new(HttpExecutor::new(&args.url, config.request_timeout()?)?);
    let listener = RecordingListener::new();
    info!("Fuzzing {} {} against {}", data.method, data.path, args.url);

    if args.mode.includes(Mode::Contract) {
        PathVersionCheck::new()?.check(&data, &listener);
    }

    if args.mode.includes(Mode::Units) {
        let registry = FuzzerRegistry::builtin(config.edge_spaces_strategy, config.sanitization_strategy)
            .with_flags(&config.fuzzers);
        registry.run_all(&data, executor.as_ref(), &listener).await;
    }

    if args.mode.includes(Mode::Security) {
        match &config.security_fuzzer_file {
            Some(file) => {
                let fuzzer = SecurityFuzzer::new(SecurityConfig::load(file)?);
                let runner = DictionaryRunner::new(executor.clone());
                fuzzer.fuzz(&data, &runner, &listener).await;
            }
            None => warn!("No security_fuzzer_file configured, skipping security fuzzing"),
        }
    }

    if args.mode.includes(Mode::Random) {
        let fuzzer = RandomFuzzer::new(
            resolve_mutators(config.mutators_folder.as_deref()),
            config.stop_conditions()?,
            config.match_rule()?,
        );
        info!("Random fuzzing with {} mutators", fuzzer.mutators().len());
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        fuzzer.fuzz(&data, executor.as_ref(), &listener, &mut rng).await;
    }

    listener.print_summary();
    Ok(())
}
