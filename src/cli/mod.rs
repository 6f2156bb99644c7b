use anyhow::{Result, anyhow};

use scrycoach::coach::{Coach, Request};
use scrycoach::completion::OpenAiBackend;
use scrycoach::config::CoachConfig;
use scrycoach::context::load_context;
use scrycoach::harvest::harvest_docs;
use scrycoach::results::ResultStore;
use scrycoach::toolchain::CargoRunner;

mod doctor;
mod progress;

pub use doctor::doctor;
use progress::BatchProgress;

#[derive(Clone, Copy)]
pub struct Config {
    pub verbose: bool,
}

/// Predefined requests exercised by `batch`.
const BATCH_REQUESTS: [&str; 4] = [
    "Create a trivial hello world blueprint that gives out tokens",
    "Create an admin-controlled NFT blueprint with minting permissions",
    "Create a simple token faucet that distributes tokens with rate limiting",
    "Create a basic DEX blueprint for token swapping",
];

fn build_coach(
    coach_config: &CoachConfig,
    config: &Config,
) -> Result<Coach<OpenAiBackend, CargoRunner>> {
    let backend = OpenAiBackend::new(coach_config).map_err(|e| anyhow!("{}", e))?;
    let runner = CargoRunner::from_config(coach_config);

    let kb_context = load_context(&coach_config.cleaned_dir());
    if config.verbose {
        println!(
            "Loaded {} character(s) of knowledge-base context",
            kb_context.len()
        );
    }

    Ok(Coach::new(
        coach_config,
        backend,
        runner,
        kb_context,
        config.verbose,
    ))
}

/// Runs the coaching loop for a single request and persists its record.
pub async fn generate(
    request_text: String,
    max_retries: Option<u32>,
    config: &Config,
) -> Result<()> {
    let coach_config = CoachConfig::load(None)?;
    let coach = build_coach(&coach_config, config)?;

    let request = Request::new(
        request_text,
        max_retries.unwrap_or(coach_config.max_retries),
    );
    let record = coach.run(&request).await;

    let passed = record.passed();
    let retry_count = record.outcome.retry_count;
    let attempts = record.attempts.len();

    let mut store = ResultStore::new(coach_config.results_path.clone());
    store.append(record)?;

    if passed {
        println!("\n✓ SUCCESS: generated a working Scrypto blueprint");
        println!("Retries needed: {}", retry_count);
        Ok(())
    } else {
        anyhow::bail!("could not generate working code after {} attempt(s)", attempts);
    }
}

/// Processes the predefined batch sequentially, persisting after each
/// request and continuing past individual failures.
pub async fn batch(config: &Config) -> Result<()> {
    let coach_config = CoachConfig::load(None)?;
    let coach = build_coach(&coach_config, config)?;
    let mut store = ResultStore::new(coach_config.results_path.clone());

    let mut progress = BatchProgress::new(BATCH_REQUESTS.len());

    for request_text in BATCH_REQUESTS {
        progress.start_request(request_text);

        let request = Request::new(request_text.to_string(), coach_config.max_retries);
        let record = coach.run(&request).await;
        let passed = record.passed();

        store.append(record)?;
        progress.complete_request(request_text, passed);
    }

    progress.finish();

    let summary = store.summary();
    println!(
        "Results saved: {}/{} successful",
        summary.successful, summary.total_attempts
    );
    Ok(())
}

/// Populates the knowledge base from the documentation sources.
pub async fn harvest(config: &Config) -> Result<()> {
    let coach_config = CoachConfig::load(None)?;
    harvest_docs(&coach_config.kb_dir, config.verbose).await
}
