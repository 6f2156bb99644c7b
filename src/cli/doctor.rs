use anyhow::Result;
use std::fs;
use tokio::process::Command;

use scrycoach::config::CoachConfig;

use super::Config;

/// Reports on everything the pipeline needs: the toolchain binary, the
/// completion-service credentials, and the harvested knowledge base.
pub async fn doctor(_config: &Config) -> Result<()> {
    let coach_config = CoachConfig::load(None)?;
    let mut issues = 0usize;

    println!("Environment check");
    println!("{}", "=".repeat(60));

    // Toolchain
    match Command::new(&coach_config.cargo_bin)
        .arg("--version")
        .output()
        .await
    {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout);
            println!("✓ Toolchain: {}", version.trim());
        }
        Ok(_) => {
            issues += 1;
            println!("✗ Toolchain: {} exists but did not report a version", coach_config.cargo_bin);
        }
        Err(_) => {
            issues += 1;
            println!(
                "✗ Toolchain: {} not found (install Rust via https://rustup.rs/)",
                coach_config.cargo_bin
            );
        }
    }

    // Completion service credentials
    match &coach_config.api_key {
        Some(key) => {
            println!("✓ API key: present (length {})", key.len());
            if !key.starts_with("sk-") {
                println!("  note: key does not start with 'sk-'; double-check the value");
            }
        }
        None => {
            issues += 1;
            println!("✗ API key: OPENAI_API_KEY not set");
        }
    }

    // Knowledge base
    let cleaned_dir = coach_config.cleaned_dir();
    let corpus_size = fs::read_dir(&cleaned_dir)
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .filter(|entry| {
                    entry.path().extension().and_then(|ext| ext.to_str()) == Some("md")
                })
                .count()
        })
        .unwrap_or(0);
    if corpus_size > 0 {
        println!("✓ Knowledge base: {} document(s) in {}", corpus_size, cleaned_dir.display());
    } else {
        // Not fatal: generation works without context, just worse.
        println!(
            "⊚ Knowledge base: empty ({}); run 'scrycoach harvest' to populate it",
            cleaned_dir.display()
        );
    }

    println!("{}", "=".repeat(60));
    if issues > 0 {
        anyhow::bail!("Environment check failed with {} issue(s)", issues);
    }

    println!("✓ Environment check passed");
    Ok(())
}
