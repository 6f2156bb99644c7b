//! Documentation harvester
//!
//! Batch fetch-clean-store of the context corpus: pulls a fixed set of
//! Scrypto documentation pages, keeps the raw HTML, and stores a text
//! rendition under the cleaned corpus directory that the context loader
//! reads. No decision logic beyond skipping pages that fail to fetch.

use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Request timeout per documentation page.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
/// Politeness delay between fetches.
const FETCH_DELAY: Duration = Duration::from_secs(1);
/// Rendering width for the text rendition of HTML pages.
const TEXT_WIDTH: usize = 80;

/// Documentation pages harvested into the knowledge base.
const DOC_SOURCES: [(&str, &str); 6] = [
    (
        "scrypto_overview",
        "https://docs.radixdlt.com/docs/scrypto-overview",
    ),
    (
        "blueprint_basics",
        "https://docs.radixdlt.com/docs/blueprint-basics",
    ),
    (
        "resource_creation",
        "https://docs.radixdlt.com/docs/resource-creation",
    ),
    (
        "component_creation",
        "https://docs.radixdlt.com/docs/component-creation",
    ),
    (
        "asset_oriented_programming",
        "https://docs.radixdlt.com/docs/asset-oriented-programming",
    ),
    (
        "getting_started",
        "https://docs.radixdlt.com/docs/getting-started-scrypto",
    ),
];

#[derive(Serialize)]
struct SourceRecord {
    name: String,
    url: String,
    timestamp: String,
}

#[derive(Serialize)]
struct HarvestMetadata {
    harvest_timestamp: String,
    sources: Vec<SourceRecord>,
    raw_files: usize,
    cleaned_files: usize,
    total_size_bytes: usize,
}

/// Renders one fetched page as a cleaned markdown document.
fn clean_page(name: &str, html: &str) -> String {
    let body = html2text::from_read(html.as_bytes(), TEXT_WIDTH)
        .unwrap_or_else(|_| html.to_string());

    let title = name
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "# Radix Documentation: {}\nHarvest date: {}\n\n{}",
        title,
        Utc::now().format("%Y-%m-%d"),
        body
    )
}

/// Fetches every documentation source into `kb_dir`.
///
/// Individual page failures are reported and skipped; the harvest as a whole
/// fails only when nothing could be fetched.
pub async fn harvest_docs(kb_dir: &Path, verbose: bool) -> Result<()> {
    let raw_dir = kb_dir.join("raw");
    let cleaned_dir = kb_dir.join("cleaned");
    for dir in [&raw_dir, &cleaned_dir] {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let client = reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    let mut sources = Vec::new();
    let mut total_size = 0usize;
    let mut fetched = 0usize;

    println!("Harvesting {} documentation page(s)", DOC_SOURCES.len());

    for (index, (name, url)) in DOC_SOURCES.iter().enumerate() {
        if verbose {
            println!("Fetching {} ({})", name, url);
        }

        match fetch_page(&client, url).await {
            Ok(html) => {
                let raw_path = raw_dir.join(format!("radix_docs_{}.html", name));
                fs::write(&raw_path, &html)
                    .with_context(|| format!("Failed to write {}", raw_path.display()))?;

                let cleaned = clean_page(name, &html);
                let cleaned_path = cleaned_dir.join(format!("radix_docs_{}.md", name));
                fs::write(&cleaned_path, &cleaned)
                    .with_context(|| format!("Failed to write {}", cleaned_path.display()))?;

                total_size += html.len();
                fetched += 1;
                sources.push(SourceRecord {
                    name: name.to_string(),
                    url: url.to_string(),
                    timestamp: Utc::now().to_rfc3339(),
                });
                println!("✓ Harvested {}", name);
            }
            Err(e) => {
                eprintln!("✗ Failed to fetch {}: {}", name, e);
            }
        }

        if index + 1 < DOC_SOURCES.len() {
            tokio::time::sleep(FETCH_DELAY).await;
        }
    }

    let metadata = HarvestMetadata {
        harvest_timestamp: Utc::now().to_rfc3339(),
        sources,
        raw_files: fetched,
        cleaned_files: fetched,
        total_size_bytes: total_size,
    };
    let metadata_path = kb_dir.join("metadata.json");
    fs::write(
        &metadata_path,
        serde_json::to_string_pretty(&metadata).context("Failed to serialize metadata")?,
    )
    .with_context(|| format!("Failed to write {}", metadata_path.display()))?;

    if fetched == 0 {
        bail!("Harvest failed: no documentation page could be fetched");
    }

    println!(
        "Harvest complete: {}/{} pages, {:.1} KB",
        fetched,
        DOC_SOURCES.len(),
        total_size as f64 / 1024.0
    );
    Ok(())
}

async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Request to {} failed", url))?;

    if !response.status().is_success() {
        bail!("HTTP {}", response.status());
    }

    response.text().await.context("Failed to read response body")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_page_strips_markup_and_adds_header() {
        let html = "<html><body><h1>Blueprints</h1><p>A blueprint is a template.</p></body></html>";
        let cleaned = clean_page("blueprint_basics", html);

        assert!(cleaned.starts_with("# Radix Documentation: Blueprint Basics"));
        assert!(cleaned.contains("A blueprint is a template."));
        assert!(!cleaned.contains("<p>"));
    }

    #[test]
    fn test_clean_page_title_casing() {
        let cleaned = clean_page("asset_oriented_programming", "<p>x</p>");
        assert!(cleaned.contains("Asset Oriented Programming"));
    }
}
