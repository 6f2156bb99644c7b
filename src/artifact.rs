//! Artifact writer
//!
//! Materializes one extracted source block as a Scrypto package on disk:
//! a manifest from a fixed template plus a single `src/lib.rs` holding the
//! code verbatim. Package names derive deterministically from the request
//! text, so re-running the same request reuses (overwrites) its directory.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Hex characters of the request hash embedded in the package name.
const NAME_HASH_CHARS: usize = 16;

/// A generated package on disk. Never mutated after creation; a retry for
/// the same request supersedes it by overwriting in place.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub name: String,
    pub project_dir: PathBuf,
    pub source_path: PathBuf,
}

/// Derives the deterministic package name for a request.
pub fn package_name(request_text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(request_text.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("generated_{}", &digest[..NAME_HASH_CHARS])
}

fn manifest_template(name: &str) -> String {
    format!(
        r#"[package]
name = "{name}"
version = "0.1.0"
edition = "2021"

[dependencies]
scrypto = {{ git = "https://github.com/radixdlt/radixdlt-scrypto", tag = "v1.0.1" }}

[dev-dependencies]
scrypto-unit = {{ git = "https://github.com/radixdlt/radixdlt-scrypto", tag = "v1.0.1" }}
transaction = {{ git = "https://github.com/radixdlt/radixdlt-scrypto", tag = "v1.0.1" }}
"#
    )
}

/// Writes the package for `request_text` under `output_dir`.
///
/// Creates missing parent directories; the source text is written exactly as
/// extracted, with no further validation.
pub fn write_artifact(output_dir: &Path, request_text: &str, code: &str) -> Result<Artifact> {
    let name = package_name(request_text);
    let project_dir = output_dir.join(&name);
    let src_dir = project_dir.join("src");

    fs::create_dir_all(&src_dir)
        .with_context(|| format!("Failed to create {}", src_dir.display()))?;

    fs::write(project_dir.join("Cargo.toml"), manifest_template(&name))
        .with_context(|| format!("Failed to write manifest in {}", project_dir.display()))?;

    let source_path = src_dir.join("lib.rs");
    fs::write(&source_path, code)
        .with_context(|| format!("Failed to write {}", source_path.display()))?;

    Ok(Artifact {
        name,
        project_dir,
        source_path,
    })
}
