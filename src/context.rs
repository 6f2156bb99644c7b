//! Context loader
//!
//! Concatenates a size-capped subset of the cleaned knowledge-base corpus
//! into the background text handed to the prompt builder. The corpus is a
//! flat directory of markdown documents produced by the harvester; files are
//! taken in name order so the same corpus always yields the same context.

use crate::text::truncate_chars;
use std::fs;
use std::path::Path;

/// Per-document character cap applied before concatenation.
const MAX_DOC_CHARS: usize = 2000;
/// At most this many documents contribute to the context.
const MAX_DOCS: usize = 5;

/// Loads the context corpus from `cleaned_dir`.
///
/// A missing directory yields an empty context; unreadable files are skipped
/// with a warning. Never fails: generation without context is still useful.
pub fn load_context(cleaned_dir: &Path) -> String {
    if !cleaned_dir.is_dir() {
        return String::new();
    }

    let mut paths: Vec<_> = match fs::read_dir(cleaned_dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("md"))
            .collect(),
        Err(e) => {
            eprintln!("Warning: could not read {}: {}", cleaned_dir.display(), e);
            return String::new();
        }
    };
    paths.sort();

    let mut parts = Vec::new();
    for path in paths {
        if parts.len() >= MAX_DOCS {
            break;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match fs::read_to_string(&path) {
            Ok(content) => {
                parts.push(format!(
                    "=== {} ===\n{}\n",
                    name,
                    truncate_chars(&content, MAX_DOC_CHARS)
                ));
            }
            Err(e) => {
                eprintln!("Warning: could not load {}: {}", path.display(), e);
            }
        }
    }

    parts.join("\n")
}
