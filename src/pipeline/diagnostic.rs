//! Diagnostic dump for unrecoverable model responses.
//!
//! **Activation** (resolved by `SegmenterConfig::from_env`):
//! - `EDITORIAL_DUMP_DIR` env var, any build
//! - dev builds (`is_dev()`): `~/.cache/codeforces-editorial/`
//! - prod builds: disabled
//!
//! **Output**:
//! ```text
//! {dump_dir}/failed_llm_response_{contest_id}.txt
//!   === Original Response ===
//!   === Attempted JSON Content ===
//! ```

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9_-]").unwrap());

/// Contest id reduced to filename-safe characters (`../x` → `___x`).
pub fn safe_file_stem(contest_id: &str) -> String {
    UNSAFE_FILENAME_CHARS.replace_all(contest_id, "_").into_owned()
}

/// Write a failed response and the last JSON candidate for offline inspection.
///
/// Returns the written path. Failures are logged (warn) and yield `None`;
/// never panics, never blocks the pipeline.
pub fn dump_failed_response(
    dir: &Path,
    contest_id: &str,
    raw_response: &str,
    attempted_json: Option<&str>,
) -> Option<PathBuf> {
    if let Err(e) = std::fs::create_dir_all(dir) {
        tracing::warn!(
            path = %dir.display(),
            error = %e,
            "Diagnostic dump: failed to create directory"
        );
        return None;
    }

    let filename = format!("failed_llm_response_{}.txt", safe_file_stem(contest_id));
    let content = format!(
        "# contest {contest_id}, {}\n\n=== Original Response ===\n{raw_response}\n\n=== Attempted JSON Content ===\n{}\n",
        chrono::Utc::now().to_rfc3339(),
        attempted_json.unwrap_or("N/A"),
    );

    dump_text(dir, &filename, &content).then(|| dir.join(filename))
}

/// Write a text artifact. Returns whether the write succeeded. Never panics.
pub fn dump_text(dir: &Path, filename: &str, text: &str) -> bool {
    let path = dir.join(filename);
    match std::fs::write(&path, text.as_bytes()) {
        Ok(()) => {
            tracing::debug!(
                path = %path.display(),
                size = text.len(),
                "Diagnostic dump: text written"
            );
            true
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Diagnostic dump: failed to write text"
            );
            false
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
