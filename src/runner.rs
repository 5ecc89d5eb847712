//! Arrange / act / assert lifecycle for a single resolved case.
//!
//! The phases run strictly in order:
//! 1. **Arrange**: copy the original file over the actual file
//! 2. **Snapshot**: read the expected baseline (a missing baseline fails here,
//!    before any mutation work)
//! 3. **Act**: run the mutation pipeline against the actual file
//! 4. **Normalize**: optionally rewrite line endings in the actual file
//! 5. **Assert or accept**: compare against the snapshot, or overwrite the
//!    expected file in accept mode
//!
//! Only the actual file (and, in accept mode, the expected file) is written.
//! File handles never outlive a single read or write.

use std::path::Path;

use tokio::fs;

use crate::diagnostics::{HarnessError, Result};
use crate::mutation::MutationPipeline;
use crate::settings::ResolvedCaseSettings;

/// How a case that did not fail finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseOutcome {
    /// Actual output matched the expected baseline.
    Passed,
    /// Accept mode: the expected baseline was overwritten with the actual
    /// output. `changed` is false when the prior baseline already matched.
    Accepted { changed: bool },
}

/// Runs one case through the full lifecycle.
pub async fn run_case(
    settings: &ResolvedCaseSettings,
    pipeline: &dyn MutationPipeline,
) -> Result<CaseOutcome> {
    arrange(&settings.original, &settings.actual).await?;
    let expected = read(&settings.expected).await?;

    tracing::debug!(target_file = %settings.actual.display(), "running mutation pipeline");
    pipeline
        .invoke(&settings.actual, &settings.settings, settings.waves.as_ref())
        .await
        .map_err(|error| HarnessError::Pipeline {
            target: settings.actual.clone(),
            error,
        })?;

    let mut actual = read(&settings.actual).await?;
    if let Some(replacement) = &settings.normalize_endlines {
        let normalized = normalize_endlines(&String::from_utf8_lossy(&actual), replacement);
        actual = normalized.into_bytes();
        write(&settings.actual, &actual).await?;
    }

    if settings.accept {
        let changed = actual != expected;
        write(&settings.expected, &actual).await?;
        tracing::info!(expected = %settings.expected.display(), changed, "accepted new baseline");
        return Ok(CaseOutcome::Accepted { changed });
    }

    if actual != expected {
        return Err(HarnessError::Assertion {
            expected_path: settings.expected.clone(),
            expected: String::from_utf8_lossy(&expected).into_owned(),
            actual: String::from_utf8_lossy(&actual).into_owned(),
        });
    }
    Ok(CaseOutcome::Passed)
}

/// Replaces every `\r\n` or bare `\n` in `contents` with `replacement`.
pub fn normalize_endlines(contents: &str, replacement: &str) -> String {
    contents.replace("\r\n", "\n").replace('\n', replacement)
}

async fn arrange(original: &Path, actual: &Path) -> Result<()> {
    let contents = read(original).await?;
    write(actual, &contents).await
}

async fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path)
        .await
        .map_err(|e| HarnessError::io("read", path, e))
}

async fn write(path: &Path, contents: &[u8]) -> Result<()> {
    fs::write(path, contents)
        .await
        .map_err(|e| HarnessError::io("write", path, e))
}
