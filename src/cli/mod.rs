pub mod errors;
pub mod feedback;
pub mod suggest;

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Read a log file for one analysis step.
///
/// A missing file is reported and yields `None` so the caller can skip its
/// step while the remaining steps still run. Invalid UTF-8 is replaced.
fn read_log(path: &Path, kind: &str) -> Result<Option<String>> {
    if !path.is_file() {
        eprintln!("ERROR: {} file not found: {}", kind, path.display());
        warn!("Skipping {} analysis, no file at {}", kind, path.display());
        return Ok(None);
    }
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!("{} contains invalid UTF-8, replaced", path.display());
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };
    Ok(Some(text))
}
