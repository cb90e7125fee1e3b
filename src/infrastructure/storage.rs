use crate::domain::error::Result;
use crate::domain::test_case::TestCaseBatch;
use std::fs;
use std::path::{Path, PathBuf};

/// Paths written by [`save_debug_responses`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugFiles {
    pub raw: PathBuf,
    pub cleaned: PathBuf,
}

pub fn save_batch(path: &Path, batch: &TestCaseBatch) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let json = serde_json::to_string_pretty(batch)?;
    fs::write(path, json)?;
    Ok(())
}

/// Keeps the unusable response next to where the batch would have gone:
/// `out.json` becomes `out_raw.txt` and `out_cleaned.txt`.
pub fn save_debug_responses(path: &Path, raw: &str, cleaned: &str) -> Result<DebugFiles> {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "response".to_string());
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    ensure_dir(dir)?;

    let files = DebugFiles {
        raw: dir.join(format!("{}_raw.txt", stem)),
        cleaned: dir.join(format!("{}_cleaned.txt", stem)),
    };
    fs::write(&files.raw, raw)?;
    fs::write(&files.cleaned, cleaned)?;
    Ok(files)
}

fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.as_os_str().is_empty() && !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
