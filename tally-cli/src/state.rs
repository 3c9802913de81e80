use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Default ledger written by `tally run` when no `--out` is given
pub const DEFAULT_RUN_OUTPUT: &str = "Categorized_Output.csv";

pub fn tally_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".tally"))
}

pub fn ensure_tally_home() -> Result<PathBuf> {
    let dir = tally_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// `Categorized_<name>` next to the input, or inside `out_dir`
pub fn categorized_path(input: &Path, out_dir: Option<&Path>) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "statement.csv".to_string());
    let file = format!("Categorized_{name}");
    match out_dir {
        Some(dir) => dir.join(file),
        None => input.with_file_name(file),
    }
}
