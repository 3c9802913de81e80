use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::error;

use tally_finance::{CategorizeError, CsvReport, MasterKeywordTable, categorize_csv, load_master_table};

use crate::config::Config;
use crate::state::categorized_path;

/// Categorize statement CSVs, writing `Categorized_<name>` for each
pub async fn categorize(
    files: Vec<PathBuf>,
    master: Option<String>,
    out_dir: Option<PathBuf>,
    cfg: &Config,
) -> Result<ExitCode> {
    let source = cfg.master.source(master.as_deref());
    let table = load_master_table(&source, &cfg.master.fetch_policy())
        .await
        .context("loading keyword table")?;

    if let Some(dir) = &out_dir {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }

    let mut failed = 0;
    for path in &files {
        match categorize_file(path, out_dir.as_deref(), &table) {
            Ok((out, report)) => println!(
                "{} -> {} ({} rows, {} uncategorized, column {:?})",
                path.display(),
                out.display(),
                report.rows,
                report.uncategorized,
                report.description_column
            ),
            Err(e) => {
                failed += 1;
                match e.to_diagnostic() {
                    Some(d) => eprintln!("  {}", d.for_file(path.display().to_string())),
                    None => error!(file = %path.display(), error = %e, "categorize failed"),
                }
            }
        }
    }

    Ok(if failed == files.len() { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

/// Output is buffered so a rejected file leaves nothing behind
fn categorize_file(
    path: &Path,
    out_dir: Option<&Path>,
    table: &MasterKeywordTable,
) -> Result<(PathBuf, CsvReport), CategorizeError> {
    let input = fs::File::open(path)?;
    let mut buf = Vec::new();
    let report = categorize_csv(input, &mut buf, table)?;

    let out = categorized_path(path, out_dir);
    fs::write(&out, buf)?;
    Ok((out, report))
}
