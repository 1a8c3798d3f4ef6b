//! Build artifact cleanup (`cbuild --clean`).
//!
//! Removes exactly what a build writes: one artifact per unit, the
//! compilation database and the final target. Directories are left alone.

use crate::config::BuildConfig;
use anyhow::{Context, Result};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Every file a build of `config` may produce, in build order.
pub fn artifacts(config: &BuildConfig) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = config
        .units
        .iter()
        .map(|unit| PathBuf::from(config.artifact_path(unit)))
        .collect();
    paths.push(Path::new(&config.output_dir).join("compile_commands.json"));
    paths.push(PathBuf::from(config.target_path()));
    paths
}

/// Returns the number of files removed.
pub fn clean(config: &BuildConfig, verbose: bool) -> Result<usize> {
    let mut removed = 0;

    for path in artifacts(config) {
        if !path.is_file() {
            continue;
        }
        fs::remove_file(&path).with_context(|| format!("Failed to remove {}", path.display()))?;
        if verbose {
            println!("   {} Removed {}", "🗑️".red(), path.display());
        }
        removed += 1;
    }

    if removed > 0 {
        println!("{} Clean complete ({} file(s) removed).", "✓".green(), removed);
    } else {
        println!("{} Nothing to clean", "!".yellow());
    }
    Ok(removed)
}
