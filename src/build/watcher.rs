use super::core::{BuildOptions, build_project};
use crate::config::{self, BuildConfig};
use anyhow::{Context, Result};
use colored::*;
use notify::{Config, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc::channel;
use std::time::Duration;

/// Rebuilds whenever the input directory, a declared dependency or the
/// build description itself changes. Runs until the process is interrupted.
pub fn watch(config_path: &Path, options: &BuildOptions) -> Result<()> {
    let config = config::load(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    let (tx, rx) = channel();
    let config_notify = Config::default().with_poll_interval(Duration::from_secs(1));
    let mut watcher = notify::RecommendedWatcher::new(tx, config_notify)?;

    watcher.watch(Path::new(&config.input_dir), RecursiveMode::Recursive)?;
    watcher.watch(config_path, RecursiveMode::NonRecursive)?;
    for dep in watched_dependencies(&config) {
        watcher.watch(Path::new(dep), RecursiveMode::NonRecursive)?;
    }
    println!(
        "{} Watching {} for changes...",
        "👀".cyan(),
        config.input_dir.bold()
    );

    run_once(config_path, options);

    // Only the first run honours --force.
    let options = BuildOptions {
        force: false,
        ..options.clone()
    };
    while rx.recv().is_ok() {
        std::thread::sleep(Duration::from_millis(100));
        while rx.try_recv().is_ok() {}
        print!("\x1B[2J\x1B[1;1H");
        println!("{} File changed. Rebuilding...", "🔄".yellow());
        run_once(config_path, &options);
    }
    Ok(())
}

/// Dependencies outside the input directory that exist right now.
fn watched_dependencies(config: &BuildConfig) -> Vec<&str> {
    let input_dir = Path::new(&config.input_dir);
    let mut deps: Vec<&str> = config
        .units
        .iter()
        .flat_map(|u| u.dependencies.iter().map(String::as_str))
        .filter(|d| Path::new(d).exists() && !Path::new(d).starts_with(input_dir))
        .collect();
    deps.sort_unstable();
    deps.dedup();
    deps
}

fn run_once(config_path: &Path, options: &BuildOptions) {
    let result = config::load(config_path)
        .map_err(anyhow::Error::from)
        .and_then(|config| build_project(&config, options).map_err(anyhow::Error::from));

    match result {
        Ok(_) => println!("{} Finished", "✓".green()),
        Err(e) => println!("{} Error: {}", "x".red(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_watched_dependencies_skip_missing_and_inner_paths() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_string_lossy().to_string();
        fs_setup(dir.path());
        let inner = format!("{}/src/foo.h", root);
        let outer = format!("{}/include/common.h", root);
        let config = config::resolve(&json!({
            "indir": format!("{}/src", root),
            "outdir": "obj/",
            "targetdir": "bin/",
            "compiler": "cc",
            "format": ".c",
            "target": "app",
            "cpp_source": [
                { "name": "a", "dependencies": [inner, outer, "/does/not/exist.h"] },
                { "name": "b", "dependencies": [outer] }
            ]
        }))
        .unwrap();

        assert_eq!(watched_dependencies(&config), vec![outer.as_str()]);
    }

    fn fs_setup(root: &Path) {
        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::create_dir_all(root.join("include")).unwrap();
        std::fs::write(root.join("src/foo.h"), "").unwrap();
        std::fs::write(root.join("include/common.h"), "").unwrap();
    }
}
