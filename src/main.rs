//! # cbuild CLI Entry Point
//!
//! Parses the run mode from flags, loads `build.json` (or the given path) and
//! hands off to the build orchestrator.
//!
//! Short flags cluster, so the historical forms `-fb`, `-bf`, `-fr` and `-rf`
//! keep working: they are `-f` combined with `-b` or `-r`.

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::time::Instant;

use cbuild::build::{self, BuildOptions, Mode};
use cbuild::config;
use cbuild::ui;

#[derive(Parser, Debug)]
#[command(name = "cbuild")]
#[command(about = "Incremental build orchestrator for C/C++ projects", version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
struct Cli {
    /// Path to the build description
    #[arg(default_value = "build.json")]
    config: PathBuf,

    /// Recompile stale object files, then link (default)
    #[arg(short = 'b', long = "build")]
    build: bool,

    /// Recompile stale object files without linking
    #[arg(short = 'r', long = "recompile")]
    recompile: bool,

    /// Recompile every unit, even if its object file is up to date
    #[arg(short = 'f', long = "force")]
    force: bool,

    /// Same as -fb
    #[arg(long = "force_build")]
    force_build: bool,

    /// Same as -fr
    #[arg(long = "force_recompile")]
    force_recompile: bool,

    /// Show every command and staleness decision
    #[arg(short, long)]
    verbose: bool,

    /// Show what would be executed without running anything
    #[arg(long)]
    dry_run: bool,

    /// Write compile_commands.json to the output directory
    #[arg(long)]
    compile_commands: bool,

    /// Remove object files and the final target
    #[arg(short = 'c', long, conflicts_with_all = ["watch", "dry_run"])]
    clean: bool,

    /// Rebuild whenever a source or dependency changes
    #[arg(short = 'w', long)]
    watch: bool,
}

impl Cli {
    /// Forced build > forced recompile > build > recompile > default build.
    fn mode(&self) -> (Mode, bool) {
        if self.force_build || (self.force && self.build) {
            (Mode::Build, true)
        } else if self.force_recompile || (self.force && self.recompile) {
            (Mode::Recompile, true)
        } else if self.build {
            (Mode::Build, false)
        } else if self.recompile {
            (Mode::Recompile, false)
        } else {
            (Mode::Build, self.force)
        }
    }

    fn options(&self) -> BuildOptions {
        let (mode, force) = self.mode();
        BuildOptions {
            mode,
            force,
            verbose: self.verbose,
            dry_run: self.dry_run,
            compile_commands: self.compile_commands,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let options = cli.options();

    if cli.watch {
        return build::watch(&cli.config, &options);
    }

    let config = match config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            println!("{} {}", "x".red(), e);
            println!("{}", " Cannot read build description ".red().bold());
            std::process::exit(1);
        }
    };

    if cli.clean {
        build::clean(&config, cli.verbose).context("Clean failed")?;
        return Ok(());
    }

    let start = Instant::now();
    match build::build_project(&config, &options) {
        Ok(report) => {
            if options.verbose || options.dry_run {
                ui::summary_table(&report).print();
            }
            println!(
                "{} total in {} ms",
                " Finished".green(),
                start.elapsed().as_millis()
            );
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "x".red(), e);
            println!("{}", " Error occurred ".red().bold());
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("cbuild").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_default_is_unforced_build() {
        let cli = parse(&[]);
        assert_eq!(cli.mode(), (Mode::Build, false));
        assert_eq!(cli.config, PathBuf::from("build.json"));
    }

    #[test]
    fn test_flag_aliases() {
        assert_eq!(parse(&["-b"]).mode(), (Mode::Build, false));
        assert_eq!(parse(&["--build"]).mode(), (Mode::Build, false));
        assert_eq!(parse(&["-r"]).mode(), (Mode::Recompile, false));
        assert_eq!(parse(&["--recompile"]).mode(), (Mode::Recompile, false));
        for flags in [&["-fb"][..], &["-bf"], &["--force_build"]] {
            assert_eq!(parse(flags).mode(), (Mode::Build, true));
        }
        for flags in [&["-fr"][..], &["-rf"], &["--force_recompile"]] {
            assert_eq!(parse(flags).mode(), (Mode::Recompile, true));
        }
    }

    #[test]
    fn test_forced_build_wins() {
        assert_eq!(parse(&["-r", "--force_build"]).mode(), (Mode::Build, true));
        assert_eq!(parse(&["-b", "-r"]).mode(), (Mode::Build, false));
    }

    #[test]
    fn test_config_path_argument() {
        let cli = parse(&["-fb", "project/build.json"]);
        assert_eq!(cli.config, PathBuf::from("project/build.json"));
    }

    #[test]
    fn test_help_is_not_a_build() {
        let err = Cli::try_parse_from(["cbuild", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
