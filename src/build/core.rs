use super::command::{compile_command, link_command};
use super::exec::{ExecOutput, Executor, ShellExecutor};
use super::feedback::FeedbackAnalyzer;
use super::staleness::{self, StaleReason, Staleness};
use crate::config::{BuildConfig, CompilationUnit};
use crate::error::BuildError;
use colored::*;
use serde_json::json;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Recompile stale units, then link.
    #[default]
    Build,
    /// Recompile stale units only.
    Recompile,
}

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub mode: Mode,
    pub force: bool,
    pub verbose: bool,
    pub dry_run: bool,
    pub compile_commands: bool,
}

/// Orchestrator state. Runs strictly forward; any error ends in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    ValidateDirs,
    Recompile,
    Link,
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    Compiled {
        reason: StaleReason,
        elapsed: Duration,
    },
    UpToDate,
    /// Dry run: the unit is stale but nothing was executed.
    WouldCompile(StaleReason),
}

#[derive(Debug, Clone)]
pub struct UnitReport {
    pub name: String,
    pub outcome: UnitOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub units: Vec<UnitReport>,
    pub link_command: Option<String>,
    pub link_elapsed: Option<Duration>,
}

impl BuildReport {
    pub fn compiled(&self) -> impl Iterator<Item = &UnitReport> {
        self.units
            .iter()
            .filter(|u| matches!(u.outcome, UnitOutcome::Compiled { .. }))
    }
}

/// Drives one run: validate directories, recompile stale units, link.
///
/// Exactly one external process is in flight at a time. The first failing
/// step aborts the run; artifacts written before it stay on disk.
pub struct Orchestrator<'a, E: Executor> {
    config: &'a BuildConfig,
    options: &'a BuildOptions,
    executor: E,
    phase: Phase,
    report: BuildReport,
}

impl<'a, E: Executor> Orchestrator<'a, E> {
    pub fn new(config: &'a BuildConfig, options: &'a BuildOptions, executor: E) -> Self {
        Self {
            config,
            options,
            executor,
            phase: Phase::Idle,
            report: BuildReport::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn run(&mut self) -> Result<(), BuildError> {
        let result = self.run_phases();
        self.phase = if result.is_ok() {
            Phase::Done
        } else {
            Phase::Failed
        };
        result
    }

    fn run_phases(&mut self) -> Result<(), BuildError> {
        self.phase = Phase::ValidateDirs;
        self.validate_dirs()?;

        self.phase = Phase::Recompile;
        self.recompile()?;

        if self.options.mode == Mode::Build {
            self.phase = Phase::Link;
            self.link()?;
        }
        Ok(())
    }

    fn validate_dirs(&self) -> Result<(), BuildError> {
        let input_dir = Path::new(&self.config.input_dir);
        if !input_dir.is_dir() {
            return Err(BuildError::MissingInputDir(input_dir.to_path_buf()));
        }

        let output_dir = Path::new(&self.config.output_dir);
        if !output_dir.is_dir() {
            if self.options.dry_run {
                println!("   {} Would create {}", "·".dimmed(), output_dir.display());
            } else {
                fs::create_dir_all(output_dir).map_err(|source| BuildError::CreateOutputDir {
                    path: output_dir.to_path_buf(),
                    source,
                })?;
                if self.options.verbose {
                    println!("   {} Created {}", "✓".green(), output_dir.display());
                }
            }
        }

        // The target directory is never created; the linker reports it if absent.
        if self.options.mode == Mode::Build && !Path::new(&self.config.target_dir).is_dir() {
            println!(
                "   {} Target directory '{}' does not exist",
                "!".yellow(),
                self.config.target_dir
            );
        }
        Ok(())
    }

    fn recompile(&mut self) -> Result<(), BuildError> {
        let config = self.config;
        println!("{} Compilation:", "⚙".blue());

        for unit in &config.units {
            let reason = match staleness::decide(unit, config, self.options.force) {
                Staleness::Fresh => {
                    if self.options.verbose {
                        println!("   {} {} up to date", "⚡".green(), unit.source_name().dimmed());
                    }
                    self.record(unit, UnitOutcome::UpToDate);
                    continue;
                }
                Staleness::Stale(reason) => reason,
            };

            let command = compile_command(unit, config)?;
            if self.options.verbose {
                println!("   {} {} ({})", "→".cyan(), unit.source_name(), reason);
                println!("     {}", command.dimmed());
            }
            if self.options.dry_run {
                println!("   {} Would execute: {}", "·".dimmed(), command);
                self.record(unit, UnitOutcome::WouldCompile(reason));
                continue;
            }

            let start = Instant::now();
            let output = self.execute(&command)?;
            if !output.success {
                report_failure(&format!("Cannot compile {}", unit.source_name()), &output);
                return Err(BuildError::Compile {
                    unit: unit.name.clone(),
                });
            }
            let elapsed = start.elapsed();

            if !output.stderr.trim().is_empty() {
                println!(
                    "   {} Warning in {}:\n{}",
                    "!".yellow(),
                    unit.source_name(),
                    output.stderr.trim_end()
                );
            }
            println!(
                "   {} {}: {}",
                "✓".green(),
                unit.source_name().blue(),
                format!("{} ms", elapsed.as_millis()).dimmed()
            );
            self.record(unit, UnitOutcome::Compiled { reason, elapsed });
        }

        if self.options.compile_commands {
            self.write_compile_commands()?;
        }
        Ok(())
    }

    fn link(&mut self) -> Result<(), BuildError> {
        let command = link_command(&self.config.units, self.config)?;
        println!("{} Linking:", "🔗".cyan());
        if self.options.verbose {
            println!("     {}", command.dimmed());
        }
        if self.options.dry_run {
            println!("   {} Would execute: {}", "·".dimmed(), command);
            self.report.link_command = Some(command);
            return Ok(());
        }

        let start = Instant::now();
        let output = self.execute(&command)?;
        self.report.link_command = Some(command);
        if !output.success {
            report_failure("Linking failed", &output);
            return Err(BuildError::Link);
        }
        let elapsed = start.elapsed();
        println!(
            "   {} {}: {}",
            "✓".green(),
            self.config.target_path().blue(),
            format!("{} ms", elapsed.as_millis()).dimmed()
        );
        self.report.link_elapsed = Some(elapsed);
        Ok(())
    }

    fn execute(&mut self, command: &str) -> Result<ExecOutput, BuildError> {
        let output = self
            .executor
            .execute(command)
            .map_err(|source| BuildError::Spawn {
                command: command.to_string(),
                source,
            })?;
        if !output.stdout.trim().is_empty() {
            println!("{}", output.stdout.trim_end());
        }
        Ok(output)
    }

    fn record(&mut self, unit: &CompilationUnit, outcome: UnitOutcome) {
        self.report.units.push(UnitReport {
            name: unit.name.clone(),
            outcome,
        });
    }

    fn write_compile_commands(&self) -> Result<(), BuildError> {
        let directory = std::env::current_dir()?.to_string_lossy().to_string();
        let mut entries = Vec::with_capacity(self.config.units.len());
        for unit in &self.config.units {
            let command = compile_command(unit, self.config)?;
            entries.push(json!({
                "directory": directory,
                "command": command,
                "file": self.config.source_path(unit),
            }));
        }

        let path = Path::new(&self.config.output_dir).join("compile_commands.json");
        if self.options.dry_run {
            println!("   {} Would write {}", "·".dimmed(), path.display());
            return Ok(());
        }
        let json_str = serde_json::to_string_pretty(&entries).map_err(std::io::Error::other)?;
        fs::write(&path, json_str)?;
        if self.options.verbose {
            println!("   {} Wrote {}", "✓".green(), path.display());
        }
        Ok(())
    }
}

fn report_failure(headline: &str, output: &ExecOutput) {
    if !output.stderr.trim().is_empty() {
        println!("{}", output.stderr.trim_end());
    }
    match output.code {
        Some(code) => println!("{} {} (exit code {})", "x".red(), headline, code),
        None => println!("{} {} (terminated by signal)", "x".red(), headline),
    }
    if let Some(hint) = FeedbackAnalyzer::analyze(&output.stderr) {
        println!("{} {}", "💡".yellow(), hint);
    }
}

/// Runs a build with the platform shell.
pub fn build_project(config: &BuildConfig, options: &BuildOptions) -> Result<BuildReport, BuildError> {
    let mut orchestrator = Orchestrator::new(config, options, ShellExecutor);
    orchestrator.run()?;
    Ok(orchestrator.report().clone())
}
