//! Compiler and linker command lines.
//!
//! Configuration strings are trusted and inserted verbatim: no quoting or
//! escaping happens here. Commands are length-checked instead of truncated.

use crate::config::{BuildConfig, CompilationUnit};
use crate::error::BuildError;

/// Upper bound for one assembled command, in bytes.
pub const MAX_COMMAND_LEN: usize = 8191;

pub const OUTPUT_FLAG: &str = "-o";

/// Space-separated command builder. Empty tokens are dropped.
#[derive(Debug, Default)]
struct CommandLine {
    buf: String,
}

impl CommandLine {
    fn push(&mut self, token: &str) -> &mut Self {
        let token = token.trim();
        if !token.is_empty() {
            if !self.buf.is_empty() {
                self.buf.push(' ');
            }
            self.buf.push_str(token);
        }
        self
    }

    fn finish(self) -> Result<String, BuildError> {
        if self.buf.len() > MAX_COMMAND_LEN {
            return Err(BuildError::CommandTooLong {
                len: self.buf.len(),
                max: MAX_COMMAND_LEN,
            });
        }
        Ok(self.buf)
    }
}

/// `compiler cflags source [libs] -o artifact`
pub fn compile_command(unit: &CompilationUnit, config: &BuildConfig) -> Result<String, BuildError> {
    let mut cmd = CommandLine::default();
    cmd.push(&unit.compiler)
        .push(&unit.cflags)
        .push(&config.source_path(unit));
    if let Some(libs) = &unit.libs {
        cmd.push(libs);
    }
    cmd.push(OUTPUT_FLAG).push(&config.artifact_path(unit));
    cmd.finish()
}

/// `linker artifacts... [libs] -o target`, linkable units only, in order.
pub fn link_command(units: &[CompilationUnit], config: &BuildConfig) -> Result<String, BuildError> {
    let mut cmd = CommandLine::default();
    cmd.push(&config.linker);
    for unit in units.iter().filter(|u| u.linkable) {
        cmd.push(&config.artifact_path(unit));
    }
    if let Some(libs) = &config.global_libs {
        cmd.push(libs);
    }
    cmd.push(OUTPUT_FLAG).push(&config.target_path());
    cmd.finish()
}
