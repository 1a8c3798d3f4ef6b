use std::io;
use std::process::Command;

/// Captured result of one external command.
#[derive(Debug, Clone, Default)]
pub struct ExecOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs assembled command lines. Calls block until the process exits.
pub trait Executor {
    fn execute(&mut self, command: &str) -> io::Result<ExecOutput>;
}

/// Hands the command line to the platform shell, since it is not escaped.
#[derive(Debug, Default)]
pub struct ShellExecutor;

impl Executor for ShellExecutor {
    fn execute(&mut self, command: &str) -> io::Result<ExecOutput> {
        let output = if cfg!(target_os = "windows") {
            Command::new("cmd").args(["/C", command]).output()?
        } else {
            Command::new("sh").args(["-c", command]).output()?
        };

        Ok(ExecOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_shell_executor_reports_exit_status() {
        let mut exec = ShellExecutor;
        let ok = exec.execute("echo hello").unwrap();
        assert!(ok.success);
        assert_eq!(ok.code, Some(0));
        assert_eq!(ok.stdout.trim(), "hello");

        let failed = exec.execute("echo oops >&2; exit 3").unwrap();
        assert!(!failed.success);
        assert_eq!(failed.code, Some(3));
        assert_eq!(failed.stderr.trim(), "oops");
    }
}
