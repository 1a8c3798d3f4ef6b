mod clean;
pub mod command;
mod core;
mod exec;
mod feedback;
pub mod staleness;
mod watcher;

pub use clean::{artifacts, clean};
pub use command::{MAX_COMMAND_LEN, compile_command, link_command};
pub use self::core::{
    BuildOptions, BuildReport, Mode, Orchestrator, Phase, UnitOutcome, UnitReport, build_project,
};
pub use exec::{ExecOutput, Executor, ShellExecutor};
pub use feedback::FeedbackAnalyzer;
pub use staleness::{StaleReason, Staleness, decide};
pub use watcher::watch;
