//! Incremental check: decides whether a unit's artifact must be rebuilt.
//!
//! Staleness is purely timestamp based. When a modification time cannot be
//! read (missing file, permissions) the current time is used instead, so an
//! unknown timestamp always pushes toward rebuilding.

use crate::config::{BuildConfig, CompilationUnit};
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::SystemTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staleness {
    Fresh,
    Stale(StaleReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleReason {
    Forced,
    MissingArtifact,
    SourceNewer,
    /// First dependency found newer than the artifact.
    DependencyNewer(String),
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaleReason::Forced => write!(f, "forced"),
            StaleReason::MissingArtifact => write!(f, "no artifact"),
            StaleReason::SourceNewer => write!(f, "source changed"),
            StaleReason::DependencyNewer(dep) => write!(f, "dependency {} changed", dep),
        }
    }
}

/// Modification time of `path`, or now if it cannot be read.
pub fn mtime_or_now(path: &Path) -> SystemTime {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or_else(|_| SystemTime::now())
}

pub fn decide(unit: &CompilationUnit, config: &BuildConfig, force: bool) -> Staleness {
    if force {
        return Staleness::Stale(StaleReason::Forced);
    }

    let artifact = config.artifact_path(unit);
    let artifact = Path::new(&artifact);
    if !artifact.exists() {
        return Staleness::Stale(StaleReason::MissingArtifact);
    }

    let artifact_time = mtime_or_now(artifact);
    let source_time = mtime_or_now(Path::new(&config.source_path(unit)));
    if artifact_time < source_time {
        return Staleness::Stale(StaleReason::SourceNewer);
    }

    // Flat list, declared order, first hit wins.
    for dep in &unit.dependencies {
        if mtime_or_now(Path::new(dep)) > artifact_time {
            return Staleness::Stale(StaleReason::DependencyNewer(dep.clone()));
        }
    }

    Staleness::Fresh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolve;
    use serde_json::json;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::TempDir;

    struct Project {
        dir: TempDir,
        config: BuildConfig,
    }

    impl Project {
        fn new(units: serde_json::Value) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let root = dir.path().to_string_lossy().to_string();
            fs::create_dir_all(dir.path().join("src")).unwrap();
            fs::create_dir_all(dir.path().join("obj")).unwrap();
            let config = resolve(&json!({
                "indir": format!("{}/src/", root),
                "outdir": format!("{}/obj/", root),
                "targetdir": format!("{}/", root),
                "compiler": "cc",
                "format": ".c",
                "target": "app",
                "cpp_source": units
            }))
            .unwrap();
            Self { dir, config }
        }

        /// Creates `rel` under the project root with an mtime `secs` after a fixed base.
        fn touch(&self, rel: &str, secs: u64) -> String {
            let path = self.dir.path().join(rel);
            fs::write(&path, "").unwrap();
            let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
            File::options()
                .write(true)
                .open(&path)
                .unwrap()
                .set_modified(base + Duration::from_secs(secs))
                .unwrap();
            path.to_string_lossy().to_string()
        }

        fn decide(&self, force: bool) -> Staleness {
            decide(&self.config.units[0], &self.config, force)
        }
    }

    #[test]
    fn test_missing_artifact_is_stale() {
        let p = Project::new(json!(["foo"]));
        p.touch("src/foo.c", 10);
        assert_eq!(p.decide(false), Staleness::Stale(StaleReason::MissingArtifact));
    }

    #[test]
    fn test_force_is_always_stale() {
        let p = Project::new(json!(["foo"]));
        p.touch("src/foo.c", 10);
        p.touch("obj/foo.o", 100);
        assert_eq!(p.decide(true), Staleness::Stale(StaleReason::Forced));
    }

    #[test]
    fn test_newer_artifact_is_fresh() {
        let p = Project::new(json!(["foo"]));
        p.touch("src/foo.c", 10);
        p.touch("obj/foo.o", 20);
        assert_eq!(p.decide(false), Staleness::Fresh);
    }

    #[test]
    fn test_equal_timestamps_are_fresh() {
        let p = Project::new(json!(["foo"]));
        p.touch("src/foo.c", 10);
        p.touch("obj/foo.o", 10);
        assert_eq!(p.decide(false), Staleness::Fresh);
    }

    #[test]
    fn test_newer_source_is_stale() {
        let p = Project::new(json!(["foo"]));
        p.touch("obj/foo.o", 10);
        p.touch("src/foo.c", 20);
        assert_eq!(p.decide(false), Staleness::Stale(StaleReason::SourceNewer));
    }

    #[test]
    fn test_unreadable_source_counts_as_now() {
        let p = Project::new(json!(["foo"]));
        p.touch("obj/foo.o", 10);
        assert_eq!(p.decide(false), Staleness::Stale(StaleReason::SourceNewer));
    }

    #[test]
    fn test_first_newer_dependency_is_reported() {
        let p = Project::new(json!(["foo"]));
        let deps: Vec<String> = [("a.h", 5), ("b.h", 30), ("c.h", 40)]
            .into_iter()
            .map(|(name, secs)| p.touch(name, secs))
            .collect();
        let mut config = p.config.clone();
        config.units[0].dependencies = deps.clone();
        p.touch("src/foo.c", 10);
        p.touch("obj/foo.o", 20);
        assert_eq!(
            decide(&config.units[0], &config, false),
            Staleness::Stale(StaleReason::DependencyNewer(deps[1].clone()))
        );
    }

    #[test]
    fn test_older_dependencies_keep_fresh() {
        let p = Project::new(json!(["foo"]));
        let header = p.touch("foo.h", 5);
        let mut config = p.config.clone();
        config.units[0].dependencies = vec![header];
        p.touch("src/foo.c", 10);
        p.touch("obj/foo.o", 20);
        assert_eq!(decide(&config.units[0], &config, false), Staleness::Fresh);
    }

    #[test]
    fn test_missing_dependency_counts_as_now() {
        let p = Project::new(json!([{ "name": "foo", "dependencies": ["/nonexistent/dep.h"] }]));
        p.touch("src/foo.c", 10);
        p.touch("obj/foo.o", 20);
        assert_eq!(
            p.decide(false),
            Staleness::Stale(StaleReason::DependencyNewer("/nonexistent/dep.h".into()))
        );
    }

    #[test]
    fn test_custom_target_name_is_checked() {
        let p = Project::new(json!([{ "name": "foo", "target": "foo.obj" }]));
        p.touch("src/foo.c", 10);
        p.touch("obj/foo.o", 20);
        assert_eq!(p.decide(false), Staleness::Stale(StaleReason::MissingArtifact));
        p.touch("obj/foo.obj", 20);
        assert_eq!(p.decide(false), Staleness::Fresh);
    }
}
