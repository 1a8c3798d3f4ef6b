//! Build description (`build.json`) resolution.
//!
//! The parsed JSON tree is turned into one immutable [`BuildConfig`] that owns
//! the ordered list of [`CompilationUnit`]s. Each unit field is resolved with
//! the same chain: explicit per-unit value, then the global default, then a
//! built-in fallback (only `cflags` has one).
//!
//! ```json
//! {
//!     "indir": "src/", "outdir": "obj/", "targetdir": "bin/",
//!     "compiler": "gcc", "format": ".c", "target": "app",
//!     "cflags": "-c -O2", "libs": "-lm",
//!     "cpp_source": ["main", { "name": "util", "linkable": false }]
//! }
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Compiler flags used when neither the unit nor the project sets any.
pub const DEFAULT_CFLAGS: &str = "-c";

/// Extension appended to a unit name when it has no explicit `target`.
pub const OBJECT_EXT: &str = ".o";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub input_dir: String,
    pub output_dir: String,
    pub target_dir: String,
    pub compiler: String,
    pub linker: String,
    /// File extension of sources, e.g. `.c`.
    pub source_format: String,
    pub global_cflags: Option<String>,
    /// Only ever passed to the link step.
    pub global_libs: Option<String>,
    pub target_name: String,
    /// Declaration order from the build description.
    pub units: Vec<CompilationUnit>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    /// Source path relative to the input directory, without extension.
    pub name: String,
    pub format: String,
    pub compiler: String,
    pub cflags: String,
    /// Per-unit compile-time libraries. Never inherited from the global `libs`.
    pub libs: Option<String>,
    /// Output file name overriding `name + ".o"`.
    pub target: Option<String>,
    pub linkable: bool,
    /// Extra paths whose timestamps gate staleness. Never expanded transitively.
    pub dependencies: Vec<String>,
}

impl CompilationUnit {
    pub fn artifact_name(&self) -> String {
        match &self.target {
            Some(target) => target.clone(),
            None => format!("{}{}", self.name, OBJECT_EXT),
        }
    }

    pub fn source_name(&self) -> String {
        format!("{}{}", self.name, self.format)
    }
}

impl BuildConfig {
    pub fn source_path(&self, unit: &CompilationUnit) -> String {
        join_dir(&self.input_dir, &unit.source_name())
    }

    pub fn artifact_path(&self, unit: &CompilationUnit) -> String {
        join_dir(&self.output_dir, &unit.artifact_name())
    }

    pub fn target_path(&self) -> String {
        join_dir(&self.target_dir, &self.target_name)
    }

    pub fn linkable_units(&self) -> impl Iterator<Item = &CompilationUnit> {
        self.units.iter().filter(|u| u.linkable)
    }
}

/// Joins a configured directory and a file name.
///
/// Directories are usually written with a trailing separator (`"src/"`), in
/// which case the two parts are concatenated verbatim.
pub fn join_dir(dir: &str, file: &str) -> String {
    if dir.is_empty() || dir.ends_with('/') || dir.ends_with('\\') {
        format!("{}{}", dir, file)
    } else {
        format!("{}/{}", dir, file)
    }
}

/// Per-unit value, else global default, else built-in fallback.
pub fn resolve_field<T: Clone>(unit: Option<T>, global: Option<&T>, fallback: Option<T>) -> Option<T> {
    unit.or_else(|| global.cloned()).or(fallback)
}

#[derive(Deserialize, Debug, Default)]
struct RawConfig {
    indir: Option<String>,
    outdir: Option<String>,
    targetdir: Option<String>,
    compiler: Option<String>,
    linker: Option<String>,
    format: Option<String>,
    cflags: Option<String>,
    libs: Option<String>,
    target: Option<String>,
    cpp_source: Option<Vec<Value>>,
}

#[derive(Deserialize, Debug, Default)]
struct RawUnit {
    name: Option<String>,
    format: Option<String>,
    compiler: Option<String>,
    cflags: Option<String>,
    libs: Option<String>,
    target: Option<String>,
    linkable: Option<bool>,
    dependencies: Option<Vec<String>>,
}

fn required(value: Option<String>, key: &'static str) -> Result<String, ConfigError> {
    value.ok_or(ConfigError::MissingField(key))
}

/// Reads and resolves a build description file.
pub fn load(path: &Path) -> Result<BuildConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let tree: Value = serde_json::from_str(&content)?;
    resolve(&tree)
}

/// Resolves a parsed tree. Touches nothing but memory.
pub fn resolve(tree: &Value) -> Result<BuildConfig, ConfigError> {
    let raw = RawConfig::deserialize(tree)?;

    let input_dir = required(raw.indir, "indir")?;
    let output_dir = required(raw.outdir, "outdir")?;
    let target_dir = required(raw.targetdir, "targetdir")?;
    let compiler = required(raw.compiler, "compiler")?;
    let source_format = required(raw.format, "format")?;
    let target_name = required(raw.target, "target")?;
    let entries = raw
        .cpp_source
        .ok_or(ConfigError::MissingField("cpp_source"))?;
    if entries.is_empty() {
        return Err(ConfigError::EmptyUnitList);
    }

    let mut config = BuildConfig {
        input_dir,
        output_dir,
        target_dir,
        linker: raw.linker.unwrap_or_else(|| compiler.clone()),
        compiler,
        source_format,
        global_cflags: raw.cflags,
        global_libs: raw.libs,
        target_name,
        units: Vec::with_capacity(entries.len()),
    };

    for (index, entry) in entries.iter().enumerate() {
        let raw_unit = match entry {
            Value::String(name) => RawUnit {
                name: Some(name.clone()),
                ..Default::default()
            },
            Value::Object(_) => RawUnit::deserialize(entry)
                .map_err(|source| ConfigError::InvalidUnitField { index, source })?,
            _ => return Err(ConfigError::InvalidUnitShape { index }),
        };
        let unit = resolve_unit(raw_unit, &config, index)?;
        config.units.push(unit);
    }

    Ok(config)
}

fn resolve_unit(
    raw: RawUnit,
    config: &BuildConfig,
    index: usize,
) -> Result<CompilationUnit, ConfigError> {
    let name = raw
        .name
        .filter(|n| !n.is_empty())
        .ok_or(ConfigError::MissingUnitName { index })?;

    // The three mandatory-with-default fields always resolve to something.
    let format = resolve_field(raw.format, Some(&config.source_format), None).unwrap_or_default();
    let compiler = resolve_field(raw.compiler, Some(&config.compiler), None).unwrap_or_default();
    let cflags = resolve_field(
        raw.cflags,
        config.global_cflags.as_ref(),
        Some(DEFAULT_CFLAGS.to_string()),
    )
    .unwrap_or_default();

    Ok(CompilationUnit {
        name,
        format,
        compiler,
        cflags,
        libs: raw.libs,
        target: raw.target,
        linkable: raw.linkable.unwrap_or(true),
        dependencies: raw.dependencies.unwrap_or_default(),
    })
}
