//! # cbuild - incremental build orchestrator for C/C++
//!
//! cbuild reads a declarative `build.json`, recompiles only the units whose
//! object file is older than its source or one of its declared dependencies,
//! and links the surviving objects into the final target.
//!
//! ## Quick Start
//!
//! ```bash
//! # Build, recompiling only what changed
//! cbuild
//!
//! # Recompile everything, then link
//! cbuild -fb
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - `build.json` resolution and field inheritance
//! - [`build`] - staleness checks, command construction and the build run
//! - [`error`] - error taxonomy
//! - [`ui`] - terminal table for the build summary

/// Staleness checks, command lines and the sequential build run.
pub mod build;

/// Build description parsing (`build.json`).
pub mod config;

/// Configuration and build errors.
pub mod error;

/// Terminal UI utilities (tables).
pub mod ui;
