//! Relog - rewrites ad-hoc console diagnostics into structured logger calls.
//!
//! This library provides the core functionality for relog, including:
//! - Skeleton matchers with bounded gaps and multi-alternative families
//! - Capture templates checked against their matcher before any text is touched
//! - An ordered rule table with declared cross-rule dependencies
//! - A single-pass rewrite driver with idempotence checking and atomic writes
//! - Configuration file parsing and cascade discovery
//!
//! # Example
//!
//! ```no_run
//! use relog_cli::config::load_merged_config;
//! use relog_cli::rewrite::{MigrateOptions, migrate};
//! use relog_cli::rules::compile_rules;
//!
//! let cwd = std::env::current_dir().unwrap();
//! let config = load_merged_config(&cwd).unwrap();
//! let table = compile_rules(&config).unwrap();
//!
//! let report = migrate(
//!     &cwd.join("server/storage.ts"),
//!     &table,
//!     &MigrateOptions::default(),
//! )
//! .unwrap();
//! println!("{} replacements", report.replacements());
//! ```

pub mod config;
pub mod error;
pub mod rewrite;
pub mod rules;

pub use error::{ErrorKind, RelogError, Result};
