use crate::error::{Result, RelogError};
use crate::rewrite::Limits;
use crate::rules::RuleDef;
use serde::Deserialize;
use std::path::PathBuf;

/// Document migrated when no config names a target.
pub const DEFAULT_TARGET: &str = "server/storage.ts";

/// Top-level configuration from a `.relog.toml` file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
	/// If true, stop the directory cascade and jump directly to ~/.relog.toml.
	#[serde(default)]
	pub root: bool,

	/// Document to migrate, relative to the directory of this config file.
	#[serde(default)]
	pub target: Option<PathBuf>,

	/// Whether the built-in rule table runs before the custom rules.
	#[serde(default)]
	pub builtin_rules: Option<bool>,

	/// Whether to re-apply the table to the output and refuse to write if
	/// anything still matches.
	#[serde(default)]
	pub verify_idempotence: Option<bool>,

	#[serde(default)]
	pub max_matches_per_rule: Option<usize>,

	#[serde(default)]
	pub max_document_bytes: Option<usize>,

	/// Environment variable name that, if truthy, skips ~/.relog.toml lookup.
	/// Useful for CI environments.
	#[serde(default)]
	pub user_config_disable_env_var: Option<String>,

	/// Extra rules, appended after the built-in table in the order written.
	#[serde(default)]
	pub rules: Vec<RuleConfig>,
}

/// A rewrite rule declared in a config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RuleConfig {
	/// Unique rule name.
	pub name: String,

	/// Skeleton to match (mutually exclusive with alternatives).
	pub pattern: Option<String>,

	/// Alternative skeletons, first match wins (mutually exclusive with pattern).
	pub alternatives: Option<Vec<String>>,

	/// Replacement template. An empty string deletes the match.
	pub template: String,

	/// Names of rules that must run before this one.
	#[serde(default)]
	pub after: Vec<String>,

	/// Free-form description shown by `relog rules`.
	pub note: Option<String>,
}

/// A loaded configuration with its source path for debugging/display.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
	/// The parsed configuration.
	pub config: Config,

	/// The path this config was loaded from.
	pub path: PathBuf,
}

/// Merged configuration from every config file in the cascade.
#[derive(Debug, Clone)]
pub struct MergedConfig {
	/// Target from the most specific config that sets one, already resolved
	/// against that config's directory.
	pub target: Option<PathBuf>,

	pub builtin_rules: bool,

	pub verify_idempotence: bool,

	pub limits: Limits,

	/// Custom rules, outermost config first.
	pub rules: Vec<RuleWithSource>,
}

impl Default for MergedConfig {
	fn default() -> Self {
		MergedConfig {
			target: None,
			builtin_rules: true,
			verify_idempotence: true,
			limits: Limits::default(),
			rules: Vec::new(),
		}
	}
}

/// A rule with its source config path for debugging/display.
#[derive(Debug, Clone)]
pub struct RuleWithSource {
	/// The rule itself.
	pub rule: RuleConfig,

	/// The config file this rule came from.
	pub source: PathBuf,
}

impl RuleConfig {
	/// Validate that exactly one of `pattern` and `alternatives` is set.
	pub fn validate(&self) -> Result<()> {
		match (&self.pattern, &self.alternatives) {
			(Some(_), Some(_)) => Err(RelogError::MutuallyExclusive {
				option1: "pattern".to_string(),
				option2: "alternatives".to_string(),
			}),
			(None, None) => Err(RelogError::MissingPattern {
				rule: self.name.clone(),
			}),
			(None, Some(alternatives)) if alternatives.is_empty() => {
				Err(RelogError::MissingPattern {
					rule: self.name.clone(),
				})
			}
			_ => Ok(()),
		}
	}

	/// Convert to an engine rule definition.
	pub fn to_rule_def(&self) -> RuleDef {
		let patterns = match (&self.pattern, &self.alternatives) {
			(Some(pattern), _) => vec![pattern.clone()],
			(None, Some(alternatives)) => alternatives.clone(),
			(None, None) => Vec::new(),
		};

		RuleDef {
			name: self.name.clone(),
			patterns,
			template: self.template.clone(),
			after: self.after.clone(),
			note: self.note.clone(),
		}
	}
}

impl Config {
	/// Validate all rules in this config.
	pub fn validate(&self) -> Result<()> {
		for rule in &self.rules {
			rule.validate()?;
		}
		Ok(())
	}
}
