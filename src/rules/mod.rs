//! Rule definitions for relog.
//!
//! This module handles:
//! - Skeleton patterns with bounded, terminator-delimited gaps
//! - Single and multi-alternative matchers
//! - Templates with positional and named capture references
//! - The ordered rule table and the built-in migration rules

pub mod builtin;
pub mod matcher;
pub mod skeleton;
pub mod table;
pub mod template;

pub use builtin::builtin_rules;
pub use matcher::{CompiledSkeleton, Match, Matcher, Matches};
pub use skeleton::{Segment, Skeleton};
pub use table::{Rule, RuleDef, RuleTable};
pub use template::{CaptureRef, ResolvedTemplate, Template};

use crate::config::MergedConfig;
use crate::error::Result;

/// Compile the effective rule table for a merged config: the built-in rules
/// (unless disabled), followed by the config's own rules.
pub fn compile_rules(config: &MergedConfig) -> Result<RuleTable> {
	let builtin = if config.builtin_rules {
		builtin_rules()
	} else {
		Vec::new()
	};
	let custom = config.rules.iter().map(|r| r.rule.to_rule_def());

	RuleTable::compile(builtin.into_iter().chain(custom), &config.limits)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::{LoadedConfig, merge_configs, parse_config_str};
	use crate::error::RelogError;
	use std::path::PathBuf;

	fn merged(content: &str) -> MergedConfig {
		let path = PathBuf::from("/work/.relog.toml");
		let config = parse_config_str(content, &path).unwrap();
		merge_configs(&[LoadedConfig { config, path }])
	}

	#[test]
	fn test_compile_defaults_to_builtin_table() {
		let table = compile_rules(&MergedConfig::default()).unwrap();
		assert_eq!(table.len(), builtin_rules().len());
	}

	#[test]
	fn test_custom_rules_follow_builtin() {
		let config = merged(
			r#"
[[rules]]
name = "api-request"
pattern = "console.log(`[API] {{route:`}}`);"
template = "apiLogger.info('Request', { route: '${route}' });"
after = ["db-query-start"]
"#,
		);
		let table = compile_rules(&config).unwrap();
		assert_eq!(table.len(), builtin_rules().len() + 1);
		assert_eq!(table.get("api-request").map(|(pos, _)| pos), Some(table.len()));
	}

	#[test]
	fn test_builtin_can_be_disabled() {
		let config = merged(
			r#"
builtin-rules = false

[[rules]]
name = "only"
pattern = "print()"
template = "log()"
"#,
		);
		let table = compile_rules(&config).unwrap();
		assert_eq!(table.len(), 1);
	}

	#[test]
	fn test_custom_rule_cannot_shadow_builtin() {
		let config = merged(
			r#"
[[rules]]
name = "db-query-start"
pattern = "x"
template = "y"
"#,
		);
		assert!(matches!(
			compile_rules(&config),
			Err(RelogError::DuplicateRule { .. })
		));
	}
}
