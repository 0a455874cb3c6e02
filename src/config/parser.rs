use crate::config::types::Config;
use crate::error::{Result, RelogError};
use std::path::Path;

/// Parse a config file from the given path.
pub fn parse_config_file(path: &Path) -> Result<Config> {
	let content = std::fs::read_to_string(path).map_err(|source| RelogError::ConfigReadError {
		path: path.to_path_buf(),
		source,
	})?;

	parse_config_str(&content, path)
}

/// Parse a config from a string (useful for testing).
pub fn parse_config_str(content: &str, path: &Path) -> Result<Config> {
	let config: Config =
		toml::from_str(content).map_err(|source| RelogError::ConfigParseError {
			path: path.to_path_buf(),
			source,
		})?;

	// Validate the parsed config
	config.validate()?;

	Ok(config)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::path::PathBuf;

	#[test]
	fn test_parse_empty_config() {
		let content = "";
		let path = PathBuf::from("test.toml");
		let config = parse_config_str(content, &path).unwrap();

		assert!(!config.root);
		assert!(config.target.is_none());
		assert!(config.builtin_rules.is_none());
		assert!(config.verify_idempotence.is_none());
		assert!(config.user_config_disable_env_var.is_none());
		assert!(config.rules.is_empty());
	}

	#[test]
	fn test_parse_basic_config() {
		let content = r#"
root = true
target = "src/db.ts"
builtin-rules = false
verify-idempotence = false
max-matches-per-rule = 50
user-config-disable-env-var = "CI"
"#;
		let path = PathBuf::from("test.toml");
		let config = parse_config_str(content, &path).unwrap();

		assert!(config.root);
		assert_eq!(config.target, Some(PathBuf::from("src/db.ts")));
		assert_eq!(config.builtin_rules, Some(false));
		assert_eq!(config.verify_idempotence, Some(false));
		assert_eq!(config.max_matches_per_rule, Some(50));
		assert_eq!(config.user_config_disable_env_var, Some("CI".to_string()));
	}

	#[test]
	fn test_parse_rules_array_of_tables() {
		let content = r#"
[[rules]]
name = "api-request"
pattern = "console.log(`[API] {{route:`}}`);"
template = "apiLogger.info('Request', { route: '${route}' });"

[[rules]]
name = "api-error"
alternatives = ["console.error('[API] {{route:'}}');", "console.error(`[API] {{route:`}}`);"]
template = "apiLogger.error('${route}');"
after = ["api-request"]
note = "two quoting styles"
"#;
		let path = PathBuf::from("test.toml");
		let config = parse_config_str(content, &path).unwrap();

		assert_eq!(config.rules.len(), 2);

		let rule1 = &config.rules[0];
		assert_eq!(rule1.name, "api-request");
		assert_eq!(
			rule1.pattern,
			Some("console.log(`[API] {{route:`}}`);".to_string())
		);
		assert!(rule1.after.is_empty());

		let rule2 = &config.rules[1];
		assert_eq!(rule2.alternatives.as_ref().map(Vec::len), Some(2));
		assert_eq!(rule2.after, vec!["api-request".to_string()]);
		assert_eq!(rule2.note.as_deref(), Some("two quoting styles"));

		let def = rule2.to_rule_def();
		assert_eq!(def.patterns.len(), 2);
		assert_eq!(def.after, vec!["api-request".to_string()]);
	}

	#[test]
	fn test_parse_deletion_rule() {
		let content = r#"
rules = [
    { name = "drop-timer", pattern = "const t0 = performance.now();{{_}}", template = "" },
]
"#;
		let path = PathBuf::from("test.toml");
		let config = parse_config_str(content, &path).unwrap();

		assert_eq!(config.rules.len(), 1);
		assert!(config.rules[0].template.is_empty());
	}

	#[test]
	fn test_mutually_exclusive_pattern_options() {
		let content = r#"
[[rules]]
name = "both"
pattern = "a"
alternatives = ["b"]
template = "c"
"#;
		let path = PathBuf::from("test.toml");
		let result = parse_config_str(content, &path);

		assert!(result.is_err());
		match result.unwrap_err() {
			RelogError::MutuallyExclusive { option1, option2 } => {
				assert_eq!(option1, "pattern");
				assert_eq!(option2, "alternatives");
			}
			_ => panic!("Expected MutuallyExclusive error"),
		}
	}

	#[test]
	fn test_rule_without_pattern() {
		let content = r#"
[[rules]]
name = "nothing"
template = "c"
"#;
		let path = PathBuf::from("test.toml");
		match parse_config_str(content, &path).unwrap_err() {
			RelogError::MissingPattern { rule } => assert_eq!(rule, "nothing"),
			_ => panic!("Expected MissingPattern error"),
		}
	}

	#[test]
	fn test_rule_without_template_is_parse_error() {
		let content = r#"
[[rules]]
name = "no-template"
pattern = "a"
"#;
		let path = PathBuf::from("test.toml");
		assert!(matches!(
			parse_config_str(content, &path),
			Err(RelogError::ConfigParseError { .. })
		));
	}
}
