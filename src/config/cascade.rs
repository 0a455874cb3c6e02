use crate::config::parser::parse_config_file;
use crate::config::types::{LoadedConfig, MergedConfig, RuleWithSource};
use crate::error::{Result, RelogError};
use std::path::{Path, PathBuf};

/// Name of the per-directory config file.
pub const CONFIG_FILE_NAME: &str = ".relog.toml";

/// Discover and load all config files in the cascade.
///
/// The cascade order is:
/// 1. Start from `start_dir` and look for `.relog.toml`
/// 2. If found and `root = true`, skip to user config only
/// 3. Otherwise, continue up the directory tree
/// 4. Finally, check ~/.relog.toml (unless disabled)
///
/// Returns configs in cascade order (most specific first).
pub fn discover_configs(start_dir: &Path) -> Result<Vec<LoadedConfig>> {
	let mut configs = Vec::new();
	let mut current_dir = start_dir.to_path_buf();

	// Walk up the directory tree
	loop {
		let config_path = current_dir.join(CONFIG_FILE_NAME);

		if config_path.exists() {
			let config = parse_config_file(&config_path)?;
			let root = config.root;

			tracing::debug!(path = %config_path.display(), root, "loaded config");
			configs.push(LoadedConfig {
				config,
				path: config_path,
			});

			if root {
				break;
			}
		}

		// Move to parent directory
		if let Some(parent) = current_dir.parent() {
			current_dir = parent.to_path_buf();
		} else {
			break;
		}
	}

	// Check user config unless disabled by env var
	if let Some(user_config) = load_user_config(&configs)? {
		configs.push(user_config);
	}

	Ok(configs)
}

/// Load the user's ~/.relog.toml if it exists and isn't disabled.
fn load_user_config(existing_configs: &[LoadedConfig]) -> Result<Option<LoadedConfig>> {
	// Check if any config disables user config lookup via env var
	for loaded in existing_configs {
		if let Some(ref env_var) = loaded.config.user_config_disable_env_var
			&& is_env_truthy(env_var)
		{
			return Ok(None);
		}
	}

	let user_config_path = user_config_path()?;

	// Already picked up by the directory walk
	if existing_configs
		.iter()
		.any(|c| same_file(&c.path, &user_config_path))
	{
		return Ok(None);
	}

	if user_config_path.exists() {
		let config = parse_config_file(&user_config_path)?;
		Ok(Some(LoadedConfig {
			config,
			path: user_config_path,
		}))
	} else {
		Ok(None)
	}
}

fn same_file(a: &Path, b: &Path) -> bool {
	match (a.canonicalize(), b.canonicalize()) {
		(Ok(a), Ok(b)) => a == b,
		_ => a == b,
	}
}

/// Check if an environment variable is set to a truthy value.
fn is_env_truthy(var_name: &str) -> bool {
	match std::env::var(var_name) {
		Ok(value) => {
			let lower = value.to_lowercase();
			!value.is_empty() && lower != "0" && lower != "false" && lower != "no"
		}
		Err(_) => false,
	}
}

/// Merge multiple configs into a single effective config.
///
/// Settings come from the most specific config that sets them. Rules are
/// collected outermost first, so a project's rules see the output of the
/// user-wide ones.
pub fn merge_configs(configs: &[LoadedConfig]) -> MergedConfig {
	let mut merged = MergedConfig::default();

	merged.target = configs.iter().find_map(|loaded| {
		loaded
			.config
			.target
			.as_ref()
			.map(|target| resolve_against(&loaded.path, target))
	});

	if let Some(builtin) = configs.iter().find_map(|c| c.config.builtin_rules) {
		merged.builtin_rules = builtin;
	}
	if let Some(verify) = configs.iter().find_map(|c| c.config.verify_idempotence) {
		merged.verify_idempotence = verify;
	}
	if let Some(max) = configs.iter().find_map(|c| c.config.max_matches_per_rule) {
		merged.limits.max_matches_per_rule = max;
	}
	if let Some(max) = configs.iter().find_map(|c| c.config.max_document_bytes) {
		merged.limits.max_document_bytes = max;
	}

	for loaded in configs.iter().rev() {
		// Collect rules with their source
		for rule in &loaded.config.rules {
			merged.rules.push(RuleWithSource {
				rule: rule.clone(),
				source: loaded.path.clone(),
			});
		}
	}

	merged
}

/// Resolve a path from a config file against that file's directory.
fn resolve_against(config_path: &Path, target: &Path) -> PathBuf {
	if target.is_absolute() {
		return target.to_path_buf();
	}
	match config_path.parent() {
		Some(dir) => dir.join(target),
		None => target.to_path_buf(),
	}
}

/// Convenience function to discover, load, and merge configs from a directory.
pub fn load_merged_config(start_dir: &Path) -> Result<MergedConfig> {
	let configs = discover_configs(start_dir)?;
	Ok(merge_configs(&configs))
}

/// Get the path to the user's config file.
pub fn user_config_path() -> Result<PathBuf> {
	let home_dir = dirs::home_dir().ok_or(RelogError::HomeDirectoryNotFound)?;
	Ok(home_dir.join(CONFIG_FILE_NAME))
}
