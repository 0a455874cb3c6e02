//! Configuration loading and parsing for relog.
//!
//! This module handles:
//! - TOML config file parsing
//! - Directory cascade discovery
//! - Config merging
//! - The `--init` template

pub mod cascade;
pub mod parser;
pub mod types;

pub use cascade::{
	CONFIG_FILE_NAME, discover_configs, load_merged_config, merge_configs, user_config_path,
};
pub use parser::{parse_config_file, parse_config_str};
pub use types::{
	Config, DEFAULT_TARGET, LoadedConfig, MergedConfig, RuleConfig, RuleWithSource,
};

/// Starter `.relog.toml` written by `relog --init`.
pub fn generate_init_template() -> String {
	format!(
		r#"# relog configuration
# Stop looking for .relog.toml in parent directories.
root = true

# Document to migrate, relative to this file.
target = "{DEFAULT_TARGET}"

# Run the built-in dbLogger/inventoryLogger table before the rules below.
builtin-rules = true

# Refuse to write if a second pass would still change the output.
verify-idempotence = true

# Skeleton placeholders:
#   {{{{name:'}}}}  capture up to the next ' as `name`
#   {{{{#:'}}}}     capture up to the next ' by position only
#   {{{{:'}}}}      skip up to the next '
#   {{{{_}}}}       skip optional whitespace
# Templates use $1, ${{1}} or ${{name}}; $$ is a literal dollar; "" deletes.
#
# [[rules]]
# name = "api-request"
# pattern = "console.log(`[API] {{{{route:`}}}}`);"
# template = "apiLogger.info('Request', {{ route: '${{route}}' }});"
"#
	)
}
