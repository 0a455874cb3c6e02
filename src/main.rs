use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use relog_cli::config::{
	CONFIG_FILE_NAME, DEFAULT_TARGET, MergedConfig, discover_configs, generate_init_template,
	load_merged_config, user_config_path,
};
use relog_cli::rewrite::{MigrateOptions, migrate};
use relog_cli::rules::compile_rules;

#[derive(Parser)]
#[command(name = "relog")]
#[command(
	author,
	version,
	about = "Rewrites ad-hoc console diagnostics into structured logger calls"
)]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	/// Document to migrate (defaults to the configured target, then server/storage.ts)
	#[arg(long, value_name = "PATH")]
	target: Option<PathBuf>,

	/// Show what would change without writing the document
	#[arg(long)]
	dry_run: bool,

	/// Create a template .relog.toml in the current directory
	#[arg(long)]
	init: bool,

	/// Overwrite existing .relog.toml when using --init
	#[arg(long, requires = "init")]
	force: bool,

	/// Increase log verbosity (-v info, -vv debug); RELOG_LOG overrides
	#[arg(short, long, action = ArgAction::Count, global = true)]
	verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
	/// List the effective rule table in application order
	Rules,
	/// Configuration management commands
	Config {
		#[command(subcommand)]
		action: ConfigAction,
	},
}

#[derive(Subcommand)]
enum ConfigAction {
	/// Display discovered config files with source annotations
	Show,
	/// Check config files and compile the rule table without touching the document
	Validate,
}

fn main() -> ExitCode {
	let cli = Cli::parse();
	init_tracing(cli.verbose);

	match run(cli) {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn init_tracing(verbose: u8) {
	let default_level = match verbose {
		0 => "warn",
		1 => "info",
		_ => "debug",
	};
	let filter = EnvFilter::try_from_env("RELOG_LOG")
		.unwrap_or_else(|_| EnvFilter::new(format!("relog_cli={default_level},relog={default_level}")));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.init();
}

fn run(cli: Cli) -> Result<ExitCode> {
	// Handle --init
	if cli.init {
		return handle_init(cli.force);
	}

	// Handle subcommands
	if let Some(command) = cli.command {
		return match command {
			Commands::Rules => handle_rules(),
			Commands::Config { action } => match action {
				ConfigAction::Show => handle_config_show(),
				ConfigAction::Validate => handle_config_validate(),
			},
		};
	}

	handle_migrate(cli.target.as_deref(), cli.dry_run)
}

fn handle_init(force: bool) -> Result<ExitCode> {
	let config_path = PathBuf::from(CONFIG_FILE_NAME);

	if config_path.exists() && !force {
		anyhow::bail!("{CONFIG_FILE_NAME} already exists. Use --force to overwrite.");
	}

	std::fs::write(&config_path, generate_init_template())
		.with_context(|| format!("Failed to write {}", config_path.display()))?;

	println!("Created {CONFIG_FILE_NAME}");
	Ok(ExitCode::SUCCESS)
}

fn load_config() -> Result<(PathBuf, MergedConfig)> {
	let cwd = std::env::current_dir().context("Failed to get current directory")?;
	let config = load_merged_config(&cwd).context("Failed to load configuration")?;
	Ok((cwd, config))
}

fn handle_migrate(target_override: Option<&Path>, dry_run: bool) -> Result<ExitCode> {
	let (cwd, config) = load_config()?;

	// Compile before touching the document so definition errors abort early
	let table = compile_rules(&config).context("Failed to compile rules")?;

	let target = match target_override {
		Some(path) => cwd.join(path),
		None => config
			.target
			.clone()
			.unwrap_or_else(|| cwd.join(DEFAULT_TARGET)),
	};

	let options = MigrateOptions {
		dry_run,
		verify_idempotence: config.verify_idempotence,
		limits: config.limits,
	};

	let report = migrate(&target, &table, &options)
		.with_context(|| format!("Failed to migrate {}", target.display()))?;

	let shown = target.strip_prefix(&cwd).unwrap_or(target.as_path()).display();
	if !report.changed {
		println!("{shown} already migrated; nothing to do");
	} else if dry_run {
		println!(
			"{shown}: {} replacements would be made (dry run)",
			report.replacements()
		);
		for stat in report.stats.iter().filter(|s| s.matches > 0) {
			println!("  {:>3}  {:<28} {}", stat.position, stat.rule, stat.matches);
		}
	} else {
		println!("Rewrote {shown}: {} replacements", report.replacements());
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_rules() -> Result<ExitCode> {
	let (_, config) = load_config()?;
	let table = compile_rules(&config).context("Failed to compile rules")?;

	if table.is_empty() {
		println!("No rules configured.");
		return Ok(ExitCode::SUCCESS);
	}

	println!("Rule table (applied in this order):\n");

	for (i, rule) in table.rules().iter().enumerate() {
		println!("  {}. {}", i + 1, rule.name);
		for (n, alternative) in rule.matcher.alternatives().iter().enumerate() {
			if rule.matcher.alternatives().len() > 1 {
				println!("    match[{}]: {}", n + 1, alternative.skeleton.as_str());
			} else {
				println!("    match: {}", alternative.skeleton.as_str());
			}
		}
		if rule.template.is_deletion() {
			println!("    delete");
		} else {
			println!("    template: {}", rule.template.as_str());
		}
		if !rule.after.is_empty() {
			println!("    after: {}", rule.after.join(", "));
		}
		if let Some(ref note) = rule.note {
			println!("    note: {}", note);
		}
		println!();
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_config_show() -> Result<ExitCode> {
	let cwd = std::env::current_dir().context("Failed to get current directory")?;
	let configs = discover_configs(&cwd).context("Failed to discover config files")?;

	if configs.is_empty() {
		println!("No configuration files found.");
		println!("Target: {DEFAULT_TARGET} (default)");
		return Ok(ExitCode::SUCCESS);
	}

	println!("Configuration files (in cascade order):\n");

	for loaded in &configs {
		let config = &loaded.config;
		println!("# Source: {}", loaded.path.display());
		println!("# root: {}", config.root);
		if let Some(ref target) = config.target {
			println!("# target: {}", target.display());
		}
		if let Some(builtin) = config.builtin_rules {
			println!("# builtin-rules: {}", builtin);
		}
		if let Some(verify) = config.verify_idempotence {
			println!("# verify-idempotence: {}", verify);
		}
		if let Some(max) = config.max_matches_per_rule {
			println!("# max-matches-per-rule: {}", max);
		}
		if let Some(max) = config.max_document_bytes {
			println!("# max-document-bytes: {}", max);
		}
		if let Some(ref env_var) = config.user_config_disable_env_var {
			println!("# user-config-disable-env-var: {}", env_var);
		}
		println!("# rules: {}", config.rules.len());
		println!();

		for (i, rule) in config.rules.iter().enumerate() {
			println!("  Rule {}: {}", i + 1, rule.name);
			if let Some(ref pattern) = rule.pattern {
				println!("    pattern: {}", pattern);
			}
			if let Some(ref alternatives) = rule.alternatives {
				for alternative in alternatives {
					println!("    alternative: {}", alternative);
				}
			}
			println!("    template: {}", rule.template);
			if !rule.after.is_empty() {
				println!("    after: {}", rule.after.join(", "));
			}
			println!();
		}
	}

	// Show user config path
	if let Ok(user_path) = user_config_path() {
		println!("User config path: {}", user_path.display());
		if user_path.exists() {
			println!("  (exists)");
		} else {
			println!("  (not found)");
		}
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_config_validate() -> Result<ExitCode> {
	let cwd = std::env::current_dir().context("Failed to get current directory")?;

	let configs = match discover_configs(&cwd) {
		Ok(configs) => configs,
		Err(e) => {
			eprintln!("Configuration error: {}", e);
			return Ok(ExitCode::FAILURE);
		}
	};

	let merged = relog_cli::config::merge_configs(&configs);
	let table = match compile_rules(&merged) {
		Ok(table) => table,
		Err(e) => {
			eprintln!("Rule error: {}", e);
			return Ok(ExitCode::FAILURE);
		}
	};

	if configs.is_empty() {
		println!("No configuration files found.");
	} else {
		println!("All configuration files are valid:");
		for loaded in &configs {
			println!(
				"  {} ({} rules)",
				loaded.path.display(),
				loaded.config.rules.len()
			);
		}
	}
	println!("Rule table compiles: {} rules", table.len());

	Ok(ExitCode::SUCCESS)
}
