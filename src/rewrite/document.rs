use crate::error::{Result, RelogError};
use crate::rewrite::{Limits, RuleStats, rewrite, verify_idempotent};
use crate::rules::RuleTable;
use std::io::Write;
use std::path::{Path, PathBuf};

/// The full text of one target file, read once and written once.
#[derive(Debug, Clone)]
pub struct Document {
	path: PathBuf,
	original: String,
	text: String,
}

impl Document {
	/// Read the whole file as UTF-8.
	pub fn load(path: &Path) -> Result<Self> {
		let original = std::fs::read_to_string(path).map_err(|source| RelogError::DocumentRead {
			path: path.to_path_buf(),
			source,
		})?;

		Ok(Document {
			path: path.to_path_buf(),
			text: original.clone(),
			original,
		})
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn text(&self) -> &str {
		&self.text
	}

	/// True if the in-memory text differs from what was read.
	pub fn is_modified(&self) -> bool {
		self.text != self.original
	}

	/// Run the table over the current text. On error the text is unchanged.
	pub fn apply(&mut self, table: &RuleTable, limits: &Limits) -> Result<Vec<RuleStats>> {
		let result = rewrite(table, &self.text, limits)?;
		self.text = result.text;
		Ok(result.stats)
	}

	/// Replace the file on disk with the current text.
	///
	/// The text goes to a temporary file in the same directory, which is synced
	/// and then renamed over the original, so readers see either the old or
	/// the new contents.
	pub fn persist(&self) -> Result<()> {
		let write_error = |source: std::io::Error| RelogError::DocumentWrite {
			path: self.path.clone(),
			source,
		};

		let dir = match self.path.parent() {
			Some(parent) if !parent.as_os_str().is_empty() => parent,
			_ => Path::new("."),
		};

		let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_error)?;
		tmp.write_all(self.text.as_bytes()).map_err(write_error)?;
		tmp.as_file().sync_all().map_err(write_error)?;

		// Keep the original file mode
		if let Ok(metadata) = std::fs::metadata(&self.path) {
			tmp.as_file()
				.set_permissions(metadata.permissions())
				.map_err(write_error)?;
		}

		tmp.persist(&self.path).map_err(|e| write_error(e.error))?;
		Ok(())
	}
}

/// Options for a single migration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrateOptions {
	/// Compute the result without writing it.
	pub dry_run: bool,

	/// Re-apply the table to the output and fail if anything still matches.
	pub verify_idempotence: bool,

	pub limits: Limits,
}

impl Default for MigrateOptions {
	fn default() -> Self {
		MigrateOptions {
			dry_run: false,
			verify_idempotence: true,
			limits: Limits::default(),
		}
	}
}

/// What a migration run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
	pub path: PathBuf,
	pub stats: Vec<RuleStats>,

	/// The rewritten text differs from the original.
	pub changed: bool,

	/// The file on disk was replaced.
	pub written: bool,
}

impl MigrationReport {
	pub fn replacements(&self) -> usize {
		self.stats.iter().map(|s| s.matches).sum()
	}
}

/// Load `path`, apply `table`, and write the result back.
///
/// Nothing is written unless every rule succeeds (and, if enabled, the output
/// passes the idempotence check). Unchanged documents are left alone.
pub fn migrate(path: &Path, table: &RuleTable, options: &MigrateOptions) -> Result<MigrationReport> {
	let mut document = Document::load(path)?;
	let stats = document.apply(table, &options.limits)?;

	for stat in stats.iter().filter(|s| s.matches == 0) {
		tracing::info!(rule = %stat.rule, position = stat.position, "rule matched nothing");
	}

	if options.verify_idempotence {
		verify_idempotent(table, document.text(), &options.limits)?;
	}

	let changed = document.is_modified();
	let written = changed && !options.dry_run;
	if written {
		document.persist()?;
	}

	let report = MigrationReport {
		path: path.to_path_buf(),
		stats,
		changed,
		written,
	};
	tracing::info!(
		path = %path.display(),
		replacements = report.replacements(),
		changed,
		written,
		"migration finished"
	);

	Ok(report)
}
