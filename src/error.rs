use std::path::PathBuf;

/// Library-level structured errors for relog.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum RelogError {
	#[error("Invalid skeleton `{skeleton}`: {reason}")]
	InvalidSkeleton { skeleton: String, reason: String },

	#[error("Invalid template `{template}`: {reason}")]
	InvalidTemplate { template: String, reason: String },

	#[error("Rule `{rule}` references capture `{capture}` which alternative {alternative} does not produce")]
	UnknownCapture {
		rule: String,
		capture: String,
		alternative: usize,
	},

	#[error("Duplicate rule name: {rule}")]
	DuplicateRule { rule: String },

	#[error("Rule `{rule}` must run after `{dependency}`, which is not declared earlier in the table")]
	RuleOrdering { rule: String, dependency: String },

	#[error("Pattern for rule `{rule}` exceeds the compiled size limit")]
	PatternTooLarge {
		rule: String,
		#[source]
		source: regex::Error,
	},

	#[error("Rule #{position} `{rule}` exceeded the match budget of {limit}")]
	MatchBudgetExceeded {
		position: usize,
		rule: String,
		limit: usize,
	},

	#[error("Rule #{position} `{rule}` produced a match without capture {capture}")]
	MissingCapture {
		position: usize,
		rule: String,
		capture: usize,
	},

	#[error("Rule #{position} `{rule}` still matches already-migrated text")]
	NotIdempotent { position: usize, rule: String },

	#[error("Document is {size} bytes, larger than the limit of {limit} bytes")]
	DocumentTooLarge { size: usize, limit: usize },

	#[error("Failed to read document: {path}")]
	DocumentRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to write document: {path}")]
	DocumentWrite {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to read config file: {path}")]
	ConfigReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse config file: {path}")]
	ConfigParseError {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Mutually exclusive options: {option1} and {option2}")]
	MutuallyExclusive { option1: String, option2: String },

	#[error("Rule `{rule}` needs either `pattern` or `alternatives`")]
	MissingPattern { rule: String },

	#[error("Failed to resolve home directory")]
	HomeDirectoryNotFound,
}

/// Broad failure class, used to decide how a failed run is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	/// A rule table could not be built. Nothing was read or written.
	Definition,
	/// A rule failed while it was being applied.
	Pattern,
	/// The document could not be read or written.
	Io,
	/// A config file is missing, malformed or inconsistent.
	Config,
}

impl RelogError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			RelogError::InvalidSkeleton { .. }
			| RelogError::InvalidTemplate { .. }
			| RelogError::UnknownCapture { .. }
			| RelogError::DuplicateRule { .. }
			| RelogError::RuleOrdering { .. }
			| RelogError::PatternTooLarge { .. } => ErrorKind::Definition,
			RelogError::MatchBudgetExceeded { .. }
			| RelogError::MissingCapture { .. }
			| RelogError::NotIdempotent { .. }
			| RelogError::DocumentTooLarge { .. } => ErrorKind::Pattern,
			RelogError::DocumentRead { .. } | RelogError::DocumentWrite { .. } => ErrorKind::Io,
			RelogError::ConfigReadError { .. }
			| RelogError::ConfigParseError { .. }
			| RelogError::MutuallyExclusive { .. }
			| RelogError::MissingPattern { .. }
			| RelogError::HomeDirectoryNotFound => ErrorKind::Config,
		}
	}
}

/// Result type alias using RelogError.
pub type Result<T> = std::result::Result<T, RelogError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_kind_classification() {
		let err = RelogError::DuplicateRule {
			rule: "a".to_string(),
		};
		assert_eq!(err.kind(), ErrorKind::Definition);

		let err = RelogError::NotIdempotent {
			position: 3,
			rule: "b".to_string(),
		};
		assert_eq!(err.kind(), ErrorKind::Pattern);

		let err = RelogError::DocumentRead {
			path: PathBuf::from("x.ts"),
			source: std::io::Error::from(std::io::ErrorKind::NotFound),
		};
		assert_eq!(err.kind(), ErrorKind::Io);

		assert_eq!(RelogError::HomeDirectoryNotFound.kind(), ErrorKind::Config);
	}

	#[test]
	fn test_pattern_errors_name_the_rule() {
		let err = RelogError::MatchBudgetExceeded {
			position: 2,
			rule: "drop-start-timer".to_string(),
			limit: 10,
		};
		let message = err.to_string();
		assert!(message.contains("#2"));
		assert!(message.contains("drop-start-timer"));
	}
}
