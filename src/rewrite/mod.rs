//! Rule application for relog.
//!
//! This module handles:
//! - Applying a rule table to text, one rule at a time, in table order
//! - Guarding against rules that would match their own output
//! - Loading and atomically persisting the target document

pub mod document;

pub use document::{Document, MigrateOptions, MigrationReport, migrate};

use crate::error::{Result, RelogError};
use crate::rules::{Rule, RuleTable};

/// Caps on the work a single run may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
	/// Maximum number of matches one rule may produce in one pass.
	pub max_matches_per_rule: usize,

	/// Documents larger than this are rejected before any rule runs.
	pub max_document_bytes: usize,

	/// Upper bound on the compiled size of each skeleton's regex.
	pub regex_size_limit: usize,
}

impl Default for Limits {
	fn default() -> Self {
		Limits {
			max_matches_per_rule: 100_000,
			max_document_bytes: 16 * 1024 * 1024,
			regex_size_limit: 10 * 1024 * 1024,
		}
	}
}

/// How often one rule matched during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleStats {
	/// 1-based position in the table.
	pub position: usize,
	pub rule: String,
	pub matches: usize,
}

/// Result of applying a whole table to a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
	pub text: String,
	pub stats: Vec<RuleStats>,
}

impl Rewrite {
	/// Total replacements across all rules.
	pub fn replacements(&self) -> usize {
		self.stats.iter().map(|s| s.matches).sum()
	}
}

/// Apply every rule of `table` to `text`, in order. Each rule sees the
/// output of the previous one.
pub fn rewrite(table: &RuleTable, text: &str, limits: &Limits) -> Result<Rewrite> {
	if text.len() > limits.max_document_bytes {
		return Err(RelogError::DocumentTooLarge {
			size: text.len(),
			limit: limits.max_document_bytes,
		});
	}

	let mut current = text.to_string();
	let mut stats = Vec::with_capacity(table.len());

	for (i, rule) in table.rules().iter().enumerate() {
		let position = i + 1;
		let (next, matches) = apply_rule(rule, position, &current, limits)?;

		if matches == 0 {
			tracing::debug!(rule = %rule.name, position, "rule matched nothing");
		} else {
			tracing::debug!(rule = %rule.name, position, matches, "rule applied");
			current = next;
		}

		stats.push(RuleStats {
			position,
			rule: rule.name.clone(),
			matches,
		});
	}

	Ok(Rewrite {
		text: current,
		stats,
	})
}

/// Apply one rule in a single left-to-right pass, copying unmatched text and
/// rendering each match from the same input. Returns the new text and the
/// number of matches.
pub fn apply_rule(
	rule: &Rule,
	position: usize,
	text: &str,
	limits: &Limits,
) -> Result<(String, usize)> {
	let mut out = String::with_capacity(text.len());
	let mut last = 0;
	let mut count = 0;

	for m in rule.matcher.find_iter(text) {
		count += 1;
		if count > limits.max_matches_per_rule {
			return Err(RelogError::MatchBudgetExceeded {
				position,
				rule: rule.name.clone(),
				limit: limits.max_matches_per_rule,
			});
		}

		let missing = |capture: usize| RelogError::MissingCapture {
			position,
			rule: rule.name.clone(),
			capture,
		};
		let replacement = rule
			.template_for(m.alternative())
			.ok_or_else(|| missing(0))?
			.render(&m)
			.map_err(missing)?;

		out.push_str(&text[last..m.start()]);
		out.push_str(&replacement);
		last = m.end();
	}

	if count == 0 {
		return Ok((text.to_string(), 0));
	}

	out.push_str(&text[last..]);
	Ok((out, count))
}

/// Check that `text` is a fixed point of `table`: no rule matches it again.
/// Fails with the first rule that still matches.
pub fn verify_idempotent(table: &RuleTable, text: &str, limits: &Limits) -> Result<()> {
	let second = rewrite(table, text, limits)?;
	match second.stats.into_iter().find(|s| s.matches > 0) {
		Some(offender) => Err(RelogError::NotIdempotent {
			position: offender.position,
			rule: offender.rule,
		}),
		None => Ok(()),
	}
}
