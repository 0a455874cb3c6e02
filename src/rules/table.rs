use crate::error::{Result, RelogError};
use crate::rewrite::Limits;
use crate::rules::matcher::{CompiledSkeleton, Matcher};
use crate::rules::skeleton::Skeleton;
use crate::rules::template::{ResolvedTemplate, Template};
use std::collections::HashSet;

/// Uncompiled rule, as written in the built-in table or a config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleDef {
	/// Unique name within the table.
	pub name: String,

	/// One skeleton, or several alternative phrasings in priority order.
	pub patterns: Vec<String>,

	/// Replacement template; empty deletes the match.
	pub template: String,

	/// Rules that must already have been applied when this one runs.
	pub after: Vec<String>,

	/// Free-form description of what the rule is for.
	pub note: Option<String>,
}

impl RuleDef {
	pub fn new(name: &str, pattern: &str, template: &str) -> Self {
		RuleDef {
			name: name.to_string(),
			patterns: vec![pattern.to_string()],
			template: template.to_string(),
			..Default::default()
		}
	}

	/// Same rule, tried as a family of phrasings.
	pub fn alternatives(name: &str, patterns: &[&str], template: &str) -> Self {
		RuleDef {
			name: name.to_string(),
			patterns: patterns.iter().map(|p| p.to_string()).collect(),
			template: template.to_string(),
			..Default::default()
		}
	}

	pub fn after(mut self, rules: &[&str]) -> Self {
		self.after = rules.iter().map(|r| r.to_string()).collect();
		self
	}

	pub fn note(mut self, note: &str) -> Self {
		self.note = Some(note.to_string());
		self
	}
}

/// A compiled rule: a matcher plus the template bound to each alternative.
#[derive(Debug, Clone)]
pub struct Rule {
	pub name: String,
	pub matcher: Matcher,
	pub template: Template,
	pub after: Vec<String>,
	pub note: Option<String>,

	/// `resolved[i]` renders matches from alternative `i`.
	resolved: Vec<ResolvedTemplate>,
}

impl Rule {
	/// Compile a rule definition. Every template reference must be producible
	/// by every alternative of the matcher.
	pub fn compile(def: &RuleDef, limits: &Limits) -> Result<Self> {
		if def.patterns.is_empty() {
			return Err(RelogError::MissingPattern {
				rule: def.name.clone(),
			});
		}

		let template = Template::parse(&def.template)?;

		let mut alternatives = Vec::with_capacity(def.patterns.len());
		let mut resolved = Vec::with_capacity(def.patterns.len());
		for (i, pattern) in def.patterns.iter().enumerate() {
			let skeleton = Skeleton::parse(pattern)?;
			let bound = template.resolve(&skeleton.captures()).map_err(|reference| {
				RelogError::UnknownCapture {
					rule: def.name.clone(),
					capture: reference.to_string(),
					alternative: i + 1,
				}
			})?;
			let compiled = CompiledSkeleton::compile(skeleton, limits.regex_size_limit)
				.map_err(|source| RelogError::PatternTooLarge {
					rule: def.name.clone(),
					source,
				})?;
			alternatives.push(compiled);
			resolved.push(bound);
		}

		let matcher = if alternatives.len() == 1 {
			Matcher::Skeleton(alternatives.remove(0))
		} else {
			Matcher::Alternatives(alternatives)
		};

		Ok(Rule {
			name: def.name.clone(),
			matcher,
			template,
			after: def.after.clone(),
			note: def.note.clone(),
			resolved,
		})
	}

	/// Template bound to the given matcher alternative.
	pub fn template_for(&self, alternative: usize) -> Option<&ResolvedTemplate> {
		self.resolved.get(alternative)
	}
}

/// An ordered, immutable list of rules.
///
/// Rule names are unique and every `after` dependency names a rule placed
/// earlier in the table.
#[derive(Debug, Clone)]
pub struct RuleTable {
	rules: Vec<Rule>,
}

impl RuleTable {
	/// Compile definitions into a table, preserving their order.
	pub fn compile<I>(defs: I, limits: &Limits) -> Result<Self>
	where
		I: IntoIterator<Item = RuleDef>,
	{
		let mut rules: Vec<Rule> = Vec::new();
		let mut seen: HashSet<String> = HashSet::new();

		for def in defs {
			if seen.contains(&def.name) {
				return Err(RelogError::DuplicateRule { rule: def.name });
			}
			if let Some(dependency) = def.after.iter().find(|d| !seen.contains(*d)) {
				return Err(RelogError::RuleOrdering {
					rule: def.name.clone(),
					dependency: dependency.clone(),
				});
			}

			let rule = Rule::compile(&def, limits)?;
			seen.insert(def.name);
			rules.push(rule);
		}

		Ok(RuleTable { rules })
	}

	pub fn rules(&self) -> &[Rule] {
		&self.rules
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}

	/// Look up a rule by name, with its 1-based position.
	pub fn get(&self, name: &str) -> Option<(usize, &Rule)> {
		self.rules
			.iter()
			.enumerate()
			.find(|(_, rule)| rule.name == name)
			.map(|(i, rule)| (i + 1, rule))
	}
}
