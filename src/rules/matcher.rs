use crate::rules::skeleton::Skeleton;
use regex::{Regex, RegexBuilder};
use std::ops::Range;

/// A skeleton compiled to a regex.
#[derive(Debug, Clone)]
pub struct CompiledSkeleton {
	/// The skeleton this regex was built from.
	pub skeleton: Skeleton,

	regex: Regex,
}

impl CompiledSkeleton {
	/// Compile a skeleton, refusing automata larger than `size_limit` bytes.
	pub fn compile(skeleton: Skeleton, size_limit: usize) -> Result<Self, regex::Error> {
		let regex = RegexBuilder::new(&skeleton.to_regex_source())
			.size_limit(size_limit)
			.build()?;
		Ok(CompiledSkeleton { skeleton, regex })
	}

	fn find_at<'t>(&self, text: &'t str, start: usize, alternative: usize) -> Option<Match<'t>> {
		let caps = self.regex.captures_at(text, start)?;
		let span = caps.get(0)?.range();
		let groups = (1..caps.len())
			.map(|i| caps.get(i).map(|m| m.range()))
			.collect();
		Some(Match {
			text,
			span,
			alternative,
			groups,
		})
	}
}

/// Recognizes one source phrasing, or a family of them.
#[derive(Debug, Clone)]
pub enum Matcher {
	/// A single literal-structured skeleton.
	Skeleton(CompiledSkeleton),

	/// Alternative phrasings of the same statement, tried in declared order.
	/// At a given position the earliest-starting match wins; ties go to the
	/// alternative declared first.
	Alternatives(Vec<CompiledSkeleton>),
}

impl Matcher {
	/// The skeletons this matcher tries, in declared order.
	pub fn alternatives(&self) -> &[CompiledSkeleton] {
		match self {
			Matcher::Skeleton(single) => std::slice::from_ref(single),
			Matcher::Alternatives(all) => all,
		}
	}

	/// Iterate over non-overlapping matches, left to right.
	pub fn find_iter<'m, 't>(&'m self, text: &'t str) -> Matches<'m, 't> {
		let alternatives = self.alternatives();
		Matches {
			alternatives,
			text,
			pos: 0,
			pending: vec![None; alternatives.len()],
			exhausted: vec![false; alternatives.len()],
		}
	}
}

/// One match of a matcher against a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<'t> {
	text: &'t str,
	span: Range<usize>,
	alternative: usize,
	groups: Vec<Option<Range<usize>>>,
}

impl<'t> Match<'t> {
	/// Byte span of the whole match.
	pub fn span(&self) -> Range<usize> {
		self.span.clone()
	}

	pub fn start(&self) -> usize {
		self.span.start
	}

	pub fn end(&self) -> usize {
		self.span.end
	}

	/// The matched text.
	pub fn as_str(&self) -> &'t str {
		&self.text[self.span.clone()]
	}

	/// Index of the alternative that produced this match.
	pub fn alternative(&self) -> usize {
		self.alternative
	}

	/// Text of capture `index` (1-based), if it participated in the match.
	pub fn capture(&self, index: usize) -> Option<&'t str> {
		let range = self.groups.get(index.checked_sub(1)?)?.clone()?;
		Some(&self.text[range])
	}

	/// Number of capture groups this match carries.
	pub fn capture_count(&self) -> usize {
		self.groups.len()
	}
}

/// Lazy iterator over the matches of a [`Matcher`].
///
/// Each alternative's next match is cached and only searched again once the
/// scan position has moved past its start.
pub struct Matches<'m, 't> {
	alternatives: &'m [CompiledSkeleton],
	text: &'t str,
	pos: usize,
	pending: Vec<Option<Match<'t>>>,
	exhausted: Vec<bool>,
}

impl<'t> Iterator for Matches<'_, 't> {
	type Item = Match<'t>;

	fn next(&mut self) -> Option<Match<'t>> {
		if self.pos > self.text.len() {
			return None;
		}

		for (i, alternative) in self.alternatives.iter().enumerate() {
			if self.exhausted[i] {
				continue;
			}
			let stale = self.pending[i]
				.as_ref()
				.is_none_or(|m| m.start() < self.pos);
			if stale {
				self.pending[i] = alternative.find_at(self.text, self.pos, i);
				if self.pending[i].is_none() {
					self.exhausted[i] = true;
				}
			}
		}

		// Strict `<` keeps the earlier alternative on ties.
		let mut best: Option<usize> = None;
		for (i, candidate) in self.pending.iter().enumerate() {
			if let Some(m) = candidate
				&& best.is_none_or(|b| {
					self.pending[b]
						.as_ref()
						.is_some_and(|current| m.start() < current.start())
				}) {
				best = Some(i);
			}
		}

		let found = self.pending[best?].take()?;
		self.pos = if found.span.is_empty() {
			next_char_boundary(self.text, found.end())
		} else {
			found.end()
		};
		Some(found)
	}
}

fn next_char_boundary(text: &str, from: usize) -> usize {
	text[from..]
		.chars()
		.next()
		.map_or(text.len() + 1, |c| from + c.len_utf8())
}
