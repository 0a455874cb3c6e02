use crate::error::{Result, RelogError};
use std::collections::HashSet;

/// One piece of a parsed skeleton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
	/// Text that must appear verbatim.
	Literal(String),

	/// A captured gap: any run of characters other than `terminator` or a newline.
	Capture {
		name: Option<String>,
		terminator: char,
	},

	/// Same gap as a capture, but the text is not kept.
	Skip { terminator: char },

	/// An optional run of whitespace (newlines included).
	Whitespace,
}

/// A fixed textual skeleton with bounded gaps, written as literal text with
/// `{{...}}` placeholders:
///
/// - `{{name:'}}` captures up to the next `'` under the name `name`
/// - `{{#:'}}` captures up to the next `'` without a name
/// - `{{:'}}` skips up to the next `'`
/// - `{{_}}` skips optional whitespace
///
/// Captures are numbered from 1 in the order they appear, named or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skeleton {
	source: String,
	segments: Vec<Segment>,
}

impl Skeleton {
	/// Parse a skeleton string.
	pub fn parse(input: &str) -> Result<Self> {
		let invalid = |reason: &str| RelogError::InvalidSkeleton {
			skeleton: input.to_string(),
			reason: reason.to_string(),
		};

		let mut segments = Vec::new();
		let mut literal = String::new();
		let mut chars = input.chars().peekable();

		while let Some(c) = chars.next() {
			if c != '{' || chars.peek() != Some(&'{') {
				literal.push(c);
				continue;
			}
			chars.next();

			if !literal.is_empty() {
				segments.push(Segment::Literal(std::mem::take(&mut literal)));
			}

			// `{{_}}` is whitespace; anything else is `name:T`
			if chars.peek() == Some(&'_') {
				let mut lookahead = chars.clone();
				lookahead.next();
				if lookahead.next() == Some('}') && lookahead.next() == Some('}') {
					chars = lookahead;
					segments.push(Segment::Whitespace);
					continue;
				}
			}

			let mut name = String::new();
			loop {
				match chars.next() {
					Some(':') => break,
					Some('}') => return Err(invalid("placeholder is missing a `:T` terminator")),
					Some(ch) => name.push(ch),
					None => return Err(invalid("unterminated placeholder")),
				}
			}

			let terminator = chars
				.next()
				.ok_or_else(|| invalid("unterminated placeholder"))?;
			if chars.next() != Some('}') || chars.next() != Some('}') {
				return Err(invalid("terminator must be a single character followed by `}}`"));
			}

			let segment = if name.is_empty() {
				Segment::Skip { terminator }
			} else if name == "#" {
				Segment::Capture {
					name: None,
					terminator,
				}
			} else if is_identifier(&name) {
				Segment::Capture {
					name: Some(name),
					terminator,
				}
			} else {
				return Err(invalid(&format!("`{name}` is not a valid capture name")));
			};
			segments.push(segment);
		}

		if !literal.is_empty() {
			segments.push(Segment::Literal(literal));
		}

		if !segments
			.iter()
			.any(|s| matches!(s, Segment::Literal(text) if !text.is_empty()))
		{
			return Err(invalid("skeleton has no literal text and could match nothing"));
		}

		let mut seen = HashSet::new();
		for segment in &segments {
			if let Segment::Capture { name: Some(name), .. } = segment
				&& !seen.insert(name.as_str())
			{
				return Err(invalid(&format!("capture `{name}` is declared twice")));
			}
		}

		Ok(Skeleton {
			source: input.to_string(),
			segments,
		})
	}

	/// The skeleton as it was written.
	pub fn as_str(&self) -> &str {
		&self.source
	}

	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	/// Capture names in positional order; unnamed captures are `None`.
	pub fn captures(&self) -> Vec<Option<&str>> {
		self.segments
			.iter()
			.filter_map(|s| match s {
				Segment::Capture { name, .. } => Some(name.as_deref()),
				_ => None,
			})
			.collect()
	}

	/// Translate the skeleton to a regex. Only captures introduce groups, so
	/// group `i` of the regex is capture `i` of the skeleton.
	pub fn to_regex_source(&self) -> String {
		let mut out = String::new();
		for segment in &self.segments {
			match segment {
				Segment::Literal(text) => out.push_str(&regex::escape(text)),
				Segment::Capture {
					name: Some(name),
					terminator,
				} => {
					out.push_str(&format!("(?P<{name}>{})", gap(*terminator)));
				}
				Segment::Capture {
					name: None,
					terminator,
				} => {
					out.push_str(&format!("({})", gap(*terminator)));
				}
				Segment::Skip { terminator } => out.push_str(&gap(*terminator)),
				Segment::Whitespace => out.push_str(r"\s*"),
			}
		}
		out
	}
}

fn gap(terminator: char) -> String {
	format!("[^{}\\n]*", regex::escape(&terminator.to_string()))
}

fn is_identifier(name: &str) -> bool {
	let mut chars = name.chars();
	match chars.next() {
		Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
		_ => return false,
	}
	chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
