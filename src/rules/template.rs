use crate::error::{Result, RelogError};
use crate::rules::matcher::Match;
use std::fmt;

/// A reference from a template to a matcher capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureRef {
	/// 1-based capture position.
	Index(usize),
	/// Capture name as declared in the skeleton.
	Name(String),
}

impl fmt::Display for CaptureRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CaptureRef::Index(index) => write!(f, "${index}"),
			CaptureRef::Name(name) => write!(f, "${{{name}}}"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
	Text(String),
	Capture(CaptureRef),
}

/// Replacement text for a rule.
///
/// `$1` and `${1}` insert a capture by position, `${name}` by name and `$$`
/// is a literal dollar sign. An empty template deletes the matched span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
	source: String,
	pieces: Vec<Piece>,
}

impl Template {
	/// Parse a template string.
	pub fn parse(input: &str) -> Result<Self> {
		let invalid = |reason: &str| RelogError::InvalidTemplate {
			template: input.to_string(),
			reason: reason.to_string(),
		};

		let mut pieces = Vec::new();
		let mut text = String::new();
		let mut chars = input.chars().peekable();

		while let Some(c) = chars.next() {
			if c != '$' {
				text.push(c);
				continue;
			}

			let reference = match chars.peek().copied() {
				Some('$') => {
					chars.next();
					text.push('$');
					continue;
				}
				Some('{') => {
					chars.next();
					let mut inner = String::new();
					loop {
						match chars.next() {
							Some('}') => break,
							Some(ch) => inner.push(ch),
							None => return Err(invalid("unterminated `${`")),
						}
					}
					parse_reference(&inner).ok_or_else(|| {
						invalid(&format!("`${{{inner}}}` is not a capture reference"))
					})?
				}
				Some(d) if d.is_ascii_digit() => {
					let mut digits = String::new();
					while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
						digits.push(d);
						chars.next();
					}
					parse_reference(&digits)
						.ok_or_else(|| invalid(&format!("`${digits}` is not a capture reference")))?
				}
				_ => return Err(invalid("`$` must be followed by a capture reference or `$`")),
			};

			if !text.is_empty() {
				pieces.push(Piece::Text(std::mem::take(&mut text)));
			}
			pieces.push(Piece::Capture(reference));
		}

		if !text.is_empty() {
			pieces.push(Piece::Text(text));
		}

		Ok(Template {
			source: input.to_string(),
			pieces,
		})
	}

	/// The template as it was written.
	pub fn as_str(&self) -> &str {
		&self.source
	}

	/// True when the template removes the matched span.
	pub fn is_deletion(&self) -> bool {
		self.pieces.is_empty()
	}

	/// All capture references, in order of appearance.
	pub fn references(&self) -> impl Iterator<Item = &CaptureRef> {
		self.pieces.iter().filter_map(|p| match p {
			Piece::Capture(reference) => Some(reference),
			Piece::Text(_) => None,
		})
	}

	/// Bind every reference to a capture position of one matcher alternative.
	///
	/// `captures` lists the alternative's capture names in positional order.
	/// Returns the first reference that cannot be bound.
	pub fn resolve(
		&self,
		captures: &[Option<&str>],
	) -> std::result::Result<ResolvedTemplate, CaptureRef> {
		let pieces = self
			.pieces
			.iter()
			.map(|piece| match piece {
				Piece::Text(text) => Ok(Resolved::Text(text.clone())),
				Piece::Capture(reference) => {
					let index = match reference {
						CaptureRef::Index(index) if *index <= captures.len() => Some(*index),
						CaptureRef::Index(_) => None,
						CaptureRef::Name(name) => captures
							.iter()
							.position(|c| *c == Some(name.as_str()))
							.map(|i| i + 1),
					};
					index
						.map(Resolved::Group)
						.ok_or_else(|| reference.clone())
				}
			})
			.collect::<std::result::Result<Vec<_>, _>>()?;

		Ok(ResolvedTemplate { pieces })
	}
}

fn parse_reference(inner: &str) -> Option<CaptureRef> {
	if inner.chars().all(|c| c.is_ascii_digit()) {
		return match inner.parse::<usize>() {
			Ok(0) | Err(_) => None,
			Ok(index) => Some(CaptureRef::Index(index)),
		};
	}

	let mut chars = inner.chars();
	let starts_ok = chars
		.next()
		.is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
	if starts_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
		Some(CaptureRef::Name(inner.to_string()))
	} else {
		None
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Resolved {
	Text(String),
	Group(usize),
}

/// A template bound to the capture layout of one matcher alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTemplate {
	pieces: Vec<Resolved>,
}

impl ResolvedTemplate {
	/// Render the replacement for a match. Captured text is inserted verbatim.
	///
	/// Returns the position of the first referenced capture the match did not
	/// produce.
	pub fn render(&self, m: &Match<'_>) -> std::result::Result<String, usize> {
		let mut out = String::new();
		for piece in &self.pieces {
			match piece {
				Resolved::Text(text) => out.push_str(text),
				Resolved::Group(index) => out.push_str(m.capture(*index).ok_or(*index)?),
			}
		}
		Ok(out)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_plain_text() {
		let template = Template::parse("inventoryLogger.info('FIFO writeoff completed');").unwrap();
		assert_eq!(template.references().count(), 0);
		assert!(!template.is_deletion());
	}

	#[test]
	fn test_empty_template_is_deletion() {
		let template = Template::parse("").unwrap();
		assert!(template.is_deletion());
	}

	#[test]
	fn test_parse_references() {
		let template = Template::parse("a $1 b ${2} c ${name}").unwrap();
		let refs: Vec<_> = template.references().cloned().collect();
		assert_eq!(
			refs,
			vec![
				CaptureRef::Index(1),
				CaptureRef::Index(2),
				CaptureRef::Name("name".to_string()),
			]
		);
	}

	#[test]
	fn test_dollar_escape() {
		let template = Template::parse("cost: $$5").unwrap();
		let resolved = template.resolve(&[]).unwrap();
		assert_eq!(resolved.pieces, vec![Resolved::Text("cost: $5".to_string())]);
	}

	#[test]
	fn test_rejects_bad_references() {
		assert!(Template::parse("${name").is_err());
		assert!(Template::parse("$x").is_err());
		assert!(Template::parse("$0").is_err());
		assert!(Template::parse("${0}").is_err());
		assert!(Template::parse("${a-b}").is_err());
		assert!(Template::parse("trailing $").is_err());
	}

	#[test]
	fn test_resolve_by_name_and_index() {
		let template = Template::parse("${op}/$2").unwrap();
		let resolved = template.resolve(&[Some("op"), None]).unwrap();
		assert_eq!(
			resolved.pieces,
			vec![
				Resolved::Group(1),
				Resolved::Text("/".to_string()),
				Resolved::Group(2),
			]
		);
	}

	#[test]
	fn test_resolve_reports_unknown_capture() {
		let template = Template::parse("${missing}").unwrap();
		assert_eq!(
			template.resolve(&[Some("op")]).unwrap_err(),
			CaptureRef::Name("missing".to_string())
		);

		let template = Template::parse("$3").unwrap();
		assert_eq!(
			template.resolve(&[Some("op")]).unwrap_err(),
			CaptureRef::Index(3)
		);
	}

	#[test]
	fn test_capture_ref_display() {
		assert_eq!(CaptureRef::Index(2).to_string(), "$2");
		assert_eq!(CaptureRef::Name("op".to_string()).to_string(), "${op}");
	}
}
