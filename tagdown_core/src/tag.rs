use serde::Deserialize;
use serde::Serialize;

/// A named structural node with attributes and contents.
///
/// ```text
/// {name{@attribute}: contents}
/// ```
///
/// Trees are plain values. The parser builds them from text and callers may
/// build them by hand with the builder methods below; the printer never
/// mutates a tree it is given.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tag {
	/// Marked with a leading `'`. Carried through round trips, otherwise
	/// ignored by the grammar.
	#[serde(default)]
	pub is_quoted: bool,
	/// True when the tag sits in another tag's attribute list.
	#[serde(default)]
	pub is_attribute: bool,
	pub name: String,
	#[serde(default)]
	pub attributes: Vec<Tag>,
	/// Marked with a trailing `'`. The contents are a single raw text segment
	/// in which escapes and nested tags are not interpreted.
	#[serde(default)]
	pub is_literal: bool,
	#[serde(default)]
	pub contents: Vec<Content>,
}

/// An element of a tag's contents (or of a top-level forest).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
	Text(String),
	Tag(Tag),
}

impl Tag {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Self::default()
		}
	}

	#[must_use]
	pub fn quoted(mut self) -> Self {
		self.is_quoted = true;
		self
	}

	#[must_use]
	pub fn literal(mut self) -> Self {
		self.is_literal = true;
		self
	}

	/// Append an attribute, marking it as one.
	#[must_use]
	pub fn with_attribute(mut self, mut attribute: Tag) -> Self {
		attribute.is_attribute = true;
		self.attributes.push(attribute);
		self
	}

	#[must_use]
	pub fn with_text(mut self, text: impl AsRef<str>) -> Self {
		self.push_text(text);
		self
	}

	#[must_use]
	pub fn with_tag(mut self, tag: Tag) -> Self {
		self.contents.push(Content::Tag(tag));
		self
	}

	/// Append text to the contents, merging it into a trailing text segment so
	/// that no two text segments are ever adjacent. Empty text is ignored.
	pub fn push_text(&mut self, text: impl AsRef<str>) {
		push_text(&mut self.contents, text.as_ref());
	}

	/// The single text segment of a literal tag.
	pub fn literal_text(&self) -> Option<&str> {
		match self.contents.as_slice() {
			[Content::Text(text)] if self.is_literal => Some(text),
			_ => None,
		}
	}
}

impl Content {
	pub fn text(text: impl Into<String>) -> Self {
		Self::Text(text.into())
	}

	pub fn as_text(&self) -> Option<&str> {
		match self {
			Self::Text(text) => Some(text),
			Self::Tag(_) => None,
		}
	}

	pub fn as_tag(&self) -> Option<&Tag> {
		match self {
			Self::Text(_) => None,
			Self::Tag(tag) => Some(tag),
		}
	}
}

impl From<Tag> for Content {
	fn from(tag: Tag) -> Self {
		Self::Tag(tag)
	}
}

impl From<&str> for Content {
	fn from(text: &str) -> Self {
		Self::Text(text.to_string())
	}
}

impl From<String> for Content {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}

/// Append text to a contents list, merging with a trailing text segment.
pub(crate) fn push_text(contents: &mut Vec<Content>, text: &str) {
	if text.is_empty() {
		return;
	}

	if let Some(Content::Text(last)) = contents.last_mut() {
		last.push_str(text);
	} else {
		contents.push(Content::Text(text.to_string()));
	}
}
