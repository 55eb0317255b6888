use serde::Deserialize;
use serde::Serialize;
use tracing::trace;

use crate::Content;
use crate::Tag;

/// Attribute count from which a tag lists its attributes one per line.
const BLOCK_ATTRIBUTE_COUNT: usize = 3;

/// How a tag is written out.
///
/// ```text
/// Atom    {name}
/// Brace   {name: contents}
/// Line    {name=} contents to the end of the line
/// Indent  {name=}
///           {@attribute}
///           : contents, one level deeper
/// End     {name=}
///           --
///           contents, one level deeper
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
	Atom,
	Brace,
	Line,
	Indent,
	End,
}

impl Layout {
	/// Fits inside a single line without ending it.
	pub fn is_inline(self) -> bool {
		matches!(self, Self::Atom | Self::Brace)
	}

	/// Opens an indented block.
	pub fn is_block(self) -> bool {
		matches!(self, Self::Indent | Self::End)
	}

	/// Nothing else can follow the tag on its line.
	pub fn ends_line(self) -> bool {
		matches!(self, Self::Line | Self::Indent | Self::End)
	}

	/// The line that introduces block contents.
	pub fn marker(self) -> Option<&'static str> {
		match self {
			Self::Indent => Some(":"),
			Self::End => Some("--"),
			Self::Atom | Self::Brace | Self::Line => None,
		}
	}
}

/// A copy of a [`Tag`] annotated with the layout it will be printed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LaidTag {
	pub is_quoted: bool,
	pub is_attribute: bool,
	pub name: String,
	pub attributes: Vec<LaidTag>,
	pub is_literal: bool,
	pub contents: Vec<LaidContent>,
	pub layout: Layout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LaidContent {
	Text(String),
	Tag(LaidTag),
}

impl LaidContent {
	pub(crate) fn as_tag(&self) -> Option<&LaidTag> {
		match self {
			Self::Text(_) => None,
			Self::Tag(tag) => Some(tag),
		}
	}
}

impl LaidTag {
	/// The single text segment of a literal tag.
	pub(crate) fn literal_text(&self) -> Option<&str> {
		match self.contents.as_slice() {
			[LaidContent::Text(text)] if self.is_literal => Some(text),
			_ => None,
		}
	}
}

/// Copy a tag for printing. `is_attribute` is set from the tag's position,
/// whatever the caller left in it.
pub(crate) fn prepare(tag: &Tag, is_attribute: bool) -> LaidTag {
	LaidTag {
		is_quoted: tag.is_quoted,
		is_attribute,
		name: tag.name.clone(),
		attributes: tag
			.attributes
			.iter()
			.map(|attribute| prepare(attribute, true))
			.collect(),
		is_literal: tag.is_literal,
		contents: prepare_contents(&tag.contents),
		layout: Layout::Atom,
	}
}

pub(crate) fn prepare_contents(contents: &[Content]) -> Vec<LaidContent> {
	contents
		.iter()
		.map(|content| {
			match content {
				Content::Text(text) => LaidContent::Text(text.clone()),
				Content::Tag(tag) => LaidContent::Tag(prepare(tag, false)),
			}
		})
		.collect()
}

/// Choose a layout for `tag` and everything below it.
pub(crate) fn infer(tag: &mut LaidTag) {
	for attribute in &mut tag.attributes {
		infer(attribute);
	}

	infer_contents(&mut tag.contents);

	let mut layout = Layout::Atom;

	if tag.attributes.len() >= BLOCK_ATTRIBUTE_COUNT
		|| tag.attributes.iter().any(|attribute| !attribute.layout.is_inline())
	{
		layout = Layout::Indent;
	}

	if !tag.contents.is_empty() && !layout.is_block() {
		layout = if needs_block(&tag.contents) {
			Layout::Indent
		} else {
			Layout::Brace
		};
	}

	if layout == Layout::Brace && tag.literal_text().is_some_and(|text| !is_nested(text)) {
		layout = Layout::Line;
	}

	if layout.is_block() {
		for attribute in &mut tag.attributes {
			if attribute.layout == Layout::Brace {
				attribute.layout = Layout::Line;
			}
		}
	}

	if layout == Layout::Brace
		&& tag
			.contents
			.iter()
			.filter_map(LaidContent::as_tag)
			.any(|child| matches!(child.layout, Layout::Line | Layout::Indent))
	{
		layout = Layout::Line;
	}

	trace!(name = %tag.name, ?layout, "chose layout");
	tag.layout = layout;
}

pub(crate) fn infer_contents(contents: &mut [LaidContent]) {
	for content in contents {
		if let LaidContent::Tag(child) = content {
			infer(child);
		}
	}
}

/// Contents that cannot be written on one line.
fn needs_block(contents: &[LaidContent]) -> bool {
	let last = contents.len().saturating_sub(1);

	contents.iter().enumerate().any(|(index, content)| {
		match content {
			LaidContent::Text(text) => text.contains('\n'),
			LaidContent::Tag(child) => {
				child.layout.is_block() || (child.layout == Layout::Line && index < last)
			}
		}
	})
}

/// Braces close in order and none is left open, so raw text can sit inside
/// `{name': ...}` without ending it early.
pub(crate) fn is_nested(text: &str) -> bool {
	let mut depth = 0_usize;

	for ch in text.chars() {
		match ch {
			'{' => depth += 1,
			'}' => {
				let Some(next) = depth.checked_sub(1) else {
					return false;
				};
				depth = next;
			}
			_ => {}
		}
	}

	depth == 0
}
