use std::collections::BTreeSet;

use derive_more::Deref;
use derive_more::DerefMut;

use crate::Layout;
use crate::layout::LaidContent;
use crate::layout::LaidTag;

/// Byte offsets into the text stream of one contents list, in order.
#[derive(Debug, Default, Deref, DerefMut)]
pub(crate) struct Marks(
	#[deref]
	#[deref_mut]
	BTreeSet<usize>,
);

/// What encloses a contents list once printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Context {
	/// `{name: ...}`. Closed by `}`, never crosses a line.
	Brace,
	/// `{name=} ...`. Closed by the end of the line.
	Line,
	/// Indented contents, or the top level. Closed by a dedent.
	Block,
}

impl Context {
	fn of(layout: Layout) -> Self {
		match layout {
			Layout::Atom | Layout::Brace => Self::Brace,
			Layout::Line => Self::Line,
			Layout::Indent | Layout::End => Self::Block,
		}
	}
}

#[derive(Debug, Default)]
struct Escapes {
	/// Characters to prefix with `\`.
	backslashes: Marks,
	/// Positions where a `$` end-of-text marker goes.
	dollars: Marks,
}

/// Escape the top-level contents and every tag below them in place.
pub(crate) fn escape_root(contents: &mut Vec<LaidContent>) {
	escape_contents(contents, Context::Block, false);
}

fn escape_tag(tag: &mut LaidTag) {
	for attribute in &mut tag.attributes {
		escape_tag(attribute);
	}

	escape_contents(&mut tag.contents, Context::of(tag.layout), tag.is_literal);
}

fn escape_contents(contents: &mut Vec<LaidContent>, context: Context, literal: bool) {
	for content in contents.iter_mut() {
		if let LaidContent::Tag(child) = content {
			escape_tag(child);
		}
	}

	let stream: String = contents
		.iter()
		.filter_map(|content| {
			match content {
				LaidContent::Text(text) => Some(text.as_str()),
				LaidContent::Tag(_) => None,
			}
		})
		.collect();

	let mut escapes = Escapes::default();

	if !literal {
		mark_structural(&stream, context, &mut escapes.backslashes);
	}

	let last = contents.len().saturating_sub(1);
	let mut offset = 0;

	for (index, content) in contents.iter().enumerate() {
		let LaidContent::Text(text) = content else {
			continue;
		};

		if let Some(previous) = index.checked_sub(1).and_then(|index| contents[index].as_tag()) {
			mark_after_block(text, offset, previous, &mut escapes.backslashes);
		}

		if context != Context::Brace {
			canonicalize_lines(text, offset, index == last, context, literal, &mut escapes);
		}

		offset += text.len();
	}

	align(contents, &stream, &escapes);
}

/// Backslashes for `\` and `}`, for `{` inside braces, and for any `{` that
/// could start a tag header ending in `:` further along the line.
fn mark_structural(stream: &str, context: Context, marks: &mut Marks) {
	let mut candidates: Vec<usize> = Vec::new();

	for (offset, ch) in stream.char_indices() {
		match ch {
			'\\' => {
				marks.insert(offset);
			}
			'}' => {
				marks.insert(offset);
				candidates.pop();
			}
			'{' if context == Context::Brace => {
				marks.insert(offset);
			}
			'{' => candidates.push(offset),
			':' => marks.extend(candidates.iter().copied()),
			'\n' => candidates.clear(),
			_ => {}
		}
	}
}

/// Text printed right after a block tag must not read as part of it.
fn mark_after_block(text: &str, offset: usize, previous: &LaidTag, marks: &mut Marks) {
	if !previous.layout.is_block() {
		return;
	}

	if previous.contents.is_empty()
		&& previous
			.layout
			.marker()
			.is_some_and(|marker| text.starts_with(marker))
	{
		marks.insert(offset);
	}

	let mut start = 0;

	for line in text.split('\n') {
		if !line.is_empty() {
			if line.starts_with([' ', '\t']) {
				marks.insert(offset + start);
			}

			break;
		}

		start += 1;
	}
}

/// Protect the end of every line that the printer terminates, so trailing
/// whitespace and `$` survive the parser's line trimming.
fn canonicalize_lines(
	text: &str,
	offset: usize,
	is_last: bool,
	context: Context,
	literal: bool,
	escapes: &mut Escapes,
) {
	let mut start = 0;

	for line in text.split('\n') {
		let end = start + line.len();
		let followed_by_newline = end < text.len();

		if followed_by_newline || is_last {
			match line.chars().next_back() {
				Some(' ' | '\t') => {
					escapes.dollars.insert(offset + end);
				}
				Some('$') if literal => {
					escapes.dollars.insert(offset + end);
				}
				Some('$') => {
					escapes.backslashes.insert(offset + end - 1);
				}
				None if !followed_by_newline && context == Context::Block => {
					escapes.dollars.insert(offset + end);
				}
				_ => {}
			}
		}

		start = end + 1;
	}
}

/// Rebuild the text segments of `contents` from the escaped stream, keeping
/// tags where they were.
fn align(contents: &mut Vec<LaidContent>, stream: &str, escapes: &Escapes) {
	let mut aligner = Aligner {
		stream,
		escapes,
		offset: 0,
	};

	*contents = std::mem::take(contents)
		.into_iter()
		.map(|content| {
			match content {
				LaidContent::Text(text) => LaidContent::Text(aligner.take(text.len())),
				tag @ LaidContent::Tag(_) => tag,
			}
		})
		.collect();
}

/// Walks the unescaped stream segment by segment, emitting each with its
/// escapes applied.
struct Aligner<'a> {
	stream: &'a str,
	escapes: &'a Escapes,
	offset: usize,
}

impl Aligner<'_> {
	fn take(&mut self, len: usize) -> String {
		let start = self.offset;
		let end = start + len;
		let mut escaped = String::with_capacity(len + 2);

		for (index, ch) in self.stream[start..end].char_indices() {
			let position = start + index;

			// A marker at `start` closed the previous segment.
			if position != start && self.escapes.dollars.contains(&position) {
				escaped.push('$');
			}

			if self.escapes.backslashes.contains(&position) {
				escaped.push('\\');
			}

			escaped.push(ch);
		}

		if self.escapes.dollars.contains(&end) {
			escaped.push('$');
		}

		self.offset = end;
		escaped
	}
}
