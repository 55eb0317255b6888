use std::collections::HashSet;

use tracing::debug;
use tracing::trace;

use super::TagdownError;
use super::TagdownResult;
use crate::Content;
use crate::Layout;
use crate::Tag;
use crate::cursor;
use crate::cursor::Cursor;
use crate::tag::push_text;

/// A diagnostic produced during parsing. These are issues that don't prevent
/// parsing from completing but indicate problems in the source content.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseDiagnostic {
	/// A `{` did not open a valid tag and was kept as text.
	DegradedTag {
		offset: usize,
		line: usize,
		column: usize,
	},
}

/// Parse text into a forest of tags and text segments.
///
/// Parsing never fails on malformed markup: a `{` that does not open a valid
/// tag is kept as text. Use [`parse_with_diagnostics`] to find out where that
/// happened.
pub fn parse_contents(text: impl AsRef<str>) -> TagdownResult<Vec<Content>> {
	let (contents, _) = parse_with_diagnostics(text)?;
	Ok(contents)
}

/// Parse text and also return the diagnostics collected along the way.
pub fn parse_with_diagnostics(
	text: impl AsRef<str>,
) -> TagdownResult<(Vec<Content>, Vec<ParseDiagnostic>)> {
	let text = text.as_ref();
	let mut parser = Parser::new(text);
	let contents = parser.document()?;
	let diagnostics = parser.diagnostics();

	debug!(
		items = contents.len(),
		degraded = diagnostics.len(),
		"parsed contents"
	);

	Ok((contents, diagnostics))
}

/// Parse text that holds exactly one tag. Returns `None` when the text parses
/// to anything else (plain text, several items, nothing at all).
pub fn parse_tag(text: impl AsRef<str>) -> TagdownResult<Option<Tag>> {
	let mut items = parse_contents(text)?.into_iter();

	Ok(match (items.next(), items.next()) {
		(Some(Content::Tag(tag)), None) => Some(tag),
		_ => None,
	})
}

/// Where a tag is being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Slot {
	/// Contents of a block or a line.
	Content,
	/// Contents of a brace tag.
	InlineContent,
	InlineAttribute,
	BlockAttribute,
}

impl Slot {
	fn is_attribute(self) -> bool {
		matches!(self, Self::InlineAttribute | Self::BlockAttribute)
	}

	fn requires_inline(self) -> bool {
		matches!(self, Self::InlineContent | Self::InlineAttribute)
	}
}

/// The part of an open tag the parser is reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
	/// Between the name and the terminator.
	InlineAttr,
	/// After `=}` and a newline, reading one attribute per line.
	BlockAttr,
	Content,
}

enum Step {
	Continue,
	Done(Layout),
	Fail,
}

/// A tag whose header has been read.
struct OpenTag {
	tag: Tag,
	scope: Scope,
	layout: Layout,
	block_attributes: usize,
}

impl OpenTag {
	fn enter_contents(&mut self, layout: Layout) {
		self.layout = layout;
		self.scope = Scope::Content;
	}
}

#[derive(Debug, Clone, Copy)]
struct Checkpoint {
	cursor: cursor::Checkpoint,
	level: usize,
	degraded: usize,
}

/// Accumulates the text between two tags.
#[derive(Debug, Default)]
struct TextBuffer {
	text: String,
	/// Start of the current line within `text`.
	line_start: usize,
	/// End of the last escaped character. Canonicalization never reaches
	/// behind it.
	protected: usize,
}

impl TextBuffer {
	fn push(&mut self, ch: char) {
		self.text.push(ch);
	}

	fn push_escaped(&mut self, ch: char) {
		self.text.push(ch);
		self.protected = self.text.len();
	}

	fn push_newline(&mut self) {
		self.text.push('\n');
		self.line_start = self.text.len();
	}

	/// Drop a trailing `$` marker, or else trailing spaces and tabs.
	fn end_line(&mut self) {
		let floor = self.line_start.max(self.protected);

		if self.text.len() > floor && self.text.ends_with('$') {
			self.text.pop();
			return;
		}

		while self.text.len() > floor && self.text.ends_with([' ', '\t']) {
			self.text.pop();
		}
	}

	fn flush_into(&mut self, contents: &mut Vec<Content>) {
		push_text(contents, &self.text);
		self.text.clear();
		self.line_start = 0;
		self.protected = 0;
	}
}

struct Parser<'a> {
	cursor: Cursor<'a>,
	/// Indent level of the innermost open block.
	level: usize,
	/// Offsets of every `{` that was kept as text.
	degraded: Vec<usize>,
	/// Tag attempts that failed, keyed by offset, slot and level. The outcome
	/// of an attempt depends on nothing else.
	failed: HashSet<(usize, Slot, usize)>,
	/// Offsets from which brace contents run to the end of the input without
	/// closing.
	unclosed: HashSet<usize>,
}

impl<'a> Parser<'a> {
	fn new(source: &'a str) -> Self {
		Self {
			cursor: Cursor::new(source),
			level: 0,
			degraded: Vec::new(),
			failed: HashSet::new(),
			unclosed: HashSet::new(),
		}
	}

	fn checkpoint(&self) -> Checkpoint {
		Checkpoint {
			cursor: self.cursor.checkpoint(),
			level: self.level,
			degraded: self.degraded.len(),
		}
	}

	fn restore(&mut self, checkpoint: Checkpoint) {
		self.cursor.restore(checkpoint.cursor);
		self.level = checkpoint.level;
		self.degraded.truncate(checkpoint.degraded);
	}

	fn document(&mut self) -> TagdownResult<Vec<Content>> {
		let contents = self.block_contents(false);
		self.cursor.eat_trailing_blank_lines();

		if !self.cursor.is_eof() {
			return Err(TagdownError::UnconsumedInput {
				offset: self.cursor.offset(),
				len: self.cursor.len(),
			});
		}

		Ok(contents)
	}

	fn diagnostics(&self) -> Vec<ParseDiagnostic> {
		let lines = self.cursor.line_index();

		self.degraded
			.iter()
			.map(|&offset| {
				let (line, column) = lines.line_column(offset);
				ParseDiagnostic::DegradedTag {
					offset,
					line,
					column,
				}
			})
			.collect()
	}

	/// Read a tag at the cursor, restoring the cursor when it does not form
	/// one that fits `slot`.
	fn tag(&mut self, slot: Slot) -> Option<(Tag, Layout)> {
		let key = (self.cursor.offset(), slot, self.level);

		if self.failed.contains(&key) {
			return None;
		}

		let parsed = self.attempt(slot);

		if parsed.is_none() {
			self.failed.insert(key);
		}

		parsed
	}

	fn attempt(&mut self, slot: Slot) -> Option<(Tag, Layout)> {
		let start = self.checkpoint();

		let Some(mut open) = self.open(slot) else {
			self.restore(start);
			return None;
		};

		let layout = loop {
			match self.advance(&mut open) {
				Step::Continue => {}
				Step::Done(layout) => break Some(layout),
				Step::Fail => break None,
			}
		};

		match layout {
			Some(layout) if !slot.requires_inline() || layout.is_inline() => {
				Some((open.tag, layout))
			}
			_ => {
				self.restore(start);
				None
			}
		}
	}

	fn open(&mut self, slot: Slot) -> Option<OpenTag> {
		if !self.cursor.eat('{') {
			return None;
		}

		let is_quoted = self.cursor.eat('\'');

		if self.cursor.eat('@') && !slot.is_attribute() {
			return None;
		}

		let name = self.name()?;

		Some(OpenTag {
			tag: Tag {
				is_quoted,
				is_attribute: slot.is_attribute(),
				name,
				..Tag::default()
			},
			scope: Scope::InlineAttr,
			layout: Layout::Atom,
			block_attributes: 0,
		})
	}

	fn name(&mut self) -> Option<String> {
		let start = self.cursor.offset();

		if !self.cursor.peek().is_some_and(|ch| ch.is_ascii_alphabetic()) {
			return None;
		}

		self.cursor.eat_while(|ch| ch.is_ascii_alphanumeric());

		while self.cursor.peek() == Some(' ')
			&& self
				.cursor
				.peek_second()
				.is_some_and(|ch| ch.is_ascii_alphanumeric())
		{
			self.cursor.bump();
			self.cursor.eat_while(|ch| ch.is_ascii_alphanumeric());
		}

		Some(self.cursor.slice_from(start).to_string())
	}

	fn advance(&mut self, open: &mut OpenTag) -> Step {
		match open.scope {
			Scope::InlineAttr => self.advance_header(open),
			Scope::BlockAttr => self.advance_block_attribute(open),
			Scope::Content => self.advance_contents(open),
		}
	}

	fn advance_header(&mut self, open: &mut OpenTag) -> Step {
		if self.cursor.peek() == Some('{') {
			return match self.tag(Slot::InlineAttribute) {
				Some((attribute, _)) => {
					open.tag.attributes.push(attribute);
					Step::Continue
				}
				None => Step::Fail,
			};
		}

		open.tag.is_literal = self.cursor.eat('\'');

		if self.cursor.eat('}') {
			return if open.tag.is_literal {
				Step::Fail
			} else {
				Step::Done(Layout::Atom)
			};
		}

		if self.cursor.eat(':') {
			self.cursor.eat(' ');
			open.enter_contents(Layout::Brace);
			return Step::Continue;
		}

		if self.cursor.eat_str("=}") {
			if self.cursor.peek() == Some('\n') {
				open.scope = Scope::BlockAttr;
			} else {
				self.cursor.eat(' ');
				open.enter_contents(Layout::Line);
			}

			return Step::Continue;
		}

		Step::Fail
	}

	/// Read one line below a `=}` header: an attribute, a contents marker, or
	/// nothing that belongs to the tag.
	fn advance_block_attribute(&mut self, open: &mut OpenTag) -> Step {
		let inner = self.level + 1;
		let line = self.checkpoint();

		if self.cursor.eat('\n') && self.cursor.eat_indent(inner) {
			let body = self.checkpoint();

			if self.cursor.peek() == Some('{') {
				self.level = inner;
				let attribute = self.tag(Slot::BlockAttribute);
				self.level = inner - 1;

				if let Some((attribute, _)) = attribute {
					if self.cursor.at_line_end() {
						open.tag.attributes.push(attribute);
						open.block_attributes += 1;
						return Step::Continue;
					}
				}

				self.restore(body);
			}

			if self.cursor.eat(':') {
				self.cursor.eat(' ');
				open.enter_contents(Layout::Indent);
				return Step::Continue;
			}

			if self.cursor.eat_str("--") && self.cursor.at_line_end() {
				open.enter_contents(Layout::End);
				return Step::Continue;
			}
		}

		self.restore(line);

		if open.block_attributes > 0 {
			return Step::Done(Layout::Indent);
		}

		// `{name=}` at the end of a line with nothing below it.
		open.enter_contents(Layout::Line);
		Step::Continue
	}

	fn advance_contents(&mut self, open: &mut OpenTag) -> Step {
		let literal = open.tag.is_literal;
		let contents = match open.layout {
			Layout::Atom => Some(Vec::new()),
			Layout::Brace if literal => self.literal_brace_contents(),
			Layout::Brace => self.brace_contents(),
			Layout::Line => Some(self.line_contents(literal)),
			Layout::Indent => Some(self.nested_block(literal, false)),
			Layout::End => Some(self.nested_block(literal, true)),
		};

		match contents {
			// A literal tag always holds one text segment.
			Some(contents) if literal && contents.is_empty() => Step::Fail,
			Some(contents) => {
				open.tag.contents = contents;
				Step::Done(open.layout)
			}
			None => Step::Fail,
		}
	}

	/// Read contents one level deeper. Indent contents start right after the
	/// marker; End contents start on the line below it.
	fn nested_block(&mut self, literal: bool, below_marker: bool) -> Vec<Content> {
		self.level += 1;

		let contents = if !below_marker || self.next_line() {
			self.block_contents(literal)
		} else {
			Vec::new()
		};

		self.level -= 1;
		contents
	}

	/// Step over the newline under the cursor and the indentation of the line
	/// after it, if the current block continues there.
	fn next_line(&mut self) -> bool {
		if self.cursor.peek() != Some('\n') || !self.cursor.continues_block(self.level) {
			return false;
		}

		self.cursor.bump();

		if !self.cursor.is_blank_line() {
			self.cursor.eat_indent(self.level);
		}

		true
	}

	fn block_contents(&mut self, literal: bool) -> Vec<Content> {
		let mut contents = Vec::new();
		let mut text = TextBuffer::default();

		loop {
			match self.cursor.peek() {
				None => {
					text.end_line();
					break;
				}
				Some('\n') => {
					text.end_line();

					if !self.next_line() {
						break;
					}

					text.push_newline();
				}
				Some('{') if !literal => {
					let layout = self.child(Slot::Content, &mut text, &mut contents);

					// The newline after a line-ending child is structural.
					if layout.is_some_and(Layout::ends_line) && !self.next_line() {
						break;
					}
				}
				Some('\\') if !literal => self.escape(&mut text),
				Some(ch) => {
					self.cursor.bump();
					text.push(ch);
				}
			}
		}

		text.flush_into(&mut contents);
		contents
	}

	fn line_contents(&mut self, literal: bool) -> Vec<Content> {
		let mut contents = Vec::new();
		let mut text = TextBuffer::default();

		loop {
			match self.cursor.peek() {
				None | Some('\n') => {
					text.end_line();
					break;
				}
				Some('{') if !literal => {
					let layout = self.child(Slot::Content, &mut text, &mut contents);

					if layout.is_some_and(Layout::ends_line) {
						break;
					}
				}
				Some('\\') if !literal => self.escape(&mut text),
				Some(ch) => {
					self.cursor.bump();
					text.push(ch);
				}
			}
		}

		text.flush_into(&mut contents);
		contents
	}

	fn brace_contents(&mut self) -> Option<Vec<Content>> {
		let start = self.cursor.offset();
		let mut contents = Vec::new();
		let mut text = TextBuffer::default();
		let mut depth = 0_usize;

		loop {
			// Contents that run unclosed from here do so at any depth.
			let next = match self.cursor.peek() {
				Some(_) if self.unclosed.contains(&self.cursor.offset()) => None,
				next => next,
			};

			let Some(next) = next else {
				self.unclosed.insert(start);
				return None;
			};

			match next {
				'}' => {
					self.cursor.bump();

					if depth == 0 {
						break;
					}

					depth -= 1;
					text.push('}');
				}
				'{' => {
					if self
						.child(Slot::InlineContent, &mut text, &mut contents)
						.is_none()
					{
						depth += 1;
					}
				}
				'\\' => self.escape(&mut text),
				ch => {
					self.cursor.bump();
					text.push(ch);
				}
			}
		}

		text.flush_into(&mut contents);
		Some(contents)
	}

	fn literal_brace_contents(&mut self) -> Option<Vec<Content>> {
		let text = self.cursor.eat_balanced()?;
		let mut contents = Vec::new();
		push_text(&mut contents, text);
		Some(contents)
	}

	/// Read a tag at `{` into `contents`, or keep the brace as text.
	fn child(
		&mut self,
		slot: Slot,
		text: &mut TextBuffer,
		contents: &mut Vec<Content>,
	) -> Option<Layout> {
		let offset = self.cursor.offset();

		if let Some((tag, layout)) = self.tag(slot) {
			text.flush_into(contents);
			contents.push(Content::Tag(tag));
			return Some(layout);
		}

		trace!(offset, "kept `{{` as text");
		self.degraded.push(offset);
		self.cursor.bump();
		text.push('{');
		None
	}

	fn escape(&mut self, text: &mut TextBuffer) {
		self.cursor.bump();

		match self.cursor.peek() {
			None | Some('\n') => text.push('\\'),
			Some(ch) => {
				self.cursor.bump();
				text.push_escaped(ch);
			}
		}
	}
}
