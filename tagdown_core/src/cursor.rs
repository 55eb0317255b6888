/// One indentation unit: two spaces or a single tab.
const INDENT_SPACES: &str = "  ";

/// A saved cursor position. Restoring it rewinds the cursor exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Checkpoint(usize);

/// The indentation of the first non-blank line following a newline.
///
/// When several nested blocks end on the same newline each of them asks
/// whether it continues. The measurement is cached against the newline so a
/// dedent over many levels is measured once and then closes one scope per
/// query.
#[derive(Debug, Clone, Copy)]
struct IndentProbe {
	newline: usize,
	/// `None` when only blank lines remain.
	units: Option<usize>,
}

/// Byte cursor over an immutable source string.
pub(crate) struct Cursor<'a> {
	source: &'a str,
	offset: usize,
	probe: Option<IndentProbe>,
	/// For each byte offset, the `}` that closes raw text starting there.
	/// Built on first use.
	closes: Option<Vec<Option<usize>>>,
}

impl<'a> Cursor<'a> {
	pub(crate) fn new(source: &'a str) -> Self {
		Self {
			source,
			offset: 0,
			probe: None,
			closes: None,
		}
	}

	pub(crate) fn offset(&self) -> usize {
		self.offset
	}

	pub(crate) fn len(&self) -> usize {
		self.source.len()
	}

	pub(crate) fn is_eof(&self) -> bool {
		self.offset >= self.source.len()
	}

	fn rest(&self) -> &'a str {
		&self.source[self.offset..]
	}

	pub(crate) fn checkpoint(&self) -> Checkpoint {
		Checkpoint(self.offset)
	}

	pub(crate) fn restore(&mut self, checkpoint: Checkpoint) {
		self.offset = checkpoint.0;
	}

	pub(crate) fn peek(&self) -> Option<char> {
		self.rest().chars().next()
	}

	pub(crate) fn peek_second(&self) -> Option<char> {
		self.rest().chars().nth(1)
	}

	/// Consume and return the next character.
	pub(crate) fn bump(&mut self) -> Option<char> {
		let ch = self.peek()?;
		self.offset += ch.len_utf8();
		Some(ch)
	}

	pub(crate) fn eat(&mut self, expected: char) -> bool {
		if self.peek() == Some(expected) {
			self.offset += expected.len_utf8();
			true
		} else {
			false
		}
	}

	pub(crate) fn eat_str(&mut self, expected: &str) -> bool {
		if self.rest().starts_with(expected) {
			self.offset += expected.len();
			true
		} else {
			false
		}
	}

	/// Consume characters while `predicate` holds.
	pub(crate) fn eat_while(&mut self, predicate: impl Fn(char) -> bool) {
		while self.peek().is_some_and(&predicate) {
			self.bump();
		}
	}

	pub(crate) fn slice_from(&self, start: usize) -> &'a str {
		&self.source[start..self.offset]
	}

	/// True at a newline or at the end of the input.
	pub(crate) fn at_line_end(&self) -> bool {
		matches!(self.peek(), None | Some('\n'))
	}

	/// True when the rest of the current line holds only spaces and tabs.
	pub(crate) fn is_blank_line(&self) -> bool {
		let rest = self.rest();
		let line = rest.find('\n').map_or(rest, |end| &rest[..end]);
		is_blank(line)
	}

	/// Consume exactly `units` indentation units, or nothing at all.
	pub(crate) fn eat_indent(&mut self, units: usize) -> bool {
		let start = self.checkpoint();

		for _ in 0..units {
			if !(self.eat_str(INDENT_SPACES) || self.eat('\t')) {
				self.restore(start);
				return false;
			}
		}

		true
	}

	/// Whether the block at `level` continues past the newline under the
	/// cursor: the next non-blank line must carry at least `level` units.
	pub(crate) fn continues_block(&mut self, level: usize) -> bool {
		debug_assert_eq!(self.peek(), Some('\n'));

		let newline = self.offset;
		let units = match self.probe {
			Some(probe) if probe.newline == newline => probe.units,
			_ => {
				let units = self.measure_next_line(newline + 1);
				self.probe = Some(IndentProbe { newline, units });
				units
			}
		};

		units.is_some_and(|units| units >= level)
	}

	fn measure_next_line(&self, mut position: usize) -> Option<usize> {
		loop {
			let rest = &self.source[position..];
			let end = rest.find('\n');
			let line = end.map_or(rest, |end| &rest[..end]);

			if !is_blank(line) {
				return Some(count_units(line));
			}

			position += end? + 1;
		}
	}

	/// Consume the remainder of the input if it is only blank lines.
	pub(crate) fn eat_trailing_blank_lines(&mut self) {
		if self.rest().chars().all(|ch| matches!(ch, ' ' | '\t' | '\n')) {
			self.offset = self.source.len();
		}
	}

	/// Consume raw text up to the first `}` not matched by a `{` before it,
	/// and that `}`. Returns the text in between.
	pub(crate) fn eat_balanced(&mut self) -> Option<&'a str> {
		let source = self.source;
		let closes = self.closes.get_or_insert_with(|| closing_braces(source));
		let close = closes[self.offset]?;
		let text = &source[self.offset..close];
		self.offset = close + 1;

		Some(text)
	}

	pub(crate) fn line_index(&self) -> LineIndex<'a> {
		LineIndex::new(self.source)
	}
}

/// Start offsets of every line in a source.
pub(crate) struct LineIndex<'a> {
	source: &'a str,
	starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
	fn new(source: &'a str) -> Self {
		let starts = std::iter::once(0)
			.chain(source.match_indices('\n').map(|(newline, _)| newline + 1))
			.collect();

		Self { source, starts }
	}

	/// 1-based line and column of a byte offset.
	pub(crate) fn line_column(&self, offset: usize) -> (usize, usize) {
		let line = self.starts.partition_point(|&start| start <= offset);
		let start = self.starts[line - 1];
		let column = self.source[start..offset].chars().count() + 1;

		(line, column)
	}
}

/// Right to left: a `}` closes itself, a `{` defers to whatever closes the
/// text after its own match.
fn closing_braces(source: &str) -> Vec<Option<usize>> {
	let bytes = source.as_bytes();
	let mut closes = vec![None; bytes.len() + 1];

	for position in (0..bytes.len()).rev() {
		closes[position] = match bytes[position] {
			b'}' => Some(position),
			b'{' => closes[position + 1].and_then(|close| closes[close + 1]),
			_ => closes[position + 1],
		};
	}

	closes
}

fn is_blank(line: &str) -> bool {
	line.chars().all(|ch| ch == ' ' || ch == '\t')
}

/// Count leading indentation units greedily.
fn count_units(line: &str) -> usize {
	let mut rest = line;
	let mut units = 0;

	loop {
		if let Some(next) = rest.strip_prefix(INDENT_SPACES) {
			rest = next;
		} else if let Some(next) = rest.strip_prefix('\t') {
			rest = next;
		} else {
			return units;
		}

		units += 1;
	}
}
