use tracing::debug;

use crate::Content;
use crate::Layout;
use crate::PrintOptions;
use crate::Tag;
use crate::TagdownResult;
use crate::escape::escape_root;
use crate::layout::LaidContent;
use crate::layout::LaidTag;
use crate::layout::infer;
use crate::layout::infer_contents;
use crate::layout::prepare;
use crate::layout::prepare_contents;
use crate::validate::validate_root;
use crate::validate::validate_tag;

/// Print contents in canonical form with the default [`PrintOptions`].
pub fn print_contents(contents: &[Content]) -> TagdownResult<String> {
	print_contents_with_options(contents, &PrintOptions::default())
}

/// Print contents in canonical form.
///
/// Every tag gets a layout chosen from its shape and its text is escaped just
/// enough for [`parse_contents`](crate::parse_contents) to read the same tree
/// back. The input is not modified.
pub fn print_contents_with_options(
	contents: &[Content],
	options: &PrintOptions,
) -> TagdownResult<String> {
	let mut laid = prepare_contents(contents);
	infer_contents(&mut laid);
	validate_root(&laid)?;
	escape_root(&mut laid);

	let mut emitter = Emitter::new(options.indent.unit());
	emitter.contents(&laid);
	let mut output = emitter.output;

	if options.final_newline && !output.is_empty() {
		output.push('\n');
	}

	debug!(items = contents.len(), bytes = output.len(), "printed contents");

	Ok(output)
}

/// Print a single tag as a top-level item.
pub fn print_tag(tag: &Tag) -> TagdownResult<String> {
	print_contents(&[Content::Tag(tag.clone())])
}

/// The layout the printer chooses for `tag` at the top level.
pub fn layout_of(tag: &Tag) -> TagdownResult<Layout> {
	let mut laid = prepare(tag, false);
	infer(&mut laid);
	validate_tag(&laid)?;

	Ok(laid.layout)
}

/// Writes escaped, laid out contents.
struct Emitter {
	output: String,
	unit: &'static str,
	level: usize,
	/// Indentation is still owed for the current line.
	at_line_start: bool,
}

impl Emitter {
	fn new(unit: &'static str) -> Self {
		Self {
			output: String::new(),
			unit,
			level: 0,
			at_line_start: false,
		}
	}

	/// Write text, indenting every line that is not empty.
	fn write(&mut self, text: &str) {
		for (index, line) in text.split('\n').enumerate() {
			if index > 0 {
				self.newline();
			}

			if line.is_empty() {
				continue;
			}

			if self.at_line_start {
				for _ in 0..self.level {
					self.output.push_str(self.unit);
				}

				self.at_line_start = false;
			}

			self.output.push_str(line);
		}
	}

	fn newline(&mut self) {
		self.output.push('\n');
		self.at_line_start = true;
	}

	fn contents(&mut self, contents: &[LaidContent]) {
		for (index, content) in contents.iter().enumerate() {
			match content {
				LaidContent::Text(text) => self.write(text),
				LaidContent::Tag(tag) => {
					self.tag(tag);

					if tag.layout.ends_line() && index + 1 < contents.len() {
						self.newline();
					}
				}
			}
		}
	}

	fn tag(&mut self, tag: &LaidTag) {
		self.write("{");

		if tag.is_quoted {
			self.write("'");
		}

		if tag.is_attribute {
			self.write("@");
		}

		self.write(&tag.name);

		if !tag.layout.is_block() {
			for attribute in &tag.attributes {
				self.tag(attribute);
			}
		}

		if tag.is_literal {
			self.write("'");
		}

		match tag.layout {
			Layout::Atom => self.write("}"),
			Layout::Brace => {
				self.write(": ");
				self.contents(&tag.contents);
				self.write("}");
			}
			Layout::Line => {
				self.write("=} ");
				self.contents(&tag.contents);
			}
			Layout::Indent | Layout::End => self.block(tag),
		}
	}

	fn block(&mut self, tag: &LaidTag) {
		self.write("=}");
		self.level += 1;

		for attribute in &tag.attributes {
			self.newline();
			self.tag(attribute);
		}

		if !tag.contents.is_empty() {
			self.newline();

			if tag.layout == Layout::End {
				self.write("--");
				self.newline();
			} else {
				self.write(":");

				if starts_on_marker_line(&tag.contents) {
					self.write(" ");
				}
			}

			self.contents(&tag.contents);
		}

		self.level -= 1;
	}
}

/// Indent contents share the marker's line unless their first line is empty.
fn starts_on_marker_line(contents: &[LaidContent]) -> bool {
	match contents.first() {
		Some(LaidContent::Text(text)) => !text.starts_with('\n'),
		Some(LaidContent::Tag(_)) => true,
		None => false,
	}
}
