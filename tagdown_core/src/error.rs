use miette::Diagnostic;
use thiserror::Error;

use crate::Layout;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum TagdownError {
	#[error("parser stopped at byte {offset} of {len} without consuming the input")]
	#[diagnostic(
		code(tagdown::unconsumed_input),
		help("the top level must always consume the whole input; this is a parser bug")
	)]
	UnconsumedInput { offset: usize, len: usize },

	#[error("invalid tag name: `{0}`")]
	#[diagnostic(
		code(tagdown::invalid_name),
		help(
			"names start with a letter and contain letters, digits and single interior spaces"
		)
	)]
	InvalidName(String),

	#[error("tag `{name}` cannot use the {layout:?} layout with its contents")]
	#[diagnostic(code(tagdown::layout_mismatch))]
	LayoutMismatch { name: String, layout: Layout },

	#[error("attribute `{0}` is not marked as an attribute")]
	#[diagnostic(code(tagdown::not_an_attribute))]
	NotAnAttribute(String),

	#[error("literal tag `{0}` must contain exactly one text segment")]
	#[diagnostic(
		code(tagdown::invalid_literal),
		help("literal contents are raw text; nested tags are not allowed")
	)]
	InvalidLiteral(String),

	#[error("tag `{0}` contains two adjacent text segments")]
	#[diagnostic(
		code(tagdown::adjacent_text),
		help("merge adjacent text with `Tag::push_text`")
	)]
	AdjacentText(String),

	#[error("tag `{0}` contains an empty text segment")]
	#[diagnostic(code(tagdown::empty_text))]
	EmptyText(String),

	#[error("failed to parse config: {0}")]
	#[diagnostic(
		code(tagdown::config_parse),
		help("check that the `[print]` section is valid TOML")
	)]
	ConfigParse(String),
}

pub type TagdownResult<T> = Result<T, TagdownError>;
