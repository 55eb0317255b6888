use crate::Layout;
use crate::TagdownError;
use crate::TagdownResult;
use crate::layout::LaidContent;
use crate::layout::LaidTag;

/// Name used in errors about the top-level contents.
const ROOT: &str = "<root>";

/// Whether `name` is a valid tag name: words of ASCII letters and digits
/// separated by single spaces, starting with a letter.
pub fn is_valid_name(name: &str) -> bool {
	let mut words = name.split(' ');
	let first = words.next().unwrap_or_default();

	first.starts_with(|ch: char| ch.is_ascii_alphabetic())
		&& first.chars().all(|ch| ch.is_ascii_alphanumeric())
		&& words.all(|word| !word.is_empty() && word.chars().all(|ch| ch.is_ascii_alphanumeric()))
}

pub(crate) fn validate_root(contents: &[LaidContent]) -> TagdownResult<()> {
	validate_contents(ROOT, contents)
}

pub(crate) fn validate_tag(tag: &LaidTag) -> TagdownResult<()> {
	if !is_valid_name(&tag.name) {
		return Err(TagdownError::InvalidName(tag.name.clone()));
	}

	let fits = match tag.layout {
		Layout::Atom => tag.contents.is_empty(),
		Layout::Brace | Layout::Line => !tag.contents.is_empty(),
		Layout::Indent | Layout::End => {
			!(tag.attributes.is_empty() && tag.contents.is_empty())
		}
	};

	if !fits {
		return Err(TagdownError::LayoutMismatch {
			name: tag.name.clone(),
			layout: tag.layout,
		});
	}

	for attribute in &tag.attributes {
		if !attribute.is_attribute {
			return Err(TagdownError::NotAnAttribute(attribute.name.clone()));
		}

		validate_tag(attribute)?;
	}

	if tag.is_literal && (tag.layout == Layout::Atom || tag.literal_text().is_none()) {
		return Err(TagdownError::InvalidLiteral(tag.name.clone()));
	}

	validate_contents(&tag.name, &tag.contents)
}

fn validate_contents(owner: &str, contents: &[LaidContent]) -> TagdownResult<()> {
	let mut previous_text = false;

	for content in contents {
		match content {
			LaidContent::Text(text) => {
				if text.is_empty() {
					return Err(TagdownError::EmptyText(owner.to_string()));
				}

				if previous_text {
					return Err(TagdownError::AdjacentText(owner.to_string()));
				}

				previous_text = true;
			}
			LaidContent::Tag(tag) => {
				validate_tag(tag)?;
				previous_text = false;
			}
		}
	}

	Ok(())
}
