use crate::Content;
use crate::Tag;

pub(crate) fn atom() -> Tag {
	Tag::new("a")
}

pub(crate) fn brace_with_structural_text() -> Tag {
	Tag::new("a").with_text("x}y{z}lala")
}

pub(crate) fn three_backslashes() -> Tag {
	Tag::new("p").with_text("\\\\\\")
}

pub(crate) fn three_attributes() -> Tag {
	Tag::new("item")
		.with_attribute(Tag::new("x"))
		.with_attribute(Tag::new("y"))
		.with_attribute(Tag::new("z"))
}

pub(crate) fn two_lines() -> Tag {
	Tag::new("p").with_text("a\nb")
}

pub(crate) fn link() -> Tag {
	Tag::new("link")
		.with_attribute(Tag::new("href").with_text("https://example.com"))
		.with_text("docs")
}

pub(crate) fn unbalanced_literal() -> Tag {
	Tag::new("code").literal().with_text("a {b")
}

pub(crate) fn section() -> Tag {
	Tag::new("section")
		.with_attribute(Tag::new("title").with_text("Usage"))
		.with_attribute(Tag::new("id").with_text("usage"))
		.with_attribute(Tag::new("draft"))
		.with_text("Run it.\nThen read ")
		.with_tag(link())
		.with_text(".")
}

/// Three blocks that all end on the same dedent.
pub(crate) fn nested_blocks() -> Vec<Content> {
	vec![
		Content::Tag(
			Tag::new("a").with_tag(
				Tag::new("b").with_tag(Tag::new("c").with_text("deep\ntext")),
			),
		),
		Content::text("after"),
	]
}

/// A document touching every layout the printer chooses.
pub(crate) fn document() -> Vec<Content> {
	vec![
		Content::text("Intro with "),
		Content::Tag(Tag::new("em").with_text("emphasis")),
		Content::text(" and a price of 5$ \n"),
		Content::Tag(section()),
		Content::text("\n  indented tail"),
		Content::Tag(Tag::new("note").with_tag(unbalanced_literal())),
		Content::Tag(Tag::new("hr").quoted()),
	]
}
