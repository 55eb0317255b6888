use rstest::rstest;
use similar_asserts::assert_eq;
use tracing_test::traced_test;

use super::__fixtures::*;
use super::*;

fn text(value: &str) -> Content {
	Content::text(value)
}

fn tag(value: Tag) -> Content {
	Content::Tag(value)
}

#[rstest]
#[case::atom("{a}", vec![tag(atom())])]
#[case::brace_with_escapes(r"{a: x\}y\{z\}lala}", vec![tag(brace_with_structural_text())])]
#[case::brace_with_child(
	"{a: x {b: y} z}",
	vec![tag(Tag::new("a").with_text("x ").with_tag(Tag::new("b").with_text("y")).with_text(" z"))]
)]
#[case::inline_attribute("{link{@href: https://example.com}: docs}", vec![tag(link())])]
#[case::line("{note=} hello\nworld", vec![tag(Tag::new("note").with_text("hello")), text("world")])]
#[case::indent(
	"{s=}\n  : one\n  two\nafter",
	vec![tag(Tag::new("s").with_text("one\ntwo")), text("after")]
)]
#[case::end_marker("{s=}\n  --\n  one\n  two", vec![tag(Tag::new("s").with_text("one\ntwo"))])]
#[case::block_attributes(
	"{s=}\n  {@title: T}\n  {@id}\n  : body",
	vec![tag(
		Tag::new("s")
			.with_attribute(Tag::new("title").with_text("T"))
			.with_attribute(Tag::new("id"))
			.with_text("body")
	)]
)]
#[case::contentless_indent("{item=}\n  {@x}\n  {@y}\n  {@z}\nnext", vec![tag(three_attributes()), text("next")])]
#[case::quoted("{'q}", vec![tag(Tag::new("q").quoted())])]
#[case::literal_brace(r"{code': a {b} \c}", vec![tag(Tag::new("code").literal().with_text(r"a {b} \c"))])]
#[case::literal_line("{code'=} {{ raw", vec![tag(Tag::new("code").literal().with_text("{{ raw"))])]
#[case::unfinished_tag("{not a tag", vec![text("{not a tag")])]
#[case::attribute_marker_in_contents("{@x}", vec![text("{@x}")])]
#[case::literal_atom("{a'}", vec![text("{a'}")])]
#[case::dollar_marker("x  $\ny", vec![text("x  \ny")])]
#[case::trailing_whitespace("x  \ny", vec![text("x\ny")])]
#[case::escaped_dollar(r"cost \$", vec![text("cost $")])]
#[case::backslash_before_newline("a\\\nb", vec![text("a\\\nb")])]
#[case::blank_line_in_block(
	"{s=}\n  : one\n\n  two",
	vec![tag(Tag::new("s").with_text("one\n\ntwo"))]
)]
#[case::tab_indentation("{s=}\n\t: one\n\ttwo", vec![tag(Tag::new("s").with_text("one\ntwo"))])]
#[case::trailing_blank_lines("{a}\n\n  \n", vec![tag(atom())])]
#[case::line_without_contents("{a=}\nnext", vec![tag(Tag::new("a")), text("next")])]
#[case::empty_literal_brace("{a':}", vec![text("{a':}")])]
#[case::empty_literal_brace_with_space("{a': }", vec![text("{a': }")])]
#[case::empty_literal_line("{a'=}", vec![text("{a'=}")])]
#[case::empty_literal_block("{a'=}\n  :\nnext", vec![text("{a'=}\n  :\nnext")])]
fn parses_contents(#[case] input: &str, #[case] expected: Vec<Content>) -> TagdownResult<()> {
	let contents = parse_contents(input)?;
	assert_eq!(contents, expected);

	Ok(())
}

#[test]
fn closes_every_block_on_one_dedent() -> TagdownResult<()> {
	let input = "{a=}\n  : {b=}\n    : {c=}\n      : deep\n      text\nafter";
	let contents = parse_contents(input)?;
	assert_eq!(contents, nested_blocks());

	Ok(())
}

#[test]
fn parse_tag_requires_a_single_tag() -> TagdownResult<()> {
	assert_eq!(parse_tag("{a}")?, Some(atom()));
	assert_eq!(parse_tag("{a} tail")?, None);
	assert_eq!(parse_tag("plain")?, None);
	assert_eq!(parse_tag("")?, None);

	Ok(())
}

#[test]
fn parsed_attributes_are_marked() -> TagdownResult<()> {
	let Some(parsed) = parse_tag("{s=}\n  {@a{@b}: x}\n  {@c}\n  : body")? else {
		panic!("expected a tag");
	};

	assert!(!parsed.is_attribute);
	assert!(parsed.attributes.iter().all(|a| a.is_attribute));
	assert!(parsed.attributes[0].attributes[0].is_attribute);

	Ok(())
}

#[test]
fn reports_degraded_tags() -> TagdownResult<()> {
	let (contents, diagnostics) = parse_with_diagnostics("a {b\nc {d}")?;

	assert_eq!(contents, vec![text("a {b\nc "), tag(Tag::new("d"))]);
	assert_eq!(
		diagnostics,
		vec![ParseDiagnostic::DegradedTag {
			offset: 2,
			line: 1,
			column: 3,
		}]
	);

	Ok(())
}

#[test]
fn locates_degraded_tags_by_line_and_column() -> TagdownResult<()> {
	let (_, diagnostics) = parse_with_diagnostics("a {\nbé {\n{")?;

	assert_eq!(diagnostics, vec![
		ParseDiagnostic::DegradedTag {
			offset: 2,
			line: 1,
			column: 3,
		},
		ParseDiagnostic::DegradedTag {
			offset: 8,
			line: 2,
			column: 4,
		},
		ParseDiagnostic::DegradedTag {
			offset: 10,
			line: 3,
			column: 1,
		},
	]);

	Ok(())
}

#[rstest]
#[case::brace("{a: ")]
#[case::literal_brace("{a': ")]
#[case::brace_with_attribute("{a{@b: ")]
fn unclosed_openers_stay_text(#[case] opener: &str) -> TagdownResult<()> {
	let input = opener.repeat(200);
	let contents = parse_contents(&input)?;
	assert_eq!(contents, vec![text(input.trim_end())]);

	Ok(())
}

#[test]
fn failed_outer_tag_discards_inner_diagnostics() -> TagdownResult<()> {
	let (contents, diagnostics) = parse_with_diagnostics("{a: {x")?;
	let offsets: Vec<usize> = diagnostics
		.iter()
		.map(|diagnostic| {
			match diagnostic {
				ParseDiagnostic::DegradedTag { offset, .. } => *offset,
			}
		})
		.collect();

	assert_eq!(contents, vec![text("{a: {x")]);
	assert_eq!(offsets, vec![0, 4]);

	Ok(())
}

#[rstest]
#[case::atom(vec![tag(atom())], "{a}")]
#[case::brace_with_escapes(vec![tag(brace_with_structural_text())], r"{a: x\}y\{z\}lala}")]
#[case::three_backslashes(vec![tag(three_backslashes())], r"{p: \\\\\\}")]
#[case::three_attributes(vec![tag(three_attributes())], "{item=}\n  {@x}\n  {@y}\n  {@z}")]
#[case::two_lines(vec![tag(two_lines())], "{p=}\n  : a\n  b")]
#[case::unbalanced_literal(vec![tag(unbalanced_literal())], "{code'=} a {b")]
#[case::balanced_literal(vec![tag(Tag::new("code").literal().with_text("a {b}"))], "{code': a {b}}")]
#[case::literal_dollar(vec![tag(Tag::new("c").literal().with_text("{$"))], "{c'=} {$$")]
#[case::line_child(vec![tag(Tag::new("note").with_text("x ").with_tag(unbalanced_literal()))], "{note=} x {code'=} a {b")]
#[case::trailing_space(vec![text("x ")], "x $")]
#[case::trailing_dollar(vec![text("x$")], r"x\$")]
#[case::colon_after_brace(vec![text("{a: b")], r"\{a: b")]
#[case::closed_brace_before_colon(vec![text("{a} : b")], r"{a\} : b")]
#[case::backslash(vec![text(r"back\slash")], r"back\\slash")]
#[case::final_empty_line(vec![text("\n")], "\n$")]
#[case::padded_brace(vec![tag(Tag::new("p").with_text(" padded "))], "{p:  padded }")]
#[case::marker_after_contentless_block(
	vec![tag(three_attributes()), text(": x")],
	"{item=}\n  {@x}\n  {@y}\n  {@z}\n\\: x"
)]
#[case::space_after_block(vec![tag(two_lines()), text(" tail")], "{p=}\n  : a\n  b\n\\ tail")]
#[case::nested_blocks(nested_blocks(), "{a=}\n  : {b=}\n    : {c=}\n      : deep\n      text\nafter")]
#[case::block_attribute_demotion(
	vec![tag(section())],
	"{section=}\n  {@title=} Usage\n  {@id=} usage\n  {@draft}\n  : Run it.\n  Then read {link{@href: https://example.com}: docs}."
)]
fn prints_contents(#[case] contents: Vec<Content>, #[case] expected: &str) -> TagdownResult<()> {
	let printed = print_contents(&contents)?;
	assert_eq!(printed, expected);
	assert_eq!(parse_contents(&printed)?, contents);

	Ok(())
}

#[test]
fn prints_document() -> TagdownResult<()> {
	let contents = document();
	let printed = print_contents(&contents)?;

	assert_eq!(
		printed,
		"Intro with {em: emphasis} and a price of 5$ $\n{section=}\n  {@title=} Usage\n  {@id=} \
		 usage\n  {@draft}\n  : Run it.\n  Then read {link{@href: https://example.com}: \
		 docs}.\n\n\\  indented tail{note=} {code'=} a {b\n{'hr}"
	);
	assert_eq!(parse_contents(&printed)?, contents);
	assert_eq!(print_contents(&parse_contents(&printed)?)?, printed);

	Ok(())
}

#[test]
fn literal_block_keeps_its_text() -> TagdownResult<()> {
	let pre = Tag::new("pre").literal().with_text("fn main() {\n}\n");
	let printed = print_tag(&pre)?;

	insta::assert_snapshot!(printed.replace('\n', "⏎"), @"{pre'=}⏎  : fn main() {⏎  }⏎  $");

	let Some(parsed) = parse_tag(&printed)? else {
		panic!("expected a tag");
	};

	assert!(parsed.is_literal);
	assert_eq!(parsed.literal_text(), Some("fn main() {\n}\n"));

	Ok(())
}

#[test]
fn end_layout_prints_as_indent() -> TagdownResult<()> {
	let contents = parse_contents("{s=}\n  --\n  one")?;
	let printed = print_contents(&contents)?;

	insta::assert_snapshot!(printed.replace('\n', "⏎"), @"{s=}⏎  : one");

	Ok(())
}

#[test]
fn prepare_marks_attributes_by_position() -> TagdownResult<()> {
	let mut attribute = Tag::new("x");
	attribute.is_attribute = false;
	let mut outer = Tag::new("a");
	outer.attributes.push(attribute);
	outer.is_attribute = true;

	insta::assert_snapshot!(print_tag(&outer)?, @"{a{@x}}");

	Ok(())
}

#[rstest]
#[case::atom(atom(), Layout::Atom)]
#[case::brace(brace_with_structural_text(), Layout::Brace)]
#[case::three_attributes(three_attributes(), Layout::Indent)]
#[case::multi_line_text(two_lines(), Layout::Indent)]
#[case::unbalanced_literal(unbalanced_literal(), Layout::Line)]
#[case::line_child(Tag::new("note").with_tag(unbalanced_literal()), Layout::Line)]
#[case::line_child_before_text(
	Tag::new("note").with_tag(unbalanced_literal()).with_text("more"),
	Layout::Indent
)]
#[case::block_attribute(Tag::new("a").with_attribute(two_lines()), Layout::Indent)]
#[case::inline_attributes(link(), Layout::Brace)]
#[case::section(section(), Layout::Indent)]
fn chooses_layout(#[case] input: Tag, #[case] expected: Layout) -> TagdownResult<()> {
	assert_eq!(layout_of(&input)?, expected);

	Ok(())
}

#[test]
fn rejects_invalid_names() {
	for name in ["", "1a", "a  b", "a ", " a", "a-b", "é"] {
		let result = print_tag(&Tag::new(name));
		assert!(
			matches!(result, Err(TagdownError::InvalidName(ref invalid)) if invalid == name),
			"{name:?} should be rejected"
		);
	}

	assert!(is_valid_name("a b2 c"));
}

#[test]
fn rejects_invalid_literals() {
	let empty = print_tag(&Tag::new("code").literal());
	assert!(matches!(empty, Err(TagdownError::InvalidLiteral(_))));

	let nested = print_tag(&Tag::new("code").literal().with_tag(atom()));
	assert!(matches!(nested, Err(TagdownError::InvalidLiteral(_))));
}

#[test]
fn rejects_invalid_text_segments() {
	let adjacent = print_contents(&[text("a"), text("b")]);
	assert!(matches!(adjacent, Err(TagdownError::AdjacentText(_))));

	let empty = print_contents(&[text("")]);
	assert!(matches!(empty, Err(TagdownError::EmptyText(_))));

	let mut inner = Tag::new("p");
	inner.contents = vec![text("a"), text("b")];
	let nested = print_tag(&Tag::new("outer").with_tag(inner));
	assert!(matches!(nested, Err(TagdownError::AdjacentText(ref owner)) if owner == "p"));
}

#[test]
fn builder_merges_text() {
	let built = Tag::new("p").with_text("a").with_text("").with_text("b");
	assert_eq!(built.contents, vec![text("ab")]);
}

#[test]
fn prints_with_options() -> TagdownResult<()> {
	let options = PrintOptions {
		indent: IndentStyle::Tab,
		final_newline: true,
	};
	let contents = vec![tag(two_lines())];
	let printed = print_contents_with_options(&contents, &options)?;

	assert_eq!(printed, "{p=}\n\t: a\n\tb\n");
	assert_eq!(parse_contents(&printed)?, contents);
	assert_eq!(print_contents_with_options(&[], &options)?, "");

	Ok(())
}

#[test]
fn loads_print_options_from_toml() -> TagdownResult<()> {
	let config = TagdownConfig::from_toml_str("[print]\nindent = \"tab\"\nfinal_newline = true\n")?;
	let options = PrintOptions::from_config(Some(&config));

	assert_eq!(options, PrintOptions {
		indent: IndentStyle::Tab,
		final_newline: true,
	});

	Ok(())
}

#[test]
fn missing_print_section_uses_defaults() -> TagdownResult<()> {
	let config = TagdownConfig::from_toml_str("")?;

	assert_eq!(PrintOptions::from_config(Some(&config)), PrintOptions::default());
	assert_eq!(PrintOptions::from_config(None), PrintOptions::default());

	Ok(())
}

#[test]
fn invalid_config_is_reported() {
	let result = TagdownConfig::from_toml_str("[print]\nindent = \"wide\"\n");
	assert!(matches!(result, Err(TagdownError::ConfigParse(_))));
}

#[test]
#[traced_test]
fn logs_parse_and_print_summaries() {
	let contents = parse_contents("{a} {b").unwrap_or_default();
	let _ = print_contents(&contents);

	assert!(logs_contain("parsed contents"));
	assert!(logs_contain("kept `{` as text"));
	assert!(logs_contain("printed contents"));
}

#[test]
fn trees_serialize_for_hosts() -> Result<(), serde_json::Error> {
	let contents = vec![
		text("say "),
		tag(Tag::new("em")
			.with_attribute(Tag::new("lang").with_text("en"))
			.with_text("hi")),
	];
	let json = serde_json::to_string_pretty(&contents)?;

	insta::assert_snapshot!(json, @r#"
[
  "say ",
  {
    "is_quoted": false,
    "is_attribute": false,
    "name": "em",
    "attributes": [
      {
        "is_quoted": false,
        "is_attribute": true,
        "name": "lang",
        "attributes": [],
        "is_literal": false,
        "contents": [
          "en"
        ]
      }
    ],
    "is_literal": false,
    "contents": [
      "hi"
    ]
  }
]
"#);

	let restored: Vec<Content> = serde_json::from_str(&json)?;
	assert_eq!(restored, contents);

	let sparse: Vec<Content> = serde_json::from_str(r#"["x ", {"name": "a"}]"#)?;
	assert_eq!(sparse, vec![text("x "), tag(atom())]);
	assert_eq!(serde_json::to_string(&Layout::Indent)?, r#""indent""#);

	Ok(())
}
