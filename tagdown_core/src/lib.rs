//! `tagdown_core` reads and writes tagdown, a plain-text markup language built
//! from nested tags embedded in free text.
//!
//! ```text
//! A paragraph with {em: emphasis} and a {link{@href: https://example.com}: link}.
//! {note=} A tag that runs to the end of its line.
//! {section=}
//!   {@title: Details}
//!   : Indented contents, one level deeper.
//!   More of the same section.
//! ```
//!
//! ## Processing Pipeline
//!
//! ```text
//! Text
//!   → Parser (scope state machine per open tag, indentation probing, fail-soft recovery)
//!   → Vec<Content> (tags and text segments)
//!   → Printer (prepare → layout → validate → escape → emit)
//!   → Text
//! ```
//!
//! Printing is canonical: parsing the printed text and printing the result
//! again reproduces the same text.
//!
//! ## Layouts
//!
//! Every tag is printed in one of five layouts, chosen from its shape:
//!
//! - `Atom`: `{name}`, no contents.
//! - `Brace`: `{name: contents}`, contents on a single line.
//! - `Line`: `{name=} contents`, contents to the end of the line.
//! - `Indent`: `{name=}` with attributes one per line and contents introduced
//!   by a `:` marker, all one level deeper.
//! - `End`: like `Indent` with a `--` marker line. Accepted by the parser; the
//!   printer does not choose it.
//!
//! ## Escaping
//!
//! `\` followed by any character other than a newline stands for that
//! character. A `$` ends the significant text of a line so trailing spaces
//! survive.
//!
//! ## Quick Start
//!
//! ```rust
//! use tagdown_core::{Content, Tag, parse_contents, print_contents};
//!
//! let contents = vec![
//! 	Content::text("Hello "),
//! 	Content::Tag(Tag::new("em").with_text("world")),
//! ];
//!
//! let text = print_contents(&contents).unwrap();
//! assert_eq!(text, "Hello {em: world}");
//! assert_eq!(parse_contents(&text).unwrap(), contents);
//! ```

pub use config::*;
pub use error::*;
pub use layout::Layout;
pub use parser::*;
pub use printer::*;
pub use tag::*;
pub use validate::is_valid_name;

pub mod config;
pub(crate) mod cursor;
#[allow(unused_assignments)]
mod error;
pub(crate) mod escape;
pub(crate) mod layout;
mod parser;
mod printer;
mod tag;
pub(crate) mod validate;

#[cfg(test)]
mod __fixtures;
#[cfg(test)]
mod __tests;
