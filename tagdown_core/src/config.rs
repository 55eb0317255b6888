use serde::Deserialize;
use serde::Serialize;

use crate::TagdownError;
use crate::TagdownResult;

/// Configuration an embedding application keeps for tagdown, usually as a
/// section of its own TOML file.
///
/// ```toml
/// [print]
/// indent = "tab"
/// final_newline = true
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct TagdownConfig {
	/// Printer settings.
	#[serde(default)]
	pub print: PrintConfig,
}

/// The `[print]` section. Missing keys keep the printer defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PrintConfig {
	#[serde(default)]
	pub indent: Option<IndentStyle>,
	#[serde(default)]
	pub final_newline: Option<bool>,
}

/// What one level of block indentation is written as.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IndentStyle {
	/// Two spaces.
	#[default]
	Spaces,
	/// One tab.
	Tab,
}

impl IndentStyle {
	pub fn unit(self) -> &'static str {
		match self {
			Self::Spaces => "  ",
			Self::Tab => "\t",
		}
	}
}

impl TagdownConfig {
	/// Parse a config from TOML text.
	pub fn from_toml_str(content: &str) -> TagdownResult<Self> {
		toml::from_str(content).map_err(|e| TagdownError::ConfigParse(e.to_string()))
	}
}

/// Options controlling how contents are printed.
///
/// Use [`PrintOptions::default()`] for the canonical output or
/// [`PrintOptions::from_config`] to construct from a [`TagdownConfig`]. The
/// parser accepts the output of every combination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrintOptions {
	/// Indentation unit for nested blocks.
	pub indent: IndentStyle,
	/// End non-empty output with a newline.
	pub final_newline: bool,
}

impl PrintOptions {
	/// Construct [`PrintOptions`] from a [`TagdownConfig`].
	pub fn from_config(config: Option<&TagdownConfig>) -> Self {
		let defaults = Self::default();

		Self {
			indent: config
				.and_then(|c| c.print.indent)
				.unwrap_or(defaults.indent),
			final_newline: config
				.and_then(|c| c.print.final_newline)
				.unwrap_or(defaults.final_newline),
		}
	}
}
