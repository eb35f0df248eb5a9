//! Canonical re-indentation of XML text

use tracing::instrument;

use crate::error::Result;
use crate::xml::parser::Parser;
use crate::xml::printer::{FormatConfig, Printer};

/// Re-parse `input` and print it with one tab per level
///
/// Idempotent: formatting already formatted text returns it unchanged.
#[instrument(level = "debug", skip_all, fields(len = input.len()))]
pub fn format(input: &str) -> Result<String> {
    format_with_config(input, FormatConfig::default())
}

/// Re-parse `input` and print it with custom indentation
pub fn format_with_config(input: &str, config: FormatConfig) -> Result<String> {
    let doc = Parser::new(input.as_bytes()).parse()?;
    Ok(Printer::new(config).print(&doc))
}
