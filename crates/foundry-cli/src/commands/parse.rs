//! Parse command implementation.

use super::read_input;
use crate::cli::ParseArgs;
use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::output::Formatter;
use foundry_extractor::{classify, ReplyParser, ReplyShape};

/// Execute the parse command.
///
/// Runs the reply parser on saved model output, without any network call.
pub fn execute_parse(args: ParseArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let raw = read_input(args.file.as_deref(), args.stdin)?;

    if formatter.format() == OutputFormat::Table {
        let shape = shape_name(&classify(&raw));
        eprintln!("{}", formatter.info(&format!("Reply shape: {}", shape)));
    }

    let parser = ReplyParser::new(config.extractor.inferred_title_max_chars);
    let candidates = parser.parse_reply(&raw);
    println!("{}", formatter.format_candidates(&candidates)?);
    Ok(())
}

fn shape_name(shape: &ReplyShape) -> &'static str {
    match shape {
        ReplyShape::Skip => "skip",
        ReplyShape::JsonArray(_) => "json array",
        ReplyShape::JsonObject(_) => "json object",
        ReplyShape::FencedJsonObject(_) => "fenced json object",
        ReplyShape::LabelLines => "label lines",
    }
}
