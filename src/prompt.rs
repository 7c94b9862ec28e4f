//! Interactive filter selection.

use anyhow::{Context, Result};
use std::io::{BufRead, Write};

/// Splits a comma-separated filter list, trimming entries and dropping empty
/// ones. Repeated names are kept once, in first-seen order.
pub fn parse_filter_list(input: &str) -> Vec<String> {
    let mut filters: Vec<String> = Vec::new();
    for name in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !filters.iter().any(|f| f == name) {
            filters.push(name.to_string());
        }
    }
    filters
}

fn read_answer<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> Result<String> {
    write!(output, "{}", label)?;
    output.flush()?;
    let mut line = String::new();
    input
        .read_line(&mut line)
        .with_context(|| format!("Failed to read answer for {:?}", label.trim()))?;
    Ok(line.trim().to_string())
}

/// Asks for the main filter and the other filters. Returns the raw main
/// filter (possibly blank) and the parsed extra filters.
pub fn prompt_for_filters<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<(String, Vec<String>)> {
    writeln!(output, "Enter the main filter (e.g., roomsNo, type, zone):")?;
    let main_filter = read_answer(input, output, "Main filter: ")?;

    writeln!(
        output,
        "Enter other filters separated by commas (e.g., type,zone,surface,bathroomsNo,roomsNo,createdOn):"
    )?;
    let others = read_answer(input, output, "Other filters: ")?;

    Ok((main_filter, parse_filter_list(&others)))
}
