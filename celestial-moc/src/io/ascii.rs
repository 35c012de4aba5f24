//! Range text: `order/ranges` tokens separated by spaces.
//!
//! ```text
//! 1/1,3,4 2/4,12-14,21,25
//! ```
//!
//! Runs of three or more consecutive cells are written as `a-b`; a run of
//! two is written as `a,b`. The writer emits the cells as stored, so an
//! un-normalized MOC keeps its overlapping cells.

use crate::error::{MocError, MocResult};
use crate::moc::validate::{parse_cell, parse_order};
use crate::moc::Moc;
use std::collections::BTreeSet;
use std::io::{Read, Write};
use tracing::debug;

pub fn format_ascii(moc: &Moc) -> String {
    moc.iter()
        .map(|(order, cells)| format!("{}/{}", order, format_ranges(cells)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_ranges(cells: &BTreeSet<u64>) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut iter = cells.iter().copied().peekable();

    while let Some(first) = iter.next() {
        let mut last = first;
        while iter.peek() == Some(&(last + 1)) {
            last += 1;
            iter.next();
        }
        match last - first {
            0 => parts.push(first.to_string()),
            1 => {
                parts.push(first.to_string());
                parts.push(last.to_string());
            }
            _ => parts.push(format!("{}-{}", first, last)),
        }
    }

    parts.join(",")
}

pub fn write_moc_ascii<W: Write>(moc: &Moc, writer: &mut W) -> MocResult<()> {
    writer.write_all(format_ascii(moc).as_bytes())?;
    Ok(())
}

/// Reads range text from `reader` and adds its cells to `moc`.
///
/// Nothing is added unless the whole stream parses.
pub fn read_moc_ascii<R: Read>(moc: &mut Moc, mut reader: R) -> MocResult<()> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse_ascii(moc, &text)
}

pub fn parse_ascii(moc: &mut Moc, text: &str) -> MocResult<()> {
    let mut parsed = Vec::new();

    for token in text.split_whitespace() {
        let (order, ranges) = token.split_once('/').ok_or_else(|| {
            MocError::parse("ascii", format!("expected 'order/cells', found '{}'", token))
        })?;
        let order = parse_order(order)?;

        let mut cells = Vec::new();
        for part in ranges.split(',') {
            if part.is_empty() {
                if ranges.is_empty() {
                    continue;
                }
                return Err(MocError::parse(
                    "ascii",
                    format!("empty cell entry in '{}'", token),
                ));
            }
            match split_range(part) {
                Some((first, last)) => {
                    let first = parse_cell(order, first)?;
                    let last = parse_cell(order, last)?;
                    cells.extend(first..=last);
                }
                None => cells.push(parse_cell(order, part)?),
            }
        }

        parsed.push((order, cells));
    }

    debug!(orders = parsed.len(), "parsed range text");
    for (order, cells) in parsed {
        if !cells.is_empty() {
            moc.insert_cells(order, cells);
        }
    }
    Ok(())
}

/// Splits `a-b`, leaving a leading sign on a single value alone.
fn split_range(part: &str) -> Option<(&str, &str)> {
    let dash = part.get(1..)?.find('-')? + 1;
    Some((&part[..dash], &part[dash + 1..]))
}
