//! Canonical JSON: `{"order":[cells],...}`.
//!
//! The writer always works from the normalized form and emits keys in
//! lexicographic order with no whitespace, so equal MOCs serialize to the
//! same bytes.

use crate::error::{MocError, MocResult, ValueErrorKind};
use crate::moc::validate::{check_cell, parse_cell, parse_order, signed_cell};
use crate::moc::Moc;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::{Read, Write};

pub fn write_moc_json<W: Write>(moc: &Moc, writer: &mut W) -> MocResult<()> {
    let normalized = moc.normalized_view();
    let document: BTreeMap<String, Vec<u64>> = normalized
        .iter()
        .map(|(order, cells)| (order.to_string(), cells.iter().copied().collect()))
        .collect();
    serde_json::to_writer(writer, &document)?;
    Ok(())
}

pub fn read_moc_json<R: Read>(moc: &mut Moc, reader: R) -> MocResult<()> {
    let document: Value = serde_json::from_reader(reader)?;
    let object = match document {
        Value::Object(object) => object,
        other => return Err(MocError::type_mismatch("object", value_kind(&other))),
    };

    let mut parsed = Vec::with_capacity(object.len());
    for (key, value) in &object {
        let order = parse_order(key)?;
        let items = value
            .as_array()
            .ok_or_else(|| MocError::type_mismatch("array", value_kind(value)))?;
        let cells = items
            .iter()
            .map(|item| json_cell(order, item))
            .collect::<MocResult<Vec<_>>>()?;
        parsed.push((order, cells));
    }

    for (order, cells) in parsed {
        moc.insert_cells(order, cells);
    }
    Ok(())
}

fn json_cell(order: u8, item: &Value) -> MocResult<u64> {
    match item {
        Value::Number(number) => {
            if let Some(cell) = number.as_u64() {
                check_cell(order, cell)
            } else if let Some(cell) = number.as_i64() {
                signed_cell(order, cell as i128)
            } else {
                Err(not_an_integer(order, item))
            }
        }
        Value::String(text) => parse_cell(order, text),
        _ => Err(not_an_integer(order, item)),
    }
}

fn not_an_integer(order: u8, item: &Value) -> MocError {
    MocError::invalid_cell(
        order,
        item,
        ValueErrorKind::NotConvertible,
        "MOC cell must be convertible to an integer",
    )
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
