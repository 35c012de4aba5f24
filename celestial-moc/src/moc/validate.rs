//! Order and cell validation.
//!
//! Numeric inputs only need a range check. Text inputs (codecs, the tool's
//! argument stream) are parsed first and report
//! [`ValueErrorKind::NotConvertible`] when the text is not an integer.

use super::MAX_ORDER;
use crate::error::{MocError, MocResult, ValueErrorKind};

/// Number of cells at `order`: `12 * 4^order`.
#[inline]
pub const fn order_num_cells(order: u8) -> u64 {
    12u64 << (2 * order as u32)
}

pub fn check_order(order: u8) -> MocResult<u8> {
    if order > MAX_ORDER {
        return Err(MocError::invalid_order(
            order,
            ValueErrorKind::OutOfRange,
            "MOC order must be in range 0-29",
        ));
    }
    Ok(order)
}

pub fn check_cell(order: u8, cell: u64) -> MocResult<u64> {
    let max_cells = order_num_cells(order);
    if cell >= max_cells {
        return Err(MocError::invalid_cell(
            order,
            cell,
            ValueErrorKind::OutOfRange,
            &format!("must be in range 0-{}", max_cells - 1),
        ));
    }
    Ok(cell)
}

pub fn parse_order(text: &str) -> MocResult<u8> {
    let value: i64 = text.trim().parse().map_err(|_| {
        MocError::invalid_order(
            text,
            ValueErrorKind::NotConvertible,
            "MOC order must be convertible to an integer",
        )
    })?;
    if !(0..=MAX_ORDER as i64).contains(&value) {
        return Err(MocError::invalid_order(
            value,
            ValueErrorKind::OutOfRange,
            "MOC order must be in range 0-29",
        ));
    }
    Ok(value as u8)
}

pub fn parse_cell(order: u8, text: &str) -> MocResult<u64> {
    let value: i128 = text.trim().parse().map_err(|_| {
        MocError::invalid_cell(
            order,
            text,
            ValueErrorKind::NotConvertible,
            "MOC cell must be convertible to an integer",
        )
    })?;
    signed_cell(order, value)
}

/// Range-checks a signed value, so negative input is reported as out of range
/// rather than as a conversion failure.
pub fn signed_cell(order: u8, value: i128) -> MocResult<u64> {
    if value < 0 || value >= order_num_cells(order) as i128 {
        return Err(MocError::invalid_cell(
            order,
            value,
            ValueErrorKind::OutOfRange,
            &format!("must be in range 0-{}", order_num_cells(order) - 1),
        ));
    }
    Ok(value as u64)
}
