//! The [`Moc`] value type.
//!
//! A MOC stores one ordered set of HEALPix nested-scheme cell indices per
//! order, `0..=MAX_ORDER`. Cells at different orders may overlap until the
//! MOC is normalized; see [`Moc::normalize`].
//!
//! ```
//! use celestial_moc::Moc;
//!
//! let mut moc = Moc::with_cells(2, [16, 17, 18, 19])?;
//! assert!(!moc.is_normalized());
//!
//! moc.normalize();
//! assert_eq!(moc.order(), 1);
//! assert!(moc.cells_at(1)?.contains(&4));
//! # Ok::<(), celestial_moc::MocError>(())
//! ```

mod algebra;
mod compare;
mod flatten;
mod kind;
mod normalize;
pub mod validate;

pub use kind::MocType;

use crate::error::MocResult;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::f64::consts::PI;
use std::fmt;
use validate::{check_cell, check_order};

/// Highest supported HEALPix order (nside = 2^29).
pub const MAX_ORDER: u8 = 29;

const ORDER_COUNT: usize = MAX_ORDER as usize + 1;

pub(crate) type Orders = [BTreeSet<u64>; ORDER_COUNT];

const SQ_DEG_PER_SR: f64 = (180.0 / PI) * (180.0 / PI);

/// A Multi-Order Coverage map.
///
/// Metadata fields are free-form and do not take part in equality. The
/// source type is validated, so it is only reachable through
/// [`Moc::set_type`] and [`Moc::set_moc_type`].
#[derive(Debug, Clone)]
pub struct Moc {
    orders: Orders,
    normalized: bool,
    pub id: Option<String>,
    pub name: Option<String>,
    pub origin: Option<String>,
    moc_type: Option<MocType>,
}

impl Default for Moc {
    fn default() -> Self {
        Self {
            orders: std::array::from_fn(|_| BTreeSet::new()),
            normalized: true,
            id: None,
            name: None,
            origin: None,
            moc_type: None,
        }
    }
}

impl Moc {
    /// An empty, normalized MOC.
    pub fn new() -> Self {
        Self::default()
    }

    /// A MOC holding `cells` at `order`.
    pub fn with_cells(order: u8, cells: impl IntoIterator<Item = u64>) -> MocResult<Self> {
        let mut moc = Self::new();
        moc.add(order, cells)?;
        Ok(moc)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn with_type(mut self, moc_type: MocType) -> Self {
        self.moc_type = Some(moc_type);
        self
    }

    pub fn moc_type(&self) -> Option<MocType> {
        self.moc_type
    }

    /// Sets the source type from a case-insensitive `IMAGE` / `CATALOG`
    /// token, or clears it.
    pub fn set_type(&mut self, value: Option<&str>) -> MocResult<()> {
        self.moc_type = value.map(str::parse).transpose()?;
        Ok(())
    }

    pub fn set_moc_type(&mut self, moc_type: Option<MocType>) {
        self.moc_type = moc_type;
    }

    /// Highest order holding at least one cell, or 0 when empty.
    pub fn order(&self) -> u8 {
        (1..=MAX_ORDER)
            .rev()
            .find(|&order| !self.orders[order as usize].is_empty())
            .unwrap_or(0)
    }

    /// Total number of stored cells across all orders.
    pub fn cells(&self) -> usize {
        self.orders.iter().map(BTreeSet::len).sum()
    }

    /// Number of orders holding at least one cell.
    pub fn len(&self) -> usize {
        self.orders.iter().filter(|cells| !cells.is_empty()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.iter().all(BTreeSet::is_empty)
    }

    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    pub fn cells_at(&self, order: u8) -> MocResult<&BTreeSet<u64>> {
        check_order(order)?;
        Ok(&self.orders[order as usize])
    }

    /// Non-empty orders in ascending order, with their cells.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &BTreeSet<u64>)> + '_ {
        self.orders
            .iter()
            .enumerate()
            .filter(|(_, cells)| !cells.is_empty())
            .map(|(order, cells)| (order as u8, cells))
    }

    /// Adds cells at `order`.
    ///
    /// Every cell is validated before any is inserted. The normalized flag
    /// is cleared on every successful call, even when nothing new was added.
    pub fn add(&mut self, order: u8, cells: impl IntoIterator<Item = u64>) -> MocResult<()> {
        check_order(order)?;
        let cells = cells
            .into_iter()
            .map(|cell| check_cell(order, cell))
            .collect::<MocResult<Vec<_>>>()?;
        self.insert_cells(order, cells);
        Ok(())
    }

    /// Adds cells at `order` without range-checking them.
    ///
    /// Only the order is validated. Use this for cells that come from a
    /// trusted source; out-of-range cells are stored as given.
    pub fn add_unchecked(
        &mut self,
        order: u8,
        cells: impl IntoIterator<Item = u64>,
    ) -> MocResult<()> {
        check_order(order)?;
        self.insert_cells(order, cells);
        Ok(())
    }

    pub(crate) fn insert_cells(&mut self, order: u8, cells: impl IntoIterator<Item = u64>) {
        self.normalized = false;
        self.orders[order as usize].extend(cells);
    }

    /// Removes the area covered by `cells` at `order`.
    ///
    /// Coarser cells covering a removed cell are split so that only the
    /// requested area goes; finer cells inside it are dropped.
    pub fn remove(&mut self, order: u8, cells: impl IntoIterator<Item = u64>) -> MocResult<()> {
        check_order(order)?;
        let cells = cells
            .into_iter()
            .map(|cell| check_cell(order, cell))
            .collect::<MocResult<Vec<_>>>()?;
        self.normalized = false;
        for cell in cells {
            compare::compare(compare::Remove::new(&mut self.orders), order, cell, true);
        }
        Ok(())
    }

    /// Whether `cell` at `order` is covered by a stored cell at the same or
    /// a coarser order, or (with `include_finer`) contains a finer one.
    pub fn contains(&self, order: u8, cell: u64, include_finer: bool) -> MocResult<bool> {
        check_order(order)?;
        check_cell(order, cell)?;
        Ok(compare::compare(
            compare::Check::new(&self.orders),
            order,
            cell,
            include_finer,
        ))
    }

    /// Removes all cells, keeping metadata.
    pub fn clear(&mut self) {
        self.orders.iter_mut().for_each(BTreeSet::clear);
        self.normalized = true;
    }

    /// Borrowed when already normalized, otherwise a normalized copy.
    pub fn normalized_view(&self) -> Cow<'_, Moc> {
        if self.normalized {
            Cow::Borrowed(self)
        } else {
            let mut copy = self.clone();
            copy.normalize();
            Cow::Owned(copy)
        }
    }

    /// Covered area in steradians, computed on the normalized form.
    pub fn area(&self) -> f64 {
        self.normalized_view()
            .iter()
            .map(|(order, cells)| cells.len() as f64 * cell_area(order))
            .sum()
    }

    pub fn area_sq_deg(&self) -> f64 {
        self.area() * SQ_DEG_PER_SR
    }
}

/// Area of one cell at `order` in steradians: `4π / (12 · 4^order)`.
fn cell_area(order: u8) -> f64 {
    PI / (3.0 * libm::ldexp(1.0, 2 * order as i32))
}

impl PartialEq for Moc {
    fn eq(&self, other: &Self) -> bool {
        self.normalized_view().orders == other.normalized_view().orders
    }
}

impl Eq for Moc {}

impl<'a> IntoIterator for &'a Moc {
    type Item = (u8, &'a BTreeSet<u64>);
    type IntoIter = Box<dyn Iterator<Item = (u8, &'a BTreeSet<u64>)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl fmt::Display for Moc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::io::ascii::format_ascii(self))
    }
}
