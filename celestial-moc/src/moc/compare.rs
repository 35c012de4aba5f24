//! The ancestor / exact / descendant traversal shared by containment,
//! removal and intersection.
//!
//! [`compare`] always visits in the same order: coarser orders holding an
//! ancestor of the cell, then the cell itself, then (optionally) finer orders
//! holding descendants. What happens at each hit, and whether the traversal
//! stops, is decided by the [`Comparison`] implementation.

use super::{Orders, MAX_ORDER};
use std::ops::ControlFlow;

/// Cells collected by an intersection, grouped by order.
pub(crate) type Matches = Vec<(u8, Vec<u64>)>;

pub(crate) trait Comparison {
    type Output;

    fn orders(&self) -> &Orders;

    fn ancestor(
        &mut self,
        order: u8,
        ancestor: u64,
        cell_order: u8,
        cell: u64,
    ) -> ControlFlow<Self::Output>;

    fn exact(&mut self, order: u8, cell: u64) -> ControlFlow<Self::Output>;

    fn descendants(&mut self, order: u8, cells: Vec<u64>) -> ControlFlow<Self::Output>;

    fn finish(self) -> Self::Output;
}

pub(crate) fn compare<C: Comparison>(
    mut cmp: C,
    order: u8,
    cell: u64,
    include_finer: bool,
) -> C::Output {
    for coarser in 0..order {
        let ancestor = cell >> (2 * (order - coarser));
        if cmp.orders()[coarser as usize].contains(&ancestor) {
            if let ControlFlow::Break(out) = cmp.ancestor(coarser, ancestor, order, cell) {
                return out;
            }
        }
    }

    if cmp.orders()[order as usize].contains(&cell) {
        if let ControlFlow::Break(out) = cmp.exact(order, cell) {
            return out;
        }
    }

    if include_finer {
        for finer in (order + 1)..=MAX_ORDER {
            let shift = 2 * (finer - order) as u32;
            let first = cell << shift;
            let last = ((cell + 1) << shift) - 1;
            let found: Vec<u64> = cmp.orders()[finer as usize]
                .range(first..=last)
                .copied()
                .collect();
            if found.is_empty() {
                continue;
            }
            if let ControlFlow::Break(out) = cmp.descendants(finer, found) {
                return out;
            }
        }
    }

    cmp.finish()
}

/// Stops at the first hit.
pub(crate) struct Check<'a> {
    orders: &'a Orders,
}

impl<'a> Check<'a> {
    pub(crate) fn new(orders: &'a Orders) -> Self {
        Self { orders }
    }
}

impl Comparison for Check<'_> {
    type Output = bool;

    fn orders(&self) -> &Orders {
        self.orders
    }

    fn ancestor(&mut self, _: u8, _: u64, _: u8, _: u64) -> ControlFlow<bool> {
        ControlFlow::Break(true)
    }

    fn exact(&mut self, _: u8, _: u64) -> ControlFlow<bool> {
        ControlFlow::Break(true)
    }

    fn descendants(&mut self, _: u8, _: Vec<u64>) -> ControlFlow<bool> {
        ControlFlow::Break(true)
    }

    fn finish(self) -> bool {
        false
    }
}

/// Deletes every hit. An ancestor is split into its four children so that
/// the scan of the next order can split again, until the exact cell is
/// reached and removed.
pub(crate) struct Remove<'a> {
    orders: &'a mut Orders,
}

impl<'a> Remove<'a> {
    pub(crate) fn new(orders: &'a mut Orders) -> Self {
        Self { orders }
    }
}

impl Comparison for Remove<'_> {
    type Output = ();

    fn orders(&self) -> &Orders {
        &*self.orders
    }

    fn ancestor(&mut self, order: u8, ancestor: u64, _: u8, _: u64) -> ControlFlow<()> {
        self.orders[order as usize].remove(&ancestor);
        let first_child = ancestor << 2;
        self.orders[order as usize + 1].extend(first_child..first_child + 4);
        ControlFlow::Continue(())
    }

    fn exact(&mut self, order: u8, cell: u64) -> ControlFlow<()> {
        self.orders[order as usize].remove(&cell);
        ControlFlow::Continue(())
    }

    fn descendants(&mut self, order: u8, cells: Vec<u64>) -> ControlFlow<()> {
        let level = &mut self.orders[order as usize];
        for cell in cells {
            level.remove(&cell);
        }
        ControlFlow::Continue(())
    }

    fn finish(self) {}
}

/// Collects the overlap with one cell. An ancestor or exact hit means the
/// whole cell is covered, so the traversal stops there.
pub(crate) struct Intersect<'a> {
    orders: &'a Orders,
    found: Matches,
}

impl<'a> Intersect<'a> {
    pub(crate) fn new(orders: &'a Orders) -> Self {
        Self {
            orders,
            found: Vec::new(),
        }
    }
}

impl Comparison for Intersect<'_> {
    type Output = Matches;

    fn orders(&self) -> &Orders {
        self.orders
    }

    fn ancestor(&mut self, _: u8, _: u64, cell_order: u8, cell: u64) -> ControlFlow<Matches> {
        ControlFlow::Break(vec![(cell_order, vec![cell])])
    }

    fn exact(&mut self, order: u8, cell: u64) -> ControlFlow<Matches> {
        ControlFlow::Break(vec![(order, vec![cell])])
    }

    fn descendants(&mut self, order: u8, cells: Vec<u64>) -> ControlFlow<Matches> {
        self.found.push((order, cells));
        ControlFlow::Continue(())
    }

    fn finish(self) -> Matches {
        self.found
    }
}
