//! Reduction to canonical form.
//!
//! Orders are processed from the finest occupied order down to 1. Each cell
//! is first checked against every coarser order: a cell already covered by
//! an ancestor is dropped together with its siblings, without adding the
//! parent again. Only then are complete sibling groups merged into their
//! parent. Testing siblings first would re-add coverage that an ancestor
//! already holds.

use super::validate::check_order;
use super::{Moc, MAX_ORDER};
use crate::error::MocResult;
use std::collections::BTreeSet;

impl Moc {
    /// Normalizes in place without limiting the order.
    pub fn normalize(&mut self) {
        self.normalize_orders(MAX_ORDER);
    }

    /// Normalizes in place, coarsening every cell finer than `max_order`
    /// to its ancestor at `max_order`.
    pub fn normalize_to(&mut self, max_order: u8) -> MocResult<()> {
        check_order(max_order)?;
        self.normalize_orders(max_order);
        Ok(())
    }

    fn normalize_orders(&mut self, max_order: u8) {
        if self.normalized && max_order >= self.order() {
            return;
        }

        for order in (1..=self.order()).rev() {
            let level = order as usize;
            let mut pixels = std::mem::take(&mut self.orders[level]);
            let mut retained = BTreeSet::new();

            while let Some(pixel) = pixels.pop_first() {
                let already_contained = self.has_ancestor(order, pixel);

                let merge = already_contained
                    || order > max_order
                    || ((pixels.contains(&(pixel ^ 1)))
                        && pixels.contains(&(pixel ^ 2))
                        && pixels.contains(&(pixel ^ 3)));

                if merge {
                    pixels.remove(&(pixel ^ 1));
                    pixels.remove(&(pixel ^ 2));
                    pixels.remove(&(pixel ^ 3));

                    if !already_contained {
                        self.orders[level - 1].insert(pixel >> 2);
                    }
                } else {
                    retained.insert(pixel);
                }
            }

            self.orders[level] = retained;
        }

        self.normalized = true;
    }

    /// Whether any coarser order holds an ancestor of `cell`.
    fn has_ancestor(&self, order: u8, cell: u64) -> bool {
        let mut ancestor = cell;
        (0..order).rev().any(|coarser| {
            ancestor >>= 2;
            self.orders[coarser as usize].contains(&ancestor)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::moc::Moc;
    use std::collections::BTreeSet;

    fn set(cells: &[u64]) -> BTreeSet<u64> {
        cells.iter().copied().collect()
    }

    #[test]
    fn aggregate_complete_sibling_group() {
        let mut m = Moc::with_cells(10, [0, 1, 2, 3, 4]).unwrap();
        assert_eq!(m.order(), 10);
        assert_eq!(m.cells_at(10).unwrap(), &set(&[0, 1, 2, 3, 4]));
        assert!(m.cells_at(9).unwrap().is_empty());

        m.normalize();

        assert_eq!(m.order(), 10);
        assert_eq!(m.cells_at(10).unwrap(), &set(&[4]));
        assert_eq!(m.cells_at(9).unwrap(), &set(&[0]));
    }

    #[test]
    fn drop_cells_included_at_coarser_order() {
        let mut m = Moc::with_cells(10, [0, 1, 2, 3, 4]).unwrap();
        m.add(8, [0]).unwrap();

        assert_eq!(m.order(), 10);
        assert_eq!(m.cells_at(8).unwrap(), &set(&[0]));
        assert!(m.cells_at(9).unwrap().is_empty());

        m.normalize();

        assert_eq!(m.order(), 8);
        assert_eq!(m.cells_at(8).unwrap(), &set(&[0]));
        assert!(m.cells_at(9).unwrap().is_empty());
        assert!(m.cells_at(10).unwrap().is_empty());
    }

    #[test]
    fn merges_cascade_to_coarsest_order() {
        let mut m = Moc::with_cells(2, 0..16).unwrap();
        m.normalize();
        assert_eq!(m.order(), 0);
        assert_eq!(m.cells_at(0).unwrap(), &set(&[0]));
    }

    #[test]
    fn every_sibling_group_merges_to_its_parent() {
        for parent in 0..48u64 {
            let mut m = Moc::with_cells(2, (0..4).map(|i| (parent << 2) | i)).unwrap();
            m.normalize();
            assert_eq!(m.cells(), 1);
            assert_eq!(m.cells_at(1).unwrap(), &set(&[parent]));
        }
    }

    #[test]
    fn normalize_to_coarsens() {
        let mut m = Moc::with_cells(5, [55]).unwrap();
        m.normalize_to(3).unwrap();
        assert_eq!(m.order(), 3);
        assert_eq!(m.cells_at(3).unwrap(), &set(&[3]));
        assert!(m.is_normalized());
        assert!(m.normalize_to(30).is_err());
    }

    #[test]
    fn normalize_to_applies_to_already_normalized() {
        let mut m = Moc::with_cells(6, [1]).unwrap();
        m.normalize();
        assert_eq!(m.order(), 6);
        m.normalize_to(4).unwrap();
        assert_eq!(m.order(), 4);
        assert_eq!(m.cells_at(4).unwrap(), &set(&[0]));
    }

    #[test]
    fn idempotent() {
        let mut m = Moc::new();
        m.add(3, [0, 1, 2, 3, 17, 200]).unwrap();
        m.add(5, [1000, 1001, 1002, 1003, 3]).unwrap();
        m.add(1, [47]).unwrap();
        m.normalize();
        let once = m.clone();
        m.normalize();
        assert_eq!(
            once.iter().collect::<Vec<_>>(),
            m.iter().collect::<Vec<_>>()
        );
    }
}
