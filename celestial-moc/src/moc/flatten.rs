use super::validate::check_order;
use super::Moc;
use crate::error::MocResult;
use std::collections::BTreeSet;

impl Moc {
    /// All cells at the MOC's own order, finer cells included.
    pub fn flattened(&self) -> BTreeSet<u64> {
        self.flatten_to(self.order(), true)
    }

    /// Projects every stored cell onto `order`.
    ///
    /// Coarser cells expand to all of their descendants at `order`. With
    /// `include_finer`, each finer cell contributes its ancestor at `order`,
    /// which overstates the covered area.
    pub fn flattened_at(&self, order: u8, include_finer: bool) -> MocResult<BTreeSet<u64>> {
        check_order(order)?;
        Ok(self.flatten_to(order, include_finer))
    }

    fn flatten_to(&self, order: u8, include_finer: bool) -> BTreeSet<u64> {
        let mut flat = self.orders[order as usize].clone();

        for (coarser, cells) in self.orders[..order as usize].iter().enumerate() {
            let shift = 2 * (order as u32 - coarser as u32);
            for &cell in cells {
                flat.extend((cell << shift)..((cell + 1) << shift));
            }
        }

        if include_finer {
            for (finer, cells) in self.orders.iter().enumerate().skip(order as usize + 1) {
                let shift = 2 * (finer as u32 - order as u32);
                flat.extend(cells.iter().map(|&cell| cell >> shift));
            }
        }

        flat
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
    fn flattened_at_own_order() {
        let p = Moc::with_cells(4, [11, 12]).unwrap();
        assert_eq!(p.flattened(), set(&[11, 12]));
    }

    #[test]
    fn flattened_expands_coarser_cells() {
        let p = Moc::with_cells(4, [11, 12]).unwrap();
        let q = p + &Moc::with_cells(3, [0]).unwrap();
        assert_eq!(q.flattened(), set(&[0, 1, 2, 3, 11, 12]));
    }

    #[test]
    fn flattened_with_and_without_finer_cells() {
        let p = Moc::with_cells(4, [11, 12]).unwrap();
        let q = p + &Moc::with_cells(5, [55]).unwrap();

        assert_eq!(q.flattened_at(4, true).unwrap(), set(&[11, 12, 13]));
        assert_eq!(q.flattened_at(4, false).unwrap(), set(&[11, 12]));
        assert_eq!(
            q.flattened_at(5, true).unwrap(),
            set(&[44, 45, 46, 47, 48, 49, 50, 51, 55])
        );
        assert_eq!(q.flattened(), q.flattened_at(5, true).unwrap());
    }

    #[test]
    fn flattened_at_rejects_bad_order() {
        assert!(Moc::new().flattened_at(30, true).is_err());
    }

    #[test]
    fn flattened_empty() {
        assert!(Moc::new().flattened().is_empty());
    }
}
