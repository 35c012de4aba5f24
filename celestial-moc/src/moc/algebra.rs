//! Union (`+`), difference (`-`) and intersection.
//!
//! Union and difference keep the left operand's metadata. None of the
//! operations normalize their result.

use super::compare::{compare, Intersect, Remove};
use super::Moc;
use std::ops::{Add, AddAssign, Sub, SubAssign};

impl Moc {
    /// Cells of `other` that overlap `self`, at the finer of the two
    /// resolutions.
    ///
    /// The result is not normalized.
    pub fn intersection(&self, other: &Moc) -> Moc {
        let mut result = Moc::new();
        for (order, cells) in other.iter() {
            for &cell in cells {
                let found = compare(Intersect::new(&self.orders), order, cell, true);
                for (found_order, found_cells) in found {
                    result.insert_cells(found_order, found_cells);
                }
            }
        }
        result
    }
}

impl AddAssign<&Moc> for Moc {
    fn add_assign(&mut self, other: &Moc) {
        for (order, cells) in other.iter() {
            self.insert_cells(order, cells.iter().copied());
        }
    }
}

impl Add<&Moc> for &Moc {
    type Output = Moc;

    fn add(self, other: &Moc) -> Moc {
        let mut sum = self.clone();
        sum += other;
        sum
    }
}

impl Add<&Moc> for Moc {
    type Output = Moc;

    fn add(mut self, other: &Moc) -> Moc {
        self += other;
        self
    }
}

impl SubAssign<&Moc> for Moc {
    fn sub_assign(&mut self, other: &Moc) {
        for (order, cells) in other.iter() {
            self.normalized = false;
            for &cell in cells {
                compare(Remove::new(&mut self.orders), order, cell, true);
            }
        }
    }
}

impl Sub<&Moc> for &Moc {
    type Output = Moc;

    fn sub(self, other: &Moc) -> Moc {
        let mut difference = self.clone();
        difference -= other;
        difference
    }
}

impl Sub<&Moc> for Moc {
    type Output = Moc;

    fn sub(mut self, other: &Moc) -> Moc {
        self -= other;
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::moc::{Moc, MocType};

    fn cells(moc: &Moc, order: u8) -> Vec<u64> {
        moc.cells_at(order).unwrap().iter().copied().collect()
    }

    #[test]
    fn add_assign_merges() {
        let mut p = Moc::with_cells(4, [11, 12]).unwrap();
        p.add(5, [100]).unwrap();

        let mut q = Moc::with_cells(4, [13]).unwrap();
        q.add(5, [101]).unwrap();

        p += &q;

        assert_eq!(p.cells(), 5);
        assert_eq!(cells(&p, 4), vec![11, 12, 13]);
        assert_eq!(cells(&p, 5), vec![100, 101]);
    }

    #[test]
    fn add_leaves_operands_untouched() {
        let mut p = Moc::with_cells(4, [11, 12]).unwrap();
        p.add(5, [100]).unwrap();

        let mut q = Moc::with_cells(4, [13]).unwrap();
        q.add(5, [101]).unwrap();

        let s = &p + &q;

        assert_eq!(p.cells(), 3);
        assert_eq!(q.cells(), 2);
        assert_eq!(s.cells(), 5);
        assert_eq!(cells(&s, 4), vec![11, 12, 13]);
        assert_eq!(cells(&s, 5), vec![100, 101]);
    }

    #[test]
    fn union_keeps_left_metadata() {
        let p = Moc::with_cells(1, [1]).unwrap().with_name("left");
        let q = Moc::with_cells(1, [2]).unwrap().with_name("right");
        let s = &p + &q;
        assert_eq!(s.name.as_deref(), Some("left"));
    }

    #[test]
    fn union_with_finer_cells_differs() {
        assert_ne!(
            Moc::with_cells(3, [4, 5, 6]).unwrap(),
            Moc::with_cells(3, [4, 5, 6]).unwrap() + &Moc::with_cells(10, [0]).unwrap()
        );
    }

    #[test]
    fn remove_cells() {
        let mut m = Moc::with_cells(4, [10, 11, 12, 13]).unwrap();
        m.remove(4, [10, 13]).unwrap();
        assert_eq!(m, Moc::with_cells(4, [11, 12]).unwrap());
    }

    #[test]
    fn remove_validates_before_mutating() {
        let mut m = Moc::with_cells(0, [1, 2]).unwrap();
        assert!(m.remove(0, [1, 12]).is_err());
        assert_eq!(cells(&m, 0), vec![1, 2]);
    }

    #[test]
    fn sub_assign() {
        let mut p = Moc::with_cells(1, [3, 4, 5]).unwrap();
        p -= &Moc::with_cells(1, [4]).unwrap();
        assert_eq!(p, Moc::with_cells(1, [3, 5]).unwrap());
    }

    #[test]
    fn sub_splits_and_drops() {
        let p = Moc::with_cells(1, [3, 4, 5]).unwrap();

        let mut q = Moc::new();
        q.add(0, [0]).unwrap();
        q.add(1, [5]).unwrap();
        q.add(2, [19]).unwrap();

        let d = &p - &q;

        assert_eq!(d, Moc::with_cells(2, [16, 17, 18]).unwrap());
        assert_eq!(cells(&p, 1), vec![3, 4, 5]);
    }

    #[test]
    fn intersection_same_order() {
        let p = Moc::with_cells(4, [10, 11, 12]).unwrap();
        let q = Moc::with_cells(4, [9, 11, 13]).unwrap();
        let i = p.intersection(&q);

        assert!(!i.is_normalized());
        assert_eq!(i, Moc::with_cells(4, [11]).unwrap());
    }

    #[test]
    fn intersection_mixed_orders() {
        let mut p = Moc::with_cells(0, [0]).unwrap();
        p.add(1, [4, 5, 6]).unwrap();

        let mut q = Moc::with_cells(0, [1]).unwrap();
        q.add(1, [1, 2, 3]).unwrap();

        let i = p.intersection(&q);

        assert!(!i.is_normalized());
        assert_eq!(i, Moc::with_cells(1, [1, 2, 3, 4, 5, 6]).unwrap());
    }

    #[test]
    fn intersection_coarse_and_fine() {
        let mut p = Moc::with_cells(0, [1]).unwrap();
        let mut q = Moc::with_cells(2, [15, 19]).unwrap();
        let i = p.intersection(&q);

        assert!(!i.is_normalized());
        assert_eq!(i, Moc::with_cells(2, [19]).unwrap());

        p.add(0, [2]).unwrap();
        q.add(0, [2]).unwrap();
        let i = p.intersection(&q);

        assert!(!i.is_normalized());
        assert_eq!(
            i,
            Moc::with_cells(0, [2]).unwrap() + &Moc::with_cells(2, [19]).unwrap()
        );
    }

    #[test]
    fn intersection_two_orders_apart() {
        let p = Moc::with_cells(4, [1024]).unwrap();
        let q = Moc::with_cells(6, [16385]).unwrap();

        let i = p.intersection(&q);
        assert!(!i.is_normalized());
        assert_eq!(i, Moc::with_cells(6, [16385]).unwrap());

        let i = q.intersection(&p);
        assert!(!i.is_normalized());
        assert_eq!(i, Moc::with_cells(6, [16385]).unwrap());
    }

    #[test]
    fn intersection_multiple_orders() {
        let p = Moc::with_cells(1, [1]).unwrap();
        let mut q = Moc::new();
        q.add(2, [4, 8]).unwrap();
        q.add(3, [20, 192]).unwrap();
        q.add(4, [96, 256]).unwrap();

        let mut expect = Moc::new();
        expect.add(2, [4]).unwrap();
        expect.add(3, [20]).unwrap();
        expect.add(4, [96]).unwrap();

        let i = p.intersection(&q);
        assert!(!i.is_normalized());
        assert_eq!(i, expect);

        let i = q.intersection(&p);
        assert!(!i.is_normalized());
        assert_eq!(i, expect);
    }

    #[test]
    fn intersection_has_no_metadata() {
        let p = Moc::with_cells(1, [1]).unwrap().with_type(MocType::Image);
        let i = p.intersection(&p.clone());
        assert_eq!(i.moc_type(), None);
    }
}
