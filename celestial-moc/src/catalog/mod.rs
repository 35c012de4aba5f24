//! Catalog to MOC conversion.
//!
//! Every catalog position contributes the cells of the chosen order whose
//! centers lie within the search radius. By default the cell holding the
//! position itself is always added as well, so that a radius smaller than
//! the cell size still yields coverage.
//!
//! ```
//! use celestial_moc::catalog::{CatalogQuery, SkyCoord};
//!
//! let catalog = [SkyCoord::new(303.75, -4.18152827)?];
//! let moc = CatalogQuery::new(6, 60.0).to_moc(&catalog)?;
//! assert!(moc.contains(6, 30000, false)?);
//! # Ok::<(), celestial_moc::MocError>(())
//! ```

pub mod healpix;
pub mod reader;

pub use reader::{read_ascii_catalog, read_catalog_file, AngleUnit, CatalogUnits};

use crate::error::{MocError, MocResult};
use crate::moc::validate::check_order;
use crate::moc::{Moc, MocType};
use std::collections::BTreeSet;
use tracing::debug;

/// An ICRS position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyCoord {
    ra: f64,
    dec: f64,
}

impl SkyCoord {
    /// RA is wrapped into `[0, 360)`; Dec must lie in `[-90, 90]`.
    pub fn new(ra_deg: f64, dec_deg: f64) -> MocResult<Self> {
        if !ra_deg.is_finite() || !dec_deg.is_finite() {
            return Err(MocError::InvalidArgument(format!(
                "coordinates must be finite: ({}, {})",
                ra_deg, dec_deg
            )));
        }
        if !(-90.0..=90.0).contains(&dec_deg) {
            return Err(MocError::InvalidArgument(format!(
                "declination {} outside [-90, 90]",
                dec_deg
            )));
        }
        Ok(Self {
            ra: ra_deg.rem_euclid(360.0),
            dec: dec_deg,
        })
    }

    pub fn ra(&self) -> f64 {
        self.ra
    }

    pub fn dec(&self) -> f64 {
        self.dec
    }
}

/// Parameters for turning catalog positions into cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogQuery {
    pub order: u8,
    pub radius_arcsec: f64,
    /// Select every cell overlapping the search radius rather than only
    /// those whose centers fall inside it.
    pub inclusive: bool,
    /// Always add the cell holding each position.
    pub include_fallback: bool,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            order: 12,
            radius_arcsec: 3600.0,
            inclusive: false,
            include_fallback: true,
        }
    }
}

impl CatalogQuery {
    pub fn new(order: u8, radius_arcsec: f64) -> Self {
        Self {
            order,
            radius_arcsec,
            ..Self::default()
        }
    }

    pub fn inclusive(mut self, inclusive: bool) -> Self {
        self.inclusive = inclusive;
        self
    }

    pub fn include_fallback(mut self, include_fallback: bool) -> Self {
        self.include_fallback = include_fallback;
        self
    }

    fn validate(&self) -> MocResult<()> {
        check_order(self.order)?;
        if !self.radius_arcsec.is_finite() || self.radius_arcsec < 0.0 {
            return Err(MocError::InvalidArgument(format!(
                "radius must be a non-negative number of arcseconds, got {}",
                self.radius_arcsec
            )));
        }
        Ok(())
    }

    pub fn cells(&self, catalog: &[SkyCoord]) -> MocResult<BTreeSet<u64>> {
        self.validate()?;
        let radius_deg = self.radius_arcsec / 3600.0;

        let mut cells = BTreeSet::new();
        for coord in catalog {
            cells.extend(healpix::query_disc_nest(
                self.order,
                coord.ra,
                coord.dec,
                radius_deg,
                self.inclusive,
            ));
            if self.include_fallback {
                cells.insert(healpix::ang2pix_nest(self.order, coord.ra, coord.dec));
            }
        }

        debug!(
            entries = catalog.len(),
            order = self.order,
            radius_arcsec = self.radius_arcsec,
            cells = cells.len(),
            "catalog cells"
        );
        Ok(cells)
    }

    /// A `CATALOG` type MOC covering the catalog.
    pub fn to_moc(&self, catalog: &[SkyCoord]) -> MocResult<Moc> {
        let cells = self.cells(catalog)?;
        let mut moc = Moc::new().with_type(MocType::Catalog);
        moc.add(self.order, cells)?;
        Ok(moc)
    }
}

pub fn catalog_to_cells(
    catalog: &[SkyCoord],
    radius_arcsec: f64,
    order: u8,
) -> MocResult<BTreeSet<u64>> {
    CatalogQuery::new(order, radius_arcsec).cells(catalog)
}

pub fn catalog_to_moc(catalog: &[SkyCoord], radius_arcsec: f64, order: u8) -> MocResult<Moc> {
    CatalogQuery::new(order, radius_arcsec).to_moc(catalog)
}
