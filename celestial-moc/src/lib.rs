//! Multi-Order Coverage maps (MOCs) over the HEALPix nested scheme.
//!
//! A MOC describes a region of the sky as a set of HEALPix cells at mixed
//! orders. This crate provides the [`Moc`] value type with set algebra,
//! normalization and flattening, readers and writers for the FITS, JSON
//! and range-text encodings, and conversion of point catalogs to MOCs.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`moc`] | [`Moc`], [`MocType`], union/difference/intersection, [`Moc::normalize`], [`Moc::flattened`] |
//! | [`io`] | [`MocFormat`], file-type inference, the [`io::fits`], [`io::json`] and [`io::ascii`] codecs |
//! | [`catalog`] | HEALPix pixel lookup and disc queries, catalog text reader, [`CatalogQuery`](catalog::CatalogQuery) |
//! | [`tool`] | The `moc-tool` command processor |
//! | [`error`] | [`MocError`] and [`MocResult`] |
//!
//! # Quick Start
//!
//! ```
//! use celestial_moc::Moc;
//!
//! let mut a = Moc::with_cells(1, [0, 1, 2])?;
//! let b = Moc::with_cells(2, [4, 5])?;
//!
//! a -= &b;
//! assert_eq!(a.to_string(), "1/0,2 2/6,7");
//! assert_eq!(a.intersection(&b).cells(), 0);
//! # Ok::<(), celestial_moc::MocError>(())
//! ```
//!
//! # Features
//!
//! - **`cli`**: builds the `moc-tool` binary.

pub mod catalog;
pub mod error;
pub mod io;
pub mod moc;
pub mod tool;

pub use error::{MocError, MocResult, ValueErrorKind};
pub use io::MocFormat;
pub use moc::validate::{parse_cell, parse_order};
pub use moc::{Moc, MocType, MAX_ORDER};
