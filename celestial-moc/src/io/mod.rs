//! MOC serialization.
//!
//! Three encodings are supported:
//!
//! | Module | Format | Writes |
//! |--------|--------|--------|
//! | [`ascii`] | `order/ranges` text, e.g. `1/1,3,4 2/4,12-14,21,25` | stored cells |
//! | [`json`] | `{"order":[cells],...}` with sorted keys | normalized cells |
//! | [`fits`] | FITS binary table of NUNIQ values | normalized cells |
//!
//! Each module exposes stream-based `read_moc_*` / `write_moc_*` functions.
//! [`Moc::read`], [`Moc::from_file`] and [`Moc::write`] work on paths and
//! infer the format when none is given; see [`infer_format`].

pub mod ascii;
pub mod fits;
pub mod json;

use crate::error::{MocError, MocResult};
use crate::moc::Moc;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MocFormat {
    Fits,
    Json,
    Ascii,
}

impl MocFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fits => "fits",
            Self::Json => "json",
            Self::Ascii => "ascii",
        }
    }

    /// Format implied by a file name suffix.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "fits" | "fit" => Some(Self::Fits),
            "json" => Some(Self::Json),
            "txt" | "ascii" => Some(Self::Ascii),
            _ => None,
        }
    }

    /// Format implied by the first byte of a file.
    pub fn from_magic(first: u8) -> Option<Self> {
        match first {
            b'S' => Some(Self::Fits),
            b'{' => Some(Self::Json),
            b'0'..=b'9' => Some(Self::Ascii),
            _ => None,
        }
    }
}

impl fmt::Display for MocFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MocFormat {
    type Err = MocError;

    fn from_str(s: &str) -> MocResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "fits" => Ok(Self::Fits),
            "json" => Ok(Self::Json),
            "ascii" | "text" => Ok(Self::Ascii),
            _ => Err(MocError::UnknownFormat(s.to_string())),
        }
    }
}

/// Determines the format of `path` from its suffix, or failing that from
/// the first byte of the file if it exists.
pub fn infer_format(path: &Path) -> MocResult<MocFormat> {
    if let Some(format) = MocFormat::from_extension(path) {
        return Ok(format);
    }

    if path.is_file() {
        let mut first = [0u8; 1];
        let read = File::open(path)?.read(&mut first)?;
        if read == 1 {
            if let Some(format) = MocFormat::from_magic(first[0]) {
                return Ok(format);
            }
        }
    }

    Err(MocError::UnknownFormat(format!(
        "cannot determine format of {}",
        path.display()
    )))
}

impl Moc {
    /// Reads a MOC file, importing its metadata.
    pub fn from_file(path: impl AsRef<Path>) -> MocResult<Self> {
        let mut moc = Self::new();
        moc.read_file(path.as_ref(), None, true)?;
        Ok(moc)
    }

    /// Merges the cells of a MOC file into `self`. Metadata is left
    /// untouched.
    pub fn read(&mut self, path: impl AsRef<Path>, format: Option<MocFormat>) -> MocResult<()> {
        self.read_file(path.as_ref(), format, false)
    }

    fn read_file(
        &mut self,
        path: &Path,
        format: Option<MocFormat>,
        include_meta: bool,
    ) -> MocResult<()> {
        let format = match format {
            Some(format) => format,
            None => infer_format(path)?,
        };
        debug!(path = %path.display(), %format, include_meta, "reading MOC");

        let reader = BufReader::new(File::open(path)?);
        match format {
            MocFormat::Fits => fits::read_moc_fits(self, reader, include_meta),
            MocFormat::Json => json::read_moc_json(self, reader),
            MocFormat::Ascii => ascii::read_moc_ascii(self, reader),
        }
    }

    /// Writes the MOC to `path`, inferring the format from the suffix when
    /// none is given.
    pub fn write(&self, path: impl AsRef<Path>, format: Option<MocFormat>) -> MocResult<()> {
        let path = path.as_ref();
        let format = match format {
            Some(format) => format,
            None => MocFormat::from_extension(path).ok_or_else(|| {
                MocError::UnknownFormat(format!(
                    "cannot determine format of {}",
                    path.display()
                ))
            })?,
        };
        debug!(path = %path.display(), %format, cells = self.cells(), "writing MOC");

        let mut writer = BufWriter::new(File::create(path)?);
        match format {
            MocFormat::Fits => fits::write_moc_fits(self, &mut writer)?,
            MocFormat::Json => json::write_moc_json(self, &mut writer)?,
            MocFormat::Ascii => ascii::write_moc_ascii(self, &mut writer)?,
        }
        writer.flush()?;
        Ok(())
    }
}
