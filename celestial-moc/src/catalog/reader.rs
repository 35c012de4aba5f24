//! Plain-text catalogs with a commented header.
//!
//! ```text
//! # RA Dec
//! 01:30:00 +45:00:00
//! 22:30:00 +45:00:00
//! ```
//!
//! The first comment line names the columns; later comment lines and blank
//! lines are skipped. Values are decimal or colon-separated sexagesimal.

use super::SkyCoord;
use crate::error::{MocError, MocResult};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleUnit {
    Hour,
    Degree,
    Radian,
}

impl AngleUnit {
    pub fn to_degrees(self, value: f64) -> f64 {
        match self {
            Self::Hour => value * 15.0,
            Self::Degree => value,
            Self::Radian => value.to_degrees(),
        }
    }
}

impl FromStr for AngleUnit {
    type Err = MocError;

    fn from_str(s: &str) -> MocResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "hour" | "hours" | "h" | "hourangle" => Ok(Self::Hour),
            "deg" | "degree" | "degrees" => Ok(Self::Degree),
            "rad" | "radian" | "radians" => Ok(Self::Radian),
            _ => Err(MocError::InvalidArgument(format!("unknown angle unit '{}'", s))),
        }
    }
}

/// Units of the RA and Dec columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogUnits {
    pub ra: AngleUnit,
    pub dec: AngleUnit,
}

impl Default for CatalogUnits {
    fn default() -> Self {
        Self {
            ra: AngleUnit::Hour,
            dec: AngleUnit::Degree,
        }
    }
}

impl CatalogUnits {
    pub fn new(ra: AngleUnit, dec: AngleUnit) -> MocResult<Self> {
        if dec == AngleUnit::Hour {
            return Err(MocError::InvalidArgument(
                "declination cannot be given in hours".to_string(),
            ));
        }
        Ok(Self { ra, dec })
    }
}

pub fn read_catalog_file(path: impl AsRef<Path>, units: CatalogUnits) -> MocResult<Vec<SkyCoord>> {
    let path = path.as_ref();
    let coords = read_ascii_catalog(BufReader::new(File::open(path)?), units)?;
    debug!(path = %path.display(), entries = coords.len(), "read catalog");
    Ok(coords)
}

pub fn read_ascii_catalog<R: BufRead>(reader: R, units: CatalogUnits) -> MocResult<Vec<SkyCoord>> {
    let mut columns: Option<(usize, usize)> = None;
    let mut coords = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        let trimmed = line.trim();

        if let Some(comment) = trimmed.strip_prefix('#') {
            if columns.is_none() {
                columns = Some(header_columns(comment)?);
            }
            continue;
        }
        if trimmed.is_empty() {
            continue;
        }

        let (ra_col, dec_col) = columns.ok_or_else(|| {
            MocError::parse("catalog", "missing commented header line naming the columns")
        })?;
        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        let field = |col: usize| {
            fields.get(col).copied().ok_or_else(|| {
                MocError::parse("catalog", format!("line {}: too few columns", line_no))
            })
        };

        let ra = parse_angle(field(ra_col)?, units.ra, line_no)?;
        let dec = parse_angle(field(dec_col)?, units.dec, line_no)?;
        coords.push(SkyCoord::new(ra, dec).map_err(|err| {
            MocError::parse("catalog", format!("line {}: {}", line_no, err))
        })?);
    }

    if columns.is_none() {
        return Err(MocError::parse("catalog", "catalog is empty"));
    }
    Ok(coords)
}

/// Positions of the RA and Dec columns in a header line.
fn header_columns(header: &str) -> MocResult<(usize, usize)> {
    let names: Vec<&str> = header.split_whitespace().collect();
    let find = |name: &str| names.iter().position(|n| n.eq_ignore_ascii_case(name));

    match (find("RA"), find("Dec")) {
        (Some(ra), Some(dec)) => Ok((ra, dec)),
        _ if find("Lon").is_some() && find("Lat").is_some() => Err(MocError::parse(
            "catalog",
            "galactic Lon/Lat columns are not supported; convert to ICRS RA/Dec",
        )),
        _ => Err(MocError::parse("catalog", "columns RA,Dec not found")),
    }
}

/// Parses a decimal or `d:m:s` value and converts it to degrees.
fn parse_angle(text: &str, unit: AngleUnit, line_no: usize) -> MocResult<f64> {
    let invalid = || {
        MocError::parse(
            "catalog",
            format!("line {}: invalid angle '{}'", line_no, text),
        )
    };

    if !text.contains(':') {
        let value: f64 = text.parse().map_err(|_| invalid())?;
        if !value.is_finite() {
            return Err(invalid());
        }
        return Ok(unit.to_degrees(value));
    }

    if unit == AngleUnit::Radian {
        return Err(MocError::parse(
            "catalog",
            format!("line {}: sexagesimal value '{}' given in radians", line_no, text),
        ));
    }

    let (sign, body) = match text.as_bytes().first() {
        Some(b'-') => (-1.0, &text[1..]),
        Some(b'+') => (1.0, &text[1..]),
        _ => (1.0, text),
    };

    let mut value = 0.0;
    let mut scale = 1.0;
    let parts: Vec<&str> = body.split(':').collect();
    if parts.len() > 3 {
        return Err(invalid());
    }
    for part in parts {
        let part: f64 = part.parse().map_err(|_| invalid())?;
        if part < 0.0 || !part.is_finite() {
            return Err(invalid());
        }
        value += part / scale;
        scale *= 60.0;
    }

    Ok(unit.to_degrees(sign * value))
}
