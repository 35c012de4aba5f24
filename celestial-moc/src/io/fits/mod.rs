//! FITS serialization of MOCs as a binary table of NUNIQ values.
//!
//! The file holds an empty primary HDU followed by a `BINTABLE` extension
//! with a single column, `NPIX`. Each row packs one cell and its order as
//! `nuniq = cell + 4 * 4^order`. The column is 32-bit (`J`) while the
//! MOC's order is below 14, and 64-bit (`K`) from order 14 on.
//!
//! [`MocTable`] is the in-memory form of that extension. It can be built
//! from a MOC, serialized to FITS blocks, parsed back and loaded into a MOC.

pub mod header;

use crate::error::{MocError, MocResult};
use crate::moc::validate::check_order;
use crate::moc::Moc;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use chrono::Utc;
use header::{padded_len, Header, Keyword, BLOCK_SIZE};
use std::io::{Cursor, Read, Write};
use tracing::debug;

/// Value written to `MOCTOOL`.
pub const MOC_TOOL: &str = concat!("celestial-moc ", env!("CARGO_PKG_VERSION"));

/// Orders from which the 64-bit column is required.
const LONG_COLUMN_ORDER: u8 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnFormat {
    /// `J`: big-endian 32-bit signed integer.
    Int32,
    /// `K`: big-endian 64-bit signed integer.
    Int64,
}

impl ColumnFormat {
    pub fn for_order(order: u8) -> Self {
        if order < LONG_COLUMN_ORDER {
            Self::Int32
        } else {
            Self::Int64
        }
    }

    pub fn tform(&self) -> &'static str {
        match self {
            Self::Int32 => "J",
            Self::Int64 => "K",
        }
    }

    pub fn width(&self) -> usize {
        match self {
            Self::Int32 => 4,
            Self::Int64 => 8,
        }
    }

    /// Accepts `J`, `K` and the repeat-count forms `1J`, `1K`.
    pub fn from_tform(tform: &str) -> MocResult<Self> {
        match tform.trim().trim_start_matches('1') {
            "J" => Ok(Self::Int32),
            "K" => Ok(Self::Int64),
            other => Err(MocError::Fits(format!(
                "unsupported NPIX column format '{}'",
                other
            ))),
        }
    }
}

/// Packs a cell and its order into one NUNIQ value.
#[inline]
pub fn to_nuniq(order: u8, cell: u64) -> u64 {
    cell + (4u64 << (2 * order as u32))
}

/// Splits a NUNIQ value into order and cell.
pub fn from_nuniq(nuniq: u64) -> MocResult<(u8, u64)> {
    if nuniq < 4 {
        return Err(MocError::Fits(format!("invalid NUNIQ value {}", nuniq)));
    }
    let order = ((63 - nuniq.leading_zeros()) / 2 - 1) as u8;
    check_order(order)?;
    Ok((order, nuniq - (4u64 << (2 * order as u32))))
}

/// The binary table extension holding a MOC.
#[derive(Debug, Clone, PartialEq)]
pub struct MocTable {
    pub header: Header,
    pub format: ColumnFormat,
    pub nuniq: Vec<u64>,
}

impl MocTable {
    /// Builds the table from the normalized form of `moc`.
    pub fn from_moc(moc: &Moc) -> Self {
        let normalized = moc.normalized_view();
        let order = normalized.order();
        let format = ColumnFormat::for_order(order);

        let nuniq: Vec<u64> = normalized
            .iter()
            .flat_map(|(order, cells)| cells.iter().map(move |&cell| to_nuniq(order, cell)))
            .collect();

        let mut header = Header::new();
        header.push(
            Keyword::string("XTENSION", "BINTABLE").with_comment("binary table extension"),
        );
        header.push(Keyword::integer("BITPIX", 8));
        header.push(Keyword::integer("NAXIS", 2));
        header.push(
            Keyword::integer("NAXIS1", format.width() as i64).with_comment("bytes per row"),
        );
        header.push(
            Keyword::integer("NAXIS2", nuniq.len() as i64).with_comment("number of rows"),
        );
        header.push(Keyword::integer("PCOUNT", 0));
        header.push(Keyword::integer("GCOUNT", 1));
        header.push(Keyword::integer("TFIELDS", 1));
        header.push(Keyword::string("TTYPE1", "NPIX"));
        header.push(Keyword::string("TFORM1", format.tform()));
        header.push(Keyword::string("PIXTYPE", "HEALPIX").with_comment("HEALPix magic code"));
        header.push(Keyword::string("ORDERING", "NUNIQ").with_comment("NUNIQ coding method"));
        header.push(Keyword::string("COORDSYS", "C").with_comment("ICRS reference frame"));
        header.push(
            Keyword::integer("MOCORDER", order as i64).with_comment("MOC resolution (best order)"),
        );
        header.push(
            Keyword::string("MOCTOOL", MOC_TOOL).with_comment("Name of the MOC generator"),
        );

        if let Some(moc_type) = moc.moc_type() {
            header.push(
                Keyword::string("MOCTYPE", moc_type.as_str())
                    .with_comment("Source type (IMAGE or CATALOG)"),
            );
        }
        if let Some(id) = &moc.id {
            header.push(
                Keyword::string("MOCID", id.as_str()).with_comment("Identifier of the collection"),
            );
        }
        if let Some(origin) = &moc.origin {
            header.push(Keyword::string("ORIGIN", origin.as_str()).with_comment("MOC origin"));
        }
        header.push(
            Keyword::string("DATE", Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string())
                .with_comment("MOC creation date"),
        );
        if let Some(name) = &moc.name {
            header.push(Keyword::string("EXTNAME", name.as_str()).with_comment("MOC name"));
        }

        Self {
            header,
            format,
            nuniq,
        }
    }

    /// Serializes the primary HDU and the table extension.
    pub fn to_bytes(&self) -> MocResult<Vec<u8>> {
        let mut primary = Header::new();
        primary.push(
            Keyword::logical("SIMPLE", true).with_comment("file does conform to FITS standard"),
        );
        primary.push(Keyword::integer("BITPIX", 8));
        primary.push(Keyword::integer("NAXIS", 0));
        primary.push(Keyword::logical("EXTEND", true));

        let mut bytes = primary.to_bytes()?;
        bytes.extend(self.header.to_bytes()?);

        let data_start = bytes.len();
        for &value in &self.nuniq {
            match self.format {
                ColumnFormat::Int32 => {
                    let value = i32::try_from(value).map_err(|_| {
                        MocError::Fits(format!("NUNIQ value {} does not fit a J column", value))
                    })?;
                    bytes.write_i32::<BigEndian>(value)?;
                }
                ColumnFormat::Int64 => bytes.write_i64::<BigEndian>(value as i64)?,
            }
        }
        let data_len = bytes.len() - data_start;
        bytes.resize(data_start + padded_len(data_len), 0);

        Ok(bytes)
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> MocResult<()> {
        writer.write_all(&self.to_bytes()?)?;
        Ok(())
    }

    /// Parses a complete FITS file holding a MOC table in its first
    /// extension.
    pub fn parse(data: &[u8]) -> MocResult<Self> {
        let (primary, primary_len) = Header::parse(data)?;
        if primary.get_logical("SIMPLE") != Some(true) {
            return Err(MocError::Fits("not a FITS file: SIMPLE = T missing".to_string()));
        }
        let offset = data_size(&primary)?
            .checked_add(BLOCK_SIZE - 1)
            .map(|size| size / BLOCK_SIZE * BLOCK_SIZE)
            .and_then(|size| size.checked_add(primary_len))
            .ok_or_else(|| MocError::Fits("primary data size overflows".to_string()))?;

        let rest = data
            .get(offset..)
            .ok_or_else(|| MocError::Fits("file ends before the MOC extension".to_string()))?;
        let (header, header_len) = Header::parse(rest)?;

        if header.get_string("XTENSION") != Some("BINTABLE") {
            return Err(MocError::Fits("first extension is not a BINTABLE".to_string()));
        }
        let tform = header
            .get_string("TFORM1")
            .ok_or_else(|| MocError::Fits("missing TFORM1".to_string()))?;
        let format = ColumnFormat::from_tform(tform)?;

        let row_width = header.require_integer("NAXIS1")?;
        if row_width != format.width() as i64 {
            return Err(MocError::Fits(format!(
                "NAXIS1 = {} does not match TFORM1 = '{}'",
                row_width, tform
            )));
        }
        let rows = usize::try_from(header.require_integer("NAXIS2")?)
            .map_err(|_| MocError::Fits("negative NAXIS2".to_string()))?;

        let end = rows
            .checked_mul(format.width())
            .and_then(|size| size.checked_add(header_len))
            .ok_or_else(|| MocError::Fits("table size overflows".to_string()))?;
        let table = rest
            .get(header_len..end)
            .ok_or_else(|| MocError::Fits("table data is truncated".to_string()))?;

        let mut cursor = Cursor::new(table);
        let mut nuniq = Vec::with_capacity(rows);
        for _ in 0..rows {
            let value = match format {
                ColumnFormat::Int32 => cursor.read_i32::<BigEndian>()? as i64,
                ColumnFormat::Int64 => cursor.read_i64::<BigEndian>()?,
            };
            let value = u64::try_from(value)
                .map_err(|_| MocError::Fits(format!("negative NUNIQ value {}", value)))?;
            nuniq.push(value);
        }

        Ok(Self {
            header,
            format,
            nuniq,
        })
    }

    pub fn read_from<R: Read>(reader: &mut R) -> MocResult<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::parse(&data)
    }

    /// Adds the table's cells to `moc`, and with `include_meta` copies
    /// `MOCTYPE`, `MOCID`, `ORIGIN` and `EXTNAME` as well.
    pub fn read_into(&self, moc: &mut Moc, include_meta: bool) -> MocResult<()> {
        let mut runs: Vec<(u8, Vec<u64>)> = Vec::new();
        for &value in &self.nuniq {
            let (order, cell) = from_nuniq(value)?;
            match runs.last_mut() {
                Some((last, cells)) if *last == order => cells.push(cell),
                _ => runs.push((order, vec![cell])),
            }
        }

        // Keywords missing from the header leave the existing metadata alone.
        if include_meta {
            if let Some(moc_type) = self.header.get_string("MOCTYPE") {
                moc.set_type(Some(moc_type))?;
            }
            if let Some(id) = self.header.get_string("MOCID") {
                moc.id = Some(id.to_string());
            }
            if let Some(origin) = self.header.get_string("ORIGIN") {
                moc.origin = Some(origin.to_string());
            }
            if let Some(name) = self.header.get_string("EXTNAME") {
                moc.name = Some(name.to_string());
            }
        }

        for (order, cells) in runs {
            moc.add(order, cells)?;
        }
        Ok(())
    }
}

/// Size in bytes of the data section described by `header`.
fn data_size(header: &Header) -> MocResult<usize> {
    let naxis = header.require_integer("NAXIS")?;
    if naxis == 0 {
        return Ok(0);
    }
    let bitpix = header.require_integer("BITPIX")?;
    let mut size = (bitpix.unsigned_abs() / 8) as usize;
    for axis in 1..=naxis {
        let length = header.require_integer(&format!("NAXIS{}", axis))?;
        let length = usize::try_from(length)
            .map_err(|_| MocError::Fits(format!("negative NAXIS{}", axis)))?;
        size = size
            .checked_mul(length)
            .ok_or_else(|| MocError::Fits("primary data size overflows".to_string()))?;
    }
    Ok(size)
}

pub fn write_moc_fits<W: Write>(moc: &Moc, writer: &mut W) -> MocResult<()> {
    let table = MocTable::from_moc(moc);
    debug!(rows = table.nuniq.len(), format = table.format.tform(), "writing FITS MOC");
    table.write_to(writer)
}

pub fn read_moc_fits<R: Read>(moc: &mut Moc, mut reader: R, include_meta: bool) -> MocResult<()> {
    let table = MocTable::read_from(&mut reader)?;
    debug!(rows = table.nuniq.len(), format = table.format.tform(), "read FITS MOC");
    table.read_into(moc, include_meta)
}

#[cfg(test)]
mod tests {
    use super::header::CARD_SIZE;
    use super::*;
    use crate::moc::MocType;

    fn round_trip(moc: &Moc, include_meta: bool) -> Moc {
        let mut bytes = Vec::new();
        write_moc_fits(moc, &mut bytes).unwrap();
        let mut loaded = Moc::new();
        read_moc_fits(&mut loaded, bytes.as_slice(), include_meta).unwrap();
        loaded
    }

    #[test]
    fn nuniq_packing() {
        assert_eq!(to_nuniq(0, 0), 4);
        assert_eq!(to_nuniq(0, 11), 15);
        assert_eq!(to_nuniq(1, 0), 16);
        assert_eq!(from_nuniq(15).unwrap(), (0, 11));
        assert_eq!(from_nuniq(16).unwrap(), (1, 0));
        assert_eq!(
            from_nuniq(to_nuniq(29, 3458700000000000000)).unwrap(),
            (29, 3458700000000000000)
        );
        assert!(from_nuniq(3).is_err());
        assert!(from_nuniq(u64::MAX).is_err());
    }

    #[test]
    fn column_format_by_order() {
        let moc = Moc::with_cells(13, [805306367]).unwrap();
        let table = MocTable::from_moc(&moc);
        assert_eq!(table.format, ColumnFormat::Int32);
        assert_eq!(table.header.get_string("TFORM1"), Some("J"));
        assert_eq!(table.nuniq, vec![to_nuniq(13, 805306367)]);

        let moc = Moc::with_cells(14, [1]).unwrap();
        let table = MocTable::from_moc(&moc);
        assert_eq!(table.format, ColumnFormat::Int64);
        assert_eq!(table.header.get_string("TFORM1"), Some("K"));
    }

    #[test]
    fn header_keywords() {
        let moc = Moc::with_cells(3, [1, 2])
            .unwrap()
            .with_name("test")
            .with_type(MocType::Catalog);
        let table = MocTable::from_moc(&moc);
        let header = &table.header;

        assert_eq!(header.get_string("PIXTYPE"), Some("HEALPIX"));
        assert_eq!(header.get_string("ORDERING"), Some("NUNIQ"));
        assert_eq!(header.get_string("COORDSYS"), Some("C"));
        assert_eq!(header.get_integer("MOCORDER"), Some(3));
        assert_eq!(header.get_string("MOCTOOL"), Some(MOC_TOOL));
        assert_eq!(header.get_string("MOCTYPE"), Some("CATALOG"));
        assert_eq!(header.get_string("EXTNAME"), Some("test"));
        assert_eq!(header.get_string("TTYPE1"), Some("NPIX"));
        assert_eq!(header.get_string("MOCID"), None);
        assert_eq!(header.get_string("DATE").map(str::len), Some(19));
    }

    #[test]
    fn file_layout() {
        let moc = Moc::with_cells(2, [5, 6, 7]).unwrap();
        let bytes = MocTable::from_moc(&moc).to_bytes().unwrap();

        assert_eq!(bytes.len() % BLOCK_SIZE, 0);
        assert_eq!(bytes.len(), 3 * BLOCK_SIZE);
        assert_eq!(&bytes[..6], b"SIMPLE");
        assert_eq!(&bytes[BLOCK_SIZE..BLOCK_SIZE + 8], b"XTENSION");

        let data = &bytes[2 * BLOCK_SIZE..];
        assert_eq!(&data[..4], &(to_nuniq(2, 5) as i32).to_be_bytes());
        assert_eq!(&data[8..12], &(to_nuniq(2, 7) as i32).to_be_bytes());
        assert!(data[12..].iter().all(|&b| b == 0));
    }

    #[test]
    fn round_trip_mixed_orders() {
        let mut moc = Moc::new();
        moc.add(10, [5, 6, 7, 8]).unwrap();
        moc.add(11, [1000, 1001, 2000]).unwrap();

        let loaded = round_trip(&moc, false);
        assert_eq!(loaded, moc);
        assert_eq!(
            loaded.cells_at(10).unwrap().iter().copied().collect::<Vec<_>>(),
            vec![5, 6, 7, 8]
        );
    }

    #[test]
    fn round_trip_normalizes() {
        let moc = Moc::with_cells(5, [0, 1, 2, 3]).unwrap();
        let loaded = round_trip(&moc, false);
        assert_eq!(loaded.order(), 4);
        assert_eq!(loaded.cells(), 1);
    }

    #[test]
    fn round_trip_large_order() {
        let moc = Moc::with_cells(29, [3458700000000000000]).unwrap();
        assert_eq!(MocTable::from_moc(&moc).format, ColumnFormat::Int64);
        let loaded = round_trip(&moc, false);
        assert_eq!(
            loaded.cells_at(29).unwrap().iter().copied().collect::<Vec<_>>(),
            vec![3458700000000000000]
        );
    }

    #[test]
    fn metadata_only_when_requested() {
        let moc = Moc::with_cells(4, [42])
            .unwrap()
            .with_name("test-moc")
            .with_id("ivo://TEST/moc")
            .with_origin("ivo://TEST")
            .with_type(MocType::Image);

        let plain = round_trip(&moc, false);
        assert_eq!(plain.name, None);
        assert_eq!(plain.id, None);
        assert_eq!(plain.origin, None);
        assert_eq!(plain.moc_type(), None);

        let full = round_trip(&moc, true);
        assert_eq!(full.name.as_deref(), Some("test-moc"));
        assert_eq!(full.id.as_deref(), Some("ivo://TEST/moc"));
        assert_eq!(full.origin.as_deref(), Some("ivo://TEST"));
        assert_eq!(full.moc_type(), Some(MocType::Image));
    }

    #[test]
    fn metadata_import_keeps_fields_missing_from_header() {
        let mut bytes = Vec::new();
        write_moc_fits(&Moc::with_cells(3, [1]).unwrap(), &mut bytes).unwrap();

        let mut moc = Moc::new()
            .with_name("keep")
            .with_id("ivo://keep")
            .with_type(MocType::Catalog);
        read_moc_fits(&mut moc, bytes.as_slice(), true).unwrap();

        assert_eq!(moc.name.as_deref(), Some("keep"));
        assert_eq!(moc.id.as_deref(), Some("ivo://keep"));
        assert_eq!(moc.moc_type(), Some(MocType::Catalog));
        assert!(moc.contains(3, 1, false).unwrap());
    }

    fn replace_card(bytes: &mut [u8], keyword: Keyword) {
        let card = keyword.to_card().unwrap();
        let start = bytes
            .chunks(CARD_SIZE)
            .position(|c| c.starts_with(&card[..8]))
            .unwrap()
            * CARD_SIZE;
        bytes[start..start + CARD_SIZE].copy_from_slice(&card);
    }

    #[test]
    fn huge_row_count_is_an_error() {
        for order in [5, 20] {
            let moc = Moc::with_cells(order, [1, 2]).unwrap();
            let mut bytes = MocTable::from_moc(&moc).to_bytes().unwrap();
            replace_card(&mut bytes, Keyword::integer("NAXIS2", 1 << 62));
            assert!(matches!(MocTable::parse(&bytes), Err(MocError::Fits(_))));
        }
    }

    #[test]
    fn huge_primary_data_is_an_error() {
        let mut primary = Header::new();
        primary.push(Keyword::logical("SIMPLE", true));
        primary.push(Keyword::integer("BITPIX", 64));
        primary.push(Keyword::integer("NAXIS", 2));
        primary.push(Keyword::integer("NAXIS1", 1 << 40));
        primary.push(Keyword::integer("NAXIS2", 1 << 40));
        let bytes = primary.to_bytes().unwrap();

        let err = MocTable::parse(&bytes).unwrap_err();
        assert_eq!(err.to_string(), "FITS error: primary data size overflows");
    }

    #[test]
    fn empty_moc() {
        let loaded = round_trip(&Moc::new(), true);
        assert!(loaded.is_empty());
    }

    #[test]
    fn rejects_non_moc_files() {
        assert!(MocTable::parse(b"not a fits file").is_err());

        let moc = Moc::with_cells(2, [5]).unwrap();
        let mut bytes = MocTable::from_moc(&moc).to_bytes().unwrap();
        bytes.truncate(2 * BLOCK_SIZE + 2);
        assert!(matches!(MocTable::parse(&bytes), Err(MocError::Fits(_))));

        assert!(ColumnFormat::from_tform("E").is_err());
        assert_eq!(ColumnFormat::from_tform("1K").unwrap(), ColumnFormat::Int64);
    }
}
