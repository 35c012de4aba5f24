use super::{Command, CommandOutput};
use crate::catalog::{read_catalog_file, AngleUnit, CatalogQuery, CatalogUnits};
use crate::error::{MocError, MocResult};
use crate::moc::validate::parse_order;
use crate::tool::{Params, Session};
use tracing::info;

pub struct Catalog;

impl Catalog {
    fn query(params: &mut Params) -> MocResult<(CatalogQuery, CatalogUnits)> {
        let mut query = CatalogQuery::default();
        let mut units = CatalogUnits::default();

        loop {
            if params.take_if("order") {
                query.order = parse_order(&params.require("--catalog order", "an order")?)?;
            } else if params.take_if("radius") {
                let text = params.require("--catalog radius", "a radius in arcseconds")?;
                query.radius_arcsec = text.parse().map_err(|_| {
                    MocError::InvalidArgument(format!("radius '{}' is not a number", text))
                })?;
            } else if params.take_if("unit") {
                let ra: AngleUnit = params.require("--catalog unit", "RA and Dec units")?.parse()?;
                let dec: AngleUnit = params.require("--catalog unit", "RA and Dec units")?.parse()?;
                units = CatalogUnits::new(ra, dec)?;
            } else if params.take_if("format") {
                let format = params.require("--catalog format", "a catalog format")?;
                if format != "commented_header" {
                    return Err(MocError::Command(format!(
                        "catalog format {} not supported",
                        format
                    )));
                }
            } else if params.take_if("inclusive") {
                query.inclusive = true;
            } else {
                return Ok((query, units));
            }
        }
    }
}

impl Command for Catalog {
    fn aliases(&self) -> &'static [&'static str] {
        &["--catalog"]
    }

    fn description(&self) -> &'static str {
        "Create a MOC from a catalog of positions"
    }

    fn usage(&self) -> &'static str {
        "Reads a text catalog whose first comment line names the RA and Dec\n\
         columns, and adds the cells within the radius of each position.\n\
         Options, in any order after the file name:\n\
         \n\
         \x20   order N             cell order (default 12)\n\
         \x20   radius ARCSEC       search radius (default 3600)\n\
         \x20   unit RA DEC         column units: hour, deg or rad (default hour deg)\n\
         \x20   format FORMAT       only commented_header is supported\n\
         \x20   inclusive           select cells overlapping the radius\n\
         \n\
         \x20   moc-tool --catalog stars.txt order 10 radius 30 --output stars.fits"
    }

    fn execute(&self, session: &mut Session, params: &mut Params) -> MocResult<CommandOutput> {
        let file = params.require("--catalog", "a catalog file")?;
        let (query, units) = Self::query(params)?;

        let coords = read_catalog_file(&file, units)?;
        let moc = query.to_moc(&coords)?;
        info!(
            path = %file,
            entries = coords.len(),
            cells = moc.cells(),
            "catalog converted"
        );
        session.merge(moc);
        Ok(CommandOutput::None)
    }
}
