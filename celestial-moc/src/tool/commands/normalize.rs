use super::{Command, CommandOutput};
use crate::error::MocResult;
use crate::moc::validate::parse_order;
use crate::tool::{Params, Session};

pub struct Normalize;

impl Command for Normalize {
    fn aliases(&self) -> &'static [&'static str] {
        &["--normalize"]
    }

    fn description(&self) -> &'static str {
        "Normalize the MOC to a given order"
    }

    fn usage(&self) -> &'static str {
        "Takes a MOC order (0-29) and normalizes the MOC so that its maximum\n\
         order is the given order.\n\
         \n\
         \x20   moc-tool a.fits --normalize 10 --output a_10.fits"
    }

    fn execute(&self, session: &mut Session, params: &mut Params) -> MocResult<CommandOutput> {
        let moc = session.require_moc("normalization")?;
        let order = parse_order(&params.require("--normalize", "an order")?)?;
        moc.normalize_to(order)?;
        Ok(CommandOutput::None)
    }
}
