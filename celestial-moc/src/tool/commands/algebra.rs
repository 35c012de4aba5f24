use super::{Command, CommandOutput};
use crate::error::MocResult;
use crate::moc::Moc;
use crate::tool::{Params, Session};

pub struct Intersection;

impl Command for Intersection {
    fn aliases(&self) -> &'static [&'static str] {
        &["--intersection"]
    }

    fn description(&self) -> &'static str {
        "Compute the intersection with the given MOC"
    }

    fn usage(&self) -> &'static str {
        "Takes the name of a MOC file and replaces the running MOC with its\n\
         intersection with that file. The result carries no metadata.\n\
         \n\
         \x20   moc-tool a.fits --intersection b.fits --output intersection.fits"
    }

    fn execute(&self, session: &mut Session, params: &mut Params) -> MocResult<CommandOutput> {
        let moc = session.require_moc("intersection")?;
        let file = params.require("--intersection", "a MOC file")?;
        let other = Moc::from_file(&file)?;
        *moc = moc.intersection(&other);
        Ok(CommandOutput::None)
    }
}

pub struct Subtract;

impl Command for Subtract {
    fn aliases(&self) -> &'static [&'static str] {
        &["--subtract"]
    }

    fn description(&self) -> &'static str {
        "Subtract the given MOC from the running MOC"
    }

    fn usage(&self) -> &'static str {
        "Takes the name of a MOC file to be subtracted from the running MOC.\n\
         \n\
         \x20   moc-tool a.fits --subtract b.fits --output difference.fits"
    }

    fn execute(&self, session: &mut Session, params: &mut Params) -> MocResult<CommandOutput> {
        let moc = session.require_moc("subtraction")?;
        let file = params.require("--subtract", "a MOC file")?;
        *moc -= &Moc::from_file(&file)?;
        Ok(CommandOutput::None)
    }
}
