use super::{Command, CommandOutput};
use crate::error::MocResult;
use crate::moc::Moc;
use crate::tool::{Params, Session};

pub struct Identifier;

impl Command for Identifier {
    fn aliases(&self) -> &'static [&'static str] {
        &["--id"]
    }

    fn description(&self) -> &'static str {
        "Set the identifier of the current MOC"
    }

    fn usage(&self) -> &'static str {
        "The new identifier should be given after this option.\n\
         \n\
         \x20   moc-tool ... --id 'New MOC identifier' --output new_moc.fits"
    }

    fn execute(&self, session: &mut Session, params: &mut Params) -> MocResult<CommandOutput> {
        let id = params.require("--id", "an identifier")?;
        session.moc.get_or_insert_with(Moc::new).id = Some(id);
        Ok(CommandOutput::None)
    }
}

pub struct Name;

impl Command for Name {
    fn aliases(&self) -> &'static [&'static str] {
        &["--name"]
    }

    fn description(&self) -> &'static str {
        "Set the name of the current MOC"
    }

    fn usage(&self) -> &'static str {
        "The new name should be given after this option.\n\
         \n\
         \x20   moc-tool ... --name 'New MOC name' --output new_moc.fits"
    }

    fn execute(&self, session: &mut Session, params: &mut Params) -> MocResult<CommandOutput> {
        let name = params.require("--name", "a name")?;
        session.moc.get_or_insert_with(Moc::new).name = Some(name);
        Ok(CommandOutput::None)
    }
}
