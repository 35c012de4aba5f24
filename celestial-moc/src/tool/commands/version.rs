use super::{Command, CommandOutput};
use crate::error::MocResult;
use crate::io::fits::MOC_TOOL;
use crate::tool::{Params, Session};

pub struct Version;

impl Command for Version {
    fn aliases(&self) -> &'static [&'static str] {
        &["--version"]
    }

    fn description(&self) -> &'static str {
        "Show the version number"
    }

    fn execute(&self, _session: &mut Session, _params: &mut Params) -> MocResult<CommandOutput> {
        Ok(CommandOutput::Text(MOC_TOOL.to_string()))
    }
}
