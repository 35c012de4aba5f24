use super::{Command, CommandOutput};
use crate::error::MocResult;
use crate::io::ascii::format_ascii;
use crate::tool::{Params, Session};

pub struct Output;

impl Command for Output {
    fn aliases(&self) -> &'static [&'static str] {
        &["--output", "-o"]
    }

    fn description(&self) -> &'static str {
        "Write the MOC to a given file"
    }

    fn usage(&self) -> &'static str {
        "The format follows the file suffix: .fits, .json, .txt or .ascii.\n\
         Giving '-' as the file name writes range text to standard output.\n\
         \n\
         \x20   moc-tool a.fits --output a.json"
    }

    fn execute(&self, session: &mut Session, params: &mut Params) -> MocResult<CommandOutput> {
        let moc = session.require_moc("output")?;
        let file = params.require("--output", "a file name")?;

        if file == "-" {
            return Ok(CommandOutput::Text(format_ascii(moc)));
        }
        moc.write(&file, None)?;
        Ok(CommandOutput::None)
    }
}
