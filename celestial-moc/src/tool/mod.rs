//! The `moc-tool` command processor.
//!
//! Arguments are consumed left to right against a single running MOC. A
//! command name runs that command, which may consume further arguments;
//! `-` reads range text from standard input; any other argument naming an
//! existing file is read into the running MOC.
//!
//! ```text
//! moc-tool a.fits --subtract b.fits --normalize 10 --output diff.json
//! ```

pub mod commands;

use crate::error::{MocError, MocResult};
use crate::io::ascii::read_moc_ascii;
use crate::moc::Moc;
use commands::{find_command, CommandOutput};
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info};

/// State shared by the commands of one run.
#[derive(Debug, Default)]
pub struct Session {
    pub moc: Option<Moc>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a MOC file. The first file read creates the running MOC along
    /// with its metadata; later files are merged without metadata.
    pub fn read_moc(&mut self, path: &Path) -> MocResult<()> {
        match &mut self.moc {
            Some(moc) => moc.read(path, None),
            None => {
                self.moc = Some(Moc::from_file(path)?);
                Ok(())
            }
        }
    }

    /// Merges range text into the running MOC, creating it if needed.
    pub fn read_moc_ascii<R: Read>(&mut self, reader: R) -> MocResult<()> {
        read_moc_ascii(self.moc.get_or_insert_with(Moc::new), reader)
    }

    /// Adds `other` to the running MOC, or makes it the running MOC.
    pub fn merge(&mut self, other: Moc) {
        match &mut self.moc {
            Some(moc) => *moc += &other,
            None => self.moc = Some(other),
        }
    }

    /// The running MOC, or a command error naming `action`.
    pub fn require_moc(&mut self, action: &str) -> MocResult<&mut Moc> {
        self.moc
            .as_mut()
            .ok_or_else(|| MocError::Command(format!("No MOC information present for {}", action)))
    }
}

/// Remaining arguments, consumed from the front.
#[derive(Debug, Clone, Default)]
pub struct Params {
    stack: Vec<String>,
}

impl Params {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut stack: Vec<String> = args.into_iter().map(Into::into).collect();
        stack.reverse();
        Self { stack }
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn peek(&self) -> Option<&str> {
        self.stack.last().map(String::as_str)
    }

    pub fn next(&mut self) -> Option<String> {
        self.stack.pop()
    }

    /// The next argument, which `command` requires as its `what`.
    pub fn require(&mut self, command: &str, what: &str) -> MocResult<String> {
        self.next()
            .ok_or_else(|| MocError::Command(format!("{} requires {}", command, what)))
    }

    /// Consumes the next argument if it equals `keyword`.
    pub fn take_if(&mut self, keyword: &str) -> bool {
        if self.peek() == Some(keyword) {
            self.stack.pop();
            true
        } else {
            false
        }
    }
}

/// Runs `moc-tool` over an argument list.
pub struct MocTool<R, W> {
    pub session: Session,
    stdin: R,
    out: W,
}

impl<R: Read, W: Write> MocTool<R, W> {
    pub fn new(stdin: R, out: W) -> Self {
        Self {
            session: Session::new(),
            stdin,
            out,
        }
    }

    /// Processes `args` in order. With no arguments, prints general help.
    pub fn run<I, S>(&mut self, args: I) -> MocResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut params = Params::new(args);
        if params.is_empty() {
            params = Params::new(["--help"]);
        }

        while let Some(param) = params.next() {
            if let Some(command) = find_command(&param) {
                info!(command = %param, "running command");
                let output = command.execute(&mut self.session, &mut params)?;
                self.emit(output)?;
            } else if param == "-" {
                debug!("reading range text from stdin");
                self.session.read_moc_ascii(&mut self.stdin)?;
            } else if Path::new(&param).exists() {
                info!(path = %param, "reading MOC");
                self.session.read_moc(Path::new(&param))?;
            } else {
                return Err(MocError::Command(format!("file or command {} not found", param)));
            }
        }

        self.out.flush()?;
        Ok(())
    }

    fn emit(&mut self, output: CommandOutput) -> MocResult<()> {
        match output {
            CommandOutput::Text(text) => writeln!(self.out, "{}", text)?,
            CommandOutput::None => {}
        }
        Ok(())
    }

    pub fn into_parts(self) -> (Session, W) {
        (self.session, self.out)
    }
}
