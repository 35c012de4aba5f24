use super::{all_commands, find_by_topic, Command, CommandOutput};
use crate::error::{MocError, MocResult};
use crate::tool::{Params, Session};

pub struct Help;

const GENERAL: &str = "moc-tool - manipulate Multi-Order Coverage maps\n\
\n\
Usage: moc-tool [INPUT]... [COMMAND [ARG]...]...\n\
\n\
Inputs and commands are processed in order. An input is a MOC file\n\
(FITS, JSON or range text) or '-' for range text on standard input.\n\
The first input sets the running MOC; later inputs are merged into it.";

impl Command for Help {
    fn aliases(&self) -> &'static [&'static str] {
        &["--help", "-h"]
    }

    fn description(&self) -> &'static str {
        "Show general help or help on a command"
    }

    fn usage(&self) -> &'static str {
        "    moc-tool --help [COMMAND]"
    }

    fn execute(&self, _session: &mut Session, params: &mut Params) -> MocResult<CommandOutput> {
        let topic = match params.peek() {
            Some(next) if !next.starts_with('-') => params.next(),
            _ => None,
        };

        let text = match topic {
            Some(topic) => {
                let command = find_by_topic(&topic)
                    .ok_or_else(|| MocError::Command(format!("command {} not known", topic)))?;
                command_help(command)
            }
            None => general_help(),
        };
        Ok(CommandOutput::Text(text))
    }
}

fn command_help(command: &dyn Command) -> String {
    let mut text = format!("{}: {}", command.aliases().join(", "), command.description());
    if !command.usage().is_empty() {
        text.push_str("\n\n");
        text.push_str(command.usage());
    }
    text
}

fn general_help() -> String {
    let mut text = String::from(GENERAL);
    text.push_str("\n\nCommands:\n");
    for command in all_commands() {
        text.push_str(&format!(
            "    {:<20} {}\n",
            command.aliases().join(", "),
            command.description()
        ));
    }
    text.push_str("\nUse \"moc-tool --help COMMAND\" for help on a command.");
    text
}
