pub mod algebra;
pub mod catalog;
pub mod help;
pub mod info;
pub mod metadata;
pub mod normalize;
pub mod output;
pub mod version;

use super::{Params, Session};
use crate::error::MocResult;

#[derive(Debug)]
pub enum CommandOutput {
    Text(String),
    None,
}

pub trait Command {
    /// Names the command answers to; the first is the primary name.
    fn aliases(&self) -> &'static [&'static str];
    /// One-line synopsis.
    fn description(&self) -> &'static str;
    /// Longer usage text for `--help COMMAND`.
    fn usage(&self) -> &'static str {
        ""
    }
    fn execute(&self, session: &mut Session, params: &mut Params) -> MocResult<CommandOutput>;
}

static COMMANDS: &[&(dyn Command + Sync)] = &[
    &catalog::Catalog,
    &help::Help,
    &metadata::Identifier,
    &info::Info,
    &algebra::Intersection,
    &metadata::Name,
    &normalize::Normalize,
    &output::Output,
    &algebra::Subtract,
    &version::Version,
];

/// All commands, sorted by primary name.
pub fn all_commands() -> &'static [&'static (dyn Command + Sync)] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static (dyn Command + Sync)> {
    COMMANDS
        .iter()
        .copied()
        .find(|command| command.aliases().contains(&name))
}

/// Looks a command up by its primary name, with or without leading dashes.
pub fn find_by_topic(topic: &str) -> Option<&'static (dyn Command + Sync)> {
    let topic = topic.trim_start_matches('-');
    COMMANDS
        .iter()
        .copied()
        .find(|command| command.aliases()[0].trim_start_matches('-') == topic)
}
