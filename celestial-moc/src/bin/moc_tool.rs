//! moc-tool: read, combine and write MOC files from the command line.

use celestial_moc::tool::MocTool;
use clap::Parser;
use std::io;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "moc-tool")]
#[command(about = "Manipulate Multi-Order Coverage maps")]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long)]
    verbose: bool,

    /// Inputs and commands, processed in order (see `moc-tool --help`)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut tool = MocTool::new(stdin.lock(), stdout.lock());
    tool.run(cli.args)?;
    Ok(())
}
