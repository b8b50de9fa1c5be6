mod commands;
mod terminal;

use commands::{CommandLine, Commands, check, resolve};
use terminal::{logging, print};

fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init();

    match commands.command {
        Commands::Resolve { rules } => {
            print::header("resolving monitoring rules");
            resolve::resolve(&rules)
        }
        Commands::Check { rules } => {
            print::header("checking monitoring rules");
            check::check(&rules)
        }
    }
}
