use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::Result;
use serde::Deserialize;
use structopt::StructOpt;

use baristamatic::cli::{self, InteractiveCli};
use baristamatic::BaristaMatic;

#[derive(Debug, StructOpt)]
#[structopt(name = "bm", about = "Barista-matic vending machine")]
struct Opt {
    /// Configuration file
    #[structopt(parse(from_os_str))]
    config: PathBuf,
    #[structopt(subcommand)]
    command: Commands,
}

#[derive(Debug, StructOpt)]
enum Commands {
    #[structopt(name = "setup", about = "Create and seed the drink catalog")]
    Setup,
    #[structopt(name = "run", about = "Run the interactive machine")]
    Run,
    #[structopt(name = "show-menu", about = "Print the current menu")]
    ShowMenu,
    #[structopt(name = "show-inventory", about = "Print the current inventory")]
    ShowInventory,
}

#[derive(Deserialize, Debug)]
struct Config {
    #[serde(flatten)]
    baristamatic: baristamatic::config::Config,
    env_logger: baristamatic::config::EnvLogger,
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    let mut config_buf = String::new();
    File::open(&opt.config)?.read_to_string(&mut config_buf)?;
    let config: Config = toml::from_str(&config_buf)?;

    config.env_logger.builder().init();

    let bm = BaristaMatic::new(&config.baristamatic)?;

    match opt.command {
        Commands::Setup => bm.setup()?,
        Commands::Run => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            InteractiveCli::new(bm.barista(), stdin.lock(), stdout.lock()).run()?;
        }
        Commands::ShowMenu => {
            let menu = bm.barista().get_menu()?;
            cli::write_menu(&mut io::stdout().lock(), &menu)?;
        }
        Commands::ShowInventory => {
            let inventory = bm.barista().get_inventory()?;
            cli::write_inventory(&mut io::stdout().lock(), &inventory)?;
        }
    }

    Ok(())
}
