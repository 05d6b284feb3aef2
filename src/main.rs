use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;

use rusbencode::config::Config;
use rusbencode::engine::{use_command, Command};

#[derive(Debug, Parser)]
#[command(name = "rusbencode", version, about = "Encode, decode and inspect bencode")]
struct Cli {
    /// Config file (defaults to ./rusbencode.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More logging; repeat for debug output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let res = Config::load(cli.config.as_deref()).and_then(|config| {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        use_command(&cli.command, &config, &mut out)?;
        out.flush()?;
        Ok(())
    });

    if let Err(e) = res {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
