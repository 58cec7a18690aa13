use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::{Builder, Env, Target};
use log::{error, info, Level, Record};
use omnect_uboot_env::bootloader_env::{Config, UbootEnv};
use std::{
    io::{self, Write},
    process,
};

#[derive(Subcommand)]
enum Commands {
    /// Print all or the given variables as NAME=VALUE lines.
    Print {
        /// Print a JSON object instead of NAME=VALUE lines.
        #[arg(long)]
        json: bool,
        /// Names of the variables to print. All variables if omitted.
        names: Vec<String>,
    },
    /// Print the value of a single variable.
    Get {
        name: String,
    },
    /// Set a variable.
    Set {
        name: String,
        value: String,
    },
    /// Delete a variable.
    Unset {
        name: String,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Tool used to read the environment. Overrides FW_PRINTENV_PATH.
    #[arg(long, global = true)]
    printenv: Option<String>,
    /// Tool used to write the environment. Overrides FW_SETENV_PATH.
    #[arg(long, global = true)]
    setenv: Option<String>,
    /// Run the tools via sudo. Same as BOOTENV_USE_SUDO=true.
    #[arg(long, global = true)]
    sudo: bool,
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config::from_env();

        if let Some(printenv) = &self.printenv {
            config.printenv = printenv.clone();
        }
        if let Some(setenv) = &self.setenv {
            config.setenv = setenv.clone();
        }
        config.use_sudo |= self.sudo;

        config
    }
}

fn run(cli: Cli) -> Result<()> {
    let env = UbootEnv::new(cli.config());

    match cli.command {
        Commands::Print { json, names } => {
            let vars = env.read(names.as_slice()).context("failed to read bootloader env")?;

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&vars).context("failed to serialize variables")?
                );
            } else {
                for (name, value) in vars {
                    println!("{name}={value}");
                }
            }
        }
        Commands::Get { name } => {
            let value = env
                .get(&name)
                .with_context(|| format!("failed to get {name}"))?
                .with_context(|| format!("{name} not defined"))?;

            println!("{value}");
        }
        Commands::Set { name, value } => {
            env.write(&name, &value)
                .with_context(|| format!("failed to set {name}"))?;

            info!("set {name}={value}");
        }
        Commands::Unset { name } => {
            env.unset(&name)
                .with_context(|| format!("failed to unset {name}"))?;

            info!("unset {name}");
        }
    }

    Ok(())
}

/// journald priority prefixes
fn format_record<W: Write + ?Sized>(buf: &mut W, record: &Record) -> io::Result<()> {
    match record.level() {
        Level::Info => writeln!(buf, "<6>{}: {}", record.target(), record.args()),
        Level::Warn => writeln!(buf, "<4>{}: {}", record.target(), record.args()),
        Level::Error => writeln!(buf, "<3>{}: {}", record.target(), record.args()),
        _ => writeln!(buf, "<7>{}: {}", record.target(), record.args()),
    }
}

fn main() {
    log_panics::init();

    let mut builder = if cfg!(debug_assertions) {
        Builder::from_env(Env::default().default_filter_or("warn, omnect_uboot_env=debug"))
    } else {
        Builder::from_env(Env::default().default_filter_or("warn, omnect_uboot_env=info"))
    };

    builder.format(|buf, record| format_record(buf, record));

    // stdout carries the printed variables
    builder.target(Target::Stderr).init();

    if let Err(e) = run(Cli::parse()) {
        error!("application error: {e:#}");

        process::exit(1);
    }
}
