use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod actions;
mod commands;

#[derive(Parser)]
#[command(
    name = "docker-run",
    version,
    about = "Run shell commands inside a running container"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run commands inside a running container with this process's environment
    Exec(commands::exec::ExecArgs),
    /// Force-remove the container recorded by an earlier step
    Cleanup(commands::cleanup::CleanupArgs),
    /// Print version and exit
    Version,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Exec(args) => commands::exec::run(args)?,
        Commands::Cleanup(args) => commands::cleanup::run(args)?,
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
    }
    Ok(())
}
