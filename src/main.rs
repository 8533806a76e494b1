use allowance_ledger::args::{Args, Command};
use allowance_ledger::{commands, Config, Result, Tracker};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().allowance_home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => {
            commands::init(home, init_args.transactions_path(), init_args.state_path())
                .await?
                .print()
        }
        Command::Balance => commands::balance(&tracker(home).await?).await?.print(),
        Command::History(history_args) => {
            commands::history(&tracker(home).await?, history_args.order())
                .await?
                .print()
        }
        Command::Add(add_args) => commands::add(
            &tracker(home).await?,
            add_args.description(),
            add_args.amount(),
        )
        .await?
        .print(),
        Command::Allowance => commands::allowance(&tracker(home).await?).await?.print(),
        Command::Export(export_args) => commands::export(
            &tracker(home).await?,
            export_args.output(),
            export_args.order(),
        )
        .await?
        .print(),
    };
    Ok(())
}

/// Loads the config in `home` and opens the files it names.
async fn tracker(home: &Path) -> Result<Tracker> {
    let config = Config::load(home).await?;
    Ok(Tracker::from_config(&config))
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
