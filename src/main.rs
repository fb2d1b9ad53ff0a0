use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::error;
use net_monitor::{Args, Config, app};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let result = match Config::load(&args) {
        Ok(config) => app::run(config, args.live, shutdown_signal()).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Resolves on Ctrl-C. If the handler cannot be installed this never
/// resolves, leaving the monitor running until it is killed.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}
