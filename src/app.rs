//! Wires the registry, scheduler, HTTP server and live view together.

use log::{error, info};

use crate::api;
use crate::config::Config;
use crate::error::Result;
use crate::ping_executor::PingExecutor;
use crate::registry::StatsRegistry;
use crate::scheduler::Scheduler;
use crate::view;

/// Runs the monitor until `shutdown` resolves or the HTTP server stops, then
/// stops every task and waits for it.
///
/// Startup failures and HTTP server errors are returned; task panics are
/// logged.
pub async fn run<F>(config: Config, live: bool, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    info!("Starting Network Monitor");
    info!("Monitoring hosts: {:?}", config.hosts);
    info!("Ping interval: {}", humantime::format_duration(config.interval));
    info!("Web server port: {}", config.port);
    info!("Note: this program requires raw socket access. Run with sudo if needed.");

    let registry = StatsRegistry::new(config.hosts.iter().cloned());
    let listener = api::bind(config.listen_addr()).await?;

    let scheduler = Scheduler::new(
        registry.clone(),
        PingExecutor::new(config.probe_timeout),
        config.interval,
    );
    scheduler.start()?;

    let shutdown_token = scheduler.shutdown_token();
    let mut http_handle = tokio::spawn(api::serve(
        listener,
        api::router(registry.clone(), config.thresholds()),
        shutdown_token.clone(),
    ));

    let live_handle = live.then(|| {
        tokio::spawn(view::run_live(
            registry.clone(),
            config.thresholds(),
            shutdown_token.clone(),
        ))
    });

    let http_result = tokio::select! {
        () = shutdown => {
            info!("Shutting down");
            None
        }
        result = &mut http_handle => {
            error!("http server stopped unexpectedly");
            Some(result)
        }
    };

    scheduler.shutdown().await;

    let http_result = match http_result {
        Some(result) => result,
        None => http_handle.await,
    };

    if let Some(handle) = live_handle {
        if let Err(e) = handle.await {
            error!("live view task failed: {e}");
        }
    }

    match http_result {
        Ok(result) => result?,
        Err(e) => error!("http server task failed: {e}"),
    }

    info!("net-monitor shutdown cleanly. goodbye.");
    Ok(())
}
