//! # esxi-managerd — ESXi power manager daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (CLI args, `.env`, env vars, config file)
//! - Construct the SSH/Wake-on-LAN power controller (adapter)
//! - Construct the power service, injecting the controller via its port trait
//! - Spawn the schedule manager when management is enabled
//! - Build the axum router, injecting the power service
//! - Bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on the server-side adapters.
//! It is the wiring layer. No domain logic belongs here.

mod config;

use std::sync::Arc;

use clap::Parser;
use esxi_manager_adapter_http_axum::router;
use esxi_manager_adapter_http_axum::state::AppState;
use esxi_manager_adapter_ssh::SshPowerController;
use esxi_manager_app::services::power_service::PowerService;
use esxi_manager_app::services::schedule_manager::ScheduleManager;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{Cli, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();
    let config = Config::load(&cli)?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.logging.filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if dotenv.is_err() {
        tracing::warn!("no .env file found, relying on the process environment");
    }

    // Power
    let controller = SshPowerController::new(&config.esxi, &config.wol)?;
    tracing::info!(
        host = %config.esxi.address(),
        mac = %controller.mac(),
        "esxi host configured"
    );
    let power = Arc::new(PowerService::new(controller, config.power_policy()));
    let policy = power.policy();
    tracing::debug!(
        retry_count = policy.retry_count,
        retry_delay = ?policy.retry_delay,
        vm_shutdown_grace = ?policy.vm_shutdown_grace,
        "power policy"
    );

    // Schedule
    let shutdown = CancellationToken::new();
    let manager = if config.schedule.manage {
        let hours = config.operating_hours()?;
        let interval = config.poll_interval();
        let power = Arc::clone(&power);
        let token = shutdown.clone();
        Some(tokio::spawn(async move {
            ScheduleManager::start(power, hours, interval)
                .await
                .run(token)
                .await;
        }))
    } else {
        tracing::info!("schedule management disabled");
        None
    };

    // HTTP
    let app = router::build(AppState::from_arc(power));
    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "esxi-managerd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    if let Some(manager) = manager {
        shutdown.cancel();
        if let Err(err) = manager.await {
            tracing::error!(error = %err, "schedule manager task failed");
        }
    }

    tracing::info!("esxi-managerd stopped");
    Ok(())
}

/// Resolve on Ctrl-C or SIGTERM, then cancel `token`.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
    token.cancel();
}
