// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use ledgerd::api;
use ledgerd::config::Config;
use ledgerd::db::{self, Db};
use ledgerd::service::Ledger;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();

    let db_path = match config.db.clone() {
        Some(path) => path,
        None => db::default_db_path()?,
    };
    let db = Db::open(&db_path, config.read_connections)
        .with_context(|| format!("open database at {}", db_path.display()))?;
    info!(path = %db_path.display(), "database ready");

    let ledger = Ledger::new(db.clone());
    let app = api::router(ledger, Duration::from_secs(config.request_timeout));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("bind {}", config.bind))?;
    info!(addr = %config.bind, "listening");

    let mut sigint = signal(SignalKind::interrupt()).context("register SIGINT handler")?;
    let mut sigterm = signal(SignalKind::terminate()).context("register SIGTERM handler")?;

    // The server drains in-flight requests once the stop side fires.
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                stop_rx.await.ok();
            })
            .await
    });

    tokio::select! {
        _ = sigint.recv() => info!("shutdown signal received"),
        _ = sigterm.recv() => info!("shutdown signal received"),
        result = &mut server => {
            result.context("server task panicked")??;
            return Err(anyhow!("server exited unexpectedly"));
        }
    }

    info!("gracefully shutting down server...");
    let _ = stop_tx.send(());
    match tokio::time::timeout(Duration::from_secs(config.shutdown_grace), &mut server).await {
        Ok(result) => result.context("server task panicked")??,
        Err(_) => {
            warn!("timeout exceeded, forcing shutdown");
            server.abort();
        }
    }

    info!("closing primary and reader connections...");
    db.close();

    Ok(())
}
