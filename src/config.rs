// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Runtime configuration, parsed from the command line.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about = "HTTP ledger for income and expense items")]
pub struct Config {
    /// Path to the SQLite database file (defaults to the platform data dir)
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Number of read-only connections kept alongside the writer
    #[arg(long, default_value_t = 4)]
    pub read_connections: usize,

    /// Per-request deadline in seconds
    #[arg(long, default_value_t = 30)]
    pub request_timeout: u64,

    /// Seconds to wait for in-flight requests on shutdown
    #[arg(long, default_value_t = 5)]
    pub shutdown_grace: u64,
}
