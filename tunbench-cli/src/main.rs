//! tunbench-httpget
//!
//! Concurrent HTTP GET latency benchmark through a table-cipher tunnel.

// Use mimalloc as the global allocator for better performance
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod args;
mod logging;

use anyhow::{Context, Result};
use args::Args;
use clap::{CommandFactory, Parser};
use std::sync::Arc;
use tracing::{info, warn};
use tunbench::{stderr_sink, BenchReport, BenchmarkConfig, Coordinator, TableDialer};

fn main() -> Result<()> {
    let args = Args::parse();
    let json = args.json;

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("{}", Args::command().render_usage());
            std::process::exit(1);
        }
    };

    logging::init_logging();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.cores)
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let report = runtime.block_on(run(config));

    if json {
        println!("{}", report.to_json().context("failed to encode report")?);
    } else {
        print!("{report}");
    }
    Ok(())
}

async fn run(config: BenchmarkConfig) -> BenchReport {
    info!(
        "tunbench-httpget v{} via {}",
        env!("CARGO_PKG_VERSION"),
        config.server_addr()
    );

    let dialer = TableDialer::from_password(config.server_addr(), &config.password);
    let debug = config.debug;
    let mut coordinator = Coordinator::new(Arc::new(config), Arc::new(dialer));
    if debug {
        coordinator = coordinator.with_sink(stderr_sink());
    }

    let cancel = coordinator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, stopping workers");
            cancel.cancel();
        }
    });

    coordinator.run().await
}
