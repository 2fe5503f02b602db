//! Command-line flags.

use clap::Parser;
use std::time::Duration;
use tunbench::BenchmarkConfig;
use tunbench_common::DEFAULT_SERVER_HOST;

#[derive(Parser, Debug)]
#[command(
    name = "tunbench-httpget",
    version,
    about = "Measure HTTP GET latency through a table-cipher tunnel",
    long_about = "Opens --nc concurrent connections through the tunnel proxy, issues --nr \
                  sequential GET requests on each, and reports request counts, total time, \
                  mean and standard deviation."
)]
pub struct Args {
    /// Tunnel proxy host
    #[arg(short = 's', long, default_value = DEFAULT_SERVER_HOST, env = "TUNBENCH_SERVER")]
    pub server: String,

    /// Tunnel proxy port
    #[arg(short = 'p', long, env = "TUNBENCH_PORT")]
    pub port: u16,

    /// Shared password the cipher table is derived from
    #[arg(short = 'k', long, env = "TUNBENCH_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Number of CPU cores to use
    #[arg(long = "core", default_value_t = 1, env = "TUNBENCH_CORES")]
    pub cores: usize,

    /// Number of concurrent connections to the server
    #[arg(long = "nc", visible_alias = "connections", default_value_t = 1)]
    pub connections: usize,

    /// Number of requests issued on each connection
    #[arg(long = "nr", visible_alias = "requests", default_value_t = 1)]
    pub requests: usize,

    /// Print response bodies to stderr
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Fail a request that takes longer than this many milliseconds
    #[arg(long, env = "TUNBENCH_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Target URL; `http://` is assumed when no scheme is given
    pub url: String,
}

impl Args {
    pub fn into_config(self) -> tunbench::Result<BenchmarkConfig> {
        BenchmarkConfig::builder()
            .url(self.url)
            .server(self.server)
            .port(self.port)
            .password(self.password)
            .cores(self.cores)
            .workers(self.connections)
            .requests_per_worker(self.requests)
            .debug(self.debug)
            .request_timeout(self.timeout_ms.map(Duration::from_millis))
            .build()
    }
}
