//! Defaults shared by the library crates and the CLI.

/// Port assumed when the target URL does not carry one.
pub const DEFAULT_HTTP_PORT: u16 = 80;

/// Proxy host used when `--server` is not given.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// A worker logs its progress every this many completed requests.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 1000;

/// Scheme prepended to targets given as a bare `host/path`.
pub const HTTP_SCHEME_PREFIX: &str = "http://";
