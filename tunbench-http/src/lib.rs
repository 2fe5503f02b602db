pub mod client;
pub mod executor;

pub use client::HttpClient;
pub use executor::{execute_one_request, stderr_sink, DiagnosticSink, RequestExecutor};
