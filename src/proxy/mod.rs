//! Spreadsheet proxy.
//!
//! Serves the quiz as JSON over HTTP with permissive CORS, reading the
//! questions from a spreadsheet on every `GET`. One upstream attempt per
//! request; failures become a 500 carrying the error message.

mod config;
pub mod http;
mod server;
mod upstream;

pub use config::{ProxyConfig, DEFAULT_PROXY_ADDR};
pub use server::{handle_request, run, serve, ProxyError};
pub use upstream::{GoogleSheets, SheetSource, UpstreamFetchError, DEFAULT_SHEETS_BASE_URL};
