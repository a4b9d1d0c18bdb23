//! Native client for the synchronized desktop.
//!
//! [`sync_loop::follow`] keeps a [`desktop_runtime::DesktopController`] in step with the push
//! channel, reconnecting with capped exponential backoff. [`HttpCommandTransport`] delivers
//! gateway commands. The `desktop_sync_client` binary wraps both in a small CLI.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod cli;
mod error;
pub mod logging;
pub mod sync_loop;
pub mod transport;
mod url;

pub use error::SyncClientError;
pub use transport::HttpCommandTransport;
pub use url::sync_url;
