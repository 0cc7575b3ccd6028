//! Report transport for the poller
//!
//! The poller talks to peers only through [`ReportClientPool`] and
//! [`ReportClient`]; [`HttpClientPool`] is the shipped transport.

pub mod client;
mod error;
mod http;

pub use client::{ReportClient, ReportClientPool};
pub use error::TransportError;
pub use http::{HttpClientPool, HttpReportClient};
