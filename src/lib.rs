//! Library exposing public functions and types that underlie the `aic` CLI utility for
//! querying the Azure Application Insights telemetry REST API.
#![warn(missing_docs)]

mod client;
pub use client::*;
mod cli;
pub use cli::*;
mod config;
pub use config::*;
