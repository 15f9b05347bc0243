#![forbid(unsafe_code)]
#![deny(
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::redundant_pub_crate)]
#![allow(clippy::future_not_send)]

//! Headless client for the Atelier storefront API.
//!
//! Layout:
//! - `cli.rs`: argument parsing and command dispatch
//! - `commands/`: command handlers grouped by concern
//! - `client.rs`: HTTP implementation of the storefront API traits and CLI errors
//! - `credentials.rs`: file-backed credential store
//! - `output.rs`: renderers and formatting helpers
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod commands;
pub(crate) mod credentials;
pub(crate) mod output;

pub use cli::run;
