//! Pokédex TUI Library
//!
//! A terminal client for PokéAPI built on a request-deduplicating query
//! cache. The binary in `main.rs` wires these modules to a real terminal.

pub mod app;
pub mod cli;
pub mod data;
pub mod logging;
pub mod query;
pub mod ui;
