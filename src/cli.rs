//! Command-line interface parsing for the Pokédex
//!
//! This module handles parsing of CLI arguments using clap and validates them
//! into a `StartupConfig` before the terminal is taken over.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::data::{DEFAULT_BASE_URL, DEFAULT_LIST_LIMIT};
use crate::query::{QueryConfig, DEFAULT_KEEP_UNUSED_FOR};

/// Largest page PokéAPI serves without pagination tricks
pub const MAX_LIST_LIMIT: u32 = 100;

/// Error types for CLI argument validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    /// The list limit is outside the accepted range
    #[error("Invalid limit: {0}. Must be between 1 and 100")]
    InvalidLimit(u32),

    /// The base URL is not an http(s) URL
    #[error("Invalid base URL: '{0}'. Must start with http:// or https://")]
    InvalidBaseUrl(String),

    /// The Pokémon name is empty
    #[error("Pokémon name must not be empty")]
    EmptyPokemonName,
}

/// Pokédex - browse Pokémon from PokéAPI in the terminal
#[derive(Parser, Debug)]
#[command(name = "pokedex")]
#[command(about = "Browse Pokémon from PokéAPI in the terminal")]
#[command(version)]
pub struct Cli {
    /// Open directly on the detail screen for this Pokémon
    ///
    /// Examples:
    ///   pokedex --pokemon pikachu
    #[arg(long, value_name = "NAME")]
    pub pokemon: Option<String>,

    /// Number of Pokémon to list
    #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
    pub limit: u32,

    /// PokéAPI root URL
    #[arg(long, value_name = "URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Seconds to keep a cached query after nothing uses it
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_KEEP_UNUSED_FOR.as_secs())]
    pub keep_unused_for: u64,

    /// Refetch cached data older than this many seconds
    #[arg(long, value_name = "SECS")]
    pub max_age: Option<u64>,

    /// Write logs to this file (also settable via POKEDEX_LOG)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupConfig {
    /// Pokémon to show first instead of the list
    pub initial_pokemon: Option<String>,
    pub list_limit: u32,
    /// API root without trailing slash
    pub base_url: String,
    pub query: QueryConfig,
    pub log_file: Option<PathBuf>,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            initial_pokemon: None,
            list_limit: DEFAULT_LIST_LIMIT,
            base_url: DEFAULT_BASE_URL.to_string(),
            query: QueryConfig::default(),
            log_file: None,
        }
    }
}

/// Validates a base URL and strips trailing slashes
pub fn parse_base_url(s: &str) -> Result<String, CliError> {
    let trimmed = s.trim().trim_end_matches('/');
    let has_host = ["http://", "https://"]
        .iter()
        .any(|scheme| trimmed.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty()));
    if has_host {
        Ok(trimmed.to_string())
    } else {
        Err(CliError::InvalidBaseUrl(s.to_string()))
    }
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with validated settings
    /// * `Err(CliError)` if any argument is out of range
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.limit == 0 || cli.limit > MAX_LIST_LIMIT {
            return Err(CliError::InvalidLimit(cli.limit));
        }

        let initial_pokemon = match &cli.pokemon {
            None => None,
            Some(name) => {
                let name = name.trim().to_lowercase();
                if name.is_empty() {
                    return Err(CliError::EmptyPokemonName);
                }
                Some(name)
            }
        };

        Ok(StartupConfig {
            initial_pokemon,
            list_limit: cli.limit,
            base_url: parse_base_url(&cli.base_url)?,
            query: QueryConfig {
                keep_unused_for: Duration::from_secs(cli.keep_unused_for),
                max_age: cli.max_age.map(Duration::from_secs),
            },
            log_file: cli.log_file.clone(),
        })
    }
}
