//! Command-line interface parsing for pokefetch
//!
//! This module handles parsing of CLI arguments using clap and turns them into a
//! validated `RunConfig`. Field names are checked here, before any component is
//! built, so a typo fails the run without touching the network.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::data::DEFAULT_BASE_URL;
use crate::fetch::FetchOptions;
use crate::fields::{parse_field_list, Field, UnknownFieldError};

/// Default report file name
pub const DEFAULT_OUTPUT: &str = "pokemon_data.csv";

/// Default field selection
pub const DEFAULT_FIELDS: &str = "name,speed,sprite";

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// A requested field is not recognized
    #[error(transparent)]
    UnknownField(#[from] UnknownFieldError),

    /// The field list contained no field names
    #[error("No fields requested. Pass at least one name to --fields")]
    NoFields,
}

/// Fetch Pokémon data from PokeAPI and save it to CSV
#[derive(Parser, Debug)]
#[command(name = "pokefetch")]
#[command(about = "Fetch Pokémon data from PokeAPI and save it to CSV")]
#[command(version)]
pub struct Cli {
    /// Ignore cached data and fetch everything again (the cache is rewritten)
    #[arg(long)]
    pub force_refresh: bool,

    /// Process only the first N Pokémon
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Output CSV file name
    #[arg(long, value_name = "FILE", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Comma-separated list of fields to fetch
    ///
    /// Available fields: name, id, height, weight, hp, attack, defense,
    /// special-attack, special-defense, speed, types, sprite
    #[arg(long, value_name = "LIST", conflicts_with_all = ["all_stats", "all_fields"])]
    pub fields: Option<String>,

    /// Include name, id, every base stat and the sprite
    #[arg(long, conflicts_with = "all_fields")]
    pub all_stats: bool,

    /// Include every available field
    #[arg(long)]
    pub all_fields: bool,

    /// Download sprite images and report local paths (default)
    #[arg(long, overrides_with = "no_download_images")]
    pub download_images: bool,

    /// Do not download sprite images, report their URLs instead
    #[arg(long, overrides_with = "download_images")]
    pub no_download_images: bool,

    /// Directory for cached API responses
    #[arg(long, value_name = "DIR", default_value = "cache")]
    pub cache_dir: PathBuf,

    /// Directory for downloaded sprite images
    #[arg(long, value_name = "DIR", default_value = "sprites")]
    pub sprites_dir: PathBuf,

    /// PokeAPI base URL
    #[arg(long, value_name = "URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Show debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    pub verbose: bool,
}

/// Validated configuration for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Report columns in order, without duplicates
    pub fields: Vec<Field>,
    /// Bypass cache reads
    pub force_refresh: bool,
    /// Maximum number of Pokémon to process
    pub limit: Option<usize>,
    /// Whether sprites are downloaded
    pub download_images: bool,
    /// Report destination
    pub output: PathBuf,
    /// JSON cache directory
    pub cache_dir: PathBuf,
    /// Sprite image directory
    pub sprites_dir: PathBuf,
    /// API base URL
    pub base_url: String,
}

impl RunConfig {
    /// Creates a RunConfig from parsed CLI arguments.
    ///
    /// # Arguments
    /// * `cli` - The parsed CLI struct
    ///
    /// # Returns
    /// * `Ok(RunConfig)` with presets expanded and fields validated
    /// * `Err(CliError)` if a field name is unknown or none were given
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let fields = if cli.all_fields {
            Field::ALL.to_vec()
        } else if cli.all_stats {
            Field::all_stats_preset()
        } else {
            parse_field_list(cli.fields.as_deref().unwrap_or(DEFAULT_FIELDS))?
        };

        if fields.is_empty() {
            return Err(CliError::NoFields);
        }

        Ok(RunConfig {
            fields,
            force_refresh: cli.force_refresh,
            limit: cli.limit,
            download_images: !cli.no_download_images,
            output: cli.output.clone(),
            cache_dir: cli.cache_dir.clone(),
            sprites_dir: cli.sprites_dir.clone(),
            base_url: cli.base_url.clone(),
        })
    }

    /// The subset of settings the fetcher needs
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            fields: self.fields.clone(),
            force_refresh: self.force_refresh,
            limit: self.limit,
            download_images: self.download_images,
        }
    }

    /// True when sprite images will be written to the sprites directory
    pub fn saves_sprites(&self) -> bool {
        self.download_images && self.fields.contains(&Field::Sprite)
    }
}
