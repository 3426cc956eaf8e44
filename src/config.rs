//! Command-line options shared by the conversion tools.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::{
    catalog::{DefSelection, GfxDefs},
    persist::load_catalog,
    registry::{ConverterNames, ConverterRegistry, Converters, DEFAULT_CONVERTER},
};

#[derive(Args, Debug, Clone)]
pub struct RuntimeConfig {
    /// Graphics definitions file; the built-in definitions are used when omitted
    #[arg(short = 'G', long)]
    pub gfx_def: Option<PathBuf>,

    /// Hardware profile providing the default tile, color and palette formats
    #[arg(short = 'P', long)]
    pub profile: Option<String>,

    /// Tile format, overriding the profile's
    #[arg(short = 'T', long)]
    pub chr_def: Option<String>,

    /// Color format, overriding the profile's
    #[arg(short = 'C', long)]
    pub col_def: Option<String>,

    /// Palette format, overriding the profile's
    #[arg(short = 'L', long)]
    pub pal_def: Option<String>,

    /// Convert only this subpalette instead of the whole palette
    #[arg(short = 's', long)]
    pub subpalette: Option<usize>,

    #[arg(long, default_value = DEFAULT_CONVERTER)]
    pub chr_converter: String,

    #[arg(long, default_value = DEFAULT_CONVERTER)]
    pub col_converter: String,

    #[arg(long, default_value = DEFAULT_CONVERTER)]
    pub pal_converter: String,

    /// Log progress and timings
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl RuntimeConfig {
    /// Sets up logging to stderr. `RUST_LOG` still takes precedence.
    pub fn init_logging(&self) {
        let level = if self.verbose { "debug" } else { "warn" };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
            .target(env_logger::Target::Stderr)
            .init();
    }

    pub fn selection(&self) -> DefSelection {
        DefSelection {
            profile: self.profile.clone(),
            chrdef: self.chr_def.clone(),
            coldef: self.col_def.clone(),
            paldef: self.pal_def.clone(),
        }
    }

    pub fn converter_names(&self) -> ConverterNames {
        ConverterNames {
            tile: self.chr_converter.clone(),
            color: self.col_converter.clone(),
            palette: self.pal_converter.clone(),
        }
    }

    pub fn load_defs(&self) -> Result<GfxDefs> {
        load_catalog(self.gfx_def.as_deref())
    }

    pub fn converters(&self, registry: &ConverterRegistry) -> Result<Converters> {
        registry
            .resolve(&self.converter_names())
            .context("Unable to select converters")
    }
}
