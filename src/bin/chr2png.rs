use std::{path::PathBuf, time::Instant};

use anyhow::{bail, Result};
use chrpack::{
    chunk::{decode_bank, render_tiles},
    common::grayscale_ramp,
    config::RuntimeConfig,
    persist::read_binary,
    png_io::write_indexed_png,
    ConverterRegistry,
};
use clap::Parser;
use log::debug;

#[derive(Parser, Debug)]
#[command(name = "chr2png", about = "Render tile data to an indexed PNG")]
struct Args {
    /// Packed tile data to render
    #[arg(long)]
    chr_data: PathBuf,

    /// Packed palette data; a grayscale ramp is used when omitted
    #[arg(long)]
    pal_data: Option<PathBuf>,

    /// PNG file to write
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// Tiles per row
    #[arg(long, default_value_t = 16)]
    columns: usize,

    /// Make one palette index transparent
    #[arg(long)]
    trns: bool,

    /// The index made transparent by --trns
    #[arg(long, default_value_t = 0)]
    trns_index: u8,

    #[command(flatten)]
    runtime: RuntimeConfig,
}

fn main() -> Result<()> {
    let args = Args::parse();
    args.runtime.init_logging();

    let defs = args.runtime.load_defs()?;
    let gfx = defs.resolve(&args.runtime.selection())?;
    let converters = args.runtime.converters(&ConverterRegistry::default())?;

    let data = read_binary(&args.chr_data)?;
    let start = Instant::now();
    let tiles = decode_bank(gfx.chrdef, &data, converters.tile.decode);
    if tiles.is_empty() {
        bail!("{} does not hold a single complete tile", args.chr_data.display());
    }
    debug!("Decoded {} tiles in {:?}", tiles.len(), start.elapsed());

    let palette = match &args.pal_data {
        Some(path) => {
            let pal = read_binary(path)?;
            converters.decode_palette(gfx.paldef, gfx.coldef, &pal, args.runtime.subpalette)?
        }
        None => grayscale_ramp(1 << gfx.chrdef.bitplanes()),
    };

    let trns = args.trns.then_some(args.trns_index);
    let image = render_tiles(gfx.chrdef, &tiles, args.columns, trns.unwrap_or(0));
    write_indexed_png(&args.output, &image, &palette, trns)?;
    Ok(())
}
