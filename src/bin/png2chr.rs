use std::{path::PathBuf, time::Instant};

use anyhow::{bail, Result};
use chrpack::{
    chunk::{chunk_image, encode_bank},
    config::RuntimeConfig,
    persist::write_binary,
    png_io::read_indexed_png,
    ConverterRegistry,
};
use clap::Parser;
use log::debug;

#[derive(Parser, Debug)]
#[command(name = "png2chr", about = "Convert an indexed PNG to tile and palette data")]
struct Args {
    /// Indexed PNG to convert
    #[arg(long)]
    png_data: PathBuf,

    /// Write packed tiles here
    #[arg(long)]
    chr_output: Option<PathBuf>,

    /// Write the packed palette here
    #[arg(long)]
    pal_output: Option<PathBuf>,

    #[command(flatten)]
    runtime: RuntimeConfig,
}

fn main() -> Result<()> {
    let args = Args::parse();
    args.runtime.init_logging();
    if args.chr_output.is_none() && args.pal_output.is_none() {
        bail!("Nothing to do: specify --chr-output and/or --pal-output");
    }

    let defs = args.runtime.load_defs()?;
    let gfx = defs.resolve(&args.runtime.selection())?;
    let converters = args.runtime.converters(&ConverterRegistry::default())?;
    let png = read_indexed_png(&args.png_data)?;
    debug!(
        "{}x{} image with {} colors",
        png.image.width,
        png.image.height,
        png.palette.len()
    );

    if let Some(path) = &args.chr_output {
        let start = Instant::now();
        let tiles = chunk_image(gfx.chrdef, &png.image);
        let data = encode_bank(gfx.chrdef, &tiles, converters.tile.encode);
        debug!("Encoded {} tiles in {:?}", tiles.len(), start.elapsed());
        write_binary(path, &data)?;
    }

    if let Some(path) = &args.pal_output {
        let start = Instant::now();
        let data = converters.encode_palette(gfx.paldef, gfx.coldef, &png.palette, args.runtime.subpalette)?;
        debug!("Encoded palette in {:?}", start.elapsed());
        write_binary(path, &data)?;
    }

    Ok(())
}
