//! Indexed PNG reading and writing.

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use anyhow::{bail, Context, Result};
use log::{info, warn};

use crate::{
    common::{ColorIdx, IndexedImage, Rgb},
    helpers::bitmask,
};

/// An indexed image together with the color table from its PLTE chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedPng {
    pub image: IndexedImage,
    pub palette: Vec<Rgb>,
}

// Sub-byte pixels are packed most significant bits first.
fn unpack_row(line: &[u8], width: usize, bit_depth: u8, out: &mut Vec<ColorIdx>) {
    if bit_depth == 8 {
        out.extend_from_slice(&line[..width]);
        return;
    }
    let per_byte = (8 / bit_depth) as usize;
    let mask = bitmask(bit_depth) as u8;
    for x in 0..width {
        let shift = 8 - bit_depth as usize * (x % per_byte + 1);
        out.push(line[x / per_byte] >> shift & mask);
    }
}

/// Reads an indexed PNG of any bit depth into one byte per pixel.
pub fn read_indexed_png(path: &Path) -> Result<IndexedPng> {
    info!("Loading {}", path.display());
    let file = File::open(path).with_context(|| format!("Unable to open {}", path.display()))?;
    let mut decoder = png::Decoder::new(BufReader::new(file));
    decoder.set_transformations(png::Transformations::IDENTITY);
    let mut reader = decoder
        .read_info()
        .with_context(|| format!("Unable to decode {}", path.display()))?;

    let info = reader.info();
    if info.color_type != png::ColorType::Indexed {
        bail!(
            "{} is not an indexed PNG (color type {:?})",
            path.display(),
            info.color_type
        );
    }
    let palette: Vec<Rgb> = info
        .palette
        .as_ref()
        .context("Indexed PNG has no palette")?
        .chunks_exact(3)
        .map(|c| Rgb::new(c[0], c[1], c[2]))
        .collect();

    let mut buf = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buf)?;
    let (width, height) = (frame.width as usize, frame.height as usize);
    let bit_depth = frame.bit_depth as u8;

    let mut pixels = Vec::with_capacity(width * height);
    for line in buf[..frame.buffer_size()].chunks(frame.line_size).take(height) {
        unpack_row(line, width, bit_depth, &mut pixels);
    }
    Ok(IndexedPng {
        image: IndexedImage { width, height, pixels },
        palette,
    })
}

/// Writes an 8-bit indexed PNG. `trns` marks one palette index as fully
/// transparent.
///
/// The PLTE chunk always covers every index used by `image`: a palette too
/// short for the pixels is padded with black.
pub fn write_indexed_png(path: &Path, image: &IndexedImage, palette: &[Rgb], trns: Option<ColorIdx>) -> Result<()> {
    info!("Saving {}", path.display());
    if palette.is_empty() {
        bail!("Cannot write an indexed PNG without colors");
    }
    if palette.len() > 256 {
        warn!("Only the first 256 of {} colors fit in a PNG palette", palette.len());
    }
    let mut palette = palette[..palette.len().min(256)].to_vec();
    if let Some(&max) = image.pixels.iter().max() {
        let needed = max as usize + 1;
        if needed > palette.len() {
            warn!(
                "Pixel index {} is outside the {}-color palette; padding with black",
                max,
                palette.len()
            );
            palette.resize(needed, Rgb::default());
        }
    }

    let file = File::create(path).with_context(|| format!("Unable to create {}", path.display()))?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), image.width as u32, image.height as u32);
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_palette(palette.iter().flat_map(|&c| <[u8; 3]>::from(c)).collect::<Vec<u8>>());
    if let Some(idx) = trns {
        let idx = idx as usize;
        if idx >= palette.len() {
            bail!("Transparent index {} is outside the {}-color palette", idx, palette.len());
        }
        let mut alpha = vec![255u8; idx + 1];
        alpha[idx] = 0;
        encoder.set_trns(alpha);
    }

    let mut writer = encoder.write_header()?;
    writer.write_image_data(&image.pixels)?;
    writer.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("chrpack-png-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    fn write_raw(path: &Path, width: u32, height: u32, color: png::ColorType, depth: png::BitDepth, data: &[u8]) {
        let file = File::create(path).unwrap();
        let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
        encoder.set_color(color);
        encoder.set_depth(depth);
        if color == png::ColorType::Indexed {
            encoder.set_palette(vec![0, 0, 0, 85, 85, 85, 170, 170, 170, 255, 255, 255]);
        }
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(data).unwrap();
    }

    #[test]
    fn test_unpack_row() {
        let mut out = vec![];
        unpack_row(&[0b1110_0100, 0b1100_0000], 5, 2, &mut out);
        assert_eq!(out, vec![3, 2, 1, 0, 3]);

        out.clear();
        unpack_row(&[0xA5], 2, 4, &mut out);
        assert_eq!(out, vec![0xA, 0x5]);

        out.clear();
        unpack_row(&[0b1000_0001], 8, 1, &mut out);
        assert_eq!(out, vec![1, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_write_then_read() {
        let path = scratch_path("round_trip.png");
        let image = IndexedImage {
            width: 3,
            height: 2,
            pixels: vec![0, 1, 2, 2, 1, 0],
        };
        let palette = vec![Rgb::new(1, 2, 3), Rgb::new(4, 5, 6), Rgb::new(7, 8, 9)];
        write_indexed_png(&path, &image, &palette, Some(0)).unwrap();

        let png = read_indexed_png(&path).unwrap();
        assert_eq!(png.image, image);
        assert_eq!(png.palette, palette);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_read_2bpp() {
        let path = scratch_path("two_bit.png");
        // Two rows of 5 pixels, each row padded to a whole byte.
        write_raw(
            &path,
            5,
            2,
            png::ColorType::Indexed,
            png::BitDepth::Two,
            &[0b0001_1011, 0b0000_0000, 0b1111_1111, 0b0100_0000],
        );
        let png = read_indexed_png(&path).unwrap();
        assert_eq!(png.image.width, 5);
        assert_eq!(png.image.pixels, vec![0, 1, 2, 3, 0, 3, 3, 3, 3, 1]);
        assert_eq!(png.palette.len(), 4);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_rejects_non_indexed() {
        let path = scratch_path("rgb.png");
        write_raw(&path, 1, 1, png::ColorType::Rgb, png::BitDepth::Eight, &[1, 2, 3]);
        let err = read_indexed_png(&path).unwrap_err();
        assert!(err.to_string().contains("not an indexed PNG"));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_short_palette_padded_to_pixels() {
        let path = scratch_path("short_palette.png");
        let image = IndexedImage {
            width: 2,
            height: 1,
            pixels: vec![0, 3],
        };
        write_indexed_png(&path, &image, &[Rgb::new(10, 20, 30)], Some(3)).unwrap();

        let png = read_indexed_png(&path).unwrap();
        assert_eq!(png.image, image);
        assert_eq!(
            png.palette,
            vec![Rgb::new(10, 20, 30), Rgb::default(), Rgb::default(), Rgb::default()]
        );
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_trns_index_checked() {
        let path = scratch_path("trns.png");
        let image = IndexedImage::new(1, 1);
        assert!(write_indexed_png(&path, &image, &[Rgb::default()], Some(3)).is_err());
        assert!(write_indexed_png(&path, &image, &[], None).is_err());
        let _ = std::fs::remove_file(&path);
    }
}
