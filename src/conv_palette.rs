//! Palette conversion between color lists and packed palette data.
//!
//! Entry `e` of subpalette `k` is a field of `entry_datasize` bits starting at
//! bit `k * subpal_datasize + e * entry_datasize` of the palette. Each entry
//! is converted with the supplied color function and written in the color
//! definition's endianness.

use std::ops::Range;

use log::{debug, warn};

use crate::{
    common::Rgb,
    error::GfxError,
    gfxdef::{ColDef, GfxDef, PalDef},
    helpers::{bytes_for_bits, read_field, write_field},
    registry::{ColorDecoder, ColorEncoder},
};

/// A full palette is never converted past this many entries, so the result
/// stays addressable by 8-bit pixel indices.
pub const MAX_PALETTE_ENTRIES: usize = 256;

/// The entries a request covers and the number of bytes they span,
/// measured from the start of the full palette.
fn palette_span(paldef: &PalDef, subpalette: Option<usize>) -> Result<(Range<usize>, usize), GfxError> {
    let entries = match subpalette {
        Some(index) => {
            let count = paldef.subpal_count() as usize;
            if index >= count {
                return Err(GfxError::SubpaletteOutOfRange { index, count });
            }
            let length = paldef.subpal_length() as usize;
            index * length..(index + 1) * length
        }
        None => {
            let length = paldef.palette_length();
            if length > MAX_PALETTE_ENTRIES {
                warn!(
                    "Palette '{}' has {} entries; only the first {} are converted",
                    paldef.id(),
                    length,
                    MAX_PALETTE_ENTRIES
                );
            }
            0..length.min(MAX_PALETTE_ENTRIES)
        }
    };

    let end_bit = match subpalette {
        Some(index) => (index + 1) * paldef.subpal_datasize() as usize,
        None if entries.end == paldef.palette_length() => paldef.palette_datasize(),
        None => paldef.entry_offset(entries.end - 1) + paldef.entry_datasize() as usize,
    };
    Ok((entries, bytes_for_bits(end_bit)))
}

fn check_entry_width(paldef: &PalDef, coldef: &ColDef) {
    if coldef.datasize() > paldef.entry_datasize() {
        warn!(
            "Color format '{}' needs {} bits but palette '{}' entries hold {}; high bits are dropped",
            coldef.id(),
            coldef.datasize(),
            paldef.id(),
            paldef.entry_datasize()
        );
    }
}

/// Packs `colors` into palette data.
///
/// With `Some(index)` only that subpalette is converted (colors
/// `[index * subpal_length, (index + 1) * subpal_length)`) and the result is
/// `subpal_datasize_bytes` long. With `None` the whole palette is converted,
/// up to [`MAX_PALETTE_ENTRIES`] entries. Colors missing from `colors` are
/// written as black.
pub fn encode_palette(
    paldef: &PalDef,
    coldef: &ColDef,
    colors: &[Rgb],
    subpalette: Option<usize>,
    color_encoder: ColorEncoder,
) -> Result<Vec<u8>, GfxError> {
    let (entries, end_byte) = palette_span(paldef, subpalette)?;
    check_entry_width(paldef, coldef);
    if colors.len() < entries.end {
        debug!(
            "{} colors supplied for {} palette entries; padding with black",
            colors.len(),
            entries.end
        );
    }

    // A single subpalette is written as if it were the first one.
    let (base_bit, out_len) = match subpalette {
        Some(index) => (index * paldef.subpal_datasize() as usize, paldef.subpal_datasize_bytes()),
        None => (0, end_byte),
    };
    let mut out = vec![0u8; out_len];
    for idx in entries {
        let rgb = colors.get(idx).copied().unwrap_or_default();
        let word = color_encoder(coldef, rgb);
        write_field(
            &mut out,
            paldef.entry_offset(idx) - base_bit,
            paldef.entry_datasize(),
            word,
            coldef.is_big_endian(),
        );
    }
    Ok(out)
}

/// Unpacks colors from full palette data.
///
/// `data` always holds the palette from its first subpalette; `Some(index)`
/// selects which subpalette to read. With `None` every entry is read, up to
/// [`MAX_PALETTE_ENTRIES`].
pub fn decode_palette(
    paldef: &PalDef,
    coldef: &ColDef,
    data: &[u8],
    subpalette: Option<usize>,
    color_decoder: ColorDecoder,
) -> Result<Vec<Rgb>, GfxError> {
    let (entries, end_byte) = palette_span(paldef, subpalette)?;
    if data.len() < end_byte {
        return Err(GfxError::DataTooShort {
            expected: end_byte,
            actual: data.len(),
        });
    }

    entries
        .map(|idx| {
            let word = read_field(
                data,
                paldef.entry_offset(idx),
                paldef.entry_datasize(),
                coldef.is_big_endian(),
            );
            color_decoder(coldef, word)
        })
        .collect()
}
