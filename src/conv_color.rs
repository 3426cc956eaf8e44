//! Color conversion between 8-bit RGB and hardware color values.
//!
//! The word-level functions ([`to_word`], [`from_word`]) are what the palette
//! codec and the converter registry work with; [`encode_color`] and
//! [`decode_color`] add byte serialization in the definition's endianness.

use crate::{
    common::Rgb,
    error::GfxError,
    gfxdef::{ColDef, ColorEncoding, RgbLayout},
    helpers::{bitmask, expand_bits, narrow_bits, read_field, shift_signed, write_field},
};

/// Index of the reference palette entry closest to `rgb` by squared
/// Euclidean distance. Ties go to the lowest index.
pub fn nearest_index(refpal: &[Rgb], rgb: Rgb) -> usize {
    let mut best_idx = 0;
    let mut best_dist = u32::MAX;
    for (idx, entry) in refpal.iter().enumerate() {
        let dist = entry.distance_sq(&rgb);
        if dist < best_dist {
            best_dist = dist;
            best_idx = idx;
            if dist == 0 {
                break;
            }
        }
    }
    best_idx
}

fn channel_bits(layout: &[RgbLayout]) -> [u8; 3] {
    let mut bits = [0u8; 3];
    for pass in layout {
        for (total, field) in bits.iter_mut().zip(pass.channels()) {
            *total += field.count;
        }
    }
    bits
}

fn layout_to_word(layout: &[RgbLayout], rgb: Rgb) -> u32 {
    let bits = channel_bits(layout);
    let values = [rgb.red, rgb.green, rgb.blue];
    let mut remaining: [u32; 3] = [0, 1, 2].map(|ch| narrow_bits(values[ch], bits[ch]) as u32);

    let mut word = 0u32;
    for pass in layout {
        for (value, field) in remaining.iter_mut().zip(pass.channels()) {
            let part = *value & bitmask(field.count);
            word |= shift_signed(part, -(field.shift as i32));
            *value >>= field.count;
        }
    }
    word
}

fn layout_from_word(layout: &[RgbLayout], word: u32) -> Rgb {
    let bits = channel_bits(layout);
    let mut values = [0u32; 3];
    let mut filled = [0u8; 3];

    for pass in layout {
        for ch in 0..3 {
            let field = pass.channels()[ch];
            let part = shift_signed(word, field.shift as i32) & bitmask(field.count);
            values[ch] |= part << filled[ch];
            filled[ch] += field.count;
        }
    }

    let [red, green, blue] = [0, 1, 2].map(|ch| expand_bits(values[ch] as u8, bits[ch]));
    Rgb { red, green, blue }
}

/// Converts an RGB color to its hardware value: packed channel bits for a
/// layout-based definition, or the nearest reference palette index.
pub fn to_word(coldef: &ColDef, rgb: Rgb) -> u32 {
    match coldef.encoding() {
        ColorEncoding::Layout(layout) => layout_to_word(layout, rgb),
        ColorEncoding::RefPal(refpal) => nearest_index(refpal, rgb) as u32,
    }
}

/// Converts a hardware color value back to RGB. Fails only for a reference
/// palette index past the end of the table.
pub fn from_word(coldef: &ColDef, word: u32) -> Result<Rgb, GfxError> {
    match coldef.encoding() {
        ColorEncoding::Layout(layout) => Ok(layout_from_word(layout, word)),
        ColorEncoding::RefPal(refpal) => {
            refpal
                .get(word as usize)
                .copied()
                .ok_or(GfxError::PaletteIndexOutOfRange {
                    index: word as usize,
                    size: refpal.len(),
                })
        }
    }
}

/// Packs a color into `coldef.datasize_bytes()` bytes, right-aligned in a
/// word of that many bytes.
pub fn encode_color(coldef: &ColDef, rgb: Rgb) -> Vec<u8> {
    let bytes = coldef.datasize_bytes();
    let mut out = vec![0u8; bytes];
    let word = to_word(coldef, rgb);
    write_field(&mut out, 0, (bytes * 8) as u8, word, coldef.is_big_endian());
    out
}

pub fn decode_color(coldef: &ColDef, data: &[u8]) -> Result<Rgb, GfxError> {
    let expected = coldef.datasize_bytes();
    if data.len() < expected {
        return Err(GfxError::DataTooShort {
            expected,
            actual: data.len(),
        });
    }
    let word = read_field(data, 0, (expected * 8) as u8, coldef.is_big_endian());
    from_word(coldef, word)
}
