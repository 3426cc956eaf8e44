//! Tile conversion between linear pixel indices and packed tile data.
//!
//! A single routine covers planar, packed and interleaved formats alike: the
//! [`ChrDef`] offset tables give the bit address of every plane of every
//! pixel, so no format needs its own code path.

use crate::{
    common::ColorIdx,
    gfxdef::ChrDef,
    helpers::{get_bit, set_bit},
};

/// Packs one tile. `pixels` holds `width * height` indices in row-major
/// order; bits above the tile's bit depth are ignored and missing pixels
/// count as index 0.
pub fn encode_tile(chrdef: &ChrDef, pixels: &[ColorIdx]) -> Vec<u8> {
    let mut out = vec![0u8; chrdef.datasize_bytes()];
    let width = chrdef.width() as usize;

    for (y, &rowoffset) in chrdef.rowoffset().iter().enumerate() {
        for (x, &pixeloffset) in chrdef.pixeloffset().iter().enumerate() {
            let Some(&pixel) = pixels.get(y * width + x) else {
                return out;
            };
            if pixel == 0 {
                continue;
            }
            for (plane, &planeoffset) in chrdef.planeoffset().iter().enumerate() {
                if pixel >> plane & 1 == 1 {
                    set_bit(&mut out, rowoffset + pixeloffset + planeoffset);
                }
            }
        }
    }
    out
}

/// Unpacks one tile into `width * height` row-major indices. Bytes missing
/// from a short `data` read as zero.
pub fn decode_tile(chrdef: &ChrDef, data: &[u8]) -> Vec<ColorIdx> {
    let mut out = Vec::with_capacity(chrdef.pixel_count());

    for &rowoffset in chrdef.rowoffset() {
        for &pixeloffset in chrdef.pixeloffset() {
            let mut pixel: ColorIdx = 0;
            for (plane, &planeoffset) in chrdef.planeoffset().iter().enumerate() {
                if get_bit(data, rowoffset + pixeloffset + planeoffset) {
                    pixel |= 1 << plane;
                }
            }
            out.push(pixel);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planar_2bpp(pixeloffset: Vec<u32>) -> ChrDef {
        ChrDef::new("nes", 8, 8, 2, vec![0, 64], pixeloffset, (0..8).map(|r| r * 8).collect()).unwrap()
    }

    fn nes() -> ChrDef {
        planar_2bpp((0..8).collect())
    }

    fn gameboy() -> ChrDef {
        ChrDef::new("gb", 8, 8, 2, vec![0, 8], (0..8).collect(), (0..8).map(|r| r * 16).collect()).unwrap()
    }

    fn genesis() -> ChrDef {
        ChrDef::new(
            "md",
            8,
            8,
            4,
            vec![3, 2, 1, 0],
            (0..8).map(|x| x * 4).collect(),
            (0..8).map(|r| r * 32).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_all_planes_set() {
        let chr = planar_2bpp((0..8).rev().collect());
        let out = encode_tile(&chr, &[3; 64]);
        assert_eq!(out, vec![0xFF; 16]);
        assert_eq!(decode_tile(&chr, &out), vec![3; 64]);
    }

    #[test]
    fn test_nes_decode_checkerboard() {
        let mut tile_data = vec![0u8; 16];
        // Low plane: alternating bits
        for row in 0..8 {
            tile_data[row] = if row % 2 == 0 { 0b10101010 } else { 0b01010101 };
        }
        // High plane: solid in top half
        for row in 8..12 {
            tile_data[row] = 0xFF;
        }

        let pixels = decode_tile(&nes(), &tile_data);
        assert_eq!(pixels[0], 3); // lo=1, hi=1
        assert_eq!(pixels[1], 2); // lo=0, hi=1
        assert_eq!(pixels[4 * 8], 1); // lo=1, hi=0
        assert_eq!(pixels[4 * 8 + 1], 0);
        assert_eq!(encode_tile(&nes(), &pixels), tile_data);
    }

    #[test]
    fn test_gameboy_interleaved_rows() {
        let mut tile_data = vec![0u8; 16];
        tile_data[0] = 0b10101010; // row 0 low plane
        tile_data[1] = 0b11111111; // row 0 high plane
        tile_data[2] = 0b01010101; // row 1 low plane

        let pixels = decode_tile(&gameboy(), &tile_data);
        assert_eq!(&pixels[0..4], &[3, 2, 3, 2]);
        assert_eq!(&pixels[8..12], &[0, 1, 0, 1]);
        assert!(pixels[16..].iter().all(|&p| p == 0));
    }

    #[test]
    fn test_genesis_packed_nibbles() {
        let mut pixels = vec![0u8; 64];
        pixels[0] = 0x1;
        pixels[1] = 0xF;
        pixels[8] = 0xA;
        let out = encode_tile(&genesis(), &pixels);
        assert_eq!(out.len(), 32);
        assert_eq!(out[0], 0x1F);
        assert_eq!(out[4], 0xA0);
        assert_eq!(decode_tile(&genesis(), &out), pixels);
    }

    #[test]
    fn test_round_trip() {
        for chr in [nes(), gameboy(), genesis()] {
            let max = 1u16 << chr.bitplanes();
            let pixels: Vec<u8> = (0..64u16).map(|i| ((i * 7 + 3) % max) as u8).collect();
            let packed = encode_tile(&chr, &pixels);
            assert_eq!(packed.len(), chr.datasize_bytes());
            assert_eq!(decode_tile(&chr, &packed), pixels);
        }
    }

    #[test]
    fn test_non_byte_aligned_tile() {
        // 3x3 tile, 1bpp, packed tightly into 9 bits.
        let chr = ChrDef::new("tiny", 3, 3, 1, vec![0], vec![0, 1, 2], vec![0, 3, 6]).unwrap();
        let pixels = vec![1, 0, 0, 0, 1, 0, 0, 0, 1];
        let out = encode_tile(&chr, &pixels);
        assert_eq!(out, vec![0b1000_1000, 0b1000_0000]);
        assert_eq!(decode_tile(&chr, &out), pixels);
    }

    #[test]
    fn test_extra_bits_ignored_and_short_input() {
        let chr = nes();
        // Index 7 only has two planes to land in.
        let out = encode_tile(&chr, &[7; 64]);
        assert_eq!(decode_tile(&chr, &out), vec![3; 64]);

        let out = encode_tile(&chr, &[1; 8]);
        assert_eq!(out[0], 0xFF);
        assert!(out[1..].iter().all(|&b| b == 0));

        let pixels = decode_tile(&chr, &[0xFF]);
        assert_eq!(pixels.len(), 64);
        assert_eq!(&pixels[0..8], &[1; 8]);
        assert!(pixels[8..].iter().all(|&p| p == 0));
    }
}
