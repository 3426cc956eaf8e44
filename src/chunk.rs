//! Splitting images into tiles and tile banks into tiles, and back.

use itertools::iproduct;
use log::{debug, warn};

use crate::{
    common::{ColorIdx, IndexedImage},
    gfxdef::{ChrDef, GfxDef},
    registry::{TileDecoder, TileEncoder},
};

/// Cuts `image` into tiles of the chrdef's size, left to right and top to
/// bottom. Tiles hanging off the right or bottom edge are padded with 0.
pub fn chunk_image(chrdef: &ChrDef, image: &IndexedImage) -> Vec<Vec<ColorIdx>> {
    let tile_w = chrdef.width() as usize;
    let tile_h = chrdef.height() as usize;
    let tiles_x = image.width.div_ceil(tile_w);
    let tiles_y = image.height.div_ceil(tile_h);
    if image.width % tile_w != 0 || image.height % tile_h != 0 {
        debug!(
            "{}x{} image is not a multiple of {}x{} tiles; padding edge tiles",
            image.width, image.height, tile_w, tile_h
        );
    }

    iproduct!(0..tiles_y, 0..tiles_x)
        .map(|(ty, tx)| {
            iproduct!(0..tile_h, 0..tile_w)
                .map(|(y, x)| {
                    let (px, py) = (tx * tile_w + x, ty * tile_h + y);
                    if px < image.width && py < image.height {
                        image.pixel(px, py)
                    } else {
                        0
                    }
                })
                .collect()
        })
        .collect()
}

/// Lays tiles out in a grid `columns` tiles wide. Cells past the last tile
/// are filled with `fill`.
pub fn render_tiles(chrdef: &ChrDef, tiles: &[Vec<ColorIdx>], columns: usize, fill: ColorIdx) -> IndexedImage {
    let tile_w = chrdef.width() as usize;
    let tile_h = chrdef.height() as usize;
    let columns = columns.max(1);
    let rows = tiles.len().div_ceil(columns);

    let mut image = IndexedImage::new(columns * tile_w, rows * tile_h);
    image.pixels.fill(fill);
    for (idx, tile) in tiles.iter().enumerate() {
        let (tx, ty) = (idx % columns, idx / columns);
        for (y, row) in tile.chunks(tile_w).take(tile_h).enumerate() {
            let start = (ty * tile_h + y) * image.width + tx * tile_w;
            image.pixels[start..start + row.len()].copy_from_slice(row);
        }
    }
    image
}

pub fn encode_bank(chrdef: &ChrDef, tiles: &[Vec<ColorIdx>], encoder: TileEncoder) -> Vec<u8> {
    let mut out = Vec::with_capacity(tiles.len() * chrdef.datasize_bytes());
    for tile in tiles {
        out.extend(encoder(chrdef, tile));
    }
    out
}

/// Splits `data` into whole tiles. A trailing partial tile is dropped.
pub fn decode_bank(chrdef: &ChrDef, data: &[u8], decoder: TileDecoder) -> Vec<Vec<ColorIdx>> {
    let chunks = data.chunks_exact(chrdef.datasize_bytes());
    if !chunks.remainder().is_empty() {
        warn!(
            "Ignoring {} trailing bytes that do not make up a whole '{}' tile",
            chunks.remainder().len(),
            chrdef.id()
        );
    }
    chunks.map(|chunk| decoder(chrdef, chunk)).collect()
}
