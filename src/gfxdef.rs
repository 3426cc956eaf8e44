//! Graphics format definitions.
//!
//! These are the immutable descriptions that drive the codecs: a tile layout
//! ([`ChrDef`]), a color encoding ([`ColDef`]) and a palette layout
//! ([`PalDef`]). All invariants are checked on construction, so the codecs
//! never see a malformed definition.

use crate::{
    common::{BitAddr, Rgb},
    error::GfxError,
    helpers::{bitmask, bytes_for_bits, shift_signed},
};

/// Anything that lives in the definition catalog under a string id.
pub trait GfxDef {
    fn id(&self) -> &str;
}

/// Bit position and width of one color channel inside a packed color word.
///
/// Decoding shifts the word right by `shift` and masks off `count` bits.
/// `shift` is never negative in a constructed [`ColDef`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChannelField {
    pub shift: i8,
    pub count: u8,
}

impl ChannelField {
    pub const fn new(shift: i8, count: u8) -> Self {
        Self { shift, count }
    }

    /// The bits this field occupies inside a 32-bit color word.
    pub fn word_mask(&self) -> u32 {
        shift_signed(bitmask(self.count), -(self.shift as i32))
    }

    fn end_bit(&self) -> i32 {
        self.shift as i32 + self.count as i32
    }
}

/// One pass of a channel-layout color encoding: where each of red, green
/// and blue sit in the color word.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RgbLayout {
    red: ChannelField,
    green: ChannelField,
    blue: ChannelField,
}

impl RgbLayout {
    pub fn new(red: (i8, u8), green: (i8, u8), blue: (i8, u8)) -> Self {
        Self {
            red: ChannelField::new(red.0, red.1),
            green: ChannelField::new(green.0, green.1),
            blue: ChannelField::new(blue.0, blue.1),
        }
    }

    pub fn red(&self) -> ChannelField {
        self.red
    }

    pub fn green(&self) -> ChannelField {
        self.green
    }

    pub fn blue(&self) -> ChannelField {
        self.blue
    }

    /// Red, green and blue, in that order.
    pub fn channels(&self) -> [ChannelField; 3] {
        [self.red, self.green, self.blue]
    }
}

/// Tile layout: the bit address of every (plane, column, row) triple is
/// `planeoffset[plane] + pixeloffset[column] + rowoffset[row]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChrDef {
    id: String,
    width: u16,
    height: u16,
    bitplanes: u8,
    planeoffset: Vec<BitAddr>,
    pixeloffset: Vec<BitAddr>,
    rowoffset: Vec<BitAddr>,
    datasize: u32, // size of one tile in bits
}

impl ChrDef {
    /// Largest tile accepted, in bits (a 256x256 tile at 8bpp needs 2^19).
    pub const MAX_DATASIZE: u32 = 1 << 22;

    pub fn new(
        id: &str,
        width: u16,
        height: u16,
        bitplanes: u8,
        planeoffset: Vec<BitAddr>,
        pixeloffset: Vec<BitAddr>,
        rowoffset: Vec<BitAddr>,
    ) -> Result<Self, GfxError> {
        let invalid = |reason: String| GfxError::invalid("chrdef", id, reason);
        if width == 0 || height == 0 {
            return Err(invalid(format!("zero-sized tile ({width}x{height})")));
        }
        if !(1..=8).contains(&bitplanes) {
            return Err(invalid(format!("bitplanes must be 1-8, got {bitplanes}")));
        }
        for (name, table, expected) in [
            ("planeoffset", &planeoffset, bitplanes as usize),
            ("pixeloffset", &pixeloffset, width as usize),
            ("rowoffset", &rowoffset, height as usize),
        ] {
            if table.len() != expected {
                return Err(invalid(format!(
                    "{name} has {} entries, expected {expected}",
                    table.len()
                )));
            }
        }

        let datasize = width as u64 * height as u64 * bitplanes as u64;
        if datasize > Self::MAX_DATASIZE as u64 {
            return Err(invalid(format!(
                "tile size of {datasize} bits exceeds the maximum of {}",
                Self::MAX_DATASIZE
            )));
        }
        let datasize = datasize as u32;

        let max_addr: u64 = [&planeoffset, &pixeloffset, &rowoffset]
            .iter()
            .map(|t| t.iter().copied().max().unwrap_or(0) as u64)
            .sum();
        if max_addr >= datasize as u64 {
            return Err(invalid(format!(
                "bit address {max_addr} exceeds tile size of {datasize} bits"
            )));
        }

        // Every triple must map to its own bit, otherwise tiles can't round-trip.
        let mut seen = vec![0u64; (datasize as usize).div_ceil(64)];
        for &row in &rowoffset {
            for &pixel in &pixeloffset {
                for &plane in &planeoffset {
                    let addr = (row + pixel + plane) as usize;
                    let (word, bit) = (addr / 64, 1u64 << (addr % 64));
                    if seen[word] & bit != 0 {
                        return Err(invalid(format!("bit address {addr} is used more than once")));
                    }
                    seen[word] |= bit;
                }
            }
        }

        Ok(Self {
            id: id.to_string(),
            width,
            height,
            bitplanes,
            planeoffset,
            pixeloffset,
            rowoffset,
            datasize,
        })
    }

    /// Returns the width of the tile, in pixels
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Returns the height of the tile, in pixels
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Returns the bit depth of the tile
    pub fn bitplanes(&self) -> u8 {
        self.bitplanes
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn planeoffset(&self) -> &[BitAddr] {
        &self.planeoffset
    }

    pub fn pixeloffset(&self) -> &[BitAddr] {
        &self.pixeloffset
    }

    pub fn rowoffset(&self) -> &[BitAddr] {
        &self.rowoffset
    }

    /// Returns the size of a single tile, in bits
    pub fn datasize(&self) -> u32 {
        self.datasize
    }

    /// Size of a single packed tile, rounded up to whole bytes.
    pub fn datasize_bytes(&self) -> usize {
        bytes_for_bits(self.datasize as usize)
    }
}

impl GfxDef for ChrDef {
    fn id(&self) -> &str {
        &self.id
    }
}

/// How a color is represented in hardware.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColorEncoding {
    /// Channel bits packed into a word. Pass 0 holds the least significant
    /// bits of each channel, later passes progressively more significant ones.
    Layout(Vec<RgbLayout>),
    /// Colors are written as indices into a table approximating the
    /// hardware's output.
    RefPal(Vec<Rgb>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColDef {
    id: String,
    encoding: ColorEncoding,
    big_endian: bool,
    datasize: u8,
}

impl ColDef {
    pub const MAX_REFPAL_LENGTH: usize = 0x10000;

    pub fn with_layout(id: &str, layout: Vec<RgbLayout>, big_endian: bool) -> Result<Self, GfxError> {
        let invalid = |reason: String| GfxError::invalid("coldef", id, reason);
        if layout.is_empty() {
            return Err(invalid("layout has no passes".to_string()));
        }

        let mut used = 0u32;
        let mut channel_bits = [0u32; 3];
        let mut datasize = 0i32;
        for (pass_idx, pass) in layout.iter().enumerate() {
            for (ch, field) in pass.channels().iter().enumerate() {
                let name = ["red", "green", "blue"][ch];
                if field.count == 0 {
                    return Err(invalid(format!("pass {pass_idx}: {name} has zero width")));
                }
                if field.shift < 0 {
                    return Err(invalid(format!(
                        "pass {pass_idx}: {name} has negative shift {}",
                        field.shift
                    )));
                }
                if field.end_bit() > 32 {
                    return Err(invalid(format!(
                        "pass {pass_idx}: {name} field (shift {}, count {}) lies outside a 32-bit word",
                        field.shift, field.count
                    )));
                }
                let mask = field.word_mask();
                if used & mask != 0 {
                    return Err(invalid(format!("pass {pass_idx}: {name} overlaps another field")));
                }
                used |= mask;
                channel_bits[ch] += field.count as u32;
                datasize = datasize.max(field.end_bit());
            }
        }
        if let Some(ch) = channel_bits.iter().position(|&b| b > 8) {
            return Err(invalid(format!(
                "{} uses {} bits in total, at most 8 are supported",
                ["red", "green", "blue"][ch],
                channel_bits[ch]
            )));
        }

        Ok(Self {
            id: id.to_string(),
            encoding: ColorEncoding::Layout(layout),
            big_endian,
            datasize: datasize as u8,
        })
    }

    pub fn with_refpal(id: &str, refpal: Vec<Rgb>, big_endian: bool) -> Result<Self, GfxError> {
        if refpal.is_empty() || refpal.len() > Self::MAX_REFPAL_LENGTH {
            return Err(GfxError::invalid(
                "coldef",
                id,
                format!(
                    "reference palette must have 1-{} entries, got {}",
                    Self::MAX_REFPAL_LENGTH,
                    refpal.len()
                ),
            ));
        }
        // Enough bits to address every entry.
        let datasize = (usize::BITS - (refpal.len() - 1).leading_zeros()).max(1) as u8;
        Ok(Self {
            id: id.to_string(),
            encoding: ColorEncoding::RefPal(refpal),
            big_endian,
            datasize,
        })
    }

    pub fn encoding(&self) -> &ColorEncoding {
        &self.encoding
    }

    pub fn use_refpal(&self) -> bool {
        matches!(self.encoding, ColorEncoding::RefPal(_))
    }

    pub fn refpal(&self) -> Option<&[Rgb]> {
        match &self.encoding {
            ColorEncoding::RefPal(p) => Some(p),
            ColorEncoding::Layout(_) => None,
        }
    }

    pub fn rgb_layout(&self) -> Option<&[RgbLayout]> {
        match &self.encoding {
            ColorEncoding::Layout(l) => Some(l),
            ColorEncoding::RefPal(_) => None,
        }
    }

    pub fn is_big_endian(&self) -> bool {
        self.big_endian
    }

    /// Width of one packed color value, in bits.
    pub fn datasize(&self) -> u8 {
        self.datasize
    }

    pub fn datasize_bytes(&self) -> usize {
        bytes_for_bits(self.datasize as usize)
    }
}

impl GfxDef for ColDef {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Palette layout: `subpal_count` subpalettes of `subpal_length` entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PalDef {
    id: String,
    entry_datasize: u8,
    subpal_length: u16,
    subpal_count: u16,
    subpal_datasize: u32,
}

impl PalDef {
    /// `subpal_datasize` defaults to `entry_datasize * subpal_length` bits; a
    /// larger value pads each subpalette.
    pub fn new(
        id: &str,
        entry_datasize: u8,
        subpal_length: u16,
        subpal_count: u16,
        subpal_datasize: Option<u32>,
    ) -> Result<Self, GfxError> {
        let invalid = |reason: String| GfxError::invalid("paldef", id, reason);
        if !(1..=32).contains(&entry_datasize) {
            return Err(invalid(format!("entry size must be 1-32 bits, got {entry_datasize}")));
        }
        if subpal_length == 0 || subpal_count == 0 {
            return Err(invalid(format!(
                "empty palette ({subpal_count} subpalettes of {subpal_length} entries)"
            )));
        }
        let packed = entry_datasize as u32 * subpal_length as u32;
        let subpal_datasize = subpal_datasize.unwrap_or(packed);
        if subpal_datasize < packed {
            return Err(invalid(format!(
                "subpalette size of {subpal_datasize} bits cannot hold {subpal_length} entries of {entry_datasize} bits"
            )));
        }
        Ok(Self {
            id: id.to_string(),
            entry_datasize,
            subpal_length,
            subpal_count,
            subpal_datasize,
        })
    }

    /// Bits per palette entry
    pub fn entry_datasize(&self) -> u8 {
        self.entry_datasize
    }

    pub fn subpal_length(&self) -> u16 {
        self.subpal_length
    }

    pub fn subpal_count(&self) -> u16 {
        self.subpal_count
    }

    /// Bits per subpalette, including any padding
    pub fn subpal_datasize(&self) -> u32 {
        self.subpal_datasize
    }

    pub fn subpal_datasize_bytes(&self) -> usize {
        bytes_for_bits(self.subpal_datasize as usize)
    }

    /// Total number of entries across all subpalettes.
    pub fn palette_length(&self) -> usize {
        self.subpal_length as usize * self.subpal_count as usize
    }

    pub fn palette_datasize(&self) -> usize {
        self.subpal_datasize as usize * self.subpal_count as usize
    }

    pub fn palette_datasize_bytes(&self) -> usize {
        bytes_for_bits(self.palette_datasize())
    }

    /// Bit offset of entry `index` (counted across the whole palette).
    pub fn entry_offset(&self, index: usize) -> usize {
        let length = self.subpal_length as usize;
        (index / length) * self.subpal_datasize as usize + (index % length) * self.entry_datasize as usize
    }
}

impl GfxDef for PalDef {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Default tile, color and palette definitions for one piece of hardware.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GfxProfile {
    id: String,
    chrdef_id: String,
    coldef_id: String,
    paldef_id: String,
}

impl GfxProfile {
    pub fn new(id: &str, chrdef_id: &str, coldef_id: &str, paldef_id: &str) -> Self {
        Self {
            id: id.to_string(),
            chrdef_id: chrdef_id.to_string(),
            coldef_id: coldef_id.to_string(),
            paldef_id: paldef_id.to_string(),
        }
    }

    pub fn chrdef_id(&self) -> &str {
        &self.chrdef_id
    }

    pub fn coldef_id(&self) -> &str {
        &self.coldef_id
    }

    pub fn paldef_id(&self) -> &str {
        &self.paldef_id
    }
}

impl GfxDef for GfxProfile {
    fn id(&self) -> &str {
        &self.id
    }
}
