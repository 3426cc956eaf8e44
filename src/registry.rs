//! Named conversion strategies.
//!
//! Each codec kind has its own table of encoder/decoder pairs keyed by name.
//! The tools resolve the names they were given once at startup and then call
//! through the returned [`Converters`].

use hashbrown::HashMap;
use log::debug;

use crate::{
    common::{ColorIdx, Rgb},
    conv_chr, conv_color, conv_palette,
    error::GfxError,
    gfxdef::{ChrDef, ColDef, PalDef},
};

pub const DEFAULT_CONVERTER: &str = "default";

pub type TileEncoder = fn(&ChrDef, &[ColorIdx]) -> Vec<u8>;
pub type TileDecoder = fn(&ChrDef, &[u8]) -> Vec<ColorIdx>;
pub type ColorEncoder = fn(&ColDef, Rgb) -> u32;
pub type ColorDecoder = fn(&ColDef, u32) -> Result<Rgb, GfxError>;
pub type PaletteEncoder = fn(&PalDef, &ColDef, &[Rgb], Option<usize>, ColorEncoder) -> Result<Vec<u8>, GfxError>;
pub type PaletteDecoder = fn(&PalDef, &ColDef, &[u8], Option<usize>, ColorDecoder) -> Result<Vec<Rgb>, GfxError>;

/// An encoder together with its inverse.
#[derive(Copy, Clone, Debug)]
pub struct Converter<E, D> {
    pub encode: E,
    pub decode: D,
}

pub type TileConverter = Converter<TileEncoder, TileDecoder>;
pub type ColorConverter = Converter<ColorEncoder, ColorDecoder>;
pub type PaletteConverter = Converter<PaletteEncoder, PaletteDecoder>;

#[derive(Clone, Debug)]
struct ConverterTable<T> {
    kind: &'static str,
    entries: HashMap<String, T>,
}

impl<T: Copy> ConverterTable<T> {
    fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: HashMap::new(),
        }
    }

    fn get(&self, name: &str) -> Result<T, GfxError> {
        self.entries
            .get(name)
            .copied()
            .ok_or_else(|| GfxError::ConverterNotFound {
                kind: self.kind,
                name: name.to_string(),
                available: self.names().join(", "),
            })
    }

    fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Which converter to use for each codec kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConverterNames {
    pub tile: String,
    pub color: String,
    pub palette: String,
}

impl Default for ConverterNames {
    fn default() -> Self {
        Self {
            tile: DEFAULT_CONVERTER.to_string(),
            color: DEFAULT_CONVERTER.to_string(),
            palette: DEFAULT_CONVERTER.to_string(),
        }
    }
}

/// The converters selected for one run.
#[derive(Copy, Clone, Debug)]
pub struct Converters {
    pub tile: TileConverter,
    pub color: ColorConverter,
    pub palette: PaletteConverter,
}

impl Converters {
    pub fn encode_palette(
        &self,
        paldef: &PalDef,
        coldef: &ColDef,
        colors: &[Rgb],
        subpalette: Option<usize>,
    ) -> Result<Vec<u8>, GfxError> {
        (self.palette.encode)(paldef, coldef, colors, subpalette, self.color.encode)
    }

    pub fn decode_palette(
        &self,
        paldef: &PalDef,
        coldef: &ColDef,
        data: &[u8],
        subpalette: Option<usize>,
    ) -> Result<Vec<Rgb>, GfxError> {
        (self.palette.decode)(paldef, coldef, data, subpalette, self.color.decode)
    }
}

#[derive(Clone, Debug)]
pub struct ConverterRegistry {
    tile: ConverterTable<TileConverter>,
    color: ConverterTable<ColorConverter>,
    palette: ConverterTable<PaletteConverter>,
}

impl ConverterRegistry {
    /// A registry with no converters at all.
    pub fn empty() -> Self {
        Self {
            tile: ConverterTable::new("tile"),
            color: ConverterTable::new("color"),
            palette: ConverterTable::new("palette"),
        }
    }

    /// Registering an existing name replaces the previous converter.
    pub fn register_tile(&mut self, name: &str, encode: TileEncoder, decode: TileDecoder) {
        self.tile.entries.insert(name.to_string(), Converter { encode, decode });
    }

    pub fn register_color(&mut self, name: &str, encode: ColorEncoder, decode: ColorDecoder) {
        self.color.entries.insert(name.to_string(), Converter { encode, decode });
    }

    pub fn register_palette(&mut self, name: &str, encode: PaletteEncoder, decode: PaletteDecoder) {
        self.palette.entries.insert(name.to_string(), Converter { encode, decode });
    }

    pub fn tile(&self, name: &str) -> Result<TileConverter, GfxError> {
        self.tile.get(name)
    }

    pub fn color(&self, name: &str) -> Result<ColorConverter, GfxError> {
        self.color.get(name)
    }

    pub fn palette(&self, name: &str) -> Result<PaletteConverter, GfxError> {
        self.palette.get(name)
    }

    pub fn resolve(&self, names: &ConverterNames) -> Result<Converters, GfxError> {
        debug!(
            "Using converters: tile '{}', color '{}', palette '{}'",
            names.tile, names.color, names.palette
        );
        Ok(Converters {
            tile: self.tile(&names.tile)?,
            color: self.color(&names.color)?,
            palette: self.palette(&names.palette)?,
        })
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register_tile(DEFAULT_CONVERTER, conv_chr::encode_tile, conv_chr::decode_tile);
        registry.register_color(DEFAULT_CONVERTER, conv_color::to_word, conv_color::from_word);
        registry.register_palette(
            DEFAULT_CONVERTER,
            conv_palette::encode_palette,
            conv_palette::decode_palette,
        );
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfxdef::RgbLayout;

    fn inverted_to_word(coldef: &ColDef, rgb: Rgb) -> u32 {
        let inverted = Rgb::new(!rgb.red, !rgb.green, !rgb.blue);
        conv_color::to_word(coldef, inverted)
    }

    fn inverted_from_word(coldef: &ColDef, word: u32) -> Result<Rgb, GfxError> {
        let rgb = conv_color::from_word(coldef, word)?;
        Ok(Rgb::new(!rgb.red, !rgb.green, !rgb.blue))
    }

    #[test]
    fn test_default_converters() {
        let registry = ConverterRegistry::default();
        let conv = registry.resolve(&ConverterNames::default()).unwrap();
        let chr = ChrDef::new("1bpp", 8, 1, 1, vec![0], (0..8).collect(), vec![0]).unwrap();
        let packed = (conv.tile.encode)(&chr, &[1, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(packed, vec![0x81]);
        assert_eq!((conv.tile.decode)(&chr, &packed), vec![1, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_unknown_names() {
        let registry = ConverterRegistry::default();
        let names = ConverterNames {
            color: "fancy".to_string(),
            ..Default::default()
        };
        match registry.resolve(&names) {
            Err(GfxError::ConverterNotFound { kind, name, available }) => {
                assert_eq!(kind, "color");
                assert_eq!(name, "fancy");
                assert_eq!(available, "default");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(ConverterRegistry::empty().tile(DEFAULT_CONVERTER).is_err());
    }

    #[test]
    fn test_alternate_color_converter_reaches_palette() {
        let mut registry = ConverterRegistry::default();
        registry.register_color("inverted", inverted_to_word, inverted_from_word);
        let names = ConverterNames {
            color: "inverted".to_string(),
            ..Default::default()
        };
        let conv = registry.resolve(&names).unwrap();

        let coldef = ColDef::with_layout("rgb888", vec![RgbLayout::new((0, 8), (8, 8), (16, 8))], false).unwrap();
        let paldef = PalDef::new("p", 24, 1, 1, None).unwrap();
        let packed = conv.encode_palette(&paldef, &coldef, &[Rgb::new(0, 0x10, 0xFF)], None).unwrap();
        assert_eq!(packed, vec![0xFF, 0xEF, 0x00]);
        let colors = conv.decode_palette(&paldef, &coldef, &packed, None).unwrap();
        assert_eq!(colors, vec![Rgb::new(0, 0x10, 0xFF)]);
    }
}
