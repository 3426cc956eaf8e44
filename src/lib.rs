pub mod catalog;
pub mod chunk;
pub mod common;
pub mod config;
pub mod conv_chr;
pub mod conv_color;
pub mod conv_palette;
pub mod error;
pub mod gfxdef;
pub mod helpers;
pub mod persist;
pub mod png_io;
pub mod registry;

pub use catalog::{DefSelection, GfxDefs, ResolvedDefs};
pub use common::{ColorIdx, IndexedImage, Rgb};
pub use error::GfxError;
pub use gfxdef::{ChrDef, ColDef, ColorEncoding, GfxDef, GfxProfile, PalDef, RgbLayout};
pub use registry::{ConverterNames, ConverterRegistry, Converters};
