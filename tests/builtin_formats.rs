use chrpack::{
    chunk::{chunk_image, decode_bank, encode_bank, render_tiles},
    png_io::{read_indexed_png, write_indexed_png},
    ConverterNames, ConverterRegistry, Converters, DefSelection, GfxDef, GfxDefs, IndexedImage, ResolvedDefs, Rgb,
};

fn profile<'a>(defs: &'a GfxDefs, id: &str) -> ResolvedDefs<'a> {
    defs.resolve(&DefSelection {
        profile: Some(id.to_string()),
        ..Default::default()
    })
    .unwrap()
}

fn converters() -> Converters {
    ConverterRegistry::default().resolve(&ConverterNames::default()).unwrap()
}

#[test]
fn test_builtin_profiles() {
    let defs = GfxDefs::builtin().unwrap();
    assert_eq!(defs.profile_ids(), vec!["gb", "md", "neogeo", "nes", "snes"]);
    let sizes: Vec<usize> = ["nes", "gb", "snes", "md", "neogeo"]
        .iter()
        .map(|id| profile(&defs, id).chrdef.datasize_bytes())
        .collect();
    assert_eq!(sizes, vec![16, 16, 32, 32, 32]);
}

#[test]
fn test_every_builtin_tile_round_trips() {
    let defs = GfxDefs::builtin().unwrap();
    let conv = converters();
    let ids = defs.chrdef_ids();
    assert!(ids.contains(&"neogeo_fix") && ids.contains(&"snes_8bpp"));

    for id in ids {
        let chr = defs.chrdef(id).unwrap();
        let count = chr.width() as usize * chr.height() as usize;
        let max = ((1u16 << chr.bitplanes()) - 1) as usize;
        let pixels: Vec<u8> = (0..count).map(|i| ((i * 37 + i / 3) % (max + 1)) as u8).collect();

        let data = (conv.tile.encode)(chr, &pixels);
        assert_eq!(data.len(), chr.datasize_bytes(), "chrdef {id}");
        assert_eq!((conv.tile.decode)(chr, &data), pixels, "chrdef {id}");
    }
}

#[test]
fn test_snes_tile_layout() {
    let defs = GfxDefs::builtin().unwrap();
    let gfx = profile(&defs, "snes");
    let conv = converters();

    // Top-left pixel uses every plane.
    let mut pixels = vec![0u8; 64];
    pixels[0] = 0xF;
    let data = (conv.tile.encode)(gfx.chrdef, &pixels);
    assert_eq!(data[0], 0x80);
    assert_eq!(data[1], 0x80);
    assert_eq!(data[16], 0x80);
    assert_eq!(data[17], 0x80);
    assert_eq!(data.iter().filter(|&&b| b != 0).count(), 4);
}

#[test]
fn test_nes_palette_nearest_match() {
    let defs = GfxDefs::builtin().unwrap();
    let gfx = profile(&defs, "nes");
    let conv = converters();

    let colors = [
        Rgb::new(0, 0, 0),
        Rgb::new(250, 250, 250),
        Rgb::new(0, 0, 250),
        Rgb::new(124, 124, 124),
    ];
    let data = conv.encode_palette(gfx.paldef, gfx.coldef, &colors, Some(0)).unwrap();
    assert_eq!(data, vec![0x0D, 0x20, 0x01, 0x00]);

    let mut full = vec![0u8; gfx.paldef.palette_datasize_bytes()];
    full[..4].copy_from_slice(&data);
    let back = conv.decode_palette(gfx.paldef, gfx.coldef, &full, Some(0)).unwrap();
    assert_eq!(back[1], Rgb::new(248, 248, 248));
}

#[test]
fn test_neogeo_palette_is_clamped() {
    let defs = GfxDefs::builtin().unwrap();
    let gfx = profile(&defs, "neogeo");
    assert_eq!(gfx.coldef.id(), "neogeo_rgb555");
    assert_eq!(gfx.paldef.palette_length(), 4096);

    let conv = converters();
    let colors = vec![Rgb::new(255, 255, 255); 4096];
    let data = conv.encode_palette(gfx.paldef, gfx.coldef, &colors, None).unwrap();
    assert_eq!(data.len(), 512);
    assert_eq!(&data[..2], &[0x7F, 0xFF]);
}

#[test]
fn test_png_to_chr_and_back() {
    let defs = GfxDefs::builtin().unwrap();
    let gfx = profile(&defs, "md");
    let conv = converters();

    let image = IndexedImage {
        width: 16,
        height: 8,
        pixels: (0..128).map(|i| (i % 16) as u8).collect(),
    };
    let palette: Vec<Rgb> = (0..16).map(|i| Rgb::new(i * 16, 0, 255 - i * 16)).collect();

    let dir = std::env::temp_dir().join(format!("chrpack-it-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let png_path = dir.join("in.png");
    write_indexed_png(&png_path, &image, &palette, None).unwrap();

    let png = read_indexed_png(&png_path).unwrap();
    let tiles = chunk_image(gfx.chrdef, &png.image);
    let bank = encode_bank(gfx.chrdef, &tiles, conv.tile.encode);
    assert_eq!(bank.len(), 64);
    // Packed nibbles: row 0 of tile 0 is indices 0..8.
    assert_eq!(&bank[..4], &[0x01, 0x23, 0x45, 0x67]);

    let pal = conv.encode_palette(gfx.paldef, gfx.coldef, &png.palette, Some(0)).unwrap();
    assert_eq!(pal.len(), 32);
    assert_eq!(&pal[..2], &[0x0E, 0x00]);

    let rendered = render_tiles(gfx.chrdef, &decode_bank(gfx.chrdef, &bank, conv.tile.decode), 2, 0);
    assert_eq!(rendered, image);
    std::fs::remove_file(&png_path).unwrap();
}
