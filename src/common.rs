pub type ColorValue = u8; // 8-bit channel value (0-255)
pub type ColorIdx = u8; // Index into a tile's palette (0 to 2^bitplanes - 1)
pub type BitAddr = u32; // Bit address within a packed tile or palette

#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub red: ColorValue,
    pub green: ColorValue,
    pub blue: ColorValue,
}

impl Rgb {
    pub const fn new(red: ColorValue, green: ColorValue, blue: ColorValue) -> Self {
        Self { red, green, blue }
    }

    /// Squared Euclidean distance in RGB space.
    pub fn distance_sq(&self, other: &Rgb) -> u32 {
        let dr = self.red as i32 - other.red as i32;
        let dg = self.green as i32 - other.green as i32;
        let db = self.blue as i32 - other.blue as i32;
        (dr * dr + dg * dg + db * db) as u32
    }
}

impl From<[ColorValue; 3]> for Rgb {
    fn from([red, green, blue]: [ColorValue; 3]) -> Self {
        Self { red, green, blue }
    }
}

impl From<Rgb> for [ColorValue; 3] {
    fn from(c: Rgb) -> Self {
        [c.red, c.green, c.blue]
    }
}

/// `count` evenly spaced grays from black to white.
pub fn grayscale_ramp(count: usize) -> Vec<Rgb> {
    let steps = count.saturating_sub(1).max(1);
    (0..count)
        .map(|i| {
            let v = (i * 255 / steps) as ColorValue;
            Rgb::new(v, v, v)
        })
        .collect()
}

/// A linear image of palette indices, one byte per pixel, row-major.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexedImage {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<ColorIdx>,
}

impl IndexedImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> ColorIdx {
        self.pixels[y * self.width + x]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_sq() {
        let a = Rgb::new(10, 20, 30);
        let b = Rgb::new(13, 16, 30);
        assert_eq!(a.distance_sq(&b), 9 + 16);
        assert_eq!(b.distance_sq(&a), 25);
        assert_eq!(a.distance_sq(&a), 0);
        assert_eq!(Rgb::new(0, 0, 0).distance_sq(&Rgb::new(255, 255, 255)), 3 * 255 * 255);
    }

    #[test]
    fn test_grayscale_ramp() {
        assert_eq!(grayscale_ramp(2), vec![Rgb::new(0, 0, 0), Rgb::new(255, 255, 255)]);
        let ramp = grayscale_ramp(4);
        assert_eq!(ramp.iter().map(|c| c.red).collect::<Vec<_>>(), vec![0, 85, 170, 255]);
        assert_eq!(grayscale_ramp(256)[128], Rgb::new(128, 128, 128));
        assert_eq!(grayscale_ramp(1), vec![Rgb::new(0, 0, 0)]);
    }

    #[test]
    fn test_array_conversion() {
        let c: Rgb = [1, 2, 3].into();
        assert_eq!(c, Rgb::new(1, 2, 3));
        let arr: [u8; 3] = c.into();
        assert_eq!(arr, [1, 2, 3]);
    }
}
