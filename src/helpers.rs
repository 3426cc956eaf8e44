// Bit-level helpers shared by the tile, color and palette codecs.
use crate::common::BitAddr;

pub fn bitmask(count: u8) -> u32 {
    if count >= 32 {
        u32::MAX
    } else {
        (1u32 << count) - 1
    }
}

/// Shifts right for positive `shift`, left for negative. Shifting by 32 or
/// more in either direction yields 0.
pub fn shift_signed(value: u32, shift: i32) -> u32 {
    match shift {
        0 => value,
        1..=31 => value >> shift,
        -31..=-1 => value << -shift,
        _ => 0,
    }
}

/// Reduces an 8-bit channel value to its `bits` most significant bits.
pub fn narrow_bits(value: u8, bits: u8) -> u8 {
    if bits >= 8 {
        value
    } else {
        value >> (8 - bits)
    }
}

/// Widens a `bits`-wide channel value to 8 bits by repeating its bit pattern,
/// so that all-ones maps to 255 and the top `bits` bits are preserved.
pub fn expand_bits(value: u8, bits: u8) -> u8 {
    if bits == 0 {
        return 0;
    }
    if bits >= 8 {
        return value;
    }
    let v = value as u32 & bitmask(bits);
    let bits = bits as i32;
    let mut out = 0u32;
    let mut pos = 8 - bits;
    while pos > -bits {
        out |= shift_signed(v, -pos);
        pos -= bits;
    }
    (out & 0xFF) as u8
}

// Tile data is addressed most-significant bit first: address 0 is bit 7 of
// byte 0.
pub fn get_bit(data: &[u8], addr: BitAddr) -> bool {
    match data.get((addr >> 3) as usize) {
        Some(b) => b & (0x80 >> (addr & 7)) != 0,
        None => false,
    }
}

pub fn set_bit(data: &mut [u8], addr: BitAddr) {
    data[(addr >> 3) as usize] |= 0x80 >> (addr & 7);
}

fn field_bit_position(offset: usize, width: u8, bit: u8, big_endian: bool) -> (usize, u8) {
    if big_endian {
        let p = offset + (width - 1 - bit) as usize;
        (p >> 3, 7 - (p & 7) as u8)
    } else {
        let p = offset + bit as usize;
        (p >> 3, (p & 7) as u8)
    }
}

/// Writes the low `width` bits of `value` at bit `offset` of `data`.
///
/// Little-endian fields are laid down least-significant bit first, starting
/// from bit 0 of each byte; big-endian fields most-significant bit first,
/// starting from bit 7. For byte-aligned fields this is plain little/big
/// endian byte order.
pub fn write_field(data: &mut [u8], offset: usize, width: u8, value: u32, big_endian: bool) {
    for bit in 0..width {
        if value >> bit & 1 == 1 {
            let (byte, shift) = field_bit_position(offset, width, bit, big_endian);
            data[byte] |= 1 << shift;
        }
    }
}

/// Inverse of [`write_field`].
pub fn read_field(data: &[u8], offset: usize, width: u8, big_endian: bool) -> u32 {
    let mut value = 0;
    for bit in 0..width {
        let (byte, shift) = field_bit_position(offset, width, bit, big_endian);
        if data[byte] >> shift & 1 == 1 {
            value |= 1 << bit;
        }
    }
    value
}

pub fn bytes_for_bits(bits: usize) -> usize {
    (bits + 7) / 8
}
