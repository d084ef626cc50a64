// ABOUTME: Packs GSM septets eight-into-seven octets and back, with the fill bits a user data header needs
// ABOUTME: Reproduces the trailing octet modems expect when the message follows a header

use crate::binary::n_lsb_mask;

/// Carriage return septet shifted into the top seven bits of the last octet
const CR_PADDING: u8 = 0x0D << 1;

/// Fill bits between a header of `header_octets` (length octet included) and the first septet
pub fn fill_bits(header_octets: usize) -> usize {
    if header_octets == 0 {
        return 0;
    }
    (7 - (header_octets * 8) % 7) % 7
}

/// Septets a header of `header_octets` occupies, rounded up
pub fn header_septets(header_octets: usize) -> usize {
    (header_octets * 8).div_ceil(7)
}

/// Octets holding `count` septets after `fill` bits
pub fn packed_len(fill: usize, count: usize) -> usize {
    (fill + 7 * count).div_ceil(8)
}

/// Pack septets least significant bit first, starting `fill` bits into the first octet.
///
/// When the message follows a header (`fill > 0`), the output always ends one
/// octet past the last whole septet octet: either the carry of the final shift,
/// or a carriage return (`0x1A` with one fill bit) so that the spare bits are
/// not read as a trailing `@`.
pub fn pack_septets(septets: &[u8], fill: usize) -> Vec<u8> {
    if septets.is_empty() {
        return Vec::new();
    }

    let mut packed = Vec::with_capacity(packed_len(fill, septets.len()) + 1);
    let mut accumulator: u16 = 0;
    let mut bits = fill;

    for &septet in septets {
        accumulator |= u16::from(septet & 0x7F) << bits;
        bits += 7;

        while bits >= 8 {
            packed.push(accumulator as u8);
            accumulator >>= 8;
            bits -= 8;
        }
    }

    if bits > 0 {
        packed.push(accumulator as u8);
    }

    if fill > 0 {
        let unshifted = packed_len(0, septets.len());
        let padding = if fill == 1 { CR_PADDING } else { 0x00 };

        if packed.len() == unshifted {
            packed.push(padding);
        } else if let Some(last) = packed.last_mut().filter(|last| **last == 0) {
            *last = padding;
        }
    }

    packed
}

/// Extract `count` septets starting `fill` bits into `data`.
///
/// Returns `None` when `data` is too short to hold them.
pub fn unpack_septets(data: &[u8], fill: usize, count: usize) -> Option<Vec<u8>> {
    if data.len() < packed_len(fill, count) {
        return None;
    }

    let septets = (0..count)
        .map(|index| {
            let bit = fill + 7 * index;
            let (octet, offset) = (bit / 8, bit % 8);
            let low = u16::from(data[octet]);
            let high = data.get(octet + 1).copied().map(u16::from).unwrap_or_default();
            (((high << 8 | low) >> offset) as u8) & n_lsb_mask(7)
        })
        .collect();

    Some(septets)
}
