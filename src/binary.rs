// ABOUTME: Bit-mask and hex helpers shared by the PDU codec and the session transcript rendering
// ABOUTME: Wraps the hex crate so every module formats binary data the same way

/// Mask selecting the `n` least significant bits of an octet.
///
/// `n` is clamped to 8, so `n_lsb_mask(8)` is `0xFF`.
pub fn n_lsb_mask(n: u32) -> u8 {
    match n {
        0 => 0,
        n if n >= 8 => 0xFF,
        n => (1u8 << n) - 1,
    }
}

/// Mask selecting the `n` most significant bits of an octet.
pub fn n_msb_mask(n: u32) -> u8 {
    !n_lsb_mask(8u32.saturating_sub(n))
}

/// Upper-case hex without separators, the way AT commands carry PDUs.
pub fn to_hex(data: &[u8]) -> String {
    hex::encode_upper(data)
}

/// Upper-case hex with one space between octets, for logs.
pub fn hex_with_spaces(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses hex text, ignoring ASCII whitespace between digits.
pub fn from_hex(text: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    hex::decode(compact)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lsb_masks() {
        assert_eq!(n_lsb_mask(0), 0x00);
        assert_eq!(n_lsb_mask(1), 0x01);
        assert_eq!(n_lsb_mask(3), 0x07);
        assert_eq!(n_lsb_mask(7), 0x7F);
        assert_eq!(n_lsb_mask(8), 0xFF);
        assert_eq!(n_lsb_mask(12), 0xFF);
    }

    #[test]
    fn test_msb_masks() {
        assert_eq!(n_msb_mask(0), 0x00);
        assert_eq!(n_msb_mask(1), 0x80);
        assert_eq!(n_msb_mask(3), 0xE0);
        assert_eq!(n_msb_mask(8), 0xFF);
    }

    #[test]
    fn test_hex_formatting() {
        assert_eq!(to_hex(&[0x00, 0x1A, 0xFF]), "001AFF");
        assert_eq!(hex_with_spaces(&[0x00, 0x1A, 0xFF]), "00 1A FF");
        assert_eq!(hex_with_spaces(&[]), "");
    }

    #[test]
    fn test_hex_parsing() {
        assert_eq!(from_hex("00 1a\nFF").unwrap(), vec![0x00, 0x1A, 0xFF]);
        assert!(from_hex("0").is_err());
        assert!(from_hex("ZZ").is_err());
    }
}
