// ABOUTME: UCS2 coder using fixed two-octet big-endian code units
// ABOUTME: Only the basic multilingual plane is representable, surrogates are treated as malformed

use super::{IllegalCharacter, TextCoder};

/// UCS2 (big-endian, BMP only)
#[derive(Debug, Clone, Copy, Default)]
pub struct Ucs2Coder;

impl TextCoder for Ucs2Coder {
    fn name(&self) -> &'static str {
        "UCS2"
    }

    fn encode(&self, text: &str) -> Result<Vec<u8>, IllegalCharacter> {
        let mut data = Vec::with_capacity(text.len() * 2);

        for (position, character) in text.chars().enumerate() {
            let code_unit = u16::try_from(u32::from(character))
                .map_err(|_| IllegalCharacter::new(character, position, self.name()))?;
            data.extend_from_slice(&code_unit.to_be_bytes());
        }

        Ok(data)
    }

    fn decode(&self, data: &[u8]) -> Option<String> {
        if data.len() % 2 != 0 {
            return None;
        }

        data.chunks_exact(2)
            .map(|pair| char::from_u32(u32::from(u16::from_be_bytes([pair[0], pair[1]]))))
            .collect()
    }
}
