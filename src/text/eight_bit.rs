// ABOUTME: 8-bit data coder mapping each octet to the Latin-1 code point of the same value
// ABOUTME: Decoding cannot fail, encoding rejects anything above U+00FF

use super::{IllegalCharacter, TextCoder};

#[derive(Debug, Clone, Copy, Default)]
pub struct EightBitCoder;

impl TextCoder for EightBitCoder {
    fn name(&self) -> &'static str {
        "8-bit"
    }

    fn encode(&self, text: &str) -> Result<Vec<u8>, IllegalCharacter> {
        text.chars()
            .enumerate()
            .map(|(position, character)| {
                u8::try_from(u32::from(character))
                    .map_err(|_| IllegalCharacter::new(character, position, self.name()))
            })
            .collect()
    }

    fn decode(&self, data: &[u8]) -> Option<String> {
        Some(data.iter().map(|&b| char::from(b)).collect())
    }
}
