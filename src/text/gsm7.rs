// ABOUTME: GSM 03.38 default alphabet coder producing one unpacked septet per character
// ABOUTME: Characters from the extension table are emitted as an escape septet followed by their code

use super::{IllegalCharacter, TextCoder};

/// Septet that switches the next septet to the extension table
pub const ESCAPE: u8 = 0x1B;

/// Default alphabet, indexed by septet value. Slot 0x1B is the escape.
const BASIC: [char; 128] = [
    '@', '£', '$', '¥', 'è', 'é', 'ù', 'ì', 'ò', 'Ç', '\n', 'Ø', 'ø', '\r', 'Å', 'å', //
    'Δ', '_', 'Φ', 'Γ', 'Λ', 'Ω', 'Π', 'Ψ', 'Σ', 'Θ', 'Ξ', '\u{1B}', 'Æ', 'æ', 'ß', 'É', //
    ' ', '!', '"', '#', '¤', '%', '&', '\'', '(', ')', '*', '+', ',', '-', '.', '/', //
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', ':', ';', '<', '=', '>', '?', //
    '¡', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', //
    'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'Ä', 'Ö', 'Ñ', 'Ü', '§', //
    '¿', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', //
    'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'ä', 'ö', 'ñ', 'ü', 'à', //
];

/// Extension table entries as (septet after the escape, character)
const EXTENSION: [(u8, char); 10] = [
    (0x0A, '\u{0C}'),
    (0x14, '^'),
    (0x28, '{'),
    (0x29, '}'),
    (0x2F, '\\'),
    (0x3C, '['),
    (0x3D, '~'),
    (0x3E, ']'),
    (0x40, '|'),
    (0x65, '€'),
];

enum Code {
    Single(u8),
    Escape(u8),
}

fn lookup(character: char) -> Option<Code> {
    if let Some(septet) = BASIC
        .iter()
        .enumerate()
        .find(|&(index, &c)| c == character && index != ESCAPE as usize)
        .map(|(index, _)| index as u8)
    {
        return Some(Code::Single(septet));
    }

    EXTENSION
        .iter()
        .find(|&&(_, c)| c == character)
        .map(|&(septet, _)| Code::Escape(septet))
}

/// GSM 7-bit default alphabet with the extension table
#[derive(Debug, Clone, Copy, Default)]
pub struct Gsm7Coder;

impl TextCoder for Gsm7Coder {
    fn name(&self) -> &'static str {
        "GSM 7-bit"
    }

    fn encode(&self, text: &str) -> Result<Vec<u8>, IllegalCharacter> {
        let mut septets = Vec::with_capacity(text.len());

        for (position, character) in text.chars().enumerate() {
            match lookup(character) {
                Some(Code::Single(septet)) => septets.push(septet),
                Some(Code::Escape(septet)) => {
                    septets.push(ESCAPE);
                    septets.push(septet);
                }
                None => return Err(IllegalCharacter::new(character, position, self.name())),
            }
        }

        Ok(septets)
    }

    fn decode(&self, data: &[u8]) -> Option<String> {
        let mut text = String::with_capacity(data.len());
        let mut septets = data.iter().copied();

        while let Some(septet) = septets.next() {
            if septet > 0x7F {
                return None;
            }

            if septet == ESCAPE {
                let extended = septets.next()?;
                let (_, character) = EXTENSION.iter().find(|&&(s, _)| s == extended)?;
                text.push(*character);
                continue;
            }

            text.push(BASIC[septet as usize]);
        }

        Some(text)
    }

    fn units_for(&self, character: char) -> Option<usize> {
        lookup(character).map(|code| match code {
            Code::Single(_) => 1,
            Code::Escape(_) => 2,
        })
    }
}
