// ABOUTME: ASCII coder used for AT command framing plus helpers for trimming and rendering modem output
// ABOUTME: Rendering escapes control characters so transcripts stay on one readable line

use super::{IllegalCharacter, TextCoder};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiCoder;

impl TextCoder for AsciiCoder {
    fn name(&self) -> &'static str {
        "ASCII"
    }

    fn encode(&self, text: &str) -> Result<Vec<u8>, IllegalCharacter> {
        match text.chars().enumerate().find(|(_, c)| !c.is_ascii()) {
            Some((position, character)) => {
                Err(IllegalCharacter::new(character, position, self.name()))
            }
            None => Ok(text.as_bytes().to_vec()),
        }
    }

    fn decode(&self, data: &[u8]) -> Option<String> {
        if !data.is_ascii() {
            return None;
        }
        String::from_utf8(data.to_vec()).ok()
    }
}

/// Strip C0 control characters (below 0x20) from both ends.
///
/// Spaces are kept, so the `"> "` prompt survives trimming of its line breaks.
pub fn trim_control(text: &str) -> &str {
    text.trim_matches(|c: char| (c as u32) < 0x20)
}

/// Render text for logs and transcripts, escaping non-printable characters.
///
/// Line feed, carriage return and tab become `\n`, `\r` and `\t`, any other
/// control character becomes `\xHH`.
pub fn substitute_unprintable(text: &str) -> String {
    let mut rendered = String::with_capacity(text.len());

    for character in text.chars() {
        match character {
            '\n' => rendered.push_str("\\n"),
            '\r' => rendered.push_str("\\r"),
            '\t' => rendered.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{7F}' => {
                let _ = write!(rendered, "\\x{:02X}", c as u32);
            }
            c => rendered.push(c),
        }
    }

    rendered
}
