// ABOUTME: Splits message text into PDU-sized segments, picking the cheapest alphabet per segment
// ABOUTME: Concatenation totals are patched in a separate finalize step once the count is known

use super::error::{GeneratorError, GeneratorResult};
use crate::datatypes::{ConcatenatedShortMessage, UserDataHeader};
use crate::text::{Alphabet, EncodedMessage, IllegalCharacter, TextCoder};

/// Highest part count the concatenation element can carry
pub const MAX_SEGMENTS: usize = 0xFF;

/// One PDU worth of message text
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub message: EncodedMessage,
    /// Characters of the original text covered by this segment
    pub characters: usize,
    /// Present on every segment of a concatenated message
    pub header: Option<UserDataHeader>,
}

/// Segments whose concatenation totals are still placeholders
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    segments: Vec<Segment>,
}

impl Segmentation {
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Write the final part count into every concatenation element
    pub fn finalize(mut self) -> Vec<Segment> {
        // Bounded by MAX_SEGMENTS during segmentation
        let total = self.segments.len() as u8;

        for index in 0..self.segments.len() {
            let concat = self.segments[index]
                .header
                .as_mut()
                .and_then(UserDataHeader::concatenated_short_message_mut);

            if let Some(concat) = concat {
                concat.total_parts = total;
            }
        }

        self.segments
    }
}

/// Splits text into segments, trying alphabets in the given order for each one
#[derive(Debug, Clone)]
pub struct Segmenter {
    alphabets: Vec<Alphabet>,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(Alphabet::ASCENDING)
    }
}

impl Segmenter {
    pub fn new(alphabets: impl Into<Vec<Alphabet>>) -> Self {
        Self {
            alphabets: alphabets.into(),
        }
    }

    /// Split `text` into the fewest segments the alphabet order allows.
    ///
    /// An empty text yields a single empty GSM 7-bit segment.
    pub fn segment(&self, text: &str) -> GeneratorResult<Segmentation> {
        let characters: Vec<char> = text.chars().collect();

        if characters.is_empty() {
            return Ok(Segmentation {
                segments: vec![Segment {
                    message: Alphabet::Gsm7Bit.encode("")?,
                    characters: 0,
                    header: None,
                }],
            });
        }

        let mut segments = Vec::new();
        let mut position = 0;

        while position < characters.len() {
            if segments.len() >= MAX_SEGMENTS {
                return Err(GeneratorError::MessageTooLong {
                    characters: characters.len(),
                });
            }

            let remaining = &characters[position..];
            let segment = self
                .alphabets
                .iter()
                .find_map(|&alphabet| take_segment(remaining, alphabet, segments.len()))
                .ok_or_else(|| self.illegal_character(remaining, position))?;

            position += segment.characters;
            segments.push(segment);
        }

        Ok(Segmentation { segments })
    }

    fn illegal_character(&self, remaining: &[char], position: usize) -> IllegalCharacter {
        let unrepresentable = remaining.iter().enumerate().find(|(_, character)| {
            self.alphabets
                .iter()
                .all(|alphabet| alphabet.coder().units_for(**character).is_none())
        });
        let (offset, character) = unrepresentable.unwrap_or((0, &remaining[0]));
        let coder = self
            .alphabets
            .last()
            .map_or("GSM 7-bit", |alphabet| alphabet.coder().name());

        IllegalCharacter::new(*character, position + offset, coder)
    }
}

/// Cut the next segment off `remaining` in `alphabet`, if the alphabet can take any of it
fn take_segment(remaining: &[char], alphabet: Alphabet, previous: usize) -> Option<Segment> {
    let coder = alphabet.coder();
    let capacity = alphabet.max_units();

    let fits_alone = previous == 0
        && prefix_len(remaining, coder, capacity) == Some(remaining.len());

    let (count, header) = if fits_alone {
        (remaining.len(), None)
    } else {
        // Placeholder total, patched by Segmentation::finalize
        let header = UserDataHeader::new().with(ConcatenatedShortMessage {
            reference: None,
            total_parts: 0,
            sequence_number: (previous + 1) as u8,
        });
        let budget = capacity.saturating_sub(alphabet.header_units(header.encoded_len()));
        (prefix_len(remaining, coder, budget)?, Some(header))
    };

    if count == 0 {
        return None;
    }

    let text: String = remaining[..count].iter().collect();
    let message = alphabet.encode(&text).ok()?;

    Some(Segment {
        message,
        characters: count,
        header,
    })
}

/// Characters of the longest prefix within `budget` units, `None` if that prefix is unencodable
fn prefix_len(text: &[char], coder: &dyn TextCoder, budget: usize) -> Option<usize> {
    let mut units = 0;

    for (index, &character) in text.iter().enumerate() {
        if units >= budget {
            return Some(index);
        }

        let size = coder.units_for(character)?;
        if units + size > budget {
            return Some(index);
        }
        units += size;
    }

    Some(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concat(segment: &Segment) -> Option<ConcatenatedShortMessage> {
        segment
            .header
            .as_ref()
            .and_then(|header| header.concatenated_short_message())
            .copied()
    }

    #[test]
    fn test_short_message_has_no_header() {
        let segments = Segmenter::default().segment("Hello").unwrap().finalize();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].message.alphabet, Alphabet::Gsm7Bit);
        assert_eq!(segments[0].characters, 5);
        assert_eq!(segments[0].header, None);
    }

    #[test]
    fn test_full_single_part_fits() {
        let text = "a".repeat(160);
        let segments = Segmenter::default().segment(&text).unwrap().finalize();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].header, None);
    }

    #[test]
    fn test_long_message_is_concatenated() {
        let text = "a".repeat(161);
        let segmentation = Segmenter::default().segment(&text).unwrap();
        assert_eq!(segmentation.len(), 2);

        let segments = segmentation.finalize();
        assert_eq!(segments[0].characters, 153);
        assert_eq!(segments[1].characters, 8);
        for (index, segment) in segments.iter().enumerate() {
            let concat = concat(segment).unwrap();
            assert_eq!(concat.reference, None);
            assert_eq!(concat.total_parts, 2);
            assert_eq!(concat.sequence_number, index as u8 + 1);
        }
    }

    #[test]
    fn test_placeholder_total_before_finalize() {
        let segmentation = Segmenter::default().segment(&"a".repeat(400)).unwrap();
        assert!(segmentation.segments.iter().all(|s| concat(s).unwrap().total_parts == 0));
    }

    #[test]
    fn test_extension_characters_count_double() {
        // 80 euro signs need 160 septets and still fit one part
        let segments = Segmenter::default().segment(&"€".repeat(80)).unwrap().finalize();
        assert_eq!(segments.len(), 1);

        let segments = Segmenter::default().segment(&"€".repeat(81)).unwrap().finalize();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].characters, 76);
        assert!(segments.iter().all(|s| s.message.len() <= 153));
    }

    #[test]
    fn test_ucs2_fallback() {
        let segments = Segmenter::default().segment("Grüße aus Wien, Жук").unwrap().finalize();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].message.alphabet, Alphabet::Ucs2);
        assert_eq!(segments[0].message.len(), 19 * 2);
    }

    #[test]
    fn test_ucs2_segments_hold_67_characters() {
        let segments = Segmenter::default().segment(&"Ж".repeat(71)).unwrap().finalize();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].characters, 67);
        assert_eq!(segments[1].characters, 4);
    }

    #[test]
    fn test_alphabet_chosen_per_segment() {
        let text = format!("{}Ж", "a".repeat(200));
        let segments = Segmenter::default().segment(&text).unwrap().finalize();
        assert_eq!(segments[0].message.alphabet, Alphabet::Gsm7Bit);
        assert_eq!(segments[1].message.alphabet, Alphabet::Ucs2);
        assert_eq!(segments[0].characters + segments[1].characters, 201);
    }

    #[test]
    fn test_empty_message() {
        let segments = Segmenter::default().segment("").unwrap().finalize();
        assert_eq!(segments.len(), 1);
        assert!(segments[0].message.is_empty());
        assert_eq!(segments[0].message.alphabet, Alphabet::Gsm7Bit);
    }

    #[test]
    fn test_unrepresentable_character() {
        let err = Segmenter::default().segment("hi 😀").unwrap_err();
        match err {
            GeneratorError::IllegalCharacter(illegal) => {
                assert_eq!(illegal.character, '😀');
                assert_eq!(illegal.position, 3);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_too_many_segments() {
        let text = "a".repeat(153 * 255 + 1);
        assert!(matches!(
            Segmenter::default().segment(&text),
            Err(GeneratorError::MessageTooLong { characters }) if characters == text.len()
        ));
        assert_eq!(Segmenter::default().segment(&"a".repeat(153 * 255)).unwrap().len(), 255);
    }

    #[test]
    fn test_segmentation_is_deterministic() {
        let text = "Lorem ipsum dolor sit amet, Ж ".repeat(20);
        let segmenter = Segmenter::default();
        assert_eq!(segmenter.segment(&text).unwrap(), segmenter.segment(&text).unwrap());
    }
}
