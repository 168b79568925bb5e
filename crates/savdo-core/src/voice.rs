//! # Voice Command Parser
//!
//! Turns a speech transcript into a quantity and a product search term.
//!
//! ```text
//! "5 ta coca cola qo'sh"
//!      │ lower-case, normalise apostrophes
//!      ▼
//! first digit run → quantity 5          (absent → 1, zero → error)
//!      │ remove it
//!      ▼
//! drop filler tokens: qo'sh qosh add ta dona pcs pieces
//!      │
//!      ▼
//! VoiceCommand { quantity: 5, term: "coca cola" }
//! ```
//!
//! Recognition itself (uz-UZ by default) happens outside this crate; only
//! the final transcript arrives here.

use crate::error::VoiceError;

/// Words that carry no product meaning: "add" and "pieces" in Uzbek and
/// English.
const FILLER_WORDS: [&str; 7] = ["qo'sh", "qosh", "add", "ta", "dona", "pcs", "pieces"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceCommand {
    pub quantity: i64,
    pub term: String,
}

/// Parses a transcript into a [`VoiceCommand`].
///
/// ```rust
/// use savdo_core::voice::parse_voice_command;
///
/// let cmd = parse_voice_command("5 ta Coca Cola qo'sh").unwrap();
/// assert_eq!(cmd.quantity, 5);
/// assert_eq!(cmd.term, "coca cola");
/// ```
pub fn parse_voice_command(transcript: &str) -> Result<VoiceCommand, VoiceError> {
    let text: String = transcript
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            '\u{2019}' | '\u{02BB}' | '\u{02BC}' | '`' => '\'',
            other => other,
        })
        .collect();

    if text.is_empty() {
        return Err(VoiceError::EmptyTranscript);
    }

    let (quantity, rest) = match text.find(|c: char| c.is_ascii_digit()) {
        Some(start) => {
            let end = text[start..]
                .find(|c: char| !c.is_ascii_digit())
                .map_or(text.len(), |len| start + len);
            let digits = &text[start..end];
            let quantity = digits
                .parse::<i64>()
                .ok()
                .filter(|&q| q > 0)
                .ok_or_else(|| VoiceError::InvalidQuantity(digits.to_string()))?;
            (quantity, format!("{} {}", &text[..start], &text[end..]))
        }
        None => (1, text.clone()),
    };

    let term = rest
        .split_whitespace()
        .map(|token| token.trim_matches(|c: char| c.is_ascii_punctuation() && c != '\''))
        .filter(|token| !token.is_empty() && !FILLER_WORDS.contains(token))
        .collect::<Vec<_>>()
        .join(" ");

    if term.is_empty() {
        return Err(VoiceError::NoSearchTerm(text));
    }

    Ok(VoiceCommand { quantity, term })
}
