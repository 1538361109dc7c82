//! Decoding of inline narrative and attachment content.
//!
//! Attachments frequently carry their text base64 or hex encoded, and narratives are XHTML.
//! [`decode_narrative`] turns either into plain text: it decodes when the content looks
//! encoded and decodes to UTF-8. Markup is stripped and whitespace collapsed only when the
//! text contains tags; plain text keeps its line breaks.

use base64::Engine as _;
use regex::Regex;
use std::sync::LazyLock;

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

/// Share of printable characters decoded hex must reach to be accepted as text.
const PRINTABLE_RATIO: f64 = 0.8;

/// Whether `text` has the shape of standard, padded base64.
pub fn looks_like_base64(text: &str) -> bool {
    if text.is_empty() || text.len() % 4 != 0 {
        return false;
    }
    let body = text.trim_end_matches('=');
    text.len() - body.len() <= 2
        && !body.is_empty()
        && body
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/')
}

fn decode_base64_text(text: &str) -> Option<String> {
    if !looks_like_base64(text) {
        return None;
    }
    let bytes = base64::engine::general_purpose::STANDARD.decode(text).ok()?;
    String::from_utf8(bytes).ok()
}

/// Even-length hex that decodes to mostly printable UTF-8.
fn decode_hex_text(text: &str) -> Option<String> {
    if text.is_empty() || text.len() % 2 != 0 || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let decoded = String::from_utf8(hex::decode(text).ok()?).ok()?;
    let total = decoded.chars().count();
    if total == 0 {
        return None;
    }
    let printable = decoded
        .chars()
        .filter(|c| !c.is_control() || *c == ' ')
        .count();
    if (printable as f64) / (total as f64) > PRINTABLE_RATIO {
        Some(decoded)
    } else {
        None
    }
}

/// Remove markup tags and collapse runs of whitespace.
pub fn strip_html(content: &str) -> String {
    TAG.replace_all(content, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decode and clean narrative content; `None` for empty input.
pub fn decode_narrative(content: &str) -> Option<String> {
    if content.is_empty() {
        return None;
    }

    let decoded = if let Some(text) = decode_base64_text(content) {
        tracing::trace!("decoded base64 narrative");
        text
    } else if let Some(text) = decode_hex_text(content) {
        tracing::trace!("decoded hex narrative");
        text
    } else {
        content.to_owned()
    };

    let cleaned = if decoded.contains('<') && decoded.contains('>') {
        strip_html(&decoded)
    } else {
        decoded
    };
    if cleaned.trim().is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_base64_and_strips_markup() {
        let encoded =
            base64::engine::general_purpose::STANDARD.encode("<div><p>Discharge   summary</p></div>");
        assert_eq!(
            decode_narrative(&encoded).as_deref(),
            Some("Discharge summary")
        );
    }

    #[test]
    fn decodes_hex_text() {
        // "Hello" as hex; length is not a multiple of four so base64 is not attempted.
        assert_eq!(decode_narrative("48656c6c6f").as_deref(), Some("Hello"));
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(
            decode_narrative("Patient stable, follow up in 2 weeks.").as_deref(),
            Some("Patient stable, follow up in 2 weeks.")
        );
        assert_eq!(decode_narrative(""), None);
    }

    #[test]
    fn shape_checks() {
        assert!(looks_like_base64("SGVsbG8="));
        assert!(!looks_like_base64("SGVsbG8"));
        assert!(!looks_like_base64("===="));
        assert!(decode_hex_text("48656c6c6f").is_some());
        assert!(decode_hex_text("0001").is_none());
    }

    #[test]
    fn plain_notes_keep_line_breaks() {
        assert_eq!(
            decode_narrative("Line one\nLine two").as_deref(),
            Some("Line one\nLine two")
        );

        let encoded =
            base64::engine::general_purpose::STANDARD.encode("Assessment:\n- stable\n- discharge");
        assert_eq!(
            decode_narrative(&encoded).as_deref(),
            Some("Assessment:\n- stable\n- discharge")
        );
    }

    #[test]
    fn markup_is_stripped_and_collapsed() {
        assert_eq!(
            decode_narrative("<p>Line one</p>\n<p>Line two</p>").as_deref(),
            Some("Line one Line two")
        );
    }
}
