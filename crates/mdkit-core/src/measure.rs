//! Display-width measurement for text that carries terminal escape sequences.
//!
//! Widths are counted in grapheme clusters. Escape sequences (CSI, OSC, the string-terminated
//! APC/DCS/PM/SOS family and short `ESC x` forms) are recognized and contribute nothing.
use unicode_segmentation::UnicodeSegmentation;

const ESC: u8 = 0x1b;
const BEL: u8 = 0x07;

/// A piece of a string: either printable text or one complete escape sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Escape(&'a str),
}

/// Returns the byte length of the escape sequence at the start of `s`.
///
/// `None` when `s` does not start with `ESC` or the sequence is not terminated.
pub fn escape_len(s: &str) -> Option<usize> {
    let b = s.as_bytes();
    if b.first() != Some(&ESC) {
        return None;
    }
    let kind = *b.get(1)?;
    match kind {
        b'[' => {
            // Parameter and intermediate bytes, then one final byte in 0x40..=0x7e.
            let mut i = 2;
            while let Some(&c) = b.get(i) {
                match c {
                    0x20..=0x3f => i += 1,
                    0x40..=0x7e => return Some(i + 1),
                    _ => return None,
                }
            }
            None
        }
        b']' => {
            let mut i = 2;
            while let Some(&c) = b.get(i) {
                if c == BEL {
                    return Some(i + 1);
                }
                if c == ESC && b.get(i + 1) == Some(&b'\\') {
                    return Some(i + 2);
                }
                i += 1;
            }
            None
        }
        b'_' | b'P' | b'^' | b'X' => {
            let mut i = 2;
            while i + 1 < b.len() {
                if b[i] == ESC && b[i + 1] == b'\\' {
                    return Some(i + 2);
                }
                i += 1;
            }
            None
        }
        0x20..=0x2f => {
            let mut i = 2;
            while let Some(&c) = b.get(i) {
                match c {
                    0x20..=0x2f => i += 1,
                    0x30..=0x7e => return Some(i + 1),
                    _ => return None,
                }
            }
            None
        }
        0x30..=0x7e => Some(2),
        _ => None,
    }
}

/// Splits a string into runs of text and complete escape sequences.
///
/// An unterminated sequence is reported as text.
pub struct Segments<'a> {
    rest: &'a str,
}

impl<'a> Segments<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { rest: s }
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        if let Some(n) = escape_len(self.rest) {
            let (seq, rest) = self.rest.split_at(n);
            self.rest = rest;
            return Some(Segment::Escape(seq));
        }

        // Skip a leading ESC that did not start a sequence so the scan always advances.
        let skip = usize::from(self.rest.as_bytes()[0] == ESC);
        let mut end = self.rest.len();
        for (i, c) in self.rest.char_indices().skip(skip) {
            if c == '\x1b' && escape_len(&self.rest[i..]).is_some() {
                end = i;
                break;
            }
        }
        let (text, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(Segment::Text(text))
    }
}

pub fn segments(s: &str) -> Segments<'_> {
    Segments::new(s)
}

/// Number of grapheme clusters in `s`, ignoring escape sequences.
pub fn text_width(s: &str) -> usize {
    segments(s)
        .map(|seg| match seg {
            Segment::Text(t) => t.graphemes(true).count(),
            Segment::Escape(_) => 0,
        })
        .sum()
}

pub fn strip_escapes(s: &str) -> String {
    segments(s)
        .filter_map(|seg| match seg {
            Segment::Text(t) => Some(t),
            Segment::Escape(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_sequence_lengths() {
        assert_eq!(escape_len("\x1b[0m tail"), Some(4));
        assert_eq!(escape_len("\x1b[38;2;1;2;3mX"), Some(13));
        assert_eq!(escape_len("\x1b]8;;http://x\x07"), Some(14));
        assert_eq!(escape_len("\x1b]0;title\x1b\\rest"), Some(11));
        assert_eq!(escape_len("\x1b_Gm=0;AAAA\x1b\\"), Some(13));
        assert_eq!(escape_len("\x1b(B"), Some(3));
        assert_eq!(escape_len("\x1b7"), Some(2));
    }

    #[test]
    fn unterminated_sequences_are_not_escapes() {
        assert_eq!(escape_len("\x1b[38;2"), None);
        assert_eq!(escape_len("\x1b_Gm=0;AAAA"), None);
        assert_eq!(escape_len("\x1b"), None);
        assert_eq!(escape_len("plain"), None);
    }

    #[test]
    fn width_skips_escapes_and_counts_clusters() {
        assert_eq!(text_width("\x1b[1mbold\x1b[22m"), 4);
        assert_eq!(text_width("e\u{301}t\u{e9}"), 3);
        assert_eq!(text_width("\x1b_Gf=100,a=T,m=0;AAAA\x1b\\"), 0);
        assert_eq!(text_width(""), 0);
    }

    #[test]
    fn segments_alternate_text_and_escapes() {
        let parts: Vec<_> = segments("a\x1b[3mb\x1b[23m").collect();
        assert_eq!(
            parts,
            vec![
                Segment::Text("a"),
                Segment::Escape("\x1b[3m"),
                Segment::Text("b"),
                Segment::Escape("\x1b[23m"),
            ]
        );
    }

    #[test]
    fn stray_escape_is_kept_as_text() {
        assert_eq!(strip_escapes("x\x1b"), "x\x1b");
        assert_eq!(strip_escapes("\x1b[4mlink\x1b[24m"), "link");
    }
}
