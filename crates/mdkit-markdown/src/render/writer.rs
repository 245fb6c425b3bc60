//! Line prefixing, padding and word wrapping over an `io::Write` sink.
//!
//! Bytes handed to [`LineWriter::write_str`] are *content*. The writer also *inserts* bytes of
//! its own: line prefixes, padding, the newline of a wrap and the trimmed prefix of a blank
//! line. [`LineWriter::offset`] counts content bytes only, so it can be sampled while a word is
//! still buffered. [`LineWriter::resolve`] translates such an offset into a position in the
//! delivered output once the surrounding bytes have been written.
use std::io;
use std::io::Write;
use std::mem;

use mdkit_core::measure::text_width;

#[derive(Debug)]
pub struct LineWriter<W: Write> {
    out: W,
    width: usize,
    pad: bool,
    prefix: String,
    prefix_marks: Vec<usize>,
    wraps: Vec<bool>,
    word: String,
    word_start: usize,
    line_width: usize,
    at_newline: bool,
    logical: usize,
    delivered: usize,
    /// `(content offset, delivered - content)` at every point where the difference changed.
    shifts: Vec<(usize, usize)>,
}

impl<W: Write> LineWriter<W> {
    /// A writer wrapping at `width` display columns (`0` disables wrapping and padding).
    pub fn new(out: W, width: usize, pad: bool) -> Self {
        Self {
            out,
            width,
            pad,
            prefix: String::new(),
            prefix_marks: Vec::new(),
            wraps: Vec::new(),
            word: String::new(),
            word_start: 0,
            line_width: 0,
            at_newline: true,
            logical: 0,
            delivered: 0,
            shifts: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Content bytes accepted so far, including any still buffered in the pending word.
    pub fn offset(&self) -> usize {
        self.logical
    }

    /// Bytes delivered to the sink so far.
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    /// Maps a content offset to the matching offset in the delivered output.
    pub fn resolve(&self, offset: usize) -> usize {
        let i = self.shifts.partition_point(|(at, _)| *at <= offset);
        offset + i.checked_sub(1).map_or(0, |i| self.shifts[i].1)
    }

    /// Like [`resolve`](Self::resolve), but lands before any bytes inserted exactly at
    /// `offset`, so a range ending there stops short of trailing padding and wrap breaks.
    pub fn resolve_end(&self, offset: usize) -> usize {
        let i = self.shifts.partition_point(|(at, _)| *at < offset);
        offset + i.checked_sub(1).map_or(0, |i| self.shifts[i].1)
    }

    /// True when nothing visible has been written on the current line.
    pub fn at_newline(&self) -> bool {
        self.at_newline && self.word.is_empty()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn push_prefix(&mut self, prefix: &str) {
        self.prefix_marks.push(self.prefix.len());
        self.prefix.push_str(prefix);
    }

    pub fn push_indent(&mut self, columns: usize) {
        self.prefix_marks.push(self.prefix.len());
        self.prefix.extend(std::iter::repeat_n(' ', columns));
    }

    pub fn pop_prefix(&mut self) {
        let Some(mark) = self.prefix_marks.pop() else {
            panic!("pop_prefix without matching push_prefix");
        };
        self.prefix.truncate(mark);
    }

    pub fn push_wrap(&mut self, wrap: bool) {
        self.wraps.push(wrap);
    }

    pub fn pop_wrap(&mut self) {
        if self.wraps.pop().is_none() {
            panic!("pop_wrap without matching push_wrap");
        }
    }

    /// Whether writes currently go through the word buffer.
    pub fn wraps(&self) -> bool {
        self.width > 0 && self.wraps.last().copied().unwrap_or(false)
    }

    pub fn write_str(&mut self, s: &str) -> io::Result<()> {
        if !self.wraps() {
            self.flush_word()?;
            self.write_through(s, self.logical)?;
            self.logical += s.len();
            return Ok(());
        }

        for (i, ch) in s.char_indices() {
            if ch.is_whitespace() {
                self.flush_word()?;
                self.write_through(&s[i..i + ch.len_utf8()], self.logical)?;
            } else {
                if self.word.is_empty() {
                    self.word_start = self.logical;
                }
                self.word.push(ch);
            }
            self.logical += ch.len_utf8();
        }
        Ok(())
    }

    /// Writes bytes that take no room on the line, bypassing prefixes and the word buffer.
    pub fn write_raw(&mut self, s: &str) -> io::Result<()> {
        self.flush_word()?;
        self.emit(s, self.logical)?;
        self.logical += s.len();
        Ok(())
    }

    /// Writes the pending word, breaking the line first when the word would reach the width.
    pub fn flush_word(&mut self) -> io::Result<()> {
        if self.word.is_empty() {
            return Ok(());
        }
        let word = mem::take(&mut self.word);
        if self.line_width > 0 && self.line_width + text_width(&word) >= self.width {
            self.end_line(false, self.word_start)?;
        }
        self.write_through(&word, self.word_start)?;
        // Reuse the allocation for the next word.
        self.word = word;
        self.word.clear();
        Ok(())
    }

    /// Starts a visible line by inserting the prefix.
    pub fn begin_line(&mut self) -> io::Result<()> {
        let prefix = mem::take(&mut self.prefix);
        let result = self.insert(&prefix);
        self.line_width = text_width(&prefix);
        self.prefix = prefix;
        result
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.flush_word()?;
        self.out.flush()
    }

    fn write_through(&mut self, s: &str, mut pos: usize) -> io::Result<()> {
        let mut rest = s;
        loop {
            let (segment, newline) = match rest.find('\n') {
                Some(i) => (&rest[..i], true),
                None => (rest, false),
            };
            let width = text_width(segment);
            if self.at_newline && width != 0 {
                self.begin_line()?;
                self.at_newline = false;
            }
            self.emit(segment, pos)?;
            pos += segment.len();
            self.line_width += width;
            if !newline {
                return Ok(());
            }
            self.end_line(true, pos)?;
            pos += 1;
            rest = &rest[segment.len() + 1..];
        }
    }

    /// Finishes the current line: blank lines keep the visible part of the prefix, then the
    /// line is padded and terminated. `content` says whether the newline came from the caller.
    fn end_line(&mut self, content: bool, pos: usize) -> io::Result<()> {
        if self.at_newline {
            let marker = self.prefix.trim_end().to_owned();
            if !marker.is_empty() {
                self.insert(&marker)?;
                self.line_width = text_width(&marker);
            }
        }
        if self.pad && self.width > 0 {
            let fill = padding(self.line_width, self.width);
            if fill > 0 {
                let spaces = " ".repeat(fill);
                self.insert(&spaces)?;
            }
        }
        if content {
            self.emit("\n", pos)?;
        } else {
            self.insert("\n")?;
        }
        self.line_width = 0;
        self.at_newline = true;
        Ok(())
    }

    fn emit(&mut self, s: &str, pos: usize) -> io::Result<()> {
        if s.is_empty() {
            return Ok(());
        }
        let shift = self.delivered - pos;
        if self.shifts.last().map_or(0, |(_, last)| *last) != shift {
            self.shifts.push((pos, shift));
        }
        self.out.write_all(s.as_bytes())?;
        self.delivered += s.len();
        Ok(())
    }

    fn insert(&mut self, s: &str) -> io::Result<()> {
        self.out.write_all(s.as_bytes())?;
        self.delivered += s.len();
        Ok(())
    }
}

/// Spaces needed to bring a line of `used` columns to the width, or to the next multiple of
/// the width when the line already overflows it.
fn padding(used: usize, width: usize) -> usize {
    if used <= width {
        width - used
    } else {
        (width - (used - width) % width) % width
    }
}
