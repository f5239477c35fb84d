//! Page content-stream operator writer.

use crate::draw::color::Color;
use crate::draw::matrix::Matrix;
use crate::draw::path::{Path, PathElement};
use crate::util::{Rect, format_number};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use std::io::{self, Write};

/// Default number of fractional digits written for operands.
pub const DEFAULT_PRECISION: usize = 3;

/// Accumulates content-stream operators for one page.
#[derive(Debug, Clone)]
pub struct ContentStream {
    buffer: Vec<u8>,
    precision: usize,
}

impl Default for ContentStream {
    fn default() -> Self {
        Self::new(DEFAULT_PRECISION)
    }
}

impl ContentStream {
    pub fn new(precision: usize) -> Self {
        Self {
            buffer: Vec::new(),
            precision,
        }
    }

    /// Raw operators written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Operators as text, for logging and assertions.
    pub fn as_text(&self) -> String {
        String::from_utf8_lossy(&self.buffer).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    fn num(&self, value: f64) -> String {
        format_number(value, self.precision)
    }

    /// Writes `operands... op` followed by a newline.
    fn op(&mut self, operands: &[f64], op: &str) {
        for value in operands {
            let text = self.num(*value);
            self.buffer.extend_from_slice(text.as_bytes());
            self.buffer.push(b' ');
        }
        self.buffer.extend_from_slice(op.as_bytes());
        self.buffer.push(b'\n');
    }

    pub fn save(&mut self) {
        self.op(&[], "q");
    }

    pub fn restore(&mut self) {
        self.op(&[], "Q");
    }

    pub fn concat(&mut self, m: &Matrix) {
        self.op(&[m.a, m.b, m.c, m.d, m.e, m.f], "cm");
    }

    pub fn stroke_color(&mut self, color: Color) {
        self.op(&[color.r, color.g, color.b], "RG");
    }

    pub fn fill_color(&mut self, color: Color) {
        self.op(&[color.r, color.g, color.b], "rg");
    }

    pub fn line_width(&mut self, width: f64) {
        self.op(&[width], "w");
    }

    /// 0 butt, 1 round, 2 square.
    pub fn line_cap(&mut self, style: u8) {
        self.op(&[f64::from(style)], "J");
    }

    /// 0 miter, 1 round, 2 bevel.
    pub fn line_join(&mut self, style: u8) {
        self.op(&[f64::from(style)], "j");
    }

    pub fn miter_limit(&mut self, limit: f64) {
        self.op(&[limit], "M");
    }

    pub fn dash(&mut self, lengths: &[f64], phase: f64) {
        self.buffer.push(b'[');
        let items: Vec<String> = lengths.iter().map(|v| self.num(*v)).collect();
        self.buffer.extend_from_slice(items.join(" ").as_bytes());
        self.buffer.extend_from_slice(b"] ");
        self.op(&[phase], "d");
    }

    pub fn rect(&mut self, rect: Rect) {
        self.op(&[rect.x, rect.y, rect.width, rect.height], "re");
    }

    /// Appends the segments of `path` to the current path.
    pub fn path(&mut self, path: &Path) {
        for element in path.elements() {
            match *element {
                PathElement::MoveTo(p) => self.op(&[p.x, p.y], "m"),
                PathElement::LineTo(p) => self.op(&[p.x, p.y], "l"),
                PathElement::CurveTo(c1, c2, end) => {
                    self.op(&[c1.x, c1.y, c2.x, c2.y, end.x, end.y], "c")
                }
                PathElement::Close => self.op(&[], "h"),
            }
        }
    }

    pub fn stroke(&mut self) {
        self.op(&[], "S");
    }

    pub fn fill(&mut self) {
        self.op(&[], "f");
    }

    /// Intersects the clip with the current path and discards the path.
    pub fn clip(&mut self) {
        self.op(&[], "W n");
    }

    pub fn begin_text(&mut self) {
        self.op(&[], "BT");
    }

    pub fn end_text(&mut self) {
        self.op(&[], "ET");
    }

    pub fn font(&mut self, resource: &str, size: f64) {
        self.buffer.push(b'/');
        write_escaped_name(&mut self.buffer, resource);
        self.buffer.push(b' ');
        self.op(&[size], "Tf");
    }

    pub fn text_matrix(&mut self, m: &Matrix) {
        self.op(&[m.a, m.b, m.c, m.d, m.e, m.f], "Tm");
    }

    /// Shows `text` as a literal string. Characters outside Latin-1 become `?`.
    pub fn show_text(&mut self, text: &str) {
        let bytes: Vec<u8> = text
            .chars()
            .map(|ch| u8::try_from(u32::from(ch)).unwrap_or(b'?'))
            .collect();
        self.buffer.push(b'(');
        write_escaped_string(&mut self.buffer, &bytes);
        self.buffer.extend_from_slice(b") Tj\n");
    }

    /// Returns the stream bytes, Flate-compressed when `compress` is set.
    pub fn finish(self, compress: bool) -> io::Result<Vec<u8>> {
        if !compress {
            return Ok(self.buffer);
        }
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&self.buffer)?;
        encoder.finish()
    }
}

/// Backslash escaping for literal strings.
pub(crate) fn write_escaped_string(out: &mut Vec<u8>, bytes: &[u8]) {
    for &byte in bytes {
        match byte {
            b'(' => out.extend_from_slice(b"\\("),
            b')' => out.extend_from_slice(b"\\)"),
            b'\\' => out.extend_from_slice(b"\\\\"),
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\t' => out.extend_from_slice(b"\\t"),
            _ => out.push(byte),
        }
    }
}

/// `#XX` escaping for names.
pub(crate) fn write_escaped_name(out: &mut Vec<u8>, name: &str) {
    for byte in name.bytes() {
        match byte {
            b'/' | b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'%' | b'#' => {
                out.extend_from_slice(format!("#{:02X}", byte).as_bytes())
            }
            _ if byte <= b' ' || byte > b'~' => {
                out.extend_from_slice(format!("#{:02X}", byte).as_bytes())
            }
            _ => out.push(byte),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::RED;
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    #[test]
    fn operators_use_trimmed_numbers() {
        let mut content = ContentStream::new(2);
        content.concat(&Matrix::translation(10.0, 0.5));
        content.stroke_color(RED);
        content.line_width(1.264);
        assert_eq!(content.as_text(), "1 0 0 1 10 0.5 cm\n1 0 0 RG\n1.26 w\n");
    }

    #[test]
    fn dash_array_is_bracketed() {
        let mut content = ContentStream::default();
        content.dash(&[3.0, 1.5], 0.0);
        content.dash(&[], 0.0);
        assert_eq!(content.as_text(), "[3 1.5] 0 d\n[] 0 d\n");
    }

    #[test]
    fn text_is_escaped() {
        let mut content = ContentStream::default();
        content.show_text("a(b)\\ \u{263A}");
        assert_eq!(content.as_text(), "(a\\(b\\)\\\\ ?) Tj\n");
    }

    #[test]
    fn names_escape_delimiters_and_spaces() {
        let mut out = Vec::new();
        write_escaped_name(&mut out, "DejaVu Sans/Bold");
        assert_eq!(out, b"DejaVu#20Sans#2FBold");
    }

    #[test]
    fn compressed_stream_inflates_to_original() {
        let mut content = ContentStream::default();
        content.save();
        content.rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        content.fill();
        content.restore();
        let plain = content.as_bytes().to_vec();

        let packed = content.finish(true).unwrap();
        let mut inflated = Vec::new();
        ZlibDecoder::new(packed.as_slice())
            .read_to_end(&mut inflated)
            .unwrap();
        assert_eq!(inflated, plain);
    }
}
