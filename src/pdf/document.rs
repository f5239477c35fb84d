//! Single-page document serialization.
//!
//! Object layout is fixed:
//!
//! ```text
//! 1 0 obj  Catalog
//! 2 0 obj  Pages
//! 3 0 obj  Page
//! 4 0 obj  Content stream
//! 5 0 obj  First font resource, then one object per further font
//! xref / trailer / %%EOF
//! ```

use super::content::write_escaped_name;
use crate::util::{Size, format_number};
use log::debug;
use std::io::{self, Write};

/// A font resource registered on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontResource {
    /// Resource key without the leading slash, e.g. `F1`
    pub key: String,
    /// Base font name written to the font dictionary
    pub base_font: String,
}

/// A finished page: its size, content bytes and font resources.
#[derive(Debug, Clone)]
pub struct PdfPage {
    pub size: Size,
    /// Content stream bytes, already compressed when `compressed` is set
    pub content: Vec<u8>,
    pub compressed: bool,
    pub fonts: Vec<FontResource>,
}

impl PdfPage {
    /// Writes a complete single-page PDF document to `out`.
    pub fn write_document<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let mut buffer: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = Vec::new();

        buffer.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

        let font_base = 5;
        let font_refs: Vec<String> = self
            .fonts
            .iter()
            .enumerate()
            .map(|(i, font)| {
                let mut key = Vec::new();
                write_escaped_name(&mut key, &font.key);
                format!("/{} {} 0 R", String::from_utf8_lossy(&key), font_base + i)
            })
            .collect();

        offsets.push(buffer.len());
        buffer.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

        offsets.push(buffer.len());
        buffer.extend_from_slice(b"2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n");

        offsets.push(buffer.len());
        write!(
            buffer,
            "3 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] /Contents 4 0 R /Resources << /Font << {} >> >> >>\nendobj\n",
            format_number(self.size.width, 3),
            format_number(self.size.height, 3),
            font_refs.join(" ")
        )?;

        offsets.push(buffer.len());
        let filter = if self.compressed {
            " /Filter /FlateDecode"
        } else {
            ""
        };
        write!(
            buffer,
            "4 0 obj\n<< /Length {}{} >>\nstream\n",
            self.content.len(),
            filter
        )?;
        buffer.extend_from_slice(&self.content);
        buffer.extend_from_slice(b"\nendstream\nendobj\n");

        for (i, font) in self.fonts.iter().enumerate() {
            offsets.push(buffer.len());
            let mut base = Vec::new();
            write_escaped_name(&mut base, &font.base_font);
            write!(
                buffer,
                "{} 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>\nendobj\n",
                font_base + i,
                String::from_utf8_lossy(&base)
            )?;
        }

        let xref_start = buffer.len();
        write!(buffer, "xref\n0 {}\n", offsets.len() + 1)?;
        buffer.extend_from_slice(b"0000000000 65535 f \n");
        for offset in &offsets {
            write!(buffer, "{:010} {:05} n \n", offset, 0)?;
        }
        write!(
            buffer,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            offsets.len() + 1,
            xref_start
        )?;

        debug!(
            "Serialized PDF page: {} objects, {} bytes",
            offsets.len(),
            buffer.len()
        );
        out.write_all(&buffer)
    }
}
