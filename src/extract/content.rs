//! Content stream walking: text operators to positioned spans.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::text::is_spaceless_script_char;

/// Advance of a glyph when no width table is consulted, in text space units.
const AVG_GLYPH_WIDTH: f32 = 0.5;

/// TJ adjustments above this (thousandths of an em) are word breaks.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// A shown string in PDF user space (origin bottom-left).
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawSpan {
    pub text: String,
    pub x: f32,
    /// Baseline y.
    pub y: f32,
    pub width: f32,
    /// Effective size after the text matrix scale.
    pub font_size: f32,
    /// Base font name, e.g. "ABCDEF+Helvetica-Bold".
    pub font_name: String,
}

/// Text and line matrices, reduced to what positioning needs.
#[derive(Debug, Clone, Copy)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
    line_e: f32,
    line_f: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            line_e: 0.0,
            line_f: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        *self = Self {
            a,
            b,
            c,
            d,
            e,
            f,
            line_e: e,
            line_f: f,
        };
    }

    /// Td: move to the start of the next line, offset from the current line start.
    fn translate(&mut self, tx: f32, ty: f32) {
        self.line_e += tx * self.a + ty * self.c;
        self.line_f += tx * self.b + ty * self.d;
        self.e = self.line_e;
        self.f = self.line_f;
    }

    fn next_line(&mut self, leading: f32) {
        self.translate(0.0, -leading);
    }

    /// Move the pen after showing text of the given width in text space.
    fn advance(&mut self, width: f32) {
        self.e += width * self.a;
        self.f += width * self.b;
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

/// Graphics text state tracked between operators.
struct TextState {
    font_key: Vec<u8>,
    font_name: String,
    font_size: f32,
    leading: f32,
    matrix: TextMatrix,
    in_text: bool,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_key: Vec::new(),
            font_name: String::new(),
            font_size: 12.0,
            leading: 0.0,
            matrix: TextMatrix::default(),
            in_text: false,
        }
    }
}

/// Walks the content streams of one page.
pub(crate) struct PageWalker<'a> {
    doc: &'a LopdfDocument,
    fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
}

impl<'a> PageWalker<'a> {
    pub fn new(doc: &'a LopdfDocument, page_id: ObjectId) -> Result<Self> {
        let fonts = doc.get_page_fonts(page_id)?;
        Ok(Self { doc, fonts })
    }

    /// Collect every shown string of the page.
    pub fn spans(&self, page_id: ObjectId) -> Result<Vec<RawSpan>> {
        let data = page_content(self.doc, page_id)?;
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let content =
            lopdf::content::Content::decode(&data).map_err(|e| Error::Extraction(e.to_string()))?;

        let mut spans = Vec::new();
        let mut state = TextState::default();

        for op in &content.operations {
            match op.operator.as_str() {
                "BT" => {
                    state.in_text = true;
                    state.matrix = TextMatrix::default();
                }
                "ET" => state.in_text = false,
                "Tf" if op.operands.len() >= 2 => {
                    if let Object::Name(key) = &op.operands[0] {
                        state.font_name = self.base_font(key);
                        state.font_key = key.clone();
                    }
                    state.font_size = number(&op.operands[1]).unwrap_or(12.0);
                }
                "TL" => {
                    if let Some(leading) = op.operands.first().and_then(number) {
                        state.leading = leading;
                    }
                }
                "Td" | "TD" if op.operands.len() >= 2 => {
                    let tx = number(&op.operands[0]).unwrap_or(0.0);
                    let ty = number(&op.operands[1]).unwrap_or(0.0);
                    if op.operator == "TD" {
                        state.leading = -ty;
                    }
                    state.matrix.translate(tx, ty);
                }
                "Tm" if op.operands.len() >= 6 => {
                    let n = |i: usize, default: f32| number(&op.operands[i]).unwrap_or(default);
                    state
                        .matrix
                        .set(n(0, 1.0), n(1, 0.0), n(2, 0.0), n(3, 1.0), n(4, 0.0), n(5, 0.0));
                }
                "T*" => state.matrix.next_line(state.leading),
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = op.operands.first() {
                        let text = self.decode(&state.font_key, bytes);
                        self.show(&mut state, text, &mut spans);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = op.operands.first() {
                        let text = self.decode_array(&state.font_key, items);
                        self.show(&mut state, text, &mut spans);
                    }
                }
                "'" | "\"" => {
                    state.matrix.next_line(state.leading);
                    let index = if op.operator == "\"" { 2 } else { 0 };
                    if let Some(Object::String(bytes, _)) = op.operands.get(index) {
                        let text = self.decode(&state.font_key, bytes);
                        self.show(&mut state, text, &mut spans);
                    }
                }
                _ => {}
            }
        }

        Ok(spans)
    }

    fn show(&self, state: &mut TextState, text: String, spans: &mut Vec<RawSpan>) {
        if !state.in_text {
            return;
        }
        let width_text_space = text.chars().count() as f32 * state.font_size * AVG_GLYPH_WIDTH;
        if !text.trim().is_empty() {
            let (x, y) = state.matrix.position();
            let scale = state.matrix.scale();
            spans.push(RawSpan {
                text,
                x,
                y,
                width: width_text_space * scale,
                font_size: (state.font_size * scale).abs(),
                font_name: state.font_name.clone(),
            });
        }
        state.matrix.advance(width_text_space);
    }

    fn base_font(&self, key: &[u8]) -> String {
        self.fonts
            .get(key)
            .and_then(|font| font.get(b"BaseFont").ok())
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
            .unwrap_or_else(|| String::from_utf8_lossy(key).to_string())
    }

    fn decode(&self, font_key: &[u8], bytes: &[u8]) -> String {
        let encoding = self
            .fonts
            .get(font_key)
            .and_then(|font| font.get_font_encoding(self.doc).ok());
        match encoding {
            Some(enc) => LopdfDocument::decode_text(&enc, bytes).unwrap_or_else(|_| decode_text_simple(bytes)),
            None => decode_text_simple(bytes),
        }
    }

    fn decode_array(&self, font_key: &[u8], items: &[Object]) -> String {
        let mut combined = String::new();
        for item in items {
            match item {
                Object::String(bytes, _) => combined.push_str(&self.decode(font_key, bytes)),
                other => {
                    // Negative adjustments move the pen right.
                    let adjustment = -number(other).unwrap_or(0.0);
                    let breaks_word = adjustment > TJ_SPACE_THRESHOLD
                        && !combined.ends_with([' ', '\u{00A0}'])
                        && combined
                            .chars()
                            .last()
                            .map(|c| !is_spaceless_script_char(c))
                            .unwrap_or(false);
                    if breaks_word {
                        combined.push(' ');
                    }
                }
            }
        }
        combined
    }
}

/// Concatenated, decompressed content streams of a page.
fn page_content(doc: &LopdfDocument, page_id: ObjectId) -> Result<Vec<u8>> {
    let mut content = Vec::new();
    for stream_id in doc.get_page_contents(page_id) {
        let Ok(stream) = doc.get_object(stream_id).and_then(Object::as_stream) else {
            continue;
        };
        match stream.decompressed_content() {
            Ok(data) => content.extend_from_slice(&data),
            Err(_) => content.extend_from_slice(&stream.content),
        }
        content.push(b' ');
    }
    Ok(content)
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Decoding fallback for fonts without a usable encoding.
pub(crate) fn decode_text_simple(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        // Latin-1
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_simple() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
        assert_eq!(decode_text_simple(&[0xFE, 0xFF, 0x00, 0x41, 0x00, 0x42]), "AB");
        assert_eq!(decode_text_simple(&[0x43, 0x61, 0x66, 0xE9]), "Café");
    }

    #[test]
    fn test_text_matrix_line_movement() {
        let mut m = TextMatrix::default();
        m.set(1.0, 0.0, 0.0, 1.0, 72.0, 700.0);
        m.advance(50.0);
        assert_eq!(m.position(), (122.0, 700.0));

        // Td is relative to the line start, not the pen.
        m.translate(0.0, -14.0);
        assert_eq!(m.position(), (72.0, 686.0));

        m.next_line(20.0);
        assert_eq!(m.position(), (72.0, 666.0));
    }

    #[test]
    fn test_text_matrix_scale() {
        let mut m = TextMatrix::default();
        m.set(2.0, 0.0, 0.0, 2.0, 0.0, 0.0);
        assert!((m.scale() - 2.0).abs() < f32::EPSILON);
    }
}
