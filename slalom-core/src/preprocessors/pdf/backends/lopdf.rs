//! lopdf backend
//!
//! Reads page content streams directly with the pure Rust `lopdf` crate. No
//! external runtime is needed. Encrypted or image-only PDFs yield an error
//! or empty pages; OCR is out of scope.
//!
//! Timing software usually draws each column of a result row as its own text
//! object, so the text is rebuilt from layout: every shown string is placed
//! at its device-space origin, strings are grouped by baseline, and each
//! baseline is read left to right. Glyph widths are not measured, so two
//! strings drawn without repositioning in between are simply concatenated.
//!
//! Form XObjects are not followed. A page whose layout pass finds no text
//! falls back to `Document::extract_text`.

use super::PdfBackend;
use crate::error::ExtractionError;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object};

/// Strings whose baselines are closer than this (in points) share a line
const BASELINE_TOLERANCE: f64 = 2.0;

/// TJ adjustments below this (thousandths of an em) read as a word gap
const TJ_SPACE_THRESHOLD: f64 = -200.0;

#[derive(Debug, Default)]
pub struct LopdfBackend;

impl LopdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PdfBackend for LopdfBackend {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
        let document = Document::load_mem(pdf_bytes)
            .map_err(|e| ExtractionError::backend(self.name(), e))?;

        // get_pages() is keyed by 1-based page number, so iteration is in page order
        let mut pages = Vec::new();
        for (page_number, page_id) in document.get_pages() {
            let content = document
                .get_page_content(page_id)
                .and_then(|data| Content::decode(&data))
                .map_err(|e| ExtractionError::backend(self.name(), format!("page {page_number}: {e}")))?;

            let text = layout_text(&content.operations);
            if !text.trim().is_empty() {
                pages.push(text);
                continue;
            }

            log::debug!("page {page_number}: no positioned text, using plain extraction");
            let text = document
                .extract_text(&[page_number])
                .map_err(|e| ExtractionError::backend(self.name(), format!("page {page_number}: {e}")))?;
            pages.push(text);
        }
        Ok(pages)
    }

    fn name(&self) -> &str {
        "lopdf"
    }
}

/// Affine matrix `[a b c d e f]` as PDF writes it.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f64; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn translation(tx: f64, ty: f64) -> Self {
        Matrix([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    /// `self × other`, i.e. apply `self` first.
    fn then(self, other: Matrix) -> Self {
        let [a, b, c, d, e, f] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Matrix([
            a * a2 + b * c2,
            a * b2 + b * d2,
            c * a2 + d * c2,
            c * b2 + d * d2,
            e * a2 + f * c2 + e2,
            e * b2 + f * d2 + f2,
        ])
    }

    fn origin(self) -> (f64, f64) {
        (self.0[4], self.0[5])
    }
}

#[derive(Debug, Clone, PartialEq)]
struct TextRun {
    x: f64,
    y: f64,
    text: String,
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(value) => Some(*value as f64),
        Object::Real(value) => Some(f64::from(*value)),
        _ => None,
    }
}

fn numbers<const N: usize>(operands: &[Object]) -> Option<[f64; N]> {
    if operands.len() < N {
        return None;
    }
    let mut values = [0.0; N];
    for (value, operand) in values.iter_mut().zip(operands) {
        *value = number(operand)?;
    }
    Some(values)
}

/// Bytes of a PDF string as text: UTF-16BE with a BOM, otherwise one byte
/// per character in WinAnsi (Latin-1 plus the 0x80-0x9F punctuation block).
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes
        .iter()
        .map(|&byte| match byte {
            0x91 | 0x92 => '\'',
            0x93 | 0x94 => '"',
            0x96 | 0x97 => '-',
            0x80 => '€',
            0x85 => '…',
            other => char::from(other),
        })
        .collect()
}

fn shown_text(operand: &Object) -> String {
    match operand {
        Object::String(bytes, _) => decode_pdf_string(bytes),
        Object::Array(items) => {
            let mut text = String::new();
            for item in items {
                match item {
                    Object::String(bytes, _) => text.push_str(&decode_pdf_string(bytes)),
                    other => {
                        if number(other).is_some_and(|adjust| adjust < TJ_SPACE_THRESHOLD) {
                            text.push(' ');
                        }
                    }
                }
            }
            text
        }
        _ => String::new(),
    }
}

/// Walk the content stream and record every shown string with its
/// device-space origin.
fn collect_runs(operations: &[Operation]) -> Vec<TextRun> {
    let mut runs = Vec::new();
    let mut ctm = Matrix::IDENTITY;
    let mut saved = Vec::new();
    let mut text_matrix = Matrix::IDENTITY;
    let mut line_matrix = Matrix::IDENTITY;
    let mut leading = 0.0;

    for operation in operations {
        let operands = operation.operands.as_slice();
        let mut shown = None;
        match operation.operator.as_str() {
            "q" => saved.push(ctm),
            "Q" => ctm = saved.pop().unwrap_or(Matrix::IDENTITY),
            "cm" => {
                if let Some(m) = numbers::<6>(operands) {
                    ctm = Matrix(m).then(ctm);
                }
            }
            "BT" => {
                text_matrix = Matrix::IDENTITY;
                line_matrix = Matrix::IDENTITY;
            }
            "Tm" => {
                if let Some(m) = numbers::<6>(operands) {
                    line_matrix = Matrix(m);
                    text_matrix = line_matrix;
                }
            }
            "Td" | "TD" => {
                if let Some([tx, ty]) = numbers::<2>(operands) {
                    if operation.operator == "TD" {
                        leading = -ty;
                    }
                    line_matrix = Matrix::translation(tx, ty).then(line_matrix);
                    text_matrix = line_matrix;
                }
            }
            "TL" => {
                if let Some([value]) = numbers::<1>(operands) {
                    leading = value;
                }
            }
            "T*" => {
                line_matrix = Matrix::translation(0.0, -leading).then(line_matrix);
                text_matrix = line_matrix;
            }
            "Tj" | "TJ" => shown = operands.first(),
            "'" | "\"" => {
                line_matrix = Matrix::translation(0.0, -leading).then(line_matrix);
                text_matrix = line_matrix;
                shown = operands.last();
            }
            _ => {}
        }

        if let Some(operand) = shown {
            let text = shown_text(operand);
            if !text.trim().is_empty() {
                let (x, y) = text_matrix.then(ctm).origin();
                runs.push(TextRun { x, y, text });
            }
        }
    }
    runs
}

/// Group runs by baseline, top of the page first, each line left to right.
fn runs_to_lines(mut runs: Vec<TextRun>) -> Vec<String> {
    // Stable sorts keep content-stream order for runs at the same origin
    runs.sort_by(|a, b| b.y.total_cmp(&a.y));

    let mut lines: Vec<Vec<TextRun>> = Vec::new();
    for run in runs {
        match lines.last_mut() {
            Some(line) if (line[0].y - run.y).abs() <= BASELINE_TOLERANCE => line.push(run),
            _ => lines.push(vec![run]),
        }
    }

    lines
        .into_iter()
        .map(|mut line| {
            line.sort_by(|a, b| a.x.total_cmp(&b.x));
            let mut text = String::new();
            let mut previous_x = None;
            for run in line {
                // Same origin means the string continues the previous one
                let continues = previous_x.is_some_and(|x: f64| (x - run.x).abs() < 0.01);
                if !text.is_empty() && !continues {
                    text.push(' ');
                }
                text.push_str(if continues { &run.text } else { run.text.trim_start() });
                previous_x = Some(run.x);
            }
            text.trim_end().to_string()
        })
        .collect()
}

/// Page text rebuilt from text positions, one printed line per line.
fn layout_text(operations: &[Operation]) -> String {
    runs_to_lines(collect_runs(operations)).join("\n")
}
