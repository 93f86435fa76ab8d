//! Justified, paginated PDF rendering of cover letters

use crate::error::{ApplyCopilotError, Result};
use log::debug;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Page geometry and typography, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageStyle {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub font_size: f32,
    pub leading: f32,
}

impl Default for PageStyle {
    /// US Letter with one-inch margins, Helvetica 11 on 14.15.
    fn default() -> Self {
        Self {
            page_width: 612.0,
            page_height: 792.0,
            margin: 72.0,
            font_size: 11.0,
            leading: 14.15,
        }
    }
}

impl PageStyle {
    pub fn text_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    fn first_baseline(&self) -> f32 {
        self.page_height - self.margin - self.font_size
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x: f32,
    /// Baseline, measured from the bottom of the page
    pub y: f32,
    /// Extra space added to every space character
    pub word_spacing: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct DocumentInfo<'a> {
    pub title: &'a str,
    pub author: &'a str,
    pub subject: &'a str,
}

/// Helvetica advance widths for printable ASCII, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

fn char_width(c: char) -> u16 {
    match c as u32 {
        code @ 32..=126 => HELVETICA_WIDTHS[(code - 32) as usize],
        _ => 556,
    }
}

/// Rendered width of `text` at `font_size`, in points.
pub fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(|c| char_width(c) as f32).sum::<f32>() * font_size / 1000.0
}

/// Replaces typographic punctuation the builtin fonts can't encode.
pub fn to_plain_punctuation(text: &str) -> String {
    let mut plain = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{2018}' | '\u{2019}' => plain.push('\''),
            '\u{201C}' | '\u{201D}' => plain.push('"'),
            '\u{2013}' | '\u{2014}' => plain.push('-'),
            '\u{2026}' => plain.push_str("..."),
            '\u{00A0}' => plain.push(' '),
            _ => plain.push(c),
        }
    }
    plain
}

/// Paragraphs are separated by blank lines; single newlines inside one are
/// treated as spaces.
pub fn paragraphs(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .split("\n\n")
        .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|p| !p.is_empty())
        .collect()
}

/// Greedy word wrap. A word wider than the line gets a line of its own.
fn wrap(paragraph: &str, max_width: f32, font_size: f32) -> Vec<Vec<&str>> {
    let space = text_width(" ", font_size);
    let mut lines = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_width = 0.0;

    for word in paragraph.split(' ') {
        let word_width = text_width(word, font_size);
        if !current.is_empty() && current_width + space + word_width > max_width {
            lines.push(std::mem::take(&mut current));
            current_width = 0.0;
        }
        if !current.is_empty() {
            current_width += space;
        }
        current_width += word_width;
        current.push(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Positions every line of `text`, page by page. All lines except the last
/// of each paragraph are stretched to the full text width.
pub fn layout(text: &str, style: &PageStyle) -> Vec<Vec<PlacedLine>> {
    let max_width = style.text_width();
    let bottom = style.margin;
    let mut pages = vec![Vec::new()];
    let mut y = style.first_baseline();

    for (i, paragraph) in paragraphs(text).iter().enumerate() {
        if i > 0 {
            y -= style.leading;
        }

        let lines = wrap(paragraph, max_width, style.font_size);
        let last = lines.len().saturating_sub(1);
        for (n, words) in lines.into_iter().enumerate() {
            if y < bottom {
                pages.push(Vec::new());
                y = style.first_baseline();
            }

            let line = words.join(" ");
            let gaps = words.len().saturating_sub(1);
            let word_spacing = if n < last && gaps > 0 {
                ((max_width - text_width(&line, style.font_size)) / gaps as f32).max(0.0)
            } else {
                0.0
            };

            if let Some(page) = pages.last_mut() {
                page.push(PlacedLine {
                    text: line,
                    x: style.margin,
                    y,
                    word_spacing,
                });
            }
            y -= style.leading;
        }
    }

    pages
}

fn mm(points: f32) -> Mm {
    Mm(points * 25.4 / 72.0)
}

fn pdf_error(e: impl std::fmt::Display) -> ApplyCopilotError {
    ApplyCopilotError::Serialization(format!("Failed to write PDF: {}", e))
}

/// Writes `text` as a PDF at `path`.
pub fn write_pdf(path: &Path, text: &str, info: DocumentInfo<'_>) -> Result<()> {
    let style = PageStyle::default();
    let pages = layout(&to_plain_punctuation(text), &style);

    let (doc, first_page, first_layer) = PdfDocument::new(
        info.title,
        mm(style.page_width),
        mm(style.page_height),
        "Layer 1",
    );
    let doc = doc.with_author(info.author).with_subject(info.subject);
    let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;

    for (page_number, lines) in pages.iter().enumerate() {
        let (page, layer) = if page_number == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(mm(style.page_width), mm(style.page_height), "Layer 1")
        };
        let layer = doc.get_page(page).get_layer(layer);

        for line in lines {
            layer.set_word_spacing(line.word_spacing);
            layer.use_text(line.text.as_str(), style.font_size, mm(line.x), mm(line.y), &font);
        }
        layer.set_word_spacing(0.0);
    }

    debug!("Rendering {} PDF pages to {}", pages.len(), path.display());
    let mut writer = BufWriter::new(File::create(path)?);
    doc.save(&mut writer).map_err(pdf_error)?;
    Ok(())
}
