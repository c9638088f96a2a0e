//! PDF export — draws a rendered `Document` onto a single A4 page.
//!
//! Text is placed with printpdf's builtin fonts. Widths are estimated with a
//! flat average character width, so wrapping is a greedy word-wrap against a
//! per-column character budget rather than true glyph metrics. The page is
//! fixed-size: content past the bottom margin is truncated.

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rgb,
};

use crate::errors::AppError;
use crate::render::{Block, Document, RegionKind};

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 15.0;
const GUTTER: f32 = 6.0;
const CONTENT_W: f32 = PAGE_W - 2.0 * MARGIN;

const PT_TO_MM: f32 = 0.3528;
/// Flat width estimate: roughly half an em per character.
const AVG_CHAR_EM: f32 = 0.5;

/// Download filename: whitespace runs collapse to single underscores.
pub fn pdf_filename(name: &str) -> String {
    let stem = name.split_whitespace().collect::<Vec<_>>().join("_");
    if stem.is_empty() {
        "resume.pdf".to_string()
    } else {
        format!("{stem}.pdf")
    }
}

/// Greedy word-wrap against a character budget. Embedded newlines are hard
/// breaks; a single word longer than the budget gets its own line unsplit.
pub fn wrap_words(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    for raw_line in text.lines() {
        let words: Vec<&str> = raw_line.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }
        let mut current = String::new();
        for word in words {
            if current.is_empty() {
                current.push_str(word);
            } else if current.chars().count() + 1 + word.chars().count() > max_chars {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            } else {
                current.push(' ');
                current.push_str(word);
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}

/// Parses a `#rrggbb` color into unit-range RGB. Malformed input falls back
/// to black.
pub fn hex_to_rgb(hex: &str) -> (f32, f32, f32) {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 {
        return (0.0, 0.0, 0.0);
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map(|v| f32::from(v) / 255.0)
    };
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Ok(r), Ok(g), Ok(b)) => (r, g, b),
        _ => (0.0, 0.0, 0.0),
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

struct Column {
    x: f32,
    width: f32,
    /// Distance from the top of the page to the next baseline.
    y: f32,
}

impl Column {
    fn new(x: f32, width: f32) -> Self {
        Column {
            x,
            width,
            y: MARGIN,
        }
    }

    fn full(&self) -> bool {
        self.y > PAGE_H - MARGIN
    }
}

fn line_height(size_pt: f32) -> f32 {
    size_pt * PT_TO_MM * 1.25
}

fn chars_per_line(width_mm: f32, size_pt: f32) -> usize {
    (width_mm / (size_pt * PT_TO_MM * AVG_CHAR_EM)).floor() as usize
}

fn put_text(layer: &PdfLayerReference, font: &IndirectFontRef, size: f32, x: f32, y: f32, text: &str) {
    layer.use_text(text, size, Mm(x), Mm(PAGE_H - y), font);
}

fn set_color(layer: &PdfLayerReference, rgb: (f32, f32, f32)) {
    layer.set_fill_color(Color::Rgb(Rgb::new(rgb.0, rgb.1, rgb.2, None)));
}

fn draw_rule(layer: &PdfLayerReference, rgb: (f32, f32, f32), thickness: f32, x: f32, y: f32, width: f32) {
    layer.set_outline_color(Color::Rgb(Rgb::new(rgb.0, rgb.1, rgb.2, None)));
    layer.set_outline_thickness(thickness);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(x), Mm(PAGE_H - y)), false),
            (Point::new(Mm(x + width), Mm(PAGE_H - y)), false),
        ],
        is_closed: false,
    });
}

const BLACK: (f32, f32, f32) = (0.1, 0.1, 0.1);
const GRAY: (f32, f32, f32) = (0.45, 0.45, 0.45);
const LIGHT_GRAY: (f32, f32, f32) = (0.85, 0.85, 0.85);

/// Emits one wrapped run of text into a column, advancing its cursor.
/// Content past the bottom margin is dropped.
fn flow_text(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    size: f32,
    color: (f32, f32, f32),
    column: &mut Column,
    text: &str,
) {
    set_color(layer, color);
    for line in wrap_words(text, chars_per_line(column.width, size)) {
        if column.full() {
            return;
        }
        column.y += line_height(size);
        put_text(layer, font, size, column.x, column.y, &line);
    }
}

fn draw_block(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    accent: (f32, f32, f32),
    column: &mut Column,
    block: &Block,
) {
    if column.full() {
        return;
    }
    match block {
        Block::Title { text } => {
            flow_text(layer, &fonts.bold, 22.0, BLACK, column, text);
            column.y += 2.0;
        }
        Block::Tagline { text } => {
            flow_text(layer, &fonts.regular, 13.0, accent, column, text);
            column.y += 1.5;
        }
        Block::ContactLine { text } => {
            flow_text(layer, &fonts.regular, 9.0, GRAY, column, text);
        }
        Block::Heading { text } => {
            column.y += 4.0;
            flow_text(layer, &fonts.bold, 12.0, accent, column, text);
            column.y += 1.2;
            draw_rule(layer, accent, 0.8, column.x, column.y, column.width);
            column.y += 2.0;
        }
        Block::SubHeading { text } => {
            column.y += 1.5;
            flow_text(layer, &fonts.bold, 8.0, GRAY, column, &text.to_uppercase());
        }
        Block::Entry {
            primary,
            secondary,
            meta,
        } => {
            column.y += 1.5;
            flow_text(layer, &fonts.bold, 10.5, BLACK, column, primary);
            if !secondary.is_empty() {
                flow_text(layer, &fonts.regular, 9.5, accent, column, secondary);
            }
            flow_text(layer, &fonts.regular, 8.0, GRAY, column, meta);
        }
        Block::Paragraph { text } => {
            flow_text(layer, &fonts.regular, 9.0, BLACK, column, text);
            column.y += 1.0;
        }
        Block::Tags { items } => {
            flow_text(layer, &fonts.regular, 9.0, BLACK, column, &items.join(" · "));
            column.y += 1.0;
        }
        Block::LabeledLine { label, text } => {
            flow_text(layer, &fonts.regular, 9.0, BLACK, column, &format!("{label}: {text}"));
        }
        Block::Meter { name, level, fill } => {
            flow_text(
                layer,
                &fonts.regular,
                8.0,
                BLACK,
                column,
                &format!("{name}  ({level})"),
            );
            if column.full() {
                return;
            }
            column.y += 1.2;
            draw_rule(layer, LIGHT_GRAY, 1.5, column.x, column.y, column.width);
            draw_rule(layer, accent, 1.5, column.x, column.y, column.width * fill);
            column.y += 1.5;
        }
    }
}

/// Draws a document onto a fresh one-page A4 PDF and returns the bytes.
pub fn render_pdf(doc: &Document) -> Result<Vec<u8>, AppError> {
    let (pdf, page, layer) = PdfDocument::new("Resume", Mm(PAGE_W), Mm(PAGE_H), "content");
    let layer = pdf.get_page(page).get_layer(layer);

    let (regular, bold) = if doc.serif {
        (BuiltinFont::TimesRoman, BuiltinFont::TimesBold)
    } else {
        (BuiltinFont::Helvetica, BuiltinFont::HelveticaBold)
    };
    let fonts = Fonts {
        regular: pdf
            .add_builtin_font(regular)
            .map_err(|e| AppError::Export(format!("failed to load font: {e}")))?,
        bold: pdf
            .add_builtin_font(bold)
            .map_err(|e| AppError::Export(format!("failed to load font: {e}")))?,
    };
    let accent = hex_to_rgb(doc.accent);

    let left_w = CONTENT_W * doc.left_ratio - GUTTER / 2.0;
    let right_w = CONTENT_W - left_w - GUTTER;
    let mut full = Column::new(MARGIN, CONTENT_W);
    let mut left = Column::new(MARGIN, left_w);
    let mut right = Column::new(MARGIN + left_w + GUTTER, right_w);

    for region in &doc.regions {
        match region.kind {
            RegionKind::Full => {
                // A full-width region starts below everything drawn so far
                // and pushes both columns down past itself.
                full.y = full.y.max(left.y).max(right.y);
                for block in &region.blocks {
                    draw_block(&layer, &fonts, accent, &mut full, block);
                }
                full.y += 3.0;
                left.y = left.y.max(full.y);
                right.y = right.y.max(full.y);
            }
            RegionKind::Left => {
                for block in &region.blocks {
                    draw_block(&layer, &fonts, accent, &mut left, block);
                }
            }
            RegionKind::Right => {
                for block in &region.blocks {
                    draw_block(&layer, &fonts, accent, &mut right, block);
                }
            }
        }
    }

    pdf.save_to_bytes()
        .map_err(|e| AppError::Export(format!("failed to serialize PDF: {e}")))
}
