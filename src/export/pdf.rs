use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rect,
    Rgb,
};

use super::ExportError;
use crate::{
    entry::LeaderboardEntry,
    rank::{format_time, rank},
    settings::ConferenceSettings,
};

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const CENTER_X: f32 = 105.0;
const RULE_FROM: f32 = 20.0;
const RULE_TO: f32 = 190.0;
const FIRST_ROW_Y: f32 = 71.0;
const ROW_STEP: f32 = 10.0;
const PAGE_BREAK_Y: f32 = 280.0;
const CONTINUATION_Y: f32 = 20.0;
const ORG_MAX_CHARS: usize = 30;

const COLUMNS: [(&str, f32); 5] = [
    ("Rank", 25.0),
    ("Name", 45.0),
    ("University/Company", 95.0),
    ("Score", 155.0),
    ("Time", 175.0),
];

const GREEN: (u8, u8, u8) = (34, 197, 94);
const GREY: (u8, u8, u8) = (100, 100, 100);
const RULE_GREY: (u8, u8, u8) = (200, 200, 200);
const BLACK: (u8, u8, u8) = (0, 0, 0);
// Green at 10% over white.
const PODIUM_FILL: (u8, u8, u8) = (233, 249, 239);

struct HeaderLine<'a> {
    text: &'a str,
    size: f32,
    y_top: f32,
    color: (u8, u8, u8),
    bold: bool,
}

fn line(text: &str, size: f32, y_top: f32, color: (u8, u8, u8), bold: bool) -> HeaderLine<'_> {
    HeaderLine {
        text,
        size,
        y_top,
        color,
        bold,
    }
}

// Date and URL are printed bare here; only the CSV labels them.
fn header(settings: &ConferenceSettings) -> [HeaderLine<'_>; 4] {
    [
        line(&settings.conference_name, 20.0, 20.0, GREEN, true),
        line(&settings.village_name, 14.0, 30.0, BLACK, true),
        line(&settings.conference_date, 10.0, 37.0, GREY, false),
        line(&settings.conference_url, 10.0, 42.0, GREY, false),
    ]
}

/// Renders the leaderboard as an A4 portrait PDF.
///
/// Layout coordinates are millimetres from the top edge; rows that would
/// start below 280 mm continue at 20 mm on a new page. Ranks 1-3 sit on a
/// light green band.
pub fn export_pdf(
    entries: &[LeaderboardEntry],
    settings: &ConferenceSettings,
) -> Result<Vec<u8>, ExportError> {
    let title = format!("{} Leaderboard", settings.village_name);
    let (doc, page, layer) = PdfDocument::new(&title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let mut layer = doc.get_page(page).get_layer(layer);

    for line in header(settings) {
        set_fill(&layer, line.color);
        let font = if line.bold { &bold } else { &regular };
        centered(&layer, line.text, line.size, line.y_top, font);
    }

    rule(&layer, 48.0, GREEN, 0.5);

    set_fill(&layer, BLACK);
    for (label, x) in COLUMNS {
        text(&layer, label, 12.0, x, 58.0, &bold);
    }
    rule(&layer, 63.0, RULE_GREY, 0.3);

    let mut y = FIRST_ROW_Y;
    let mut page_no = 1;
    for ranked in rank(entries) {
        if y > PAGE_BREAK_Y {
            page_no += 1;
            let (next_page, next_layer) =
                doc.add_page(Mm(PAGE_W), Mm(PAGE_H), format!("Page {page_no}"));
            layer = doc.get_page(next_page).get_layer(next_layer);
            y = CONTINUATION_Y;
        }

        if ranked.rank <= 3 {
            set_fill(&layer, PODIUM_FILL);
            let top = y - 5.0;
            layer.add_rect(Rect::new(
                Mm(RULE_FROM),
                Mm(PAGE_H - (top + 8.0)),
                Mm(RULE_TO),
                Mm(PAGE_H - top),
            ));
        }

        set_fill(&layer, BLACK);
        let e = ranked.entry;
        let cells = [
            format!("#{}", ranked.rank),
            e.name.clone(),
            truncate(&e.organization, ORG_MAX_CHARS),
            e.score.to_string(),
            format_time(e.time),
        ];
        for ((_, x), cell) in COLUMNS.iter().zip(cells.iter()) {
            text(&layer, cell, 10.0, *x, y, &regular);
        }

        y += ROW_STEP;
    }

    Ok(doc.save_to_bytes()?)
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

fn set_fill(layer: &PdfLayerReference, color: (u8, u8, u8)) {
    layer.set_fill_color(rgb(color));
}

fn text(layer: &PdfLayerReference, s: &str, size: f32, x: f32, y_top: f32, font: &IndirectFontRef) {
    layer.use_text(s, size, Mm(x), Mm(PAGE_H - y_top), font);
}

fn centered(layer: &PdfLayerReference, s: &str, size: f32, y_top: f32, font: &IndirectFontRef) {
    let x = (CENTER_X - approx_width_mm(s, size) / 2.0).max(0.0);
    text(layer, s, size, x, y_top, font);
}

fn rule(layer: &PdfLayerReference, y_top: f32, color: (u8, u8, u8), thickness: f32) {
    layer.set_outline_color(rgb(color));
    layer.set_outline_thickness(thickness);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(RULE_FROM), Mm(PAGE_H - y_top)), false),
            (Point::new(Mm(RULE_TO), Mm(PAGE_H - y_top)), false),
        ],
        is_closed: false,
    });
}

/// Builtin fonts carry no metrics here; half an em per glyph is close
/// enough for Helvetica headings.
fn approx_width_mm(s: &str, size_pt: f32) -> f32 {
    const PT_TO_MM: f32 = 25.4 / 72.0;
    s.chars().count() as f32 * size_pt * 0.5 * PT_TO_MM
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
