//! Admit card layout and PDF output.
//!
//! [`layout`] turns a student and the exam details into a flat list of
//! drawing primitives on an A4 page, measured in points from the top-left
//! corner. It is pure: the same inputs always give the same list. [`render`]
//! and [`render_to_writer`] paint that list with printpdf.

use std::io::{BufWriter, Write};

use admitdesk_config::AdmitCardConfig;
use admitdesk_core::errors::AppError;
use admitdesk_models::settings::ExamDetails;
use admitdesk_models::students::Student;
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, Greyscale, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Rect,
};

pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;

const MARGIN_X: f32 = 15.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN_X;
const LABEL_X: f32 = 25.0;
const COLON_X: f32 = 145.0;
const VALUE_X: f32 = 160.0;
const VALUE_WIDTH: f32 = 280.0;
const ROW_SIZE: f32 = 10.0;
const ROW_GAP: f32 = 4.0;
const MAX_VALUE_LINES: usize = 3;
const PHOTO_X: f32 = 470.0;
const PHOTO_WIDTH: f32 = 100.0;
const PHOTO_HEIGHT: f32 = 130.0;
const GREY: f32 = 0.88;

pub const MISSING: &str = "-";

const INSTRUCTIONS: [&str; 6] = [
    "100% Free Education, Fooding and Lodging facilities will be provided to the selected candidates after final stages subject to verification.",
    "Affix two recent Passport Sized Photographs as mentioned in the Admit Card before coming to the examination Centre.",
    "Candidates are required to carry original Photo ID proof (Aadhar Card/School ID) during exam along with admit card.",
    "Result will be notified through SMS and School Website - {website}",
    "LOCATION OF TEST CENTRE: {institute}",
    "You are required to keep the Admit Card in original to avail the final scholarship subject to background clearance.",
];

/// One drawing primitive. Coordinates are points, origin top-left; `y` of a
/// text op is the top of its line box.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        size: f32,
        bold: bool,
        text: String,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        filled: bool,
    },
}

/// Rough Helvetica advance width; good enough for wrapping and centring.
fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5
}

/// Greedy word wrap to `width`. Words longer than a line are split.
pub fn wrap(text: &str, size: f32, width: f32) -> Vec<String> {
    let max_chars = ((width / (size * 0.5)).floor() as usize).max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word.to_string();
        while word.chars().count() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let head: String = word.chars().take(max_chars).collect();
            word = word.chars().skip(max_chars).collect();
            lines.push(head);
        }

        let needed = current.chars().count() + word.chars().count() + usize::from(!current.is_empty());
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn or_missing(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(MISSING)
        .to_string()
}

struct Page {
    ops: Vec<DrawOp>,
}

impl Page {
    fn text(&mut self, x: f32, y: f32, size: f32, bold: bool, text: impl Into<String>) {
        self.ops.push(DrawOp::Text {
            x,
            y,
            size,
            bold,
            text: text.into(),
        });
    }

    fn centered(&mut self, center: f32, y: f32, size: f32, bold: bool, text: &str) {
        let x = center - text_width(text, size) / 2.0;
        self.text(x, y, size, bold, text);
    }

    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, filled: bool) {
        self.ops.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
            filled,
        });
    }

    /// Writes a label/value row and returns the y of the next row.
    fn row(&mut self, y: f32, label: &str, value: &str) -> f32 {
        self.text(LABEL_X, y, ROW_SIZE, false, label);
        self.text(COLON_X, y, ROW_SIZE, false, ":");

        let lines = wrap(value, ROW_SIZE, VALUE_WIDTH);
        let count = lines.len().min(MAX_VALUE_LINES);
        for (i, line) in lines.into_iter().take(MAX_VALUE_LINES).enumerate() {
            self.text(VALUE_X, y + i as f32 * (ROW_SIZE + 2.0), ROW_SIZE, false, line);
        }

        y + count as f32 * (ROW_SIZE + 2.0) + ROW_GAP
    }

    fn label_bar(&mut self, y: f32, title: &str) -> f32 {
        self.rect(MARGIN_X, y, CONTENT_WIDTH, 20.0, true);
        self.centered(PAGE_WIDTH / 2.0, y + 5.0, 11.0, true, title);
        y + 25.0
    }

    /// A bordered copy of the card: rows, photo box and signature captions.
    fn copy_box(&mut self, top: f32, rows: &[(&str, String)]) -> f32 {
        let first_row = top + 10.0;
        let mut y = first_row;
        for (label, value) in rows {
            y = self.row(y, label, value);
        }

        self.rect(PHOTO_X, first_row, PHOTO_WIDTH, PHOTO_HEIGHT, false);
        let photo_center = PHOTO_X + PHOTO_WIDTH / 2.0;
        for (i, caption) in ["Affix", "Photograph", "Here"].iter().enumerate() {
            self.centered(photo_center, first_row + 50.0 + i as f32 * 12.0, 8.0, false, caption);
        }

        let content_bottom = y.max(first_row + PHOTO_HEIGHT);
        let caption_y = content_bottom + 8.0;
        self.text(LABEL_X, caption_y, 9.0, false, "Invigilator's Sign");
        self.text(380.0, caption_y, 9.0, false, "Candidate's Sign");

        let bottom = caption_y + 17.0;
        self.rect(MARGIN_X, top, CONTENT_WIDTH, bottom - top, false);
        bottom
    }
}

fn candidate_rows(student: &Student, details: &ExamDetails) -> Vec<(&'static str, String)> {
    vec![
        ("Roll No.", student.roll_no.map_or_else(|| MISSING.to_string(), |r| r.to_string())),
        ("Candidate's Name", or_missing(Some(&student.student_name))),
        ("Father's Name", or_missing(Some(&student.father_name))),
        ("Mother's Name", or_missing(Some(&student.mother_name))),
        ("Stream", student.stream.to_string()),
        ("Class", student.class_moving.to_string()),
        ("Gender", student.gender.to_string()),
        ("Address", or_missing(Some(&student.permanent_address))),
        ("Test Venue", or_missing(Some(&details.venue))),
        ("Time", or_missing(Some(&details.exam_time))),
        ("Date", or_missing(Some(&details.exam_date))),
        ("Reporting Time", or_missing(Some(&details.reporting_time))),
    ]
}

/// Lays out the single-page, two-copy admit card.
pub fn layout(student: &Student, details: &ExamDetails, branding: &AdmitCardConfig) -> Vec<DrawOp> {
    let mut page = Page { ops: Vec::new() };
    let center = PAGE_WIDTH / 2.0;

    // Banner
    page.rect(20.0, 20.0, PAGE_WIDTH - 40.0, 60.0, true);
    page.centered(center, 32.0, 18.0, true, &branding.institute_name);
    page.centered(center, 58.0, 10.0, false, &branding.exam_title);

    let title = "ADMIT CARD";
    page.centered(center, 90.0, 16.0, true, title);
    let title_width = text_width(title, 16.0);
    page.rect(center - title_width / 2.0, 107.0, title_width, 0.8, true);

    let mut y = page.label_bar(115.0, "Candidate's Copy");
    let rows = candidate_rows(student, details);
    y = page.copy_box(y, &rows);

    y += 10.0;
    page.text(LABEL_X, y, 10.0, true, "NOTE:");
    y += 14.0;
    for (i, instruction) in INSTRUCTIONS.iter().enumerate() {
        let text = instruction
            .replace("{website}", &branding.website)
            .replace("{institute}", &branding.institute_name);
        for (j, line) in wrap(&format!("{}. {}", i + 1, text), 9.0, 540.0)
            .into_iter()
            .enumerate()
        {
            let x = if j == 0 { LABEL_X } else { LABEL_X + 10.0 };
            page.text(x, y, 9.0, false, line);
            y += 11.0;
        }
        y += 2.0;
    }

    y = page.label_bar(y + 8.0, "Invigilator's Copy");
    let mut rows = rows;
    rows.insert(5, ("Target", student.target.to_string()));
    page.copy_box(y, &rows);

    page.ops
}

fn to_mm(points: f32) -> Mm {
    Mm(points * 25.4 / 72.0)
}

fn paint(layer: &PdfLayerReference, ops: &[DrawOp], regular: &IndirectFontRef, bold: &IndirectFontRef) {
    let black = Color::Greyscale(Greyscale::new(0.0, None));
    let grey = Color::Greyscale(Greyscale::new(GREY, None));
    layer.set_outline_color(black.clone());
    layer.set_outline_thickness(0.8);

    for op in ops {
        match op {
            DrawOp::Text {
                x,
                y,
                size,
                bold: is_bold,
                text,
            } => {
                let font = if *is_bold { bold } else { regular };
                let baseline = PAGE_HEIGHT - (y + size * 0.8);
                layer.set_fill_color(black.clone());
                layer.use_text(text.as_str(), *size, to_mm(*x), to_mm(baseline), font);
            }
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                filled,
            } => {
                let bottom = PAGE_HEIGHT - (y + height);
                let rect = Rect::new(to_mm(*x), to_mm(bottom), to_mm(x + width), to_mm(PAGE_HEIGHT - y));
                if *filled {
                    layer.set_fill_color(grey.clone());
                    layer.add_rect(rect.with_mode(PaintMode::FillStroke));
                } else {
                    layer.add_rect(rect.with_mode(PaintMode::Stroke));
                }
            }
        }
    }
}

/// Renders the card and writes the PDF to `writer`.
pub fn render_to_writer<W: Write>(
    student: &Student,
    details: &ExamDetails,
    branding: &AdmitCardConfig,
    writer: W,
) -> Result<(), AppError> {
    let ops = layout(student, details, branding);

    let title = format!("Admit Card {}", student.student_id);
    let (doc, page, layer) = PdfDocument::new(title, to_mm(PAGE_WIDTH), to_mm(PAGE_HEIGHT), "Layer 1");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| AppError::internal_error(format!("Failed to load font: {:?}", e)))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| AppError::internal_error(format!("Failed to load font: {:?}", e)))?;

    paint(&doc.get_page(page).get_layer(layer), &ops, &regular, &bold);

    doc.save(&mut BufWriter::new(writer))
        .map_err(|e| AppError::internal_error(format!("Failed to write admit card: {:?}", e)))
}

/// Renders the card into memory, e.g. for an email attachment.
pub fn render(
    student: &Student,
    details: &ExamDetails,
    branding: &AdmitCardConfig,
) -> Result<Vec<u8>, AppError> {
    let mut buffer = Vec::new();
    render_to_writer(student, details, branding, &mut buffer)?;
    Ok(buffer)
}
