use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, Point, Pt, TextItem,
};

use crate::aggregate::AggregatedLine;

/// Header of the plain-text document.
pub const TEXT_HEADER: &str = "Shopping list:";

/// Title drawn at the top of every PDF page.
pub const PDF_TITLE: &str = "Shopping list";

// A4 page, coordinates in points from the bottom-left corner.
const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const LEFT_X: f32 = 100.0;
const TITLE_Y: f32 = 800.0;
const FIRST_LINE_Y: f32 = 750.0;
const LINE_STEP: f32 = 20.0;
const BOTTOM_Y: f32 = 50.0;
const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 12.0;

fn format_line(line: &AggregatedLine) -> String {
    format!("- {} ({}) — {}", line.name, line.unit, line.total)
}

/// Render the aggregated lines as a line-oriented text document:
/// the header, a blank line, then one `- <name> (<unit>) — <total>`
/// line per ingredient. An empty input renders the header only.
pub fn render_text(lines: &[AggregatedLine]) -> String {
    let mut out = String::from(TEXT_HEADER);
    out.push_str("\n\n");
    for line in lines {
        out.push_str(&format_line(line));
        out.push('\n');
    }
    out
}

/// Number of ingredient lines that fit on one PDF page.
///
/// Walks the vertical cursor the same way rendering does: draw at the
/// cursor, step down, break to a new page once the cursor crosses the
/// bottom bound.
pub fn page_capacity() -> usize {
    let mut capacity = 0;
    let mut y = FIRST_LINE_Y;
    while y >= BOTTOM_Y {
        capacity += 1;
        y -= LINE_STEP;
    }
    capacity
}

/// Split the lines into pages. An empty input still produces one page
/// so the rendered document carries the title.
pub fn paginate(lines: &[AggregatedLine]) -> Vec<&[AggregatedLine]> {
    if lines.is_empty() {
        return vec![lines];
    }
    lines.chunks(page_capacity()).collect()
}

/// Render the aggregated lines as a paginated PDF.
///
/// Every page carries the title at a fixed top coordinate; ingredient
/// lines run downward at a fixed step until the cursor would cross the
/// lower bound, at which point a new page starts.
pub fn render_pdf(lines: &[AggregatedLine]) -> Vec<u8> {
    let mut doc = PdfDocument::new(PDF_TITLE);

    let mut pages = Vec::new();
    for page_lines in paginate(lines) {
        let mut ops = vec![
            Op::StartTextSection,
            Op::SetTextCursor {
                pos: Point {
                    x: Pt(LEFT_X),
                    y: Pt(TITLE_Y),
                },
            },
            Op::SetFontSizeBuiltinFont {
                size: Pt(TITLE_SIZE),
                font: BuiltinFont::HelveticaBold,
            },
            Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(PDF_TITLE.to_string())],
                font: BuiltinFont::HelveticaBold,
            },
            Op::EndTextSection,
        ];

        let mut y = FIRST_LINE_Y;
        for line in page_lines {
            ops.extend([
                Op::StartTextSection,
                Op::SetTextCursor {
                    pos: Point {
                        x: Pt(LEFT_X),
                        y: Pt(y),
                    },
                },
                Op::SetFontSizeBuiltinFont {
                    size: Pt(BODY_SIZE),
                    font: BuiltinFont::Helvetica,
                },
                Op::WriteTextBuiltinFont {
                    items: vec![TextItem::Text(format_line(line))],
                    font: BuiltinFont::Helvetica,
                },
                Op::EndTextSection,
            ]);
            y -= LINE_STEP;
        }

        pages.push(PdfPage::new(PAGE_WIDTH, PAGE_HEIGHT, ops));
    }

    doc.with_pages(pages)
        .save(&PdfSaveOptions::default(), &mut Vec::new())
}
