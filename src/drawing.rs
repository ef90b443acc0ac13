use crate::canvas::{Align, Canvas, TextStyle};
use crate::colors::{Colors, Rgb};
use crate::layout::PageLayout;

pub const HEADER_HEIGHT: f32 = 8.0;
pub const ROW_HEIGHT: f32 = 7.0;
pub const CARD_HEIGHT: f32 = 28.0;
const CARD_GAP: f32 = 3.0;
const CELL_PADDING: f32 = 2.0;

/// Table column. Widths of one table must add up to the content width.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub label: String,
    pub width: f32,
    pub align: Align,
}

impl Column {
    pub fn left(label: impl Into<String>, width: f32) -> Self {
        Self {
            label: label.into(),
            width,
            align: Align::Left,
        }
    }

    pub fn right(label: impl Into<String>, width: f32) -> Self {
        Self {
            label: label.into(),
            width,
            align: Align::Right,
        }
    }

    fn text_x(&self, x: f32) -> f32 {
        match self.align {
            Align::Right => x + self.width - CELL_PADDING,
            Align::Center => x + self.width / 2.0,
            Align::Left => x + CELL_PADDING,
        }
    }
}

/// Build columns from `(label, fraction of content width, align)` triples.
pub fn columns(content_width: f32, spec: &[(&str, f32, Align)]) -> Vec<Column> {
    spec.iter()
        .map(|(label, fraction, align)| Column {
            label: label.to_string(),
            width: content_width * fraction,
            align: *align,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    pub color: Option<Rgb>,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
        }
    }

    pub fn colored(text: impl Into<String>, color: Rgb) -> Self {
        Self {
            text: text.into(),
            color: Some(color),
        }
    }
}

/// Filled rounded rectangle with an optional 0.3 outline.
pub fn rounded_panel<C: Canvas>(
    canvas: &mut C,
    (x, y, w, h): (f32, f32, f32, f32),
    radius: f32,
    fill: Rgb,
    border: Option<Rgb>,
) {
    canvas.fill_rounded_rect(x, y, w, h, radius, fill);
    if let Some(border) = border {
        canvas.stroke_rounded_rect(x, y, w, h, radius, border, 0.3);
    }
}

pub fn table_header<C: Canvas>(page: &mut PageLayout<'_, C>, columns: &[Column]) {
    page.ensure_space(HEADER_HEIGHT);
    let (margin, width, y) = (page.margin(), page.content_width(), page.y());
    let canvas = page.canvas();
    canvas.fill_rect(margin, y, width, HEADER_HEIGHT - 1.0, Colors::CARD_BG);

    let mut x = margin;
    for column in columns {
        let style = TextStyle::new(8.0, Colors::MUTED).bold().aligned(column.align);
        canvas.text(&column.label, column.text_x(x), y + 5.0, &style);
        x += column.width;
    }

    page.advance(HEADER_HEIGHT);
    let separator = page.y() - 1.0;
    page.canvas()
        .line(margin, separator, margin + width, separator, Colors::BORDER, 0.3);
}

/// One 9pt data row. Cells without a color are white.
pub fn table_row<C: Canvas>(page: &mut PageLayout<'_, C>, cells: &[Cell], columns: &[Column]) {
    page.ensure_space(ROW_HEIGHT);
    let (margin, width, y) = (page.margin(), page.content_width(), page.y());
    let canvas = page.canvas();

    let mut x = margin;
    for (cell, column) in cells.iter().zip(columns) {
        let style = TextStyle::new(9.0, cell.color.unwrap_or(Colors::WHITE)).aligned(column.align);
        canvas.text(&cell.text, column.text_x(x), y + 4.0, &style);
        x += column.width;
    }

    page.advance(ROW_HEIGHT);
    let separator = page.y() - 1.0;
    page.canvas()
        .line(margin, separator, margin + width, separator, Colors::BORDER, 0.1);
}

/// 13pt section heading at the cursor, followed by `gap`.
pub fn heading<C: Canvas>(page: &mut PageLayout<'_, C>, title: &str, gap: f32) {
    let (x, y) = (page.margin(), page.y());
    page.canvas()
        .text(title, x, y, &TextStyle::new(13.0, Colors::WHITE).bold());
    page.advance(gap);
}

/// Muted 10pt chart caption; the chart body starts 10 below the cursor.
pub fn chart_caption<C: Canvas>(page: &mut PageLayout<'_, C>, caption: &str) {
    let (x, y) = (page.margin(), page.y());
    page.canvas()
        .text(caption, x, y + 4.0, &TextStyle::new(10.0, Colors::MUTED).bold());
    page.advance(10.0);
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricCard {
    pub label: String,
    pub value: String,
    pub highlight: bool,
}

impl MetricCard {
    pub fn new(label: impl Into<String>, value: impl Into<String>, highlight: bool) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            highlight,
        }
    }
}

/// Font sizes for label and value; rows of five use the smaller pair.
pub fn card_fonts(count: usize) -> (f32, f32) {
    if count >= 5 {
        (7.0, 14.0)
    } else {
        (8.0, 16.0)
    }
}

/// Evenly spaced metric cards across the content width at the cursor.
/// Highlighted cards get a red outline and value. Advances by the card height.
pub fn card_row<C: Canvas>(page: &mut PageLayout<'_, C>, cards: &[MetricCard]) {
    if cards.is_empty() {
        return;
    }
    let n = cards.len() as f32;
    let card_width = (page.content_width() - CARD_GAP * (n - 1.0)) / n;
    let (label_size, value_size) = card_fonts(cards.len());
    let (margin, y) = (page.margin(), page.y());
    let canvas = page.canvas();

    for (i, card) in cards.iter().enumerate() {
        let x = margin + i as f32 * (card_width + CARD_GAP);
        let accent = if card.highlight { Colors::RED_SOLID } else { Colors::BORDER };
        rounded_panel(canvas, (x, y, card_width, CARD_HEIGHT), 2.0, Colors::CARD_BG, Some(accent));

        let center = x + card_width / 2.0;
        canvas.text(&card.label, center, y + 10.0, &TextStyle::new(label_size, Colors::MUTED).centered());
        let value_color = if card.highlight { Colors::RED_SOLID } else { Colors::WHITE };
        canvas.text(
            &card.value,
            center,
            y + 21.0,
            &TextStyle::new(value_size, value_color).bold().centered(),
        );
    }
    page.advance(CARD_HEIGHT);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawOp, RecordingCanvas};
    use crate::layout::PageGeometry;

    fn two_columns() -> Vec<Column> {
        vec![Column::left("Name", 90.0), Column::right("Value", 90.0)]
    }

    #[test]
    fn header_advances_and_draws_separator() {
        let mut canvas = RecordingCanvas::new();
        let mut page = PageLayout::new(&mut canvas, PageGeometry::default());
        page.new_page();
        table_header(&mut page, &two_columns());
        assert_eq!(page.y(), 23.0);

        let ops = canvas.page(0);
        assert!(ops.contains(&DrawOp::Line {
            x1: 15.0,
            y1: 22.0,
            x2: 195.0,
            y2: 22.0,
            color: Colors::BORDER,
            width: 0.3
        }));
    }

    #[test]
    fn right_aligned_cells_hug_the_column_edge() {
        let mut canvas = RecordingCanvas::new();
        let mut page = PageLayout::new(&mut canvas, PageGeometry::default());
        page.new_page();
        table_row(&mut page, &[Cell::new("a"), Cell::colored("42", Colors::GREEN)], &two_columns());

        match canvas.find_text("42") {
            Some((_, DrawOp::Text { x, style, .. })) => {
                assert_eq!(*x, 193.0);
                assert_eq!(style.align, Align::Right);
                assert_eq!(style.color, Colors::GREEN);
            }
            other => panic!("unexpected {:?}", other),
        }
        match canvas.find_text("a") {
            Some((_, DrawOp::Text { x, style, .. })) => {
                assert_eq!(*x, 17.0);
                assert_eq!(style.color, Colors::WHITE);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn row_at_the_bottom_moves_to_next_page() {
        let mut canvas = RecordingCanvas::new();
        let mut page = PageLayout::new(&mut canvas, PageGeometry::default());
        page.new_page();
        page.set_y(278.0);
        table_row(&mut page, &[Cell::new("late"), Cell::new("1")], &two_columns());
        assert_eq!(page.page_count(), 2);
        assert_eq!(canvas.find_text("late").map(|(p, _)| p), Some(1));
    }

    #[test]
    fn highlighted_card_uses_red_outline() {
        let mut canvas = RecordingCanvas::new();
        let mut page = PageLayout::new(&mut canvas, PageGeometry::default());
        page.new_page();
        card_row(
            &mut page,
            &[
                MetricCard::new("Open Findings", "456", true),
                MetricCard::new("Closed Findings", "1,823", false),
                MetricCard::new("Avg. MTTR", "12.5 days", false),
                MetricCard::new("Remediation Rate", "80%", false),
            ],
        );
        assert_eq!(page.y(), 15.0 + CARD_HEIGHT);

        let outlines: Vec<Rgb> = canvas
            .page(0)
            .iter()
            .filter_map(|op| match op {
                DrawOp::StrokeRoundedRect { color, .. } => Some(*color),
                _ => None,
            })
            .collect();
        assert_eq!(outlines, vec![Colors::RED_SOLID, Colors::BORDER, Colors::BORDER, Colors::BORDER]);
    }

    #[test]
    fn five_cards_use_smaller_fonts() {
        assert_eq!(card_fonts(4), (8.0, 16.0));
        assert_eq!(card_fonts(5), (7.0, 14.0));
    }

    #[test]
    fn column_fractions_follow_content_width() {
        let cols = columns(180.0, &[("A", 0.25, Align::Left), ("B", 0.75, Align::Right)]);
        assert_eq!(cols[0].width, 45.0);
        assert_eq!(cols[1].width, 135.0);
    }
}
