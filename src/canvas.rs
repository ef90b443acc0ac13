use crate::colors::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub color: Rgb,
    pub weight: FontWeight,
    pub align: Align,
}

impl TextStyle {
    pub fn new(size: f32, color: Rgb) -> Self {
        Self {
            size,
            color,
            weight: FontWeight::Regular,
            align: Align::Left,
        }
    }

    pub fn bold(mut self) -> Self {
        self.weight = FontWeight::Bold;
        self
    }

    pub fn centered(mut self) -> Self {
        self.align = Align::Center;
        self
    }

    pub fn aligned(mut self, align: Align) -> Self {
        self.align = align;
        self
    }
}

/// Drawing surface for the report layout.
///
/// Coordinates are millimetres from the top-left corner of the page, `y`
/// growing downwards; text `y` is the baseline. Line widths are millimetres.
pub trait Canvas {
    fn add_page(&mut self);

    fn page_count(&self) -> usize;

    /// Make the zero-based page `index` the drawing target.
    fn set_page(&mut self, index: usize);

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb);

    fn fill_rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32, color: Rgb);

    fn stroke_rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32, color: Rgb, width: f32);

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: Rgb, width: f32);

    fn circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgb);

    fn text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect { x: f32, y: f32, w: f32, h: f32, color: Rgb },
    FillRoundedRect { x: f32, y: f32, w: f32, h: f32, radius: f32, color: Rgb },
    StrokeRoundedRect { x: f32, y: f32, w: f32, h: f32, radius: f32, color: Rgb, width: f32 },
    Line { x1: f32, y1: f32, x2: f32, y2: f32, color: Rgb, width: f32 },
    Circle { cx: f32, cy: f32, radius: f32, color: Rgb },
    Text { text: String, x: f32, y: f32, style: TextStyle },
}

impl DrawOp {
    /// Lowest point reached by the operation (text uses its baseline).
    pub fn bottom(&self) -> f32 {
        match self {
            DrawOp::FillRect { y, h, .. }
            | DrawOp::FillRoundedRect { y, h, .. }
            | DrawOp::StrokeRoundedRect { y, h, .. } => y + h,
            DrawOp::Line { y1, y2, .. } => y1.max(*y2),
            DrawOp::Circle { cy, radius, .. } => cy + radius,
            DrawOp::Text { y, .. } => *y,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DrawOp::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// In-memory canvas that records every drawing operation per page.
///
/// Used for dry-run layout and for inspecting the renderer's output.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    pages: Vec<Vec<DrawOp>>,
    current: usize,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pages(&self) -> &[Vec<DrawOp>] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> &[DrawOp] {
        self.pages.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All text drawn on `index`, in drawing order.
    pub fn page_texts(&self, index: usize) -> Vec<&str> {
        self.page(index).iter().filter_map(DrawOp::as_text).collect()
    }

    /// First text op equal to `needle`, with its page index.
    pub fn find_text(&self, needle: &str) -> Option<(usize, &DrawOp)> {
        self.pages.iter().enumerate().find_map(|(index, ops)| {
            ops.iter()
                .find(|op| op.as_text() == Some(needle))
                .map(|op| (index, op))
        })
    }

    fn push(&mut self, op: DrawOp) {
        if self.pages.is_empty() {
            self.add_page();
        }
        self.pages[self.current].push(op);
    }
}

impl Canvas for RecordingCanvas {
    fn add_page(&mut self) {
        self.pages.push(Vec::new());
        self.current = self.pages.len() - 1;
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn set_page(&mut self, index: usize) {
        if index < self.pages.len() {
            self.current = index;
        }
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        self.push(DrawOp::FillRect { x, y, w, h, color });
    }

    fn fill_rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32, color: Rgb) {
        self.push(DrawOp::FillRoundedRect { x, y, w, h, radius, color });
    }

    fn stroke_rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32, color: Rgb, width: f32) {
        self.push(DrawOp::StrokeRoundedRect { x, y, w, h, radius, color, width });
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: Rgb, width: f32) {
        self.push(DrawOp::Line { x1, y1, x2, y2, color, width });
    }

    fn circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgb) {
        self.push(DrawOp::Circle { cx, cy, radius, color });
    }

    fn text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle) {
        self.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            style: *style,
        });
    }
}
