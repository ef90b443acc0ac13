use printpdf::path::{PaintMode, WindingOrder};
use printpdf::*;
use std::f32::consts::PI;
use std::io::BufWriter;

use crate::canvas::{Align, Canvas, FontWeight, TextStyle};
use crate::colors::Rgb;
use crate::error::ReportError;
use crate::font_metrics::text_width;

const MM_TO_PT: f32 = 2.834_646;
// Segments per quarter circle when approximating arcs
const ARC_SEGMENTS: usize = 6;

fn to_pdf_color(color: Rgb) -> Color {
    Color::Rgb(printpdf::Rgb::new(
        color.0 as f32 / 255.0,
        color.1 as f32 / 255.0,
        color.2 as f32 / 255.0,
        None,
    ))
}

/// `Canvas` backed by a printpdf document held entirely in memory.
pub struct PdfCanvas {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    bold_font: IndirectFontRef,
    width: f32,
    height: f32,
    // printpdf always creates the first page with the document
    first_page: Option<(PdfPageIndex, PdfLayerIndex)>,
    pages: Vec<(PdfPageIndex, PdfLayerIndex)>,
    current: usize,
}

impl PdfCanvas {
    pub fn new(title: &str, width: f32, height: f32) -> Result<Self, ReportError> {
        let (doc, page1, layer1) = PdfDocument::new(title, Mm(width), Mm(height), "Layer 1");

        let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;
        let bold_font = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

        Ok(Self {
            doc,
            font,
            bold_font,
            width,
            height,
            first_page: Some((page1, layer1)),
            pages: Vec::new(),
            current: 0,
        })
    }

    /// Serialize the finished document.
    pub fn finish(self) -> Result<Vec<u8>, ReportError> {
        let mut buffer = Vec::new();
        self.doc.save(&mut BufWriter::new(&mut buffer))?;
        Ok(buffer)
    }

    fn layer(&mut self) -> PdfLayerReference {
        if self.pages.is_empty() {
            self.add_page();
        }
        let (page, layer) = self.pages[self.current];
        self.doc.get_page(page).get_layer(layer)
    }

    fn point(&self, x: f32, y: f32) -> Point {
        Point::new(Mm(x), Mm(self.height - y))
    }

    fn rect_points(&self, x: f32, y: f32, w: f32, h: f32) -> Vec<(Point, bool)> {
        vec![
            (self.point(x, y), false),
            (self.point(x + w, y), false),
            (self.point(x + w, y + h), false),
            (self.point(x, y + h), false),
        ]
    }

    fn rounded_rect_points(&self, x: f32, y: f32, w: f32, h: f32, radius: f32) -> Vec<(Point, bool)> {
        let r = radius.min(w / 2.0).min(h / 2.0).max(0.0);
        if r <= 0.0 {
            return self.rect_points(x, y, w, h);
        }

        let mut points = Vec::with_capacity(4 * (ARC_SEGMENTS + 1));
        // Corner centres clockwise from top-left, each with its start angle
        // (y grows downwards, so angles run clockwise on the page)
        let corners = [
            (x + r, y + r, PI),
            (x + w - r, y + r, 1.5 * PI),
            (x + w - r, y + h - r, 0.0),
            (x + r, y + h - r, 0.5 * PI),
        ];
        for (cx, cy, start) in corners {
            for i in 0..=ARC_SEGMENTS {
                let angle = start + (i as f32 / ARC_SEGMENTS as f32) * (PI / 2.0);
                points.push((self.point(cx + r * angle.cos(), cy + r * angle.sin()), false));
            }
        }
        points
    }

    fn fill_polygon(&mut self, points: Vec<(Point, bool)>, color: Rgb) {
        let layer = self.layer();
        layer.set_fill_color(to_pdf_color(color));
        layer.add_polygon(Polygon {
            rings: vec![points],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }
}

impl Canvas for PdfCanvas {
    fn add_page(&mut self) {
        let indices = match self.first_page.take() {
            Some(first) => first,
            None => self.doc.add_page(Mm(self.width), Mm(self.height), "Layer 1"),
        };
        self.pages.push(indices);
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
        let points = self.rect_points(x, y, w, h);
        self.fill_polygon(points, color);
    }

    fn fill_rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32, color: Rgb) {
        let points = self.rounded_rect_points(x, y, w, h, radius);
        self.fill_polygon(points, color);
    }

    fn stroke_rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32, color: Rgb, width: f32) {
        let points = self.rounded_rect_points(x, y, w, h, radius);
        let layer = self.layer();
        layer.set_outline_color(to_pdf_color(color));
        layer.set_outline_thickness(width * MM_TO_PT);
        layer.add_line(Line {
            points,
            is_closed: true,
        });
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: Rgb, width: f32) {
        let points = vec![(self.point(x1, y1), false), (self.point(x2, y2), false)];
        let layer = self.layer();
        layer.set_outline_color(to_pdf_color(color));
        layer.set_outline_thickness(width * MM_TO_PT);
        layer.add_line(Line {
            points,
            is_closed: false,
        });
    }

    fn circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgb) {
        let steps = ARC_SEGMENTS * 4;
        let points = (0..steps)
            .map(|i| {
                let angle = i as f32 / steps as f32 * 2.0 * PI;
                (self.point(cx + radius * angle.cos(), cy + radius * angle.sin()), false)
            })
            .collect();
        self.fill_polygon(points, color);
    }

    fn text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle) {
        let offset = match style.align {
            Align::Left => 0.0,
            Align::Center => text_width(text, style.size, style.weight) / 2.0,
            Align::Right => text_width(text, style.size, style.weight),
        };
        let baseline = self.height - y;
        let layer = self.layer();
        let font = match style.weight {
            FontWeight::Regular => &self.font,
            FontWeight::Bold => &self.bold_font,
        };
        layer.set_fill_color(to_pdf_color(style.color));
        layer.use_text(text, style.size, Mm(x - offset), Mm(baseline), font);
    }
}
