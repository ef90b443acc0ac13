use tracing::debug;

use crate::canvas::Canvas;
use crate::colors::{Colors, Rgb};

/// Page size and margin in millimetres. Every layout width is derived from
/// `content_width()`, so only these values change between page sizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl Default for PageGeometry {
    // A4 portrait
    fn default() -> Self {
        Self {
            width: 210.0,
            height: 297.0,
            margin: 15.0,
        }
    }
}

impl PageGeometry {
    pub fn content_width(&self) -> f32 {
        self.width - self.margin * 2.0
    }

    /// Lowest `y` any block may reach.
    pub fn bottom_limit(&self) -> f32 {
        self.height - self.margin
    }

    pub fn center_x(&self) -> f32 {
        self.width / 2.0
    }

    pub fn right(&self) -> f32 {
        self.width - self.margin
    }
}

/// Write cursor over a canvas: greedy top-to-bottom flow with forced page
/// breaks.
pub struct PageLayout<'a, C: Canvas> {
    canvas: &'a mut C,
    geometry: PageGeometry,
    background: Rgb,
    y: f32,
}

impl<'a, C: Canvas> PageLayout<'a, C> {
    pub fn new(canvas: &'a mut C, geometry: PageGeometry) -> Self {
        Self {
            canvas,
            geometry,
            background: Colors::BG,
            y: geometry.margin,
        }
    }

    pub fn canvas(&mut self) -> &mut C {
        &mut *self.canvas
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn set_y(&mut self, y: f32) {
        self.y = y;
    }

    pub fn advance(&mut self, dy: f32) {
        self.y += dy;
    }

    pub fn margin(&self) -> f32 {
        self.geometry.margin
    }

    pub fn content_width(&self) -> f32 {
        self.geometry.content_width()
    }

    /// Add a page, paint its background and move the cursor to the top margin.
    pub fn new_page(&mut self) {
        self.canvas.add_page();
        let PageGeometry { width, height, .. } = self.geometry;
        self.canvas.fill_rect(0.0, 0.0, width, height, self.background);
        self.y = self.geometry.margin;
        debug!("Started page {}", self.canvas.page_count());
    }

    /// Break to a new page unless `height` more millimetres fit above the
    /// bottom margin. Returns whether a break happened.
    pub fn ensure_space(&mut self, height: f32) -> bool {
        if self.canvas.page_count() == 0 || self.y + height > self.geometry.bottom_limit() {
            self.new_page();
            true
        } else {
            false
        }
    }

    pub fn page_count(&self) -> usize {
        self.canvas.page_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawOp, RecordingCanvas};

    #[test]
    fn content_width_excludes_both_margins() {
        let geometry = PageGeometry::default();
        assert_eq!(geometry.content_width(), 180.0);
        assert_eq!(geometry.bottom_limit(), 282.0);
    }

    #[test]
    fn new_page_paints_background_and_resets_cursor() {
        let mut canvas = RecordingCanvas::new();
        let mut page = PageLayout::new(&mut canvas, PageGeometry::default());
        page.new_page();
        page.advance(100.0);
        page.new_page();
        assert_eq!(page.y(), 15.0);
        assert_eq!(canvas.page_count(), 2);
        assert_eq!(
            canvas.page(1)[0],
            DrawOp::FillRect { x: 0.0, y: 0.0, w: 210.0, h: 297.0, color: Colors::BG }
        );
    }

    #[test]
    fn ensure_space_breaks_only_when_block_would_overflow() {
        let mut canvas = RecordingCanvas::new();
        let mut page = PageLayout::new(&mut canvas, PageGeometry::default());
        page.new_page();
        page.set_y(250.0);
        assert!(!page.ensure_space(32.0)); // ends exactly at 282
        assert!(page.ensure_space(32.5));
        assert_eq!(page.y(), 15.0);
        assert_eq!(page.page_count(), 2);
    }

    #[test]
    fn ensure_space_opens_the_first_page() {
        let mut canvas = RecordingCanvas::new();
        let mut page = PageLayout::new(&mut canvas, PageGeometry::default());
        assert!(page.ensure_space(10.0));
        assert_eq!(page.page_count(), 1);
    }

    #[test]
    fn other_page_sizes_keep_proportions() {
        let letter = PageGeometry { width: 215.9, height: 279.4, margin: 15.0 };
        assert!((letter.content_width() - 185.9).abs() < 1e-4);
        assert!((letter.center_x() - 107.95).abs() < 1e-4);
    }
}
