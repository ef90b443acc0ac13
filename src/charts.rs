//! Chart renderers. Every chart is a self-contained block: it reserves its
//! full height with `ensure_space`, draws a caption and a framed plot at the
//! cursor, and leaves the cursor below the frame.

use crate::canvas::{Align, Canvas, TextStyle};
use crate::colors::{rate_color, Colors, Rgb};
use crate::drawing::{chart_caption, rounded_panel};
use crate::font_metrics::text_width;
use crate::layout::PageLayout;
use crate::metrics::{truncate_label, TrendTable};

const CAPTION_HEIGHT: f32 = 10.0;
// Frame extends this far below the plot baseline (axis labels and legend).
const FRAME_FOOTER: f32 = 20.0;
const SPACING_AFTER: f32 = 6.0;
const SWATCH: f32 = 4.0;
const GRIDLINES: usize = 4;

/// Plot area inside a chart frame.
#[derive(Debug, Clone, Copy)]
struct Plot {
    x: f32,
    width: f32,
    top: f32,
    height: f32,
}

impl Plot {
    fn base(&self) -> f32 {
        self.top + self.height
    }

    fn legend_y(&self) -> f32 {
        self.base() + 8.0
    }

    fn bar_height(&self, value: f64, max: f64) -> f32 {
        if max > 0.0 {
            (value.clamp(0.0, max) / max) as f32 * self.height
        } else {
            0.0
        }
    }
}

/// Total height a framed chart with a `plot_height` plot occupies.
pub fn framed_chart_height(plot_height: f32) -> f32 {
    CAPTION_HEIGHT + plot_height + FRAME_FOOTER
}

fn open_frame<C: Canvas>(
    page: &mut PageLayout<'_, C>,
    caption: &str,
    plot_height: f32,
    (inset, narrowing): (f32, f32),
) -> Plot {
    page.ensure_space(framed_chart_height(plot_height));
    chart_caption(page, caption);

    let (margin, width, y) = (page.margin(), page.content_width(), page.y());
    rounded_panel(
        page.canvas(),
        (margin, y - 2.0, width, plot_height + FRAME_FOOTER + 2.0),
        3.0,
        Colors::CARD_BG,
        Some(Colors::BORDER),
    );

    Plot {
        x: margin + inset,
        width: width - narrowing,
        top: y + 2.0,
        height: plot_height,
    }
}

fn close_frame<C: Canvas>(page: &mut PageLayout<'_, C>, plot: &Plot) {
    page.set_y(plot.base() + FRAME_FOOTER - 2.0 + SPACING_AFTER);
}

fn gridlines<C: Canvas>(canvas: &mut C, plot: &Plot, label: impl Fn(usize) -> String) {
    let style = TextStyle::new(6.0, Colors::MUTED).aligned(Align::Right);
    for i in 0..=GRIDLINES {
        let y = plot.top + plot.height * (GRIDLINES - i) as f32 / GRIDLINES as f32;
        canvas.line(plot.x, y, plot.x + plot.width, y, Colors::BORDER, 0.1);
        canvas.text(&label(i), plot.x - 2.0, y + 1.5, &style);
    }
}

fn count_gridlines<C: Canvas>(canvas: &mut C, plot: &Plot, max: f64) {
    gridlines(canvas, plot, |i| {
        format!("{}", (max * i as f64 / GRIDLINES as f64).round() as i64)
    });
}

/// Swatches right-aligned against the plot's right edge.
fn legend<C: Canvas>(canvas: &mut C, plot: &Plot, entries: &[(Rgb, &str)]) {
    let style = TextStyle::new(6.0, Colors::MUTED);
    let item_width =
        |label: &str| SWATCH + 2.0 + text_width(label, style.size, style.weight) + 6.0;
    let total: f32 = entries.iter().map(|(_, label)| item_width(label)).sum();

    let y = plot.legend_y();
    let mut x = plot.x + plot.width - total;
    for (color, label) in entries {
        canvas.fill_rect(x, y, SWATCH, SWATCH, *color);
        canvas.text(label, x + SWATCH + 2.0, y + 3.5, &style);
        x += item_width(label);
    }
}

/// Evenly spread bar slots: `(bar width, gap)` for `count` bars.
fn bar_slots(width: f32, count: usize, max_bar: f32) -> (f32, f32) {
    let n = count as f32;
    let bar = (width / n - 6.0).min(max_bar).max(1.0);
    let gap = (width - bar * n) / (n + 1.0);
    (bar, gap)
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayBar {
    pub label: String,
    pub total: u64,
    pub resolved: u64,
    pub color: Rgb,
    pub label_color: Rgb,
}

/// One bar per category: a track-colored bar for the total with the resolved
/// portion painted over it from the same baseline.
pub fn overlay_bar_chart<C: Canvas>(page: &mut PageLayout<'_, C>, caption: &str, bars: &[OverlayBar]) {
    if bars.is_empty() {
        return;
    }
    let plot = open_frame(page, caption, 42.0, (5.0, 10.0));
    let max = bars.iter().map(|b| b.total).max().unwrap_or(0) as f64;
    let (bar_width, gap) = bar_slots(plot.width, bars.len(), 22.0);
    let canvas = page.canvas();

    count_gridlines(canvas, &plot, max);

    for (i, bar) in bars.iter().enumerate() {
        let x = plot.x + gap + i as f32 * (bar_width + gap);
        let total_h = plot.bar_height(bar.total as f64, max);
        let resolved_h = plot.bar_height(bar.resolved as f64, max);
        let center = x + bar_width / 2.0;

        canvas.fill_rect(x, plot.base() - total_h, bar_width, total_h, Colors::BAR_TRACK);
        canvas.fill_rect(x, plot.base() - resolved_h, bar_width, resolved_h, bar.color);
        canvas.text(
            &bar.total.to_string(),
            center,
            plot.base() - total_h - 1.5,
            &TextStyle::new(6.0, Colors::WHITE).bold().centered(),
        );
        canvas.text(
            &bar.label,
            center,
            plot.base() + 5.0,
            &TextStyle::new(7.0, bar.label_color).bold().centered(),
        );
    }

    legend(canvas, &plot, &[(Colors::BAR_TRACK, "Open"), (Colors::BLUE, "Resolved")]);
    close_frame(page, &plot);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueAxis {
    /// Scaled to the largest value, gridlines labelled with counts.
    Count,
    /// Fixed 0-100 scale labelled `0%`..`100%`.
    Percent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub name: String,
    pub color: Rgb,
}

impl BarSeries {
    pub fn new(name: impl Into<String>, color: Rgb) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarGroup {
    pub label: String,
    pub values: Vec<f64>,
    pub colors: Vec<Option<Rgb>>,
    pub emphasized: bool,
}

impl BarGroup {
    pub fn new(label: impl Into<String>, values: Vec<f64>) -> Self {
        let colors = vec![None; values.len()];
        Self {
            label: label.into(),
            values,
            colors,
            emphasized: false,
        }
    }

    /// Paint bar `index` of this group in `color` instead of its series color.
    pub fn with_color(mut self, index: usize, color: Rgb) -> Self {
        if let Some(slot) = self.colors.get_mut(index) {
            *slot = Some(color);
        }
        self
    }

    /// Accent-colored bold label.
    pub fn emphasized(mut self, emphasized: bool) -> Self {
        self.emphasized = emphasized;
        self
    }
}

/// Side-by-side bars per category, all scaled to one shared axis.
#[derive(Debug, Clone)]
pub struct GroupedBarChart<'a> {
    pub caption: &'a str,
    pub series: &'a [BarSeries],
    pub plot_height: f32,
    /// Bar width as a fraction of the group width.
    pub bar_fraction: f32,
    pub max_bar_width: f32,
    pub label_size: f32,
    pub axis: ValueAxis,
}

impl<'a> GroupedBarChart<'a> {
    pub fn new(caption: &'a str, series: &'a [BarSeries]) -> Self {
        Self {
            caption,
            series,
            plot_height: 42.0,
            bar_fraction: 0.3,
            max_bar_width: 12.0,
            label_size: 6.0,
            axis: ValueAxis::Count,
        }
    }

    pub fn plot_height(mut self, height: f32) -> Self {
        self.plot_height = height;
        self
    }

    pub fn bar_width(mut self, fraction: f32, max: f32) -> Self {
        self.bar_fraction = fraction;
        self.max_bar_width = max;
        self
    }

    pub fn label_size(mut self, size: f32) -> Self {
        self.label_size = size;
        self
    }

    pub fn axis(mut self, axis: ValueAxis) -> Self {
        self.axis = axis;
        self
    }

    pub fn draw<C: Canvas>(&self, page: &mut PageLayout<'_, C>, groups: &[BarGroup]) {
        if groups.is_empty() {
            return;
        }
        let plot = open_frame(page, self.caption, self.plot_height, (12.0, 18.0));
        let canvas = page.canvas();

        let max = match self.axis {
            ValueAxis::Percent => {
                gridlines(canvas, &plot, |i| format!("{}%", i * 25));
                100.0
            }
            ValueAxis::Count => {
                let max = groups
                    .iter()
                    .flat_map(|g| g.values.iter().copied())
                    .fold(0.0_f64, f64::max);
                count_gridlines(canvas, &plot, max);
                max
            }
        };

        let group_width = plot.width / groups.len() as f32;
        let bar_width = (group_width * self.bar_fraction).min(self.max_bar_width);

        for (i, group) in groups.iter().enumerate() {
            let center = plot.x + (i as f32 + 0.5) * group_width;
            let n = group.values.len() as f32;
            let mut x = center - (n * bar_width + (n - 1.0).max(0.0)) / 2.0;

            for (j, value) in group.values.iter().enumerate() {
                let color = group
                    .colors
                    .get(j)
                    .copied()
                    .flatten()
                    .or_else(|| self.series.get(j).map(|s| s.color))
                    .unwrap_or_else(|| Colors::series(j));
                let h = plot.bar_height(*value, max);
                canvas.fill_rect(x, plot.base() - h, bar_width, h, color);
                x += bar_width + 1.0;
            }

            let style = if group.emphasized {
                TextStyle::new(self.label_size, Colors::BLUE).bold()
            } else {
                TextStyle::new(self.label_size, Colors::MUTED)
            };
            canvas.text(&group.label, center, plot.base() + 5.0, &style.centered());
        }

        let entries: Vec<(Rgb, &str)> = self
            .series
            .iter()
            .map(|s| (s.color, s.name.as_str()))
            .collect();
        legend(canvas, &plot, &entries);
        close_frame(page, &plot);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressBar {
    pub value: f64,
    pub tag: Option<String>,
}

impl ProgressBar {
    pub fn new(value: f64) -> Self {
        Self { value, tag: None }
    }

    pub fn tagged(value: f64, tag: impl Into<String>) -> Self {
        Self {
            value,
            tag: Some(tag.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRow {
    pub label: String,
    pub bars: Vec<ProgressBar>,
}

/// Horizontal percentage bars, one or more per labelled row.
#[derive(Debug, Clone, Copy)]
pub struct ProgressChart<'a> {
    pub caption: &'a str,
    /// Printed values are clamped to `0..=100 + overflow_cap`.
    pub overflow_cap: f64,
}

const PROGRESS_BAR_HEIGHT: f32 = 6.0;
const PROGRESS_MIN_FILL: f32 = 2.0;

impl<'a> ProgressChart<'a> {
    pub fn new(caption: &'a str, overflow_cap: f64) -> Self {
        Self { caption, overflow_cap }
    }

    fn row_height(row: &ProgressRow) -> f32 {
        row.bars.len().max(1) as f32 * (PROGRESS_BAR_HEIGHT + 1.0) + 3.0
    }

    pub fn height(&self, rows: &[ProgressRow]) -> f32 {
        CAPTION_HEIGHT + rows.iter().map(Self::row_height).sum::<f32>() + 4.0
    }

    /// Printed value for `value`.
    pub fn shown(&self, value: f64) -> f64 {
        value.clamp(0.0, 100.0 + self.overflow_cap)
    }

    pub fn draw<C: Canvas>(&self, page: &mut PageLayout<'_, C>, rows: &[ProgressRow]) {
        if rows.is_empty() {
            return;
        }
        page.ensure_space(self.height(rows));
        chart_caption(page, self.caption);

        let width = page.content_width();
        let track_x = page.margin() + width * 0.32;
        let track_w = width * 0.55;
        let label_x = page.margin();

        for row in rows {
            let y = page.y();
            page.canvas().text(
                &row.label,
                label_x,
                y + PROGRESS_BAR_HEIGHT / 2.0 + 1.5,
                &TextStyle::new(7.0, Colors::WHITE),
            );

            for bar in &row.bars {
                let y = page.y();
                let shown = self.shown(bar.value);
                let fill = (track_w * (shown / 100.0).min(1.0) as f32).max(PROGRESS_MIN_FILL);
                let text_y = y + PROGRESS_BAR_HEIGHT / 2.0 + 1.5;
                let canvas = page.canvas();

                canvas.fill_rounded_rect(track_x, y, track_w, PROGRESS_BAR_HEIGHT, 1.0, Colors::CARD_BG);
                canvas.fill_rounded_rect(track_x, y, fill, PROGRESS_BAR_HEIGHT, 1.0, rate_color(shown));
                canvas.text(
                    &format!("{:.0}%", shown),
                    track_x + track_w + 3.0,
                    text_y,
                    &TextStyle::new(7.0, Colors::WHITE).bold(),
                );
                if let Some(tag) = &bar.tag {
                    canvas.text(tag, track_x + track_w + 13.0, text_y, &TextStyle::new(5.0, Colors::MUTED));
                }
                page.advance(PROGRESS_BAR_HEIGHT + 1.0);
            }
            page.advance(3.0);
        }
        page.advance(4.0);
    }
}

const LINE_PLOT_HEIGHT: f32 = 45.0;

/// Polylines over a shared date axis with one joint value scale for every
/// series. Lines break where a series has no value for a date.
pub fn line_chart<C: Canvas>(page: &mut PageLayout<'_, C>, caption: &str, table: &TrendTable) {
    if table.dates.is_empty() || table.series.is_empty() {
        return;
    }
    let plot = open_frame(page, caption, LINE_PLOT_HEIGHT, (12.0, 18.0));
    let (min, max) = table.value_range();
    let range = if max - min == 0.0 { 1.0 } else { max - min };
    let canvas = page.canvas();

    gridlines(canvas, &plot, |i| {
        format!("{}", (min + range * i as f64 / GRIDLINES as f64).round() as i64)
    });

    let steps = table.dates.len().saturating_sub(1).max(1) as f32;
    let x_at = |date: usize| plot.x + date as f32 / steps * plot.width;
    let y_at = |value: f64| plot.base() - ((value - min) / range) as f32 * plot.height;

    for (s, _) in table.series.iter().enumerate() {
        let color = Colors::series(s);
        let points: Vec<Option<(f32, f32)>> = (0..table.dates.len())
            .map(|d| table.value(s, d).map(|v| (x_at(d), y_at(v))))
            .collect();

        for pair in points.windows(2) {
            if let [Some((x1, y1)), Some((x2, y2))] = pair {
                canvas.line(*x1, *y1, *x2, *y2, color, 0.8);
            }
        }
        for (x, y) in points.iter().flatten() {
            canvas.circle(*x, *y, 1.0, color);
        }
    }

    let date_style = TextStyle::new(5.0, Colors::MUTED).centered();
    for (d, date) in table.dates.iter().enumerate() {
        canvas.text(date, x_at(d), plot.base() + 5.0, &date_style);
    }

    let spacing = (plot.width / table.series.len() as f32).min(35.0);
    let legend_y = plot.legend_y();
    for (s, name) in table.series.iter().enumerate() {
        let x = plot.x + s as f32 * spacing;
        canvas.fill_rect(x, legend_y, SWATCH, SWATCH, Colors::series(s));
        canvas.text(
            &truncate_label(name, 10, 9),
            x + 5.5,
            legend_y + 3.5,
            &TextStyle::new(5.0, Colors::MUTED),
        );
    }

    close_frame(page, &plot);
}
