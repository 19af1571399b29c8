//! Per-request canvas renderer.
//!
//! Every call to [`render`] allocates its own pixel buffer, draws the chart
//! and encodes it to PNG. There is no shared figure, so concurrent requests
//! cannot bleed into each other by construction.

use std::io::Cursor;

use super::font;
use super::{parse_color, ChartSpec, RenderError, Series, SeriesKind};

pub(crate) type Rgb = [u8; 3];

const WHITE: Rgb = [0xff, 0xff, 0xff];
const TEXT: Rgb = [0x20, 0x20, 0x20];
const AXIS: Rgb = [0x40, 0x40, 0x40];
const GRID: Rgb = [0xdc, 0xdc, 0xdc];

/// Default series colors, cycled in order.
const PALETTE: [Rgb; 6] = [
    [0x1f, 0x77, 0xb4],
    [0xff, 0x7f, 0x0e],
    [0x2c, 0xa0, 0x2c],
    [0xd6, 0x27, 0x28],
    [0x94, 0x67, 0xbd],
    [0x8c, 0x56, 0x4b],
];

/// Render a validated descriptor to PNG bytes.
pub fn render(spec: &ChartSpec) -> Result<Vec<u8>, RenderError> {
    spec.validate()?;

    let (width, height) = spec.dimensions();
    let layout = Layout::for_spec(spec, width, height);
    let bounds = data_bounds(spec);
    let map = Mapper { bounds, layout };

    let mut canvas = Canvas::new(width, height);

    draw_axes(&mut canvas, spec, &map);
    for (i, series) in spec.series.iter().enumerate() {
        let color = series_color(series, i)?;
        draw_series(&mut canvas, series, color, &map);
    }
    draw_frame(&mut canvas, &map.layout);
    draw_labels(&mut canvas, spec, &map.layout);
    draw_legend(&mut canvas, spec, &map.layout);

    canvas.into_png()
}

fn series_color(series: &Series, index: usize) -> Result<Rgb, RenderError> {
    match &series.color {
        Some(s) => parse_color(s),
        None => Ok(PALETTE[index % PALETTE.len()]),
    }
}

// ---------------------------------------------------------------------------
// Layout and coordinate mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Layout {
    left: i32,
    top: i32,
    plot_w: i32,
    plot_h: i32,
    width: i32,
    height: i32,
}

impl Layout {
    fn for_spec(spec: &ChartSpec, width: u32, height: u32) -> Self {
        let top = if spec.title.is_some() { 42 } else { 18 };
        let bottom = if spec.x_label.is_some() { 46 } else { 30 };
        let left = if spec.y_label.is_some() { 70 } else { 54 };
        let right = 18;
        Self {
            left,
            top,
            plot_w: width as i32 - left - right,
            plot_h: height as i32 - top - bottom,
            width: width as i32,
            height: height as i32,
        }
    }

    fn right(&self) -> i32 {
        self.left + self.plot_w - 1
    }

    fn bottom(&self) -> i32 {
        self.top + self.plot_h - 1
    }
}

#[derive(Debug, Clone, Copy)]
struct Bounds {
    x0: f64,
    x1: f64,
    y0: f64,
    y1: f64,
}

/// Data extent over every series, padded by 5% a side. Bar charts always
/// include the y=0 baseline. Degenerate extents (single point, constant
/// series) are widened so the pixel mapping stays well-defined.
fn data_bounds(spec: &ChartSpec) -> Bounds {
    let mut x0 = f64::INFINITY;
    let mut x1 = f64::NEG_INFINITY;
    let mut y0 = f64::INFINITY;
    let mut y1 = f64::NEG_INFINITY;
    for series in &spec.series {
        for &(x, y) in &series.points {
            x0 = x0.min(x);
            x1 = x1.max(x);
            y0 = y0.min(y);
            y1 = y1.max(y);
        }
    }
    if spec.series.iter().any(|s| s.kind == SeriesKind::Bars) {
        y0 = y0.min(0.0);
        y1 = y1.max(0.0);
    }
    let (x0, x1) = pad_extent(x0, x1);
    let (y0, y1) = pad_extent(y0, y1);
    Bounds { x0, x1, y0, y1 }
}

fn pad_extent(lo: f64, hi: f64) -> (f64, f64) {
    let span = hi - lo;
    if span > 1e-12 {
        (lo - span * 0.05, hi + span * 0.05)
    } else {
        let d = if lo.abs() > 1e-12 { lo.abs() * 0.1 } else { 1.0 };
        (lo - d, hi + d)
    }
}

struct Mapper {
    bounds: Bounds,
    layout: Layout,
}

impl Mapper {
    fn px(&self, x: f64) -> i32 {
        let t = (x - self.bounds.x0) / (self.bounds.x1 - self.bounds.x0);
        self.layout.left + (t * (self.layout.plot_w - 1) as f64).round() as i32
    }

    fn py(&self, y: f64) -> i32 {
        let t = (y - self.bounds.y0) / (self.bounds.y1 - self.bounds.y0);
        self.layout.top + self.layout.plot_h - 1 - (t * (self.layout.plot_h - 1) as f64).round() as i32
    }
}

// ---------------------------------------------------------------------------
// Ticks
// ---------------------------------------------------------------------------

/// Step size of roughly `range / target`, snapped to a 1/2/5 decade multiple.
fn nice_step(range: f64, target: u32) -> f64 {
    let raw = range / target as f64;
    let mag = 10f64.powf(raw.log10().floor());
    let norm = raw / mag;
    let nice = if norm < 1.5 {
        1.0
    } else if norm < 3.0 {
        2.0
    } else if norm < 7.0 {
        5.0
    } else {
        10.0
    };
    nice * mag
}

/// Tick positions inside `[lo, hi]`, the step between them, and the decimal
/// places needed to print them without truncation.
fn ticks(lo: f64, hi: f64, target: u32) -> (Vec<f64>, f64, usize) {
    let step = nice_step(hi - lo, target);
    let decimals = if step >= 1.0 {
        0
    } else {
        (-step.log10().floor()) as usize
    }
    .min(6);
    let first = (lo / step).ceil() * step;
    let mut out = Vec::new();
    for k in 0.. {
        let t = first + k as f64 * step;
        if t > hi + step * 1e-9 {
            break;
        }
        out.push(t);
    }
    (out, step, decimals)
}

fn format_tick(value: f64, step: f64, decimals: usize) -> String {
    // Snap near-zero values so "-0" never shows up on an axis.
    let v = if value.abs() < step * 1e-6 { 0.0 } else { value };
    format!("{v:.decimals$}")
}

// ---------------------------------------------------------------------------
// Drawing passes
// ---------------------------------------------------------------------------

fn draw_axes(canvas: &mut Canvas, spec: &ChartSpec, map: &Mapper) {
    let l = map.layout;
    let (xticks, xstep, xdec) = ticks(map.bounds.x0, map.bounds.x1, 6);
    for &t in &xticks {
        let x = map.px(t);
        if spec.grid {
            canvas.vline(x, l.top, l.bottom(), GRID);
        }
        canvas.vline(x, l.bottom() + 1, l.bottom() + 4, AXIS);
        let label = format_tick(t, xstep, xdec);
        let tw = font::text_width(&label, 1) as i32;
        canvas.text(x - tw / 2, l.bottom() + 8, &label, 1, TEXT);
    }

    let (yticks, ystep, ydec) = ticks(map.bounds.y0, map.bounds.y1, 5);
    for &t in &yticks {
        let y = map.py(t);
        if spec.grid {
            canvas.hline(l.left, l.right(), y, GRID);
        }
        canvas.hline(l.left - 4, l.left - 1, y, AXIS);
        let label = format_tick(t, ystep, ydec);
        let tw = font::text_width(&label, 1) as i32;
        canvas.text(l.left - 7 - tw, y - 3, &label, 1, TEXT);
    }
}

fn draw_series(canvas: &mut Canvas, series: &Series, color: Rgb, map: &Mapper) {
    match series.kind {
        SeriesKind::Line => {
            let mut last: Option<(i32, i32)> = None;
            for &(x, y) in &series.points {
                let p = (map.px(x), map.py(y));
                if let Some(prev) = last {
                    canvas.line(prev.0, prev.1, p.0, p.1, color);
                } else {
                    canvas.put(p.0, p.1, color);
                }
                last = Some(p);
            }
        }
        SeriesKind::Scatter => {
            for &(x, y) in &series.points {
                canvas.fill_circle(map.px(x), map.py(y), 3, color);
            }
        }
        SeriesKind::Bars => {
            let n = series.points.len() as f64;
            let bw = ((map.layout.plot_w as f64 / (n * 1.6)) as i32).clamp(1, 40);
            let baseline = map.py(0.0);
            for &(x, y) in &series.points {
                let xp = map.px(x);
                let yp = map.py(y);
                let (top, bot) = if yp <= baseline { (yp, baseline) } else { (baseline, yp) };
                canvas.fill_rect(xp - bw / 2, top, bw, bot - top + 1, color);
            }
        }
    }
}

fn draw_frame(canvas: &mut Canvas, l: &Layout) {
    canvas.hline(l.left, l.right(), l.top, AXIS);
    canvas.hline(l.left, l.right(), l.bottom(), AXIS);
    canvas.vline(l.left, l.top, l.bottom(), AXIS);
    canvas.vline(l.right(), l.top, l.bottom(), AXIS);
}

fn draw_labels(canvas: &mut Canvas, spec: &ChartSpec, l: &Layout) {
    if let Some(title) = &spec.title {
        let tw = font::text_width(title, 2) as i32;
        canvas.text((l.width - tw) / 2, 10, title, 2, TEXT);
    }
    if let Some(label) = &spec.x_label {
        let tw = font::text_width(label, 1) as i32;
        canvas.text(
            l.left + (l.plot_w - tw) / 2,
            l.height - 14,
            label,
            1,
            TEXT,
        );
    }
    if let Some(label) = &spec.y_label {
        let th = (label.chars().count() as i32) * 8;
        canvas.text_vertical(8, l.top + (l.plot_h - th) / 2, label, TEXT);
    }
}

fn draw_legend(canvas: &mut Canvas, spec: &ChartSpec, l: &Layout) {
    let named: Vec<(usize, &Series, &str)> = spec
        .series
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.name.as_deref().map(|n| (i, s, n)))
        .collect();
    if named.is_empty() {
        return;
    }
    let widest = named
        .iter()
        .map(|(_, _, n)| font::text_width(n, 1) as i32)
        .max()
        .unwrap_or(0);
    let x = l.right() - widest - 22;
    let mut y = l.top + 6;
    for (i, series, name) in named {
        let color = series_color(series, i).unwrap_or(TEXT);
        canvas.fill_rect(x, y + 2, 12, 3, color);
        canvas.text(x + 16, y, name, 1, TEXT);
        y += 11;
    }
}

// ---------------------------------------------------------------------------
// Canvas
// ---------------------------------------------------------------------------

/// Owned RGB8 pixel buffer with clipped integer drawing primitives.
struct Canvas {
    width: i32,
    height: i32,
    pixels: Vec<u8>,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        let mut pixels = vec![0u8; (width * height * 3) as usize];
        pixels.fill(WHITE[0]);
        Self {
            width: width as i32,
            height: height as i32,
            pixels,
        }
    }

    fn put(&mut self, x: i32, y: i32, c: Rgb) {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return;
        }
        let i = ((y * self.width + x) * 3) as usize;
        self.pixels[i..i + 3].copy_from_slice(&c);
    }

    fn hline(&mut self, x0: i32, x1: i32, y: i32, c: Rgb) {
        for x in x0.min(x1)..=x0.max(x1) {
            self.put(x, y, c);
        }
    }

    fn vline(&mut self, x: i32, y0: i32, y1: i32, c: Rgb) {
        for y in y0.min(y1)..=y0.max(y1) {
            self.put(x, y, c);
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for yy in y..y + h {
            self.hline(x, x + w - 1, yy, c);
        }
    }

    /// Bresenham segment, all octants.
    fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, c: Rgb) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);
        loop {
            self.put(x, y, c);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, c: Rgb) {
        for dy in -r..=r {
            let dx = (((r * r - dy * dy) as f64).sqrt()) as i32;
            self.hline(cx - dx, cx + dx, cy + dy, c);
        }
    }

    /// Blit a text run at integer scale, top-left anchored.
    fn text(&mut self, x: i32, y: i32, s: &str, scale: i32, c: Rgb) {
        let mut cx = x;
        for ch in s.chars() {
            if let Some(rows) = font::glyph(ch) {
                for (ry, row) in rows.iter().enumerate() {
                    for rx in 0..font::GLYPH_WIDTH as i32 {
                        if (row >> (font::GLYPH_WIDTH as i32 - 1 - rx)) & 1 != 0 {
                            self.fill_rect(
                                cx + rx * scale,
                                y + ry as i32 * scale,
                                scale,
                                scale,
                                c,
                            );
                        }
                    }
                }
            }
            cx += font::ADVANCE as i32 * scale;
        }
    }

    /// Blit text with characters stacked downward (used for the y label).
    fn text_vertical(&mut self, x: i32, y: i32, s: &str, c: Rgb) {
        let mut cy = y;
        for ch in s.chars() {
            let mut buf = [0u8; 4];
            self.text(x, cy, ch.encode_utf8(&mut buf), 1, c);
            cy += font::GLYPH_HEIGHT as i32 + 1;
        }
    }

    fn into_png(self) -> Result<Vec<u8>, RenderError> {
        let img = image::RgbImage::from_raw(
            self.width as u32,
            self.height as u32,
            self.pixels,
        )
        .ok_or_else(|| RenderError::Encode("pixel buffer size mismatch".into()))?;
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png)
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        Ok(out.into_inner())
    }
}
