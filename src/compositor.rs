//! Two-phase renderer: one composite surface, then two outputs cropped from it.
//!
//! The outputs are produced by [`blit`] only, never by re-applying the
//! viewport transform, so they always match the composite pixel for pixel.

use image::{Pixel, Rgba, RgbaImage};
use tracing::debug;

use crate::model::{GapHeight, Layout, OutputKind, Point, Rect, Size, SourceImage};
use crate::state::ViewportState;

pub const COMPOSITE_BACKGROUND: Rgba<u8> = Rgba([0x11, 0x11, 0x11, 0xff]);
pub const TOP_BACKGROUND: Rgba<u8> = Rgba([0x11, 0x11, 0x11, 0xff]);
/// Pure black so the bottom borders read as screen bezel.
pub const BOTTOM_BACKGROUND: Rgba<u8> = Rgba([0x00, 0x00, 0x00, 0xff]);
/// rgba(255, 50, 50, 0.3)
pub const GAP_TINT: Rgba<u8> = Rgba([255, 50, 50, 77]);
/// rgba(50, 50, 50, 0.7)
pub const SIDE_BAR_TINT: Rgba<u8> = Rgba([50, 50, 50, 179]);

pub const GAP_LABEL: &str = "Hidden Gap Area";

/// Label for the gap band. The shell draws the text on the composite preview;
/// the band never reaches either output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GapMarker {
    pub label: &'static str,
    pub center: Point,
    pub band: Rect,
}

#[derive(Debug)]
pub struct Compositor {
    composite: RgbaImage,
    top: RgbaImage,
    bottom: RgbaImage,
    gap_marker: Option<GapMarker>,
}

impl Default for Compositor {
    fn default() -> Self {
        Self {
            composite: RgbaImage::new(0, 0),
            top: RgbaImage::new(0, 0),
            bottom: RgbaImage::new(0, 0),
            gap_marker: None,
        }
    }
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Composite phase followed by split phase.
    pub fn render(
        &mut self,
        source: &SourceImage,
        viewport: &ViewportState,
        gap: GapHeight,
        layout: &Layout,
    ) {
        self.draw_composite(source, viewport, gap, layout);
        self.split(gap, layout);
        debug!(
            scale = viewport.scale,
            offset_x = viewport.offset_x,
            offset_y = viewport.offset_y,
            gap = gap.get(),
            "rendered composite {}x{}",
            self.composite.width(),
            self.composite.height()
        );
    }

    fn draw_composite(
        &mut self,
        source: &SourceImage,
        viewport: &ViewportState,
        gap: GapHeight,
        layout: &Layout,
    ) {
        let size = layout.composite_size(gap);
        resize(&mut self.composite, size);
        fill(&mut self.composite, COMPOSITE_BACKGROUND);

        let origin = viewport.image_origin(source.size(), size);
        draw_scaled(&mut self.composite, source.pixels(), origin, viewport.scale);

        self.gap_marker = None;
        if gap.get() > 0 {
            let band = Rect::new(0, layout.top.height, size.width, gap.get());
            blend_rect(&mut self.composite, band, GAP_TINT);
            self.gap_marker = Some(GapMarker {
                label: GAP_LABEL,
                center: Point::new(
                    f64::from(size.width) / 2.0,
                    f64::from(layout.top.height) + f64::from(gap.get()) / 2.0,
                ),
                band,
            });
        }

        let bar = layout.side_bar_width();
        let bottom_y = layout.top.height + gap.get();
        let band_h = layout.bottom_content.height;
        blend_rect(&mut self.composite, Rect::new(0, bottom_y, bar, band_h), SIDE_BAR_TINT);
        blend_rect(
            &mut self.composite,
            Rect::new(
                bar + layout.bottom_content.width,
                bottom_y,
                layout.right_bar_width(),
                band_h,
            ),
            SIDE_BAR_TINT,
        );
    }

    fn split(&mut self, gap: GapHeight, layout: &Layout) {
        resize(&mut self.top, layout.top);
        resize(&mut self.bottom, layout.bottom_output);
        fill(&mut self.top, TOP_BACKGROUND);
        fill(&mut self.bottom, BOTTOM_BACKGROUND);

        blit(&self.composite, layout.top_source(), &mut self.top, 0, 0);
        blit(
            &self.composite,
            layout.bottom_source(gap),
            &mut self.bottom,
            layout.bottom_destination_x(),
            0,
        );
    }

    /// Zero every surface, keeping its size.
    pub fn clear(&mut self) {
        for surface in [&mut self.composite, &mut self.top, &mut self.bottom] {
            fill(surface, Rgba([0, 0, 0, 0]));
        }
        self.gap_marker = None;
    }

    pub fn composite(&self) -> &RgbaImage {
        &self.composite
    }

    pub fn output(&self, kind: OutputKind) -> &RgbaImage {
        match kind {
            OutputKind::Top => &self.top,
            OutputKind::Bottom => &self.bottom,
        }
    }

    pub fn gap_marker(&self) -> Option<&GapMarker> {
        self.gap_marker.as_ref()
    }
}

/// Copy `from` out of `src` into `dst` at `(to_x, to_y)`, clipped to both
/// surfaces. Pixels are replaced, not blended.
pub fn blit(src: &RgbaImage, from: Rect, dst: &mut RgbaImage, to_x: u32, to_y: u32) {
    let width = from
        .width
        .min(src.width().saturating_sub(from.x))
        .min(dst.width().saturating_sub(to_x)) as usize;
    let height = from
        .height
        .min(src.height().saturating_sub(from.y))
        .min(dst.height().saturating_sub(to_y)) as usize;
    if width == 0 || height == 0 {
        return;
    }
    let src_stride = src.width() as usize * 4;
    let dst_stride = dst.width() as usize * 4;
    let len = width * 4;
    let src_raw: &[u8] = src;
    let dst_raw: &mut [u8] = dst;
    for row in 0..height {
        let s = (from.y as usize + row) * src_stride + from.x as usize * 4;
        let d = (to_y as usize + row) * dst_stride + to_x as usize * 4;
        dst_raw[d..d + len].copy_from_slice(&src_raw[s..s + len]);
    }
}

fn resize(surface: &mut RgbaImage, size: Size) {
    if surface.dimensions() != (size.width, size.height) {
        *surface = RgbaImage::new(size.width, size.height);
    }
}

fn fill(surface: &mut RgbaImage, color: Rgba<u8>) {
    for px in surface.pixels_mut() {
        *px = color;
    }
}

fn blend_rect(surface: &mut RgbaImage, rect: Rect, color: Rgba<u8>) {
    let x_end = rect.x.saturating_add(rect.width).min(surface.width());
    let y_end = rect.y.saturating_add(rect.height).min(surface.height());
    for y in rect.y..y_end {
        for x in rect.x..x_end {
            surface.get_pixel_mut(x, y).blend(&color);
        }
    }
}

/// Draw `src` scaled by `scale` with its top-left corner at `origin`.
///
/// Each destination pixel whose center falls inside the scaled image samples
/// the source bilinearly at the matching pixel center, clamped to the edge.
/// At scale 1 with an integer origin this is an exact copy.
fn draw_scaled(dst: &mut RgbaImage, src: &RgbaImage, origin: Point, scale: f64) {
    if scale <= 0.0 || src.width() == 0 || src.height() == 0 {
        return;
    }
    let scaled_w = f64::from(src.width()) * scale;
    let scaled_h = f64::from(src.height()) * scale;
    let x0 = origin.x.max(0.0).floor() as u32;
    let y0 = origin.y.max(0.0).floor() as u32;
    let x1 = (origin.x + scaled_w).min(f64::from(dst.width())).ceil().max(0.0) as u32;
    let y1 = (origin.y + scaled_h).min(f64::from(dst.height())).ceil().max(0.0) as u32;
    let inv = 1.0 / scale;

    for dy in y0..y1 {
        let v = (f64::from(dy) + 0.5 - origin.y) * inv;
        if v < 0.0 || v >= f64::from(src.height()) {
            continue;
        }
        for dx in x0..x1 {
            let u = (f64::from(dx) + 0.5 - origin.x) * inv;
            if u < 0.0 || u >= f64::from(src.width()) {
                continue;
            }
            let sample = bilinear_sample(src, u - 0.5, v - 0.5);
            let px = dst.get_pixel_mut(dx, dy);
            if sample[3] == 255 {
                *px = sample;
            } else if sample[3] > 0 {
                px.blend(&sample);
            }
        }
    }
}

fn bilinear_sample(img: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let max_x = (img.width() - 1) as i64;
    let max_y = (img.height() - 1) as i64;
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let sample = |sx: i64, sy: i64| -> [f64; 4] {
        let p = img.get_pixel(sx.clamp(0, max_x) as u32, sy.clamp(0, max_y) as u32);
        [f64::from(p[0]), f64::from(p[1]), f64::from(p[2]), f64::from(p[3])]
    };

    let tl = sample(x0, y0);
    let tr = sample(x0 + 1, y0);
    let bl = sample(x0, y0 + 1);
    let br = sample(x0 + 1, y0 + 1);

    let lerp = |a: f64, b: f64, t: f64| a + (b - a) * t;
    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = lerp(tl[c], tr[c], fx);
        let bot = lerp(bl[c], br[c], fx);
        out[c] = lerp(top, bot, fy).round().clamp(0.0, 255.0) as u8;
    }
    Rgba(out)
}
