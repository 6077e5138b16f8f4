// Scale and translation applied to the source image on the composite surface.
use crate::model::{Point, Size};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportState {
    pub scale: f64,
    /// Signed deltas from the centered position, in canvas pixels.
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl ViewportState {
    pub const MIN_SCALE: f64 = 0.1;
    pub const MAX_SCALE: f64 = 10.0;

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// Top-left canvas position of the scaled image: centered, then offset.
    pub fn image_origin(&self, image: Size, surface: Size) -> Point {
        Point::new(
            centered(surface.width, image.width, self.scale) + self.offset_x,
            centered(surface.height, image.height, self.scale) + self.offset_y,
        )
    }

    /// Image-space coordinate currently drawn at `point`.
    pub fn canvas_to_image(&self, point: Point, image: Size, surface: Size) -> Point {
        let origin = self.image_origin(image, surface);
        Point::new(
            (point.x - origin.x) / self.scale,
            (point.y - origin.y) / self.scale,
        )
    }

    /// Multiply the scale by `factor` while keeping the image pixel under
    /// `anchor` at the same canvas position.
    ///
    /// Degenerate input (empty image, non-positive or non-finite factor) leaves
    /// the state untouched. Returns whether anything changed.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64, image: Size, surface: Size) -> bool {
        if image.is_empty() || !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let under = self.canvas_to_image(anchor, image, surface);

        let before = *self;
        self.scale = (self.scale * factor).clamp(Self::MIN_SCALE, Self::MAX_SCALE);

        let moved = self.image_origin(image, surface);
        self.offset_x += anchor.x - moved.x - under.x * self.scale;
        self.offset_y += anchor.y - moved.y - under.y * self.scale;
        *self != before
    }
}

fn centered(surface: u32, image: u32, scale: f64) -> f64 {
    (f64::from(surface) - f64::from(image) * scale) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SURFACE: Size = Size::new(1920, 2160);
    const IMAGE: Size = Size::new(1920, 1080);

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-6, "{a} != {b}");
    }

    #[test]
    fn default_image_is_centered() {
        let vp = ViewportState::default();
        assert_eq!(vp.image_origin(IMAGE, SURFACE), Point::new(0.0, 540.0));
    }

    #[test]
    fn pan_adds_deltas() {
        let mut vp = ViewportState::default();
        vp.pan(12.5, -3.0);
        vp.pan(-2.5, 1.0);
        assert_eq!(vp.offset_x, 10.0);
        assert_eq!(vp.offset_y, -2.0);
        assert_eq!(vp.scale, 1.0);
    }

    #[test]
    fn zoom_in_at_center_keeps_anchor_pixel() {
        let mut vp = ViewportState::default();
        let anchor = Point::new(960.0, 540.0);
        let before = vp.canvas_to_image(anchor, IMAGE, SURFACE);
        assert!(vp.zoom_at(anchor, 1.1, IMAGE, SURFACE));
        assert_close(vp.scale, 1.1);
        let after = vp.canvas_to_image(anchor, IMAGE, SURFACE);
        assert_close(before.x, after.x);
        assert_close(before.y, after.y);
    }

    #[test]
    fn repeated_zooms_do_not_drift() {
        let mut vp = ViewportState::default();
        let anchor = Point::new(300.0, 1700.0);
        let before = vp.canvas_to_image(anchor, IMAGE, SURFACE);
        for _ in 0..15 {
            vp.zoom_at(anchor, 1.1, IMAGE, SURFACE);
        }
        for _ in 0..15 {
            vp.zoom_at(anchor, 1.0 / 1.1, IMAGE, SURFACE);
        }
        let after = vp.canvas_to_image(anchor, IMAGE, SURFACE);
        assert_close(vp.scale, 1.0);
        assert_close(before.x, after.x);
        assert_close(before.y, after.y);
    }

    #[test]
    fn degenerate_zoom_is_a_no_op() {
        let mut vp = ViewportState {
            scale: 2.0,
            offset_x: 5.0,
            offset_y: 6.0,
        };
        let anchor = Point::new(10.0, 10.0);
        let snapshot = vp;
        assert!(!vp.zoom_at(anchor, 0.0, IMAGE, SURFACE));
        assert!(!vp.zoom_at(anchor, -1.5, IMAGE, SURFACE));
        assert!(!vp.zoom_at(anchor, f64::NAN, IMAGE, SURFACE));
        assert!(!vp.zoom_at(anchor, 1.5, Size::new(0, 10), SURFACE));
        assert_eq!(vp, snapshot);
    }

    #[test]
    fn zoom_clamps_at_bounds() {
        let mut vp = ViewportState::default();
        vp.zoom_at(Point::new(0.0, 0.0), 1000.0, IMAGE, SURFACE);
        assert_eq!(vp.scale, ViewportState::MAX_SCALE);
        vp.zoom_at(Point::new(0.0, 0.0), 2.0, IMAGE, SURFACE);
        assert_eq!(vp.scale, ViewportState::MAX_SCALE);
        vp.zoom_at(Point::new(0.0, 0.0), 1e-6, IMAGE, SURFACE);
        assert_eq!(vp.scale, ViewportState::MIN_SCALE);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut vp = ViewportState {
            scale: 3.0,
            offset_x: -40.0,
            offset_y: 7.0,
        };
        vp.reset();
        assert_eq!(vp, ViewportState::default());
    }

    proptest! {
        #[test]
        fn anchor_stays_fixed_unless_clamped(
            scale in 0.1f64..10.0,
            ox in -2000.0f64..2000.0,
            oy in -2000.0f64..2000.0,
            ax in 0.0f64..1920.0,
            ay in 0.0f64..2660.0,
            factor in 0.2f64..5.0,
        ) {
            let mut vp = ViewportState { scale, offset_x: ox, offset_y: oy };
            let anchor = Point::new(ax, ay);
            let target = scale * factor;
            prop_assume!((ViewportState::MIN_SCALE..=ViewportState::MAX_SCALE).contains(&target));

            let before = vp.canvas_to_image(anchor, IMAGE, SURFACE);
            vp.zoom_at(anchor, factor, IMAGE, SURFACE);
            let after = vp.canvas_to_image(anchor, IMAGE, SURFACE);
            prop_assert!((before.x - after.x).abs() < 1e-6);
            prop_assert!((before.y - after.y).abs() < 1e-6);
        }

        #[test]
        fn scale_stays_in_bounds(factors in proptest::collection::vec(0.01f64..100.0, 1..40)) {
            let mut vp = ViewportState::default();
            for f in factors {
                vp.zoom_at(Point::new(100.0, 200.0), f, IMAGE, SURFACE);
                prop_assert!(vp.scale >= ViewportState::MIN_SCALE);
                prop_assert!(vp.scale <= ViewportState::MAX_SCALE);
            }
        }
    }
}
