//! Boundary between DOM events and the gesture controller.
//!
//! Mouse and touch events carry different shapes; both are reduced here to a
//! [`PointerFrame`] in canvas pixels so the controller sees one input type.

use web_sys::{HtmlCanvasElement, MouseEvent, TouchList, WheelEvent};

use crate::model::{Point, Size};

/// Reserved pointer id for the mouse. Touch identifiers from the browser are
/// non-negative.
pub const MOUSE_POINTER_ID: i32 = -1;

/// `MouseEvent.button` of the main (usually left) button.
pub const PRIMARY_BUTTON: i16 = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerPoint {
    pub id: i32,
    pub pos: Point,
}

impl PointerPoint {
    pub const fn new(id: i32, x: f64, y: f64) -> Self {
        Self {
            id,
            pos: Point::new(x, y),
        }
    }
}

/// One input event. `points` lists every pointer still active after the
/// event, like `TouchEvent.touches`.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerFrame {
    pub phase: PointerPhase,
    pub points: Vec<PointerPoint>,
}

impl PointerFrame {
    pub fn new(phase: PointerPhase, points: Vec<PointerPoint>) -> Self {
        Self { phase, points }
    }
}

/// A single wheel notch. Only the sign of `delta_y` matters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelStep {
    pub pos: Point,
    pub delta_y: f64,
}

/// The canvas's on-screen bounding rectangle together with its backing
/// surface size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub surface: Size,
}

impl CanvasRect {
    pub fn of(canvas: &HtmlCanvasElement) -> Self {
        let rect = canvas.get_bounding_client_rect();
        Self {
            left: rect.left(),
            top: rect.top(),
            width: rect.width(),
            height: rect.height(),
            surface: Size::new(canvas.width(), canvas.height()),
        }
    }

    /// Client coordinates to canvas pixels. A CSS-scaled canvas is corrected
    /// by the surface/display ratio; a collapsed rect falls back to 1:1.
    pub fn to_canvas(&self, client_x: f64, client_y: f64) -> Point {
        let sx = ratio(self.surface.width, self.width);
        let sy = ratio(self.surface.height, self.height);
        Point::new((client_x - self.left) * sx, (client_y - self.top) * sy)
    }

    pub fn mouse_frame(&self, phase: PointerPhase, e: &MouseEvent) -> Option<PointerFrame> {
        self.mouse_frame_at(
            phase,
            e.button(),
            f64::from(e.client_x()),
            f64::from(e.client_y()),
        )
    }

    /// Presses and releases of any button but the primary one are dropped, so
    /// a context-menu or middle click never pans.
    pub fn mouse_frame_at(
        &self,
        phase: PointerPhase,
        button: i16,
        client_x: f64,
        client_y: f64,
    ) -> Option<PointerFrame> {
        let points = match phase {
            PointerPhase::Down | PointerPhase::Up if button != PRIMARY_BUTTON => return None,
            PointerPhase::Up | PointerPhase::Cancel => Vec::new(),
            PointerPhase::Down | PointerPhase::Move => vec![PointerPoint {
                id: MOUSE_POINTER_ID,
                pos: self.to_canvas(client_x, client_y),
            }],
        };
        Some(PointerFrame::new(phase, points))
    }

    pub fn touch_frame(&self, phase: PointerPhase, touches: &TouchList) -> PointerFrame {
        let points = (0..touches.length())
            .filter_map(|i| touches.item(i))
            .map(|t| PointerPoint {
                id: t.identifier(),
                pos: self.to_canvas(f64::from(t.client_x()), f64::from(t.client_y())),
            })
            .collect();
        PointerFrame::new(phase, points)
    }

    pub fn wheel_step(&self, e: &WheelEvent) -> WheelStep {
        WheelStep {
            pos: self.to_canvas(f64::from(e.client_x()), f64::from(e.client_y())),
            delta_y: e.delta_y(),
        }
    }
}

fn ratio(surface: u32, displayed: f64) -> f64 {
    if displayed > 0.0 && surface > 0 {
        f64::from(surface) / displayed
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(width: f64, height: f64) -> CanvasRect {
        CanvasRect {
            left: 100.0,
            top: 50.0,
            width,
            height,
            surface: Size::new(1920, 2160),
        }
    }

    #[test]
    fn unscaled_canvas_only_subtracts_origin() {
        let r = rect(1920.0, 2160.0);
        assert_eq!(r.to_canvas(1060.0, 590.0), Point::new(960.0, 540.0));
    }

    #[test]
    fn css_scaled_canvas_maps_to_surface_pixels() {
        let r = rect(960.0, 1080.0);
        assert_eq!(r.to_canvas(100.0, 50.0), Point::new(0.0, 0.0));
        assert_eq!(r.to_canvas(580.0, 320.0), Point::new(960.0, 540.0));
    }

    #[test]
    fn only_the_primary_button_presses() {
        let r = rect(1920.0, 2160.0);
        assert_eq!(r.mouse_frame_at(PointerPhase::Down, 2, 150.0, 80.0), None);
        assert_eq!(r.mouse_frame_at(PointerPhase::Down, 1, 150.0, 80.0), None);
        assert_eq!(r.mouse_frame_at(PointerPhase::Up, 2, 150.0, 80.0), None);
        assert_eq!(
            r.mouse_frame_at(PointerPhase::Down, PRIMARY_BUTTON, 150.0, 80.0),
            Some(PointerFrame::new(
                PointerPhase::Down,
                vec![PointerPoint::new(MOUSE_POINTER_ID, 50.0, 30.0)]
            ))
        );
        assert_eq!(
            r.mouse_frame_at(PointerPhase::Up, PRIMARY_BUTTON, 150.0, 80.0),
            Some(PointerFrame::new(PointerPhase::Up, Vec::new()))
        );
        // Moves carry no meaningful button.
        assert!(r.mouse_frame_at(PointerPhase::Move, 2, 150.0, 80.0).is_some());
    }

    #[test]
    fn collapsed_rect_falls_back_to_identity() {
        let r = rect(0.0, 0.0);
        assert_eq!(r.to_canvas(110.0, 60.0), Point::new(10.0, 10.0));
    }
}
