// Drag / pinch state machine driving the session's viewport.
use tracing::debug;

use crate::model::Point;
use crate::state::input::{PointerFrame, PointerPhase, PointerPoint, WheelStep};
use crate::state::{Session, ViewportState};

/// Fixed zoom step per wheel notch. Zooming out divides by it.
pub const WHEEL_ZOOM_STEP: f64 = 1.1;

/// Reference geometry for an in-progress pinch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchSession {
    /// Viewport at the moment the second finger landed.
    pub origin: ViewportState,
    /// Baseline for the next move; refreshed after every applied step.
    pub distance: f64,
    pub midpoint: Point,
}

impl PinchSession {
    fn new(origin: ViewportState, a: Point, b: Point) -> Self {
        Self {
            origin,
            distance: a.distance(b),
            midpoint: a.midpoint(b),
        }
    }

    fn rebaseline(&mut self, a: Point, b: Point) {
        self.distance = a.distance(b);
        self.midpoint = a.midpoint(b);
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging {
        pointer: i32,
        last: Point,
    },
    Pinching(PinchSession),
}

#[derive(Debug, Default)]
pub struct GestureController {
    state: GestureState,
}

impl GestureController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    /// Feed one pointer frame. Returns whether the viewport changed, i.e.
    /// whether the caller should re-render.
    pub fn handle(&mut self, session: &mut Session, frame: &PointerFrame) -> bool {
        if frame.phase == PointerPhase::Cancel || frame.points.is_empty() {
            self.end();
            return false;
        }
        match frame.phase {
            PointerPhase::Down => {
                self.on_down(session, &frame.points);
                false
            }
            PointerPhase::Move => self.on_move(session, &frame.points),
            PointerPhase::Up => {
                self.on_up(&frame.points);
                false
            }
            PointerPhase::Cancel => false,
        }
    }

    /// Stateless wheel zoom anchored at the pointer. A zero delta does nothing.
    pub fn wheel(&self, session: &mut Session, step: WheelStep) -> bool {
        match wheel_factor(step.delta_y) {
            Some(factor) => session.zoom_at(step.pos, factor),
            None => false,
        }
    }

    fn on_down(&mut self, session: &Session, points: &[PointerPoint]) {
        if !session.has_image() {
            return;
        }
        match points {
            [only] => self.start_drag(*only),
            [a, b, ..] => {
                let pinch = PinchSession::new(session.viewport(), a.pos, b.pos);
                debug!(distance = pinch.distance, "pinch started");
                self.state = GestureState::Pinching(pinch);
            }
            [] => {}
        }
    }

    fn on_move(&mut self, session: &mut Session, points: &[PointerPoint]) -> bool {
        if !session.has_image() {
            return false;
        }
        match &mut self.state {
            GestureState::Idle => false,
            GestureState::Dragging { pointer, last } => {
                match points.iter().find(|p| p.id == *pointer) {
                    Some(p) => {
                        let (dx, dy) = (p.pos.x - last.x, p.pos.y - last.y);
                        *last = p.pos;
                        session.pan(dx, dy)
                    }
                    None => {
                        // Tracked pointer vanished without an up; follow the
                        // first remaining one from where it is now.
                        let first = points[0];
                        *pointer = first.id;
                        *last = first.pos;
                        false
                    }
                }
            }
            GestureState::Pinching(pinch) => {
                let [a, b] = points else {
                    return false;
                };
                let distance = a.pos.distance(b.pos);
                let midpoint = a.pos.midpoint(b.pos);
                let changed = if pinch.distance > 0.0 && distance > 0.0 {
                    session.zoom_at(midpoint, distance / pinch.distance)
                } else {
                    false
                };
                pinch.rebaseline(a.pos, b.pos);
                changed
            }
        }
    }

    fn on_up(&mut self, remaining: &[PointerPoint]) {
        if self.state == GestureState::Idle {
            return;
        }
        match remaining {
            [only] => self.start_drag(*only),
            [a, b, ..] => {
                if let GestureState::Pinching(pinch) = &mut self.state {
                    pinch.rebaseline(a.pos, b.pos);
                }
            }
            [] => {}
        }
    }

    fn start_drag(&mut self, point: PointerPoint) {
        if !matches!(self.state, GestureState::Dragging { .. }) {
            debug!(pointer = point.id, "drag started");
        }
        self.state = GestureState::Dragging {
            pointer: point.id,
            last: point.pos,
        };
    }

    fn end(&mut self) {
        if self.state != GestureState::Idle {
            debug!("gesture ended");
        }
        self.state = GestureState::Idle;
    }
}

fn wheel_factor(delta_y: f64) -> Option<f64> {
    if delta_y < 0.0 {
        Some(WHEEL_ZOOM_STEP)
    } else if delta_y > 0.0 {
        Some(1.0 / WHEEL_ZOOM_STEP)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::input::MOUSE_POINTER_ID;
    use crate::state::session::tests::loaded_session;
    use pretty_assertions::assert_eq;

    fn frame(phase: PointerPhase, points: &[(i32, f64, f64)]) -> PointerFrame {
        PointerFrame::new(
            phase,
            points
                .iter()
                .map(|&(id, x, y)| PointerPoint::new(id, x, y))
                .collect(),
        )
    }

    #[test]
    fn mouse_drag_pans_by_deltas() {
        let mut session = loaded_session(800, 600);
        let mut gc = GestureController::new();
        let id = MOUSE_POINTER_ID;
        assert!(!gc.handle(&mut session, &frame(PointerPhase::Down, &[(id, 100.0, 100.0)])));
        assert!(gc.handle(&mut session, &frame(PointerPhase::Move, &[(id, 130.0, 90.0)])));
        assert!(gc.handle(&mut session, &frame(PointerPhase::Move, &[(id, 140.0, 95.0)])));
        let vp = session.viewport();
        assert_eq!((vp.offset_x, vp.offset_y), (40.0, -5.0));

        gc.handle(&mut session, &frame(PointerPhase::Up, &[]));
        assert_eq!(gc.state(), &GestureState::Idle);
        assert!(!gc.handle(&mut session, &frame(PointerPhase::Move, &[(id, 500.0, 500.0)])));
        assert_eq!(session.viewport().offset_x, 40.0);
    }

    #[test]
    fn no_image_means_no_gesture() {
        let mut session = crate::state::Session::default();
        let mut gc = GestureController::new();
        gc.handle(&mut session, &frame(PointerPhase::Down, &[(0, 10.0, 10.0)]));
        assert_eq!(gc.state(), &GestureState::Idle);
        assert!(!gc.handle(&mut session, &frame(PointerPhase::Move, &[(0, 50.0, 50.0)])));
        assert!(!gc.wheel(
            &mut session,
            WheelStep {
                pos: Point::new(5.0, 5.0),
                delta_y: -1.0
            }
        ));
        assert_eq!(session.viewport(), ViewportState::default());
    }

    #[test]
    fn second_touch_turns_drag_into_pinch() {
        let mut session = loaded_session(1920, 1080);
        let mut gc = GestureController::new();
        gc.handle(&mut session, &frame(PointerPhase::Down, &[(1, 100.0, 100.0)]));
        gc.handle(&mut session, &frame(PointerPhase::Move, &[(1, 110.0, 100.0)]));
        let after_drag = session.viewport();
        assert_eq!(after_drag.offset_x, 10.0);

        gc.handle(
            &mut session,
            &frame(PointerPhase::Down, &[(1, 110.0, 100.0), (2, 210.0, 100.0)]),
        );
        match gc.state() {
            GestureState::Pinching(pinch) => {
                assert_eq!(pinch.origin, after_drag);
                assert_eq!(pinch.distance, 100.0);
                assert_eq!(pinch.midpoint, Point::new(160.0, 100.0));
            }
            other => panic!("expected pinch, got {other:?}"),
        }
        // Starting the pinch must not move the image.
        assert_eq!(session.viewport(), after_drag);
    }

    #[test]
    fn pinch_zooms_about_live_midpoint_and_rebaselines() {
        let mut session = loaded_session(1920, 1080);
        let mut gc = GestureController::new();
        gc.handle(
            &mut session,
            &frame(PointerPhase::Down, &[(1, 860.0, 540.0), (2, 1060.0, 540.0)]),
        );
        let image = session.source_size().unwrap();
        let surface = session.composite_size();
        let mid = Point::new(960.0, 540.0);
        let under = session.viewport().canvas_to_image(mid, image, surface);

        assert!(gc.handle(
            &mut session,
            &frame(PointerPhase::Move, &[(1, 810.0, 540.0), (2, 1110.0, 540.0)]),
        ));
        assert!((session.viewport().scale - 1.5).abs() < 1e-9);
        // Same spread again: baseline was refreshed, so no further zoom.
        gc.handle(
            &mut session,
            &frame(PointerPhase::Move, &[(1, 810.0, 540.0), (2, 1110.0, 540.0)]),
        );
        assert!((session.viewport().scale - 1.5).abs() < 1e-9);
        let after = session.viewport().canvas_to_image(mid, image, surface);
        assert!((under.x - after.x).abs() < 1e-6);
        assert!((under.y - after.y).abs() < 1e-6);

        assert!(gc.handle(
            &mut session,
            &frame(PointerPhase::Move, &[(1, 660.0, 540.0), (2, 1260.0, 540.0)]),
        ));
        assert!((session.viewport().scale - 3.0).abs() < 1e-9);
    }

    #[test]
    fn zero_distance_pinch_is_skipped_then_resumes() {
        let mut session = loaded_session(400, 400);
        let mut gc = GestureController::new();
        gc.handle(
            &mut session,
            &frame(PointerPhase::Down, &[(1, 300.0, 300.0), (2, 300.0, 300.0)]),
        );
        assert!(!gc.handle(
            &mut session,
            &frame(PointerPhase::Move, &[(1, 290.0, 300.0), (2, 310.0, 300.0)]),
        ));
        assert_eq!(session.viewport().scale, 1.0);
        assert!(gc.handle(
            &mut session,
            &frame(PointerPhase::Move, &[(1, 280.0, 300.0), (2, 320.0, 300.0)]),
        ));
        assert!((session.viewport().scale - 2.0).abs() < 1e-9);
    }

    #[test]
    fn lifting_one_finger_continues_drag_without_jump() {
        let mut session = loaded_session(1920, 1080);
        let mut gc = GestureController::new();
        gc.handle(
            &mut session,
            &frame(PointerPhase::Down, &[(1, 100.0, 100.0), (2, 300.0, 100.0)]),
        );
        gc.handle(
            &mut session,
            &frame(PointerPhase::Move, &[(1, 50.0, 100.0), (2, 350.0, 140.0)]),
        );
        gc.handle(&mut session, &frame(PointerPhase::Up, &[(2, 350.0, 140.0)]));
        assert_eq!(
            gc.state(),
            &GestureState::Dragging {
                pointer: 2,
                last: Point::new(350.0, 140.0)
            }
        );

        let before = session.viewport();
        gc.handle(&mut session, &frame(PointerPhase::Move, &[(2, 355.0, 138.0)]));
        let after = session.viewport();
        assert!((after.offset_x - before.offset_x - 5.0).abs() < 1e-9);
        assert!((after.offset_y - before.offset_y + 2.0).abs() < 1e-9);
        assert_eq!(after.scale, before.scale);
    }

    #[test]
    fn cancel_and_last_up_return_to_idle() {
        let mut session = loaded_session(100, 100);
        let mut gc = GestureController::new();
        gc.handle(&mut session, &frame(PointerPhase::Down, &[(1, 1.0, 1.0), (2, 9.0, 9.0)]));
        gc.handle(&mut session, &frame(PointerPhase::Cancel, &[(1, 1.0, 1.0)]));
        assert_eq!(gc.state(), &GestureState::Idle);

        gc.handle(&mut session, &frame(PointerPhase::Down, &[(1, 1.0, 1.0)]));
        gc.handle(&mut session, &frame(PointerPhase::Up, &[]));
        assert_eq!(gc.state(), &GestureState::Idle);
    }

    #[test]
    fn wheel_uses_fixed_steps_by_sign() {
        let mut session = loaded_session(1920, 1080);
        let gc = GestureController::new();
        let at = |delta_y| WheelStep {
            pos: Point::new(960.0, 540.0),
            delta_y,
        };
        assert!(gc.wheel(&mut session, at(-3.0)));
        assert!((session.viewport().scale - 1.1).abs() < 1e-9);
        assert!(gc.wheel(&mut session, at(-250.0)));
        assert!((session.viewport().scale - 1.21).abs() < 1e-9);
        assert!(gc.wheel(&mut session, at(40.0)));
        assert!((session.viewport().scale - 1.1).abs() < 1e-9);
        assert!(!gc.wheel(&mut session, at(0.0)));
        assert!((session.viewport().scale - 1.1).abs() < 1e-9);
    }
}
