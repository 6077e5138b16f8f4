use std::cell::RefCell;
use std::rc::Rc;

use image::RgbaImage;
use tracing::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{Clamped, JsCast, JsValue};
use web_sys::{
    CanvasRenderingContext2d, Event, HtmlCanvasElement, ImageData, MouseEvent, TouchEvent,
    WheelEvent,
};
use yew::prelude::*;

use super::app::SessionHandle;
use crate::compositor::GapMarker;
use crate::state::{CanvasRect, GestureController, GestureState, PointerFrame, PointerPhase};

const IDLE_CURSOR: &str = "grab";

#[derive(Properties, PartialEq, Clone)]
pub struct EditorViewProps {
    pub session: SessionHandle,
    pub revision: u64,
    pub has_image: bool,
    pub on_change: Callback<()>,
}

/// Copy a rendered surface onto a canvas, resizing the canvas to match.
pub fn paint_surface(
    canvas: &HtmlCanvasElement,
    surface: &RgbaImage,
) -> Result<CanvasRenderingContext2d, JsValue> {
    let (w, h) = surface.dimensions();
    if canvas.width() != w {
        canvas.set_width(w);
    }
    if canvas.height() != h {
        canvas.set_height(h);
    }
    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    if w == 0 || h == 0 {
        return Ok(ctx);
    }
    let data = ImageData::new_with_u8_clamped_array_and_sh(Clamped(surface.as_raw()), w, h)?;
    ctx.put_image_data(&data, 0.0, 0.0)?;
    Ok(ctx)
}

fn draw_gap_label(ctx: &CanvasRenderingContext2d, marker: &GapMarker) -> Result<(), JsValue> {
    ctx.set_fill_style_str("rgba(255, 255, 255, 0.8)");
    ctx.set_font("bold 24px Arial");
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.fill_text(marker.label, marker.center.x, marker.center.y)
}

fn cursor_for(state: &GestureState) -> &'static str {
    match state {
        GestureState::Idle => IDLE_CURSOR,
        GestureState::Dragging { .. } | GestureState::Pinching(_) => "grabbing",
    }
}

/// Event listeners attached to the composite canvas for the lifetime of the
/// editor.
struct CanvasListeners {
    canvas: HtmlCanvasElement,
    handlers: Vec<(&'static str, Closure<dyn FnMut(Event)>)>,
}

impl CanvasListeners {
    fn new(canvas: HtmlCanvasElement) -> Self {
        Self {
            canvas,
            handlers: Vec::new(),
        }
    }

    fn on<E: JsCast + 'static>(&mut self, kind: &'static str, mut f: impl FnMut(E) + 'static) {
        let closure = Closure::wrap(Box::new(move |e: Event| {
            if let Ok(e) = e.dyn_into::<E>() {
                f(e);
            }
        }) as Box<dyn FnMut(Event)>);
        if let Err(e) = self
            .canvas
            .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
        {
            warn!(kind, "listener not attached: {e:?}");
        }
        self.handlers.push((kind, closure));
    }

    fn detach(self) {
        for (kind, closure) in &self.handlers {
            let _ = self
                .canvas
                .remove_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
        }
    }
}

fn attach(
    canvas: HtmlCanvasElement,
    session: SessionHandle,
    controller: Rc<RefCell<GestureController>>,
    on_change: Callback<()>,
) -> CanvasListeners {
    let dispatch: Rc<dyn Fn(PointerFrame)> = {
        let canvas = canvas.clone();
        let session = session.clone();
        let controller = controller.clone();
        let on_change = on_change.clone();
        Rc::new(move |frame: PointerFrame| {
            let changed = {
                let mut s = session.borrow_mut();
                let mut gc = controller.borrow_mut();
                let changed = gc.handle(&mut s, &frame);
                let _ = canvas
                    .style()
                    .set_property("cursor", cursor_for(gc.state()));
                if changed {
                    s.render();
                }
                changed
            };
            if changed {
                on_change.emit(());
            }
        })
    };

    let mut listeners = CanvasListeners::new(canvas.clone());
    for (kind, phase) in [
        ("mousedown", PointerPhase::Down),
        ("mousemove", PointerPhase::Move),
        ("mouseup", PointerPhase::Up),
        ("mouseleave", PointerPhase::Up),
    ] {
        let canvas = canvas.clone();
        let dispatch = dispatch.clone();
        listeners.on(kind, move |e: MouseEvent| {
            if let Some(frame) = CanvasRect::of(&canvas).mouse_frame(phase, &e) {
                dispatch(frame);
            }
        });
    }
    for (kind, phase) in [
        ("touchstart", PointerPhase::Down),
        ("touchmove", PointerPhase::Move),
        ("touchend", PointerPhase::Up),
        ("touchcancel", PointerPhase::Cancel),
    ] {
        let canvas = canvas.clone();
        let dispatch = dispatch.clone();
        listeners.on(kind, move |e: TouchEvent| {
            e.prevent_default();
            dispatch(CanvasRect::of(&canvas).touch_frame(phase, &e.touches()));
        });
    }
    {
        let canvas = canvas.clone();
        listeners.on("wheel", move |e: WheelEvent| {
            e.prevent_default();
            let step = CanvasRect::of(&canvas).wheel_step(&e);
            let changed = {
                let mut s = session.borrow_mut();
                let changed = controller.borrow().wheel(&mut s, step);
                if changed {
                    s.render();
                }
                changed
            };
            if changed {
                on_change.emit(());
            }
        });
    }
    listeners
}

#[function_component(EditorView)]
pub fn editor_view(props: &EditorViewProps) -> Html {
    let canvas_ref = use_node_ref();
    let controller = use_mut_ref(GestureController::new);
    let draw_ref = use_mut_ref(|| None::<Rc<dyn Fn()>>);

    // Mount: listeners and the draw closure
    {
        let canvas_ref = canvas_ref.clone();
        let session = props.session.clone();
        let on_change = props.on_change.clone();
        let controller = controller.clone();
        let draw_ref_setup = draw_ref.clone();
        use_effect_with((), move |_| {
            let listeners = canvas_ref.cast::<HtmlCanvasElement>().map(|canvas| {
                let draw: Rc<dyn Fn()> = {
                    let canvas = canvas.clone();
                    let session = session.clone();
                    Rc::new(move || {
                        if !canvas.is_connected() {
                            return;
                        }
                        let s = session.borrow();
                        let drawn = paint_surface(&canvas, s.compositor().composite()).and_then(
                            |ctx| match s.gap_marker() {
                                Some(marker) => draw_gap_label(&ctx, marker),
                                None => Ok(()),
                            },
                        );
                        if let Err(e) = drawn {
                            warn!("composite redraw failed: {e:?}");
                        }
                    })
                };
                draw();
                *draw_ref_setup.borrow_mut() = Some(draw);
                attach(canvas, session, controller, on_change)
            });
            move || {
                if let Some(listeners) = listeners {
                    listeners.detach();
                }
                *draw_ref_setup.borrow_mut() = None;
            }
        });
    }
    // Redraw whenever the session changed
    {
        let draw_ref = draw_ref.clone();
        use_effect_with(props.revision, move |_| {
            if let Some(f) = &*draw_ref.borrow() {
                f();
            }
            || ()
        });
    }

    let canvas_display = if props.has_image { "block" } else { "none" };
    html! {
        <div style="flex:1 1 420px; min-width:280px; background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:10px 14px; display:flex; flex-direction:column; gap:8px;">
            <h3 style="margin:0; font-size:16px;">{"Combined View"}</h3>
            <canvas
                ref={canvas_ref}
                style={format!("display:{}; width:100%; height:auto; background:#111; cursor:{}; touch-action:none;", canvas_display, IDLE_CURSOR)}
            />
            { if props.has_image { html!{} } else { html!{
                <div style="min-height:240px; display:flex; align-items:center; justify-content:center; border:1px dashed #30363d; border-radius:6px; opacity:0.7;">
                    {"Upload an image to start positioning"}
                </div>
            } } }
            <div style="font-size:11px; opacity:0.7;">{"Drag to pan · scroll or pinch to zoom"}</div>
        </div>
    }
}
