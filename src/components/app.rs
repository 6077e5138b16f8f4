use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use tracing::{info, warn};
use yew::prelude::*;

use super::{
    controls_panel::ControlsPanel, editor_view::EditorView, preview_panel::PreviewPanel,
    status_panel::StatusPanel,
};
use crate::model::Layout;
use crate::state::Session;

/// Id of the optional `<script type="application/json">` block in
/// `index.html` holding a [`Layout`] override.
pub const LAYOUT_CONFIG_ID: &str = "layout-config";

/// Shared handle to the editing session. Components compare equal when they
/// point at the same session; redraws are driven by [`Revision`] instead.
#[derive(Clone)]
pub struct SessionHandle(Rc<RefCell<Session>>);

impl SessionHandle {
    pub fn borrow(&self) -> Ref<'_, Session> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Session> {
        self.0.borrow_mut()
    }
}

impl PartialEq for SessionHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Bumped after every session mutation that changed a surface.
#[derive(Default, PartialEq)]
pub struct Revision(pub u64);

impl Reducible for Revision {
    type Action = ();

    fn reduce(self: Rc<Self>, _action: ()) -> Rc<Self> {
        Rc::new(Revision(self.0 + 1))
    }
}

fn layout_from_page() -> Layout {
    let raw = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(LAYOUT_CONFIG_ID))
        .and_then(|el| el.text_content());
    match raw.as_deref().map(str::trim) {
        None | Some("") => Layout::default(),
        Some(json) => match Layout::from_json(json) {
            Ok(layout) => {
                info!(?layout, "using layout override");
                layout
            }
            Err(e) => {
                warn!("ignoring layout override: {e}");
                Layout::default()
            }
        },
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let session = use_mut_ref(|| Session::new(layout_from_page()));
    let revision = use_reducer(Revision::default);
    let session = SessionHandle(session);

    let on_change = {
        let dispatcher = revision.dispatcher();
        Callback::from(move |_| dispatcher.dispatch(()))
    };

    let (has_image, image_size, viewport, gap, composite, layout) = {
        let s = session.borrow();
        (
            s.has_image(),
            s.source_size(),
            s.viewport(),
            s.gap().get(),
            s.composite_size(),
            *s.layout(),
        )
    };

    html! {
        <div style="min-height:100vh; background:#0d1117; color:#c9d1d9; font-family:system-ui, sans-serif; padding:16px; box-sizing:border-box; display:flex; flex-direction:column; gap:16px;">
            <div id="top-bar" style="display:flex; align-items:baseline; gap:12px;">
                <h1 style="margin:0; font-size:22px;">{"Dual-Screen Wallpaper Splitter"}</h1>
                <span style="font-size:12px; opacity:0.7;">
                    { format!("top {}×{} · bottom {}×{} inside {}×{}",
                        layout.top.width, layout.top.height,
                        layout.bottom_content.width, layout.bottom_content.height,
                        layout.bottom_output.width, layout.bottom_output.height) }
                </span>
            </div>
            <div style="display:flex; gap:16px; flex-wrap:wrap; align-items:flex-start;">
                <div style="display:flex; flex-direction:column; gap:16px; flex:0 0 260px;">
                    <ControlsPanel
                        session={session.clone()}
                        has_image={has_image}
                        gap={gap}
                        on_change={on_change.clone()}
                    />
                    <StatusPanel
                        image={image_size}
                        viewport={viewport}
                        gap={gap}
                        composite={composite}
                    />
                </div>
                <EditorView
                    session={session.clone()}
                    revision={revision.0}
                    has_image={has_image}
                    on_change={on_change}
                />
                <PreviewPanel
                    session={session}
                    revision={revision.0}
                    has_image={has_image}
                    layout={layout}
                />
            </div>
        </div>
    }
}
