use tracing::warn;
use web_sys::HtmlCanvasElement;
use yew::prelude::*;

use super::app::SessionHandle;
use super::editor_view::paint_surface;
use crate::model::{Layout, OutputKind, Size};

#[derive(Properties, PartialEq, Clone)]
pub struct PreviewPanelProps {
    pub session: SessionHandle,
    pub revision: u64,
    pub has_image: bool,
    pub layout: Layout,
}

#[function_component]
pub fn PreviewPanel(props: &PreviewPanelProps) -> Html {
    let top_ref = use_node_ref();
    let bottom_ref = use_node_ref();

    {
        let session = props.session.clone();
        let top_ref = top_ref.clone();
        let bottom_ref = bottom_ref.clone();
        use_effect_with(props.revision, move |_| {
            let s = session.borrow();
            for (node, kind) in [(&top_ref, OutputKind::Top), (&bottom_ref, OutputKind::Bottom)] {
                let Some(canvas) = node.cast::<HtmlCanvasElement>() else {
                    continue;
                };
                if let Err(e) = paint_surface(&canvas, s.compositor().output(kind)) {
                    warn!(?kind, "preview redraw failed: {e:?}");
                }
            }
            || ()
        });
    }

    let preview = |title: &str, size: Size, node: NodeRef| {
        let display = if props.has_image { "block" } else { "none" };
        html! {
            <div style="display:flex; flex-direction:column; gap:6px;">
                <div style="font-size:13px; font-weight:600;">
                    { format!("{} ({}×{})", title, size.width, size.height) }
                </div>
                <canvas ref={node} style={format!("display:{}; width:100%; height:auto; background:#000;", display)} />
                { if props.has_image { html!{} } else { html!{
                    <div style="min-height:120px; display:flex; align-items:center; justify-content:center; border:1px dashed #30363d; border-radius:6px; font-size:12px; opacity:0.7;">
                        {"No image yet"}
                    </div>
                } } }
            </div>
        }
    };

    html! {
        <div style="flex:1 1 320px; min-width:240px; background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:10px 14px; display:flex; flex-direction:column; gap:12px;">
            <h3 style="margin:0; font-size:16px;">{"Outputs"}</h3>
            { preview("Top Screen", props.layout.top, top_ref) }
            { preview("Bottom Screen", props.layout.bottom_output, bottom_ref) }
        </div>
    }
}
