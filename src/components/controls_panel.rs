use js_sys::{Array, Uint8Array};
use tracing::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Blob, BlobPropertyBag, DragEvent, File, HtmlAnchorElement, HtmlInputElement, Url};
use yew::prelude::*;

use super::app::SessionHandle;
use crate::error::ExportError;
use crate::model::{GapHeight, OutputKind};
use crate::state::LoadOutcome;

const LOAD_FAILED: &str = "Failed to load image. Please try another file.";
const INVALID_GAP: &str = "Please enter a valid gap height between 0 and 500 pixels.";
const NO_IMAGE: &str = "Please upload an image first.";
const EXPORT_FAILED: &str = "Failed to export image.";

#[derive(Properties, PartialEq, Clone)]
pub struct ControlsPanelProps {
    pub session: SessionHandle,
    pub has_image: bool,
    pub gap: u32,
    pub on_change: Callback<()>,
}

fn alert(msg: &str) {
    if let Some(win) = web_sys::window() {
        let _ = win.alert_with_message(msg);
    }
}

/// Read `file` off the main task and hand the bytes to the session. A load
/// started later wins even if this one finishes last.
fn load_file(session: SessionHandle, file: File, on_change: Callback<()>) {
    let handle = session.borrow_mut().begin_load();
    debug!(name = %file.name(), size = file.size(), ?handle, "reading image file");
    spawn_local(async move {
        let bytes = match JsFuture::from(file.array_buffer()).await {
            Ok(buffer) => Uint8Array::new(&buffer).to_vec(),
            Err(e) => {
                warn!(?handle, "file read failed: {e:?}");
                {
                    let mut s = session.borrow_mut();
                    if !s.is_live(handle) {
                        return;
                    }
                    s.reset();
                }
                alert(LOAD_FAILED);
                on_change.emit(());
                return;
            }
        };
        let outcome = {
            let mut s = session.borrow_mut();
            let outcome = s.finish_load(handle, &bytes);
            if matches!(outcome, Ok(LoadOutcome::Applied)) {
                s.render();
            }
            outcome
        };
        match outcome {
            Ok(LoadOutcome::Applied) => on_change.emit(()),
            Ok(LoadOutcome::Superseded) => {}
            Err(_) => {
                alert(LOAD_FAILED);
                on_change.emit(());
            }
        }
    });
}

fn download_png(bytes: &[u8], file_name: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let parts = Array::of1(&Uint8Array::from(bytes));
    let options = BlobPropertyBag::new();
    options.set_type("image/png");
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
    let url = Url::create_object_url_with_blob(&blob)?;
    let anchor = document
        .create_element("a")?
        .dyn_into::<HtmlAnchorElement>()?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();
    // Revoke after the browser has picked the download up.
    let revoke = Closure::once_into_js(move || {
        let _ = Url::revoke_object_url(&url);
    });
    window.set_timeout_with_callback_and_timeout_and_arguments_0(revoke.unchecked_ref(), 1000)?;
    Ok(())
}

fn save_output(session: &SessionHandle, kind: OutputKind) {
    let exported = session.borrow_mut().export(kind);
    match exported {
        Ok(bytes) => {
            if let Err(e) = download_png(&bytes, kind.file_name()) {
                warn!(?kind, "download failed: {e:?}");
                alert(EXPORT_FAILED);
            }
        }
        Err(ExportError::NoImage) => alert(NO_IMAGE),
        Err(e) => {
            warn!(?kind, "export failed: {e}");
            alert(EXPORT_FAILED);
        }
    }
}

#[function_component]
pub fn ControlsPanel(props: &ControlsPanelProps) -> Html {
    let input_ref = use_node_ref();
    let drag_over = use_state(|| false);

    let open_picker = {
        let input_ref = input_ref.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(input) = input_ref.cast::<HtmlInputElement>() {
                input.click();
            }
        })
    };
    let file_chosen = {
        let session = props.session.clone();
        let on_change = props.on_change.clone();
        Callback::from(move |e: Event| {
            let Some(input) = e.target_dyn_into::<HtmlInputElement>() else {
                return;
            };
            if let Some(file) = input.files().and_then(|files| files.get(0)) {
                load_file(session.clone(), file, on_change.clone());
            }
        })
    };
    let on_drag_over = {
        let drag_over = drag_over.clone();
        Callback::from(move |e: DragEvent| {
            e.prevent_default();
            drag_over.set(true);
        })
    };
    let on_drag_leave = {
        let drag_over = drag_over.clone();
        Callback::from(move |_: DragEvent| drag_over.set(false))
    };
    let on_drop = {
        let drag_over = drag_over.clone();
        let session = props.session.clone();
        let on_change = props.on_change.clone();
        Callback::from(move |e: DragEvent| {
            e.prevent_default();
            drag_over.set(false);
            let file = e
                .data_transfer()
                .and_then(|dt| dt.files())
                .and_then(|files| files.get(0));
            if let Some(file) = file {
                load_file(session.clone(), file, on_change.clone());
            }
        })
    };
    let gap_input = {
        let session = props.session.clone();
        let on_change = props.on_change.clone();
        Callback::from(move |e: InputEvent| {
            let Some(input) = e.target_dyn_into::<HtmlInputElement>() else {
                return;
            };
            let gap = match GapHeight::parse(&input.value()) {
                Ok(gap) => gap,
                Err(e) => {
                    debug!("rejected gap input: {e}");
                    alert(INVALID_GAP);
                    return;
                }
            };
            {
                let mut s = session.borrow_mut();
                if s.set_gap(gap) {
                    s.render();
                }
            }
            // Emitted even without an image so the status panel follows.
            on_change.emit(());
        })
    };
    let reset_cb = {
        let session = props.session.clone();
        let on_change = props.on_change.clone();
        let input_ref = input_ref.clone();
        Callback::from(move |_| {
            session.borrow_mut().reset();
            if let Some(input) = input_ref.cast::<HtmlInputElement>() {
                input.set_value("");
            }
            on_change.emit(());
        })
    };
    let save_top = {
        let session = props.session.clone();
        Callback::from(move |_| save_output(&session, OutputKind::Top))
    };
    let save_bottom = {
        let session = props.session.clone();
        Callback::from(move |_| save_output(&session, OutputKind::Bottom))
    };

    let drop_style = if *drag_over {
        "border:3px dashed #00adb5; background:rgba(0,173,181,0.1);"
    } else {
        "border:2px dashed #30363d; background:#1c2128;"
    };
    html! {<div style="background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:10px 14px; display:flex; flex-direction:column; gap:10px;">
        <input
            ref={input_ref}
            type="file"
            accept="image/*"
            style="display:none;"
            onchange={file_chosen}
        />
        <div
            onclick={open_picker}
            ondragover={on_drag_over}
            ondragleave={on_drag_leave}
            ondrop={on_drop}
            style={format!("{} border-radius:8px; padding:18px 10px; text-align:center; cursor:pointer; font-size:13px;", drop_style)}
        >
            { if props.has_image { "Click or drop to replace the image" } else { "Click or drop an image here" } }
        </div>
        <label style="display:flex; align-items:center; gap:8px; font-size:13px;">
            <span style="flex:1;">{"Gap height (px)"}</span>
            <input
                type="number"
                min="0"
                max={GapHeight::MAX.to_string()}
                value={props.gap.to_string()}
                oninput={gap_input}
                style="width:80px;"
            />
        </label>
        <div style="display:flex; gap:8px; flex-wrap:wrap;">
            <button onclick={save_top} style="flex:1;">{"Save Top"}</button>
            <button onclick={save_bottom} style="flex:1;">{"Save Bottom"}</button>
        </div>
        <button onclick={reset_cb} style="background:#f85149; border:1px solid #b62324; color:#fff;">{"Reset"}</button>
        <div style="font-size:11px; line-height:1.4; opacity:0.7;">{"The gap is the physical space between the screens. That band is left out of both wallpapers."}</div>
    </div>}
}
