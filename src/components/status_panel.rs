use crate::model::Size;
use crate::state::ViewportState;
use crate::util::{format_offset, format_zoom};
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct StatusPanelProps {
    pub image: Option<Size>,
    pub viewport: ViewportState,
    pub gap: u32,
    pub composite: Size,
}

#[function_component]
pub fn StatusPanel(props: &StatusPanelProps) -> Html {
    let row_style = "display:flex; align-items:center; gap:8px;"; // label | value
    let label_style = "flex:1; font-weight:500;";
    let value_style =
        "min-width:90px; text-align:right; font-variant-numeric:tabular-nums; font-weight:600;";
    let image = match props.image {
        Some(size) => format!("{}×{}", size.width, size.height),
        None => "none".to_string(),
    };
    let rows = [
        ("Image", image),
        ("Zoom", format_zoom(props.viewport.scale)),
        (
            "Offset",
            format_offset(props.viewport.offset_x, props.viewport.offset_y),
        ),
        ("Gap", format!("{} px", props.gap)),
        (
            "Canvas",
            format!("{}×{}", props.composite.width, props.composite.height),
        ),
    ];
    html! {
        <div style="background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:10px 14px; display:flex; flex-direction:column; gap:8px; font-size:13px;">
            { for rows.into_iter().map(|(label, value)| html! {
                <div style={row_style}>
                    <span style={label_style}>{ label }</span>
                    <span style={value_style}>{ value }</span>
                </div>
            }) }
        </div>
    }
}
