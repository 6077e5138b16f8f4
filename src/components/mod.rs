pub mod app;
pub mod controls_panel;
pub mod editor_view;
pub mod preview_panel;
pub mod status_panel;
