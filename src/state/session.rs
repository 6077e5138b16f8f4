//! Explicit editing session owned by the application shell.
//!
//! Holds the source image, the viewport, the gap and the rendered surfaces,
//! and arbitrates asynchronous image loads so a stale decode never replaces a
//! newer request.

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, ImageResult, RgbaImage};
use tracing::{debug, info, warn};

use crate::compositor::{Compositor, GapMarker};
use crate::error::{ExportError, LoadError};
use crate::model::{GapHeight, Layout, OutputKind, Point, Size, SourceImage};
use crate::state::ViewportState;

/// Token for one image load request. Only the most recently issued handle is
/// alive; it stays alive while its image is loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageHandle(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer request (or a reset) released this handle; the result was dropped.
    Superseded,
}

#[derive(Debug)]
pub struct Session {
    layout: Layout,
    source: Option<SourceImage>,
    viewport: ViewportState,
    gap: GapHeight,
    compositor: Compositor,
    live_handle: Option<ImageHandle>,
    issued: u64,
    stale: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Layout::default())
    }
}

impl Session {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            source: None,
            viewport: ViewportState::default(),
            gap: GapHeight::ZERO,
            compositor: Compositor::new(),
            live_handle: None,
            issued: 0,
            stale: false,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn has_image(&self) -> bool {
        self.source.is_some()
    }

    pub fn source_size(&self) -> Option<Size> {
        self.source.as_ref().map(SourceImage::size)
    }

    pub fn viewport(&self) -> ViewportState {
        self.viewport
    }

    pub fn gap(&self) -> GapHeight {
        self.gap
    }

    pub fn composite_size(&self) -> Size {
        self.layout.composite_size(self.gap)
    }

    /// Start a new load, releasing whatever handle was alive before.
    pub fn begin_load(&mut self) -> ImageHandle {
        self.issued += 1;
        let handle = ImageHandle(self.issued);
        if let Some(previous) = self.live_handle.replace(handle) {
            debug!(?previous, ?handle, "released image handle");
        }
        handle
    }

    pub fn is_live(&self, handle: ImageHandle) -> bool {
        self.live_handle == Some(handle)
    }

    /// Complete a load with the raw file bytes.
    ///
    /// A decode failure resets the session and is returned to the caller.
    pub fn finish_load(
        &mut self,
        handle: ImageHandle,
        bytes: &[u8],
    ) -> Result<LoadOutcome, LoadError> {
        if !self.is_live(handle) {
            warn!(?handle, "dropping superseded image load");
            return Ok(LoadOutcome::Superseded);
        }
        match SourceImage::decode(bytes) {
            Ok(image) => Ok(self.install(handle, image)),
            Err(e) => {
                warn!(?handle, "image decode failed: {e}");
                self.reset();
                Err(e)
            }
        }
    }

    /// Complete a load with an already decoded image.
    pub fn install(&mut self, handle: ImageHandle, image: SourceImage) -> LoadOutcome {
        if !self.is_live(handle) {
            warn!(?handle, "dropping superseded image");
            return LoadOutcome::Superseded;
        }
        let size = image.size();
        info!(width = size.width, height = size.height, "source image loaded");
        self.source = Some(image);
        self.viewport.reset();
        self.stale = true;
        LoadOutcome::Applied
    }

    /// Drop the image and its handle, restore defaults, clear every surface.
    pub fn reset(&mut self) {
        self.source = None;
        self.live_handle = None;
        self.viewport.reset();
        self.gap = GapHeight::ZERO;
        self.compositor.clear();
        self.stale = false;
        info!("session reset");
    }

    pub fn set_gap(&mut self, gap: GapHeight) -> bool {
        if gap == self.gap {
            return false;
        }
        self.gap = gap;
        self.stale = true;
        self.has_image()
    }

    pub fn pan(&mut self, dx: f64, dy: f64) -> bool {
        if !self.has_image() || (dx == 0.0 && dy == 0.0) {
            return false;
        }
        self.viewport.pan(dx, dy);
        self.stale = true;
        true
    }

    pub fn zoom_at(&mut self, anchor: Point, factor: f64) -> bool {
        let Some(image) = self.source_size() else {
            return false;
        };
        let surface = self.composite_size();
        let changed = self.viewport.zoom_at(anchor, factor, image, surface);
        self.stale |= changed;
        changed
    }

    /// Re-render every surface. Skipped entirely without an image.
    pub fn render(&mut self) -> bool {
        let Some(source) = self.source.as_ref() else {
            return false;
        };
        self.compositor
            .render(source, &self.viewport, self.gap, &self.layout);
        self.stale = false;
        true
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn gap_marker(&self) -> Option<&GapMarker> {
        self.compositor.gap_marker()
    }

    /// PNG bytes of one output surface as it currently stands.
    pub fn export(&mut self, kind: OutputKind) -> Result<Vec<u8>, ExportError> {
        if !self.has_image() {
            return Err(ExportError::NoImage);
        }
        if self.stale {
            self.render();
        }
        let bytes = encode_png(self.compositor.output(kind))?;
        info!(?kind, len = bytes.len(), "exported output");
        Ok(bytes)
    }
}

fn encode_png(surface: &RgbaImage) -> ImageResult<Vec<u8>> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        surface.as_raw(),
        surface.width(),
        surface.height(),
        ColorType::Rgba8,
    )?;
    Ok(bytes)
}
