//! Core data models for the dual-screen wallpaper splitter.
//! Geometry primitives, the fixed screen layout, the validated gap height and
//! the decoded source image live here.

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, LoadError};

/// A point in canvas (composite surface) space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Integer pixel rectangle used for blits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

/// Which exported output a request refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputKind {
    Top,
    Bottom,
}

impl OutputKind {
    pub fn file_name(self) -> &'static str {
        match self {
            OutputKind::Top => "top-screen-wallpaper.png",
            OutputKind::Bottom => "bottom-screen-wallpaper.png",
        }
    }
}

/// Screen geometry. Fixed for end users; deployments may override it through
/// [`Layout::from_json`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Layout {
    pub top: Size,
    pub bottom_content: Size,
    /// Bottom output canvas. Wider than the content to leave symmetric borders.
    pub bottom_output: Size,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            top: Size::new(1920, 1080),
            bottom_content: Size::new(1240, 1080),
            bottom_output: Size::new(1920, 1080),
        }
    }
}

impl Layout {
    /// Largest accepted side of any region. Keeps every surface allocatable
    /// and the composite height free of overflow.
    pub const MAX_DIMENSION: u32 = 16384;

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let layout: Layout =
            serde_json::from_str(raw).map_err(|e| ConfigError::InvalidLayout(e.to_string()))?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top.is_empty() || self.bottom_content.is_empty() || self.bottom_output.is_empty() {
            return Err(ConfigError::InvalidLayout(
                "all regions need a non-zero size".into(),
            ));
        }
        let mut sides = [self.top, self.bottom_content, self.bottom_output]
            .into_iter()
            .flat_map(|size| [size.width, size.height]);
        if sides.any(|side| side > Self::MAX_DIMENSION) {
            return Err(ConfigError::InvalidLayout(format!(
                "region sides must not exceed {} px",
                Self::MAX_DIMENSION
            )));
        }
        let tallest = self
            .top
            .height
            .checked_add(GapHeight::MAX)
            .and_then(|h| h.checked_add(self.bottom_content.height));
        if tallest.is_none() {
            return Err(ConfigError::InvalidLayout(
                "composite height overflows".into(),
            ));
        }
        if self.bottom_output.width < self.bottom_content.width
            || self.bottom_output.height < self.bottom_content.height
        {
            return Err(ConfigError::InvalidLayout(
                "bottom output must be at least as large as the bottom content".into(),
            ));
        }
        Ok(())
    }

    pub fn composite_width(&self) -> u32 {
        self.top.width.max(self.bottom_output.width)
    }

    pub fn composite_size(&self, gap: GapHeight) -> Size {
        Size::new(
            self.composite_width(),
            self.top.height + gap.get() + self.bottom_content.height,
        )
    }

    /// Width of the masked margin left of the bottom content in the composite.
    pub fn side_bar_width(&self) -> u32 {
        self.composite_width().saturating_sub(self.bottom_content.width) / 2
    }

    /// Width of the right margin. Takes the extra pixel of an odd margin so
    /// the bars always reach the composite edge.
    pub fn right_bar_width(&self) -> u32 {
        self.composite_width().saturating_sub(self.bottom_content.width) - self.side_bar_width()
    }

    /// Composite region copied into the top output.
    pub fn top_source(&self) -> Rect {
        Rect::new(0, 0, self.top.width, self.top.height)
    }

    /// Composite region copied into the bottom output.
    pub fn bottom_source(&self, gap: GapHeight) -> Rect {
        Rect::new(
            self.side_bar_width(),
            self.top.height + gap.get(),
            self.bottom_content.width,
            self.bottom_content.height,
        )
    }

    /// Where the bottom content lands inside the bottom output.
    pub fn bottom_destination_x(&self) -> u32 {
        self.bottom_output.width.saturating_sub(self.bottom_content.width) / 2
    }
}

/// Height of the hidden band between the two screens, always in `0..=MAX`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GapHeight(u32);

impl GapHeight {
    pub const MAX: u32 = 500;
    pub const ZERO: Self = Self(0);

    pub fn new(px: i64) -> Result<Self, ConfigError> {
        if (0..=i64::from(Self::MAX)).contains(&px) {
            Ok(Self(px as u32))
        } else {
            Err(ConfigError::GapOutOfRange(px))
        }
    }

    /// Parse the raw text of the gap input control.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        let px = trimmed
            .parse::<i64>()
            .map_err(|_| ConfigError::GapNotANumber(trimmed.to_string()))?;
        Self::new(px)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// Decoded, immutable source raster.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceImage {
    pixels: RgbaImage,
}

impl SourceImage {
    pub fn decode(bytes: &[u8]) -> Result<Self, LoadError> {
        if bytes.is_empty() {
            return Err(LoadError::Empty);
        }
        let pixels = image::load_from_memory(bytes)?.into_rgba8();
        Self::from_rgba(pixels)
    }

    pub fn from_rgba(pixels: RgbaImage) -> Result<Self, LoadError> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(LoadError::ZeroSized);
        }
        Ok(Self { pixels })
    }

    pub fn size(&self) -> Size {
        Size::new(self.pixels.width(), self.pixels.height())
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}
