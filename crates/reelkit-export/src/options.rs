//! Per-export caller options: watermark overlay and publishing metadata.

use std::collections::BTreeMap;

use reelkit_core::{AspectRatio, PixelRect, Resolution};
use serde::{Deserialize, Serialize};

/// Anchor of the watermark inside the output frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatermarkPosition {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    Center,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    #[default]
    BottomRight,
}

/// Where along one axis a span of `size` sits inside `extent`.
#[derive(Clone, Copy)]
enum Align {
    Start,
    Middle,
    End,
}

impl Align {
    fn offset(self, extent: u32, size: u32, margin: u32) -> u32 {
        let free = extent.saturating_sub(size);
        match self {
            Self::Start => margin.min(free),
            Self::Middle => free / 2,
            Self::End => free.saturating_sub(margin),
        }
    }
}

impl WatermarkPosition {
    fn align(self) -> (Align, Align) {
        use Align::*;
        match self {
            Self::TopLeft => (Start, Start),
            Self::TopCenter => (Middle, Start),
            Self::TopRight => (End, Start),
            Self::MiddleLeft => (Start, Middle),
            Self::Center => (Middle, Middle),
            Self::MiddleRight => (End, Middle),
            Self::BottomLeft => (Start, End),
            Self::BottomCenter => (Middle, End),
            Self::BottomRight => (End, End),
        }
    }
}

/// Image overlay burned into the export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Watermark {
    /// Location of the overlay image; opaque to the resolver.
    pub image_uri: String,
    pub position: WatermarkPosition,
    /// 0 = invisible, 1 = opaque
    pub opacity: f32,
    /// Overlay width as a fraction of the output width
    pub scale: f32,
}

impl Watermark {
    pub const DEFAULT_OPACITY: f32 = 0.8;
    pub const DEFAULT_SCALE: f32 = 0.15;
    const MIN_SCALE: f32 = 0.01;

    pub fn new(image_uri: impl Into<String>, position: WatermarkPosition) -> Self {
        Self {
            image_uri: image_uri.into(),
            position,
            opacity: Self::DEFAULT_OPACITY,
            scale: Self::DEFAULT_SCALE,
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Copy with opacity clamped to [0, 1] and scale to [0.01, 1].
    /// Non-finite values fall back to the defaults.
    pub fn normalized(&self) -> Self {
        let opacity = if self.opacity.is_finite() {
            self.opacity.clamp(0.0, 1.0)
        } else {
            Self::DEFAULT_OPACITY
        };
        let scale = if self.scale.is_finite() {
            self.scale.clamp(Self::MIN_SCALE, 1.0)
        } else {
            Self::DEFAULT_SCALE
        };
        Self {
            image_uri: self.image_uri.clone(),
            position: self.position,
            opacity,
            scale,
        }
    }

    /// Output-pixel rect for an overlay image of ratio `image` on `frame`.
    ///
    /// Keeps a margin of 2% of the shorter frame side from the anchored edges.
    pub fn rect(&self, frame: Resolution, image: AspectRatio) -> PixelRect {
        let scale = self.normalized().scale as f64;
        let width = ((frame.width as f64 * scale).round() as u32).clamp(1, frame.width.max(1));
        let height = (width as u64 * image.height() as u64 / image.width().max(1) as u64) as u32;
        let (width, height) = if height > frame.height {
            let height = frame.height.max(1);
            let width = (height as u64 * image.width() as u64 / image.height().max(1) as u64) as u32;
            (width.max(1), height)
        } else {
            (width, height.max(1))
        };
        let margin = frame.width.min(frame.height) / 50;
        let (horizontal, vertical) = self.position.align();
        PixelRect::new(
            horizontal.offset(frame.width, width, margin),
            vertical.offset(frame.height, height, margin),
            width,
            height,
        )
    }
}

/// Caller choices that ride along with a resolved plan.
///
/// These never cause a rejection; they are normalized and copied into the
/// plan for the transcoder and the publisher.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub watermark: Option<Watermark>,
    /// Free-form publishing metadata (title, caption, tags, ...)
    pub custom_metadata: BTreeMap<String, String>,
}

impl ExportOptions {
    pub fn with_watermark(mut self, watermark: Watermark) -> Self {
        self.watermark = Some(watermark);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_metadata.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_clamps() {
        let mark = Watermark::new("logo.png", WatermarkPosition::TopLeft)
            .with_opacity(3.0)
            .with_scale(-1.0)
            .normalized();
        assert_eq!(mark.opacity, 1.0);
        assert_eq!(mark.scale, 0.01);

        let mark = Watermark::new("logo.png", WatermarkPosition::TopLeft)
            .with_opacity(f32::NAN)
            .with_scale(f32::INFINITY)
            .normalized();
        assert_eq!(mark.opacity, Watermark::DEFAULT_OPACITY);
        assert_eq!(mark.scale, Watermark::DEFAULT_SCALE);
    }

    #[test]
    fn test_rect_anchors() {
        let frame = Resolution::FHD;
        let square = AspectRatio::R1_1;
        let mark = |position| Watermark::new("logo.png", position).with_scale(0.1);

        // 192px wide, 21px margin
        assert_eq!(
            mark(WatermarkPosition::TopLeft).rect(frame, square),
            PixelRect::new(21, 21, 192, 192)
        );
        assert_eq!(
            mark(WatermarkPosition::BottomRight).rect(frame, square),
            PixelRect::new(1920 - 192 - 21, 1080 - 192 - 21, 192, 192)
        );
        assert_eq!(
            mark(WatermarkPosition::Center).rect(frame, square),
            PixelRect::new((1920 - 192) / 2, (1080 - 192) / 2, 192, 192)
        );
    }

    #[test]
    fn test_rect_stays_inside_frame() {
        let frame = Resolution::FHD;
        let tall = AspectRatio::new(1, 4);
        let rect = Watermark::new("banner.png", WatermarkPosition::BottomCenter)
            .with_scale(1.0)
            .rect(frame, tall);
        assert_eq!(rect.height, 1080);
        assert_eq!(rect.width, 270);
        assert!(rect.right() <= frame.width && rect.bottom() <= frame.height);
    }

    #[test]
    fn test_options_from_partial_json() {
        let options: ExportOptions =
            serde_json::from_str(r#"{ "custom_metadata": { "title": "Launch" } }"#).unwrap();
        assert!(options.watermark.is_none());
        assert_eq!(options.custom_metadata["title"], "Launch");
    }
}
