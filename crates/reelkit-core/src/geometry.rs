//! Frame geometry: resolutions, aspect ratios and pixel rectangles.

use num_rational::Ratio;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Frame dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Create a new resolution.
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total pixel count.
    #[inline]
    pub fn pixel_count(self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Reduced aspect ratio of these dimensions.
    pub fn aspect_ratio(self) -> AspectRatio {
        AspectRatio::new(self.width, self.height)
    }

    /// Whether both dimensions fit within `bound`.
    #[inline]
    pub fn fits_within(self, bound: Resolution) -> bool {
        self.width <= bound.width && self.height <= bound.height
    }

    /// Whether either dimension is zero.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub const UHD_4K: Self = Self::new(3840, 2160);
    pub const QHD: Self = Self::new(2560, 1440);
    pub const FHD: Self = Self::new(1920, 1080);
    pub const HD: Self = Self::new(1280, 720);
    pub const SD: Self = Self::new(854, 480);
    pub const FHD_PORTRAIT: Self = Self::new(1080, 1920);
    pub const HD_PORTRAIT: Self = Self::new(720, 1280);
    pub const SQUARE_1080: Self = Self::new(1080, 1080);
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Width-to-height ratio, always kept in lowest terms.
///
/// Ratios compare exactly, so `1920x1080` and `1280x720` both reduce to 16:9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "AspectRatioRepr", into = "AspectRatioRepr")]
pub struct AspectRatio(Ratio<u32>);

#[derive(Serialize, Deserialize)]
struct AspectRatioRepr {
    width: u32,
    height: u32,
}

impl From<AspectRatioRepr> for AspectRatio {
    fn from(repr: AspectRatioRepr) -> Self {
        Self::new(repr.width, repr.height)
    }
}

impl From<AspectRatio> for AspectRatioRepr {
    fn from(ratio: AspectRatio) -> Self {
        Self {
            width: ratio.width(),
            height: ratio.height(),
        }
    }
}

impl AspectRatio {
    /// Create a ratio from width and height terms. A zero height is treated as 1.
    pub fn new(width: u32, height: u32) -> Self {
        Self(Ratio::new(width, height.max(1)))
    }

    /// Width term (reduced).
    #[inline]
    pub fn width(self) -> u32 {
        *self.0.numer()
    }

    /// Height term (reduced).
    #[inline]
    pub fn height(self) -> u32 {
        *self.0.denom()
    }

    /// Ratio as a float.
    #[inline]
    pub fn as_f64(self) -> f64 {
        self.width() as f64 / self.height() as f64
    }

    /// Fraction of a frame with one ratio that survives a centered crop to the other.
    ///
    /// Symmetric, in `(0, 1]`, and exactly `1.0` when the ratios are equal.
    pub fn coverage(self, other: AspectRatio) -> f64 {
        let (a, b) = (self.as_f64(), other.as_f64());
        if a <= b {
            a / b
        } else {
            b / a
        }
    }

    /// Whether frames with this ratio are wider than frames with `other`.
    pub fn is_wider_than(self, other: AspectRatio) -> bool {
        // Cross-multiply to stay exact.
        self.width() as u64 * other.height() as u64 > other.width() as u64 * self.height() as u64
    }

    pub const R16_9: Self = Self(Ratio::new_raw(16, 9));
    pub const R9_16: Self = Self(Ratio::new_raw(9, 16));
    pub const R1_1: Self = Self(Ratio::new_raw(1, 1));
    pub const R4_5: Self = Self(Ratio::new_raw(4, 5));
    pub const R4_3: Self = Self(Ratio::new_raw(4, 3));
    pub const R21_9: Self = Self(Ratio::new_raw(7, 3));
    pub const R2_3: Self = Self(Ratio::new_raw(2, 3));
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width(), self.height())
    }
}

/// Axis-aligned rectangle in integer pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Largest rectangle of the given ratio centered inside `frame`.
    pub fn centered_fit(frame: Resolution, ratio: AspectRatio) -> Self {
        let (fw, fh) = (frame.width as u64, frame.height as u64);
        let (rw, rh) = (ratio.width() as u64, ratio.height() as u64);
        let (w, h) = if fw * rh > rw * fh {
            // Frame is wider than the ratio: full height, trimmed width.
            ((fh * rw / rh).max(1), fh)
        } else {
            (fw, (fw * rh / rw).max(1))
        };
        Self::new(((fw - w) / 2) as u32, ((fh - h) / 2) as u32, w as u32, h as u32)
    }

    /// Size of the rectangle.
    #[inline]
    pub fn size(self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    /// Exclusive right edge.
    #[inline]
    pub fn right(self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    #[inline]
    pub fn bottom(self) -> u32 {
        self.y + self.height
    }
}
