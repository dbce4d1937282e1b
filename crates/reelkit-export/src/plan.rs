//! Resolver output: a concrete encode plan, or the reason there is none.

use std::collections::BTreeMap;

use num_rational::Rational64;
use reelkit_core::{FrameRate, MediaTime, PixelRect, Resolution};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec::{AudioCodec, Container, VideoCodec};
use crate::options::Watermark;
use crate::platform::Platform;

/// How the source frame is mapped onto the output frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AspectHandling {
    /// Source ratio is accepted as-is; only scaling applies.
    Native,
    /// Cut `rect` (source pixels) out of the source, then scale.
    Crop { rect: PixelRect },
    /// Scale the whole source into `content` (output pixels) and pad the rest.
    Letterbox { content: PixelRect },
}

impl AspectHandling {
    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native)
    }
}

/// A timeline-wide change applied so the export fits the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GlobalAdjustment {
    /// Play everything `factor` times faster.
    SpeedChange { factor: Rational64 },
}

/// Encode parameters for one timeline on one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportPlan {
    pub platform: Platform,
    pub resolution: Resolution,
    pub frame_rate: FrameRate,
    pub video_codec: VideoCodec,
    /// `None` when no clip carries audio
    pub audio_codec: Option<AudioCodec>,
    pub container: Container,
    /// Video bitrate in bits per second
    pub video_bitrate: u64,
    /// Audio bitrate in bits per second (zero without audio)
    pub audio_bitrate: u64,
    pub aspect_handling: AspectHandling,
    /// Representative source frame size the geometry was derived from
    pub source_resolution: Resolution,
    /// Timeline duration before adjustments
    pub source_duration: MediaTime,
    /// Output duration after adjustments
    pub duration: MediaTime,
    pub adjustments: Vec<GlobalAdjustment>,
    /// Metadata fields the caller must supply when publishing
    pub required_metadata: Vec<String>,
    /// Normalized overlay, if one was requested
    pub watermark: Option<Watermark>,
    /// Caller-supplied publishing metadata
    pub custom_metadata: BTreeMap<String, String>,
}

impl ExportPlan {
    /// Overall playback speed factor (1 when unchanged).
    pub fn speed_factor(&self) -> Rational64 {
        self.adjustments
            .iter()
            .map(|GlobalAdjustment::SpeedChange { factor }| *factor)
            .fold(Rational64::from_integer(1), |acc, f| acc * f)
    }

    /// Number of output frames.
    pub fn total_frames(&self) -> u64 {
        self.duration.to_frames(self.frame_rate).unsigned_abs()
    }

    /// Combined audio + video bitrate.
    pub fn total_bitrate(&self) -> u64 {
        self.video_bitrate + self.audio_bitrate
    }

    /// Expected output size in bytes at the planned bitrates.
    pub fn estimated_size_bytes(&self) -> u64 {
        estimate_size(self.total_bitrate(), self.duration)
    }

    /// Required fields with no non-blank value in `custom_metadata`.
    pub fn missing_metadata(&self) -> Vec<&str> {
        self.required_metadata
            .iter()
            .filter(|field| {
                self.custom_metadata
                    .get(field.as_str())
                    .map_or(true, |value| value.trim().is_empty())
            })
            .map(String::as_str)
            .collect()
    }

    /// Output file name for a stem, with the container's extension.
    pub fn file_name(&self, stem: &str) -> String {
        format!("{stem}.{}", self.container.extension())
    }
}

/// Bytes produced by `bitrate` bps over `duration`.
pub(crate) fn estimate_size(bitrate: u64, duration: MediaTime) -> u64 {
    let micros = duration.as_micros().max(0) as u128;
    let bytes = bitrate as u128 * micros / (8 * MediaTime::MICROS_PER_SECOND as u128);
    u64::try_from(bytes).unwrap_or(u64::MAX)
}

/// Why a timeline cannot be exported to a platform.
///
/// Only the first failing check is reported, in a fixed order: emptiness,
/// duration, resolution, codec, file size.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    #[error("timeline has no clips")]
    EmptyTimeline,

    #[error("timeline ({measured}) exceeds platform limit ({limit})")]
    DurationTooLong {
        measured: MediaTime,
        limit: MediaTime,
    },

    #[error("timeline ({measured}) is shorter than platform minimum ({limit})")]
    DurationTooShort {
        measured: MediaTime,
        limit: MediaTime,
    },

    #[error("{platform} supports no resolution for a {measured} source")]
    NoCompatibleResolution {
        measured: Resolution,
        platform: Platform,
    },

    #[error("{platform} accepts no codec the encoder can produce in a supported container")]
    NoCompatibleCodec { platform: Platform },

    #[error("estimated size of {estimated} bytes exceeds platform limit of {limit} bytes")]
    FileSizeTooLarge { estimated: u64, limit: u64 },
}
