//! Resolver tuning.

use serde::{Deserialize, Serialize};

use crate::codec::VideoCodec;

/// Encode quality tier. Scales the bitrate heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportQuality {
    Low,
    Medium,
    #[default]
    High,
    Ultra,
    /// `bits_per_pixel` is taken as-is.
    Custom,
}

impl ExportQuality {
    /// Multiplier applied to `bits_per_pixel`.
    pub fn bitrate_factor(self) -> f64 {
        match self {
            Self::Low => 0.5,
            Self::Medium => 0.75,
            Self::High | Self::Custom => 1.0,
            Self::Ultra => 1.5,
        }
    }
}

/// Configuration for export resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Video codecs the downstream encoder can produce.
    pub encoder_codecs: Vec<VideoCodec>,
    /// Target bits per pixel per frame for the bitrate heuristic.
    pub bits_per_pixel: f64,
    /// Quality tier applied on top of `bits_per_pixel`.
    pub quality: ExportQuality,
    /// Smallest fraction of the source frame a crop may keep.
    /// Below this the resolver letterboxes instead.
    pub min_crop_coverage: f64,
    /// Lowest video bitrate (bps) still worth encoding when squeezing
    /// under a file-size cap.
    pub min_video_bitrate: u64,
    /// Audio bitrate (bps) for every plan.
    pub audio_bitrate: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            encoder_codecs: vec![
                VideoCodec::H264,
                VideoCodec::H265,
                VideoCodec::Vp8,
                VideoCodec::Vp9,
                VideoCodec::Av1,
            ],
            bits_per_pixel: 0.1,
            quality: ExportQuality::High,
            min_crop_coverage: 0.5,
            min_video_bitrate: 500_000,
            audio_bitrate: 128_000,
        }
    }
}

impl ResolverConfig {
    /// Whether the encoder can produce `codec`.
    pub fn encoder_supports(&self, codec: VideoCodec) -> bool {
        self.encoder_codecs.contains(&codec)
    }

    /// Bits per pixel per frame after the quality tier.
    pub fn effective_bits_per_pixel(&self) -> f64 {
        self.bits_per_pixel * self.quality.bitrate_factor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ResolverConfig =
            serde_json::from_str(r#"{ "encoder_codecs": ["h264"] }"#).unwrap();
        assert!(config.encoder_supports(VideoCodec::H264));
        assert!(!config.encoder_supports(VideoCodec::Av1));
        assert_eq!(config.min_video_bitrate, 500_000);
        assert!((config.bits_per_pixel - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.quality, ExportQuality::High);
    }

    #[test]
    fn test_quality_scales_bits_per_pixel() {
        let config: ResolverConfig = serde_json::from_str(r#"{ "quality": "low" }"#).unwrap();
        assert!((config.effective_bits_per_pixel() - 0.05).abs() < 1e-9);

        let ultra = ResolverConfig {
            quality: ExportQuality::Ultra,
            ..ResolverConfig::default()
        };
        assert!((ultra.effective_bits_per_pixel() - 0.15).abs() < 1e-9);

        let custom = ResolverConfig {
            quality: ExportQuality::Custom,
            bits_per_pixel: 0.23,
            ..ResolverConfig::default()
        };
        assert!((custom.effective_bits_per_pixel() - 0.23).abs() < 1e-9);
    }
}
