//! Codecs and containers an export plan can name.
//!
//! The plan only names them; encoding itself is done by an external
//! transcoder, which gets the FFmpeg encoder names from here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use reelkit_core::ReelkitError;

// ── Video ───────────────────────────────────────────────────────

/// Video codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    H264,
    H265,
    Vp8,
    Vp9,
    Av1,
    ProRes,
}

impl VideoCodec {
    /// FFmpeg encoder name.
    pub fn ffmpeg_encoder(self) -> &'static str {
        match self {
            Self::H264 => "libx264",
            Self::H265 => "libx265",
            Self::Vp8 => "libvpx",
            Self::Vp9 => "libvpx-vp9",
            Self::Av1 => "libaom-av1",
            Self::ProRes => "prores_ks",
        }
    }

    /// Name as platforms spell it ("H.264", "VP9").
    pub fn display_name(self) -> &'static str {
        match self {
            Self::H264 => "H.264",
            Self::H265 => "H.265",
            Self::Vp8 => "VP8",
            Self::Vp9 => "VP9",
            Self::Av1 => "AV1",
            Self::ProRes => "ProRes",
        }
    }
}

impl fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for VideoCodec {
    type Err = ReelkitError;

    /// Accepts display names and common aliases, ignoring case and dots.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '.' | '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "h264" | "avc" | "x264" => Ok(Self::H264),
            "h265" | "hevc" | "x265" => Ok(Self::H265),
            "vp8" => Ok(Self::Vp8),
            "vp9" => Ok(Self::Vp9),
            "av1" => Ok(Self::Av1),
            "prores" => Ok(Self::ProRes),
            _ => Err(ReelkitError::InvalidParameter(format!(
                "unknown video codec {s:?}"
            ))),
        }
    }
}

// ── Audio ───────────────────────────────────────────────────────

/// Audio codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    Aac,
    Opus,
    Pcm,
}

impl AudioCodec {
    /// FFmpeg encoder name.
    pub fn ffmpeg_encoder(self) -> &'static str {
        match self {
            Self::Aac => "aac",
            Self::Opus => "libopus",
            Self::Pcm => "pcm_s16le",
        }
    }
}

// ── Containers ──────────────────────────────────────────────────

/// Output container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    Mp4,
    Mov,
    WebM,
    Flv,
}

impl Container {
    /// File extension for this container.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Mov => "mov",
            Self::WebM => "webm",
            Self::Flv => "flv",
        }
    }

    /// Whether the container can carry the given video codec.
    pub fn supports(self, codec: VideoCodec) -> bool {
        use VideoCodec::*;
        match self {
            Self::Mp4 => matches!(codec, H264 | H265 | Vp9 | Av1),
            Self::Mov => matches!(codec, H264 | H265 | ProRes),
            Self::WebM => matches!(codec, Vp8 | Vp9 | Av1),
            Self::Flv => matches!(codec, H264),
        }
    }

    /// Audio codec paired with this container.
    pub fn audio_codec(self) -> AudioCodec {
        match self {
            Self::WebM => AudioCodec::Opus,
            Self::Mp4 | Self::Mov | Self::Flv => AudioCodec::Aac,
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_names() {
        assert_eq!(VideoCodec::H264.ffmpeg_encoder(), "libx264");
        assert_eq!(VideoCodec::Vp9.ffmpeg_encoder(), "libvpx-vp9");
        assert_eq!(AudioCodec::Opus.ffmpeg_encoder(), "libopus");
    }

    #[test]
    fn test_parse_codec_aliases() {
        assert_eq!("H.264".parse::<VideoCodec>().unwrap(), VideoCodec::H264);
        assert_eq!("hevc".parse::<VideoCodec>().unwrap(), VideoCodec::H265);
        assert_eq!("VP9".parse::<VideoCodec>().unwrap(), VideoCodec::Vp9);
        assert!("theora".parse::<VideoCodec>().is_err());
    }

    #[test]
    fn test_container_compatibility() {
        assert!(Container::Mp4.supports(VideoCodec::H264));
        assert!(!Container::WebM.supports(VideoCodec::H264));
        assert!(Container::WebM.supports(VideoCodec::Vp8));
        assert!(!Container::Flv.supports(VideoCodec::H265));
        assert_eq!(Container::WebM.audio_codec(), AudioCodec::Opus);
        assert_eq!(Container::Mov.audio_codec(), AudioCodec::Aac);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&VideoCodec::H265).unwrap(), "\"h265\"");
        assert_eq!(serde_json::to_string(&Container::WebM).unwrap(), "\"webm\"");
    }
}
