//! Publishing platforms and their capability profiles.
//!
//! The registry is loaded once at startup (built in, or from a JSON table)
//! and is immutable afterwards. A malformed table is a configuration bug and
//! fails loudly with [`ReelkitError::Config`].

use num_rational::Rational64;
use reelkit_core::{AspectRatio, FrameRate, MediaTime, ReelkitError, Resolution, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::codec::{Container, VideoCodec};

/// Schema version of the profile table format.
pub const PROFILE_TABLE_VERSION: u32 = 1;

const MB: u64 = 1024 * 1024;
const GB: u64 = 1024 * MB;

/// Target publishing platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "youtube")]
    YouTube,
    #[serde(rename = "youtube_shorts")]
    YouTubeShorts,
    #[serde(rename = "tiktok")]
    TikTok,
    #[serde(rename = "instagram")]
    Instagram,
    #[serde(rename = "facebook")]
    Facebook,
    #[serde(rename = "twitter")]
    Twitter,
    #[serde(rename = "linkedin")]
    LinkedIn,
    #[serde(rename = "snapchat")]
    Snapchat,
    #[serde(rename = "pinterest")]
    Pinterest,
    #[serde(rename = "reddit")]
    Reddit,
    #[serde(rename = "twitch")]
    Twitch,
}

impl Platform {
    pub const ALL: [Platform; 11] = [
        Self::YouTube,
        Self::YouTubeShorts,
        Self::TikTok,
        Self::Instagram,
        Self::Facebook,
        Self::Twitter,
        Self::LinkedIn,
        Self::Snapchat,
        Self::Pinterest,
        Self::Reddit,
        Self::Twitch,
    ];

    /// Stable identifier used in profile tables and APIs.
    pub fn id(self) -> &'static str {
        match self {
            Self::YouTube => "youtube",
            Self::YouTubeShorts => "youtube_shorts",
            Self::TikTok => "tiktok",
            Self::Instagram => "instagram",
            Self::Facebook => "facebook",
            Self::Twitter => "twitter",
            Self::LinkedIn => "linkedin",
            Self::Snapchat => "snapchat",
            Self::Pinterest => "pinterest",
            Self::Reddit => "reddit",
            Self::Twitch => "twitch",
        }
    }

    /// Display name for UI.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::YouTube => "YouTube",
            Self::YouTubeShorts => "YouTube Shorts",
            Self::TikTok => "TikTok",
            Self::Instagram => "Instagram",
            Self::Facebook => "Facebook",
            Self::Twitter => "X (Twitter)",
            Self::LinkedIn => "LinkedIn",
            Self::Snapchat => "Snapchat",
            Self::Pinterest => "Pinterest",
            Self::Reddit => "Reddit",
            Self::Twitch => "Twitch",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Platform {
    type Err = ReelkitError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        let alias = match key.as_str() {
            "x" => "twitter",
            "shorts" => "youtube_shorts",
            "reels" => "instagram",
            other => other,
        };
        Self::ALL
            .into_iter()
            .find(|p| p.id() == alias)
            .ok_or_else(|| ReelkitError::UnknownPlatform(s.to_string()))
    }
}

/// What a platform accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformProfile {
    pub platform: Platform,
    pub min_duration: MediaTime,
    pub max_duration: MediaTime,
    /// Upload size cap in bytes; `None` = unlimited
    pub max_file_size: Option<u64>,
    /// Accepted containers, preferred first
    pub containers: Vec<Container>,
    /// Accepted video codecs, preferred first
    pub video_codecs: Vec<VideoCodec>,
    /// Accepted output sizes
    pub resolutions: Vec<Resolution>,
    /// Accepted aspect ratios; empty = any ratio of a listed resolution
    pub aspect_ratios: Vec<AspectRatio>,
    /// Video bitrate ceiling in bits per second
    pub max_bitrate: u64,
    pub max_frame_rate: FrameRate,
    /// Whether a too-long timeline may be sped up to fit
    pub allow_speed_adjust: bool,
    /// Largest speed-up allowed when `allow_speed_adjust` is set
    pub max_speed_factor: Rational64,
    /// Metadata fields the platform requires at publish time
    pub required_metadata: Vec<String>,
}

impl PlatformProfile {
    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(ReelkitError::Config(format!("{}: {msg}", self.platform)));
        if self.min_duration.is_negative() || self.min_duration > self.max_duration {
            return fail(format!(
                "duration bounds {}..{} are inverted",
                self.min_duration, self.max_duration
            ));
        }
        if self.max_bitrate == 0 {
            return fail("max_bitrate must be positive".into());
        }
        if self.max_frame_rate.numerator == 0 || self.max_frame_rate.denominator == 0 {
            return fail("max_frame_rate must be positive".into());
        }
        if *self.max_speed_factor.denom() <= 0 || self.max_speed_factor < Rational64::from_integer(1)
        {
            return fail("max_speed_factor must be at least 1".into());
        }
        if let Some(r) = self.resolutions.iter().find(|r| r.is_empty()) {
            return fail(format!("resolution {r} is empty"));
        }
        if self.max_file_size == Some(0) {
            return fail("max_file_size must be positive".into());
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct ProfileTable {
    version: u32,
    profiles: Vec<PlatformProfile>,
}

/// Immutable set of platform profiles.
#[derive(Debug, Clone)]
pub struct PlatformRegistry {
    profiles: BTreeMap<Platform, PlatformProfile>,
}

impl PlatformRegistry {
    /// The built-in profile table.
    pub fn builtin() -> Self {
        let profiles = builtin_profiles()
            .into_iter()
            .map(|p| (p.platform, p))
            .collect();
        Self { profiles }
    }

    /// Load a profile table from JSON, validating every entry.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let table: ProfileTable = serde_json::from_slice(data)
            .map_err(|e| ReelkitError::Config(format!("invalid profile table: {e}")))?;
        if table.version != PROFILE_TABLE_VERSION {
            return Err(ReelkitError::Config(format!(
                "unsupported profile table version {}",
                table.version
            )));
        }
        let mut profiles = BTreeMap::new();
        for profile in table.profiles {
            profile.validate()?;
            let platform = profile.platform;
            if profiles.insert(platform, profile).is_some() {
                return Err(ReelkitError::Config(format!(
                    "platform {platform} listed twice"
                )));
            }
        }
        tracing::info!(count = profiles.len(), "loaded platform profile table");
        Ok(Self { profiles })
    }

    /// Serialize the table in the format `from_json` reads.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        let table = ProfileTable {
            version: PROFILE_TABLE_VERSION,
            profiles: self.profiles.values().cloned().collect(),
        };
        serde_json::to_vec_pretty(&table)
            .map_err(|e| ReelkitError::Serialization(format!("failed to write profile table: {e}")))
    }

    /// Profile for a platform, if the table has one.
    pub fn get(&self, platform: Platform) -> Option<&PlatformProfile> {
        self.profiles.get(&platform)
    }

    /// Look up by string id. Unknown ids are a programmer error.
    pub fn profile(&self, id: &str) -> Result<&PlatformProfile> {
        let platform: Platform = id.parse()?;
        self.get(platform)
            .ok_or_else(|| ReelkitError::UnknownPlatform(id.to_string()))
    }

    /// All profiles, in platform order.
    pub fn iter(&self) -> impl Iterator<Item = &PlatformProfile> {
        self.profiles.values()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

// ── Built-in table ──────────────────────────────────────────────

fn minutes(m: i64) -> MediaTime {
    MediaTime::from_secs(m * 60)
}

fn metadata(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| f.to_string()).collect()
}

#[allow(clippy::too_many_arguments)]
fn profile(
    platform: Platform,
    (min_duration, max_duration): (MediaTime, MediaTime),
    max_file_size: Option<u64>,
    containers: &[Container],
    video_codecs: &[VideoCodec],
    resolutions: &[Resolution],
    aspect_ratios: &[AspectRatio],
    max_bitrate: u64,
    max_frame_rate: FrameRate,
    required_metadata: &[&str],
) -> PlatformProfile {
    PlatformProfile {
        platform,
        min_duration,
        max_duration,
        max_file_size,
        containers: containers.to_vec(),
        video_codecs: video_codecs.to_vec(),
        resolutions: resolutions.to_vec(),
        aspect_ratios: aspect_ratios.to_vec(),
        max_bitrate,
        max_frame_rate,
        allow_speed_adjust: false,
        max_speed_factor: Rational64::from_integer(1),
        required_metadata: metadata(required_metadata),
    }
}

fn with_speed_adjust(mut profile: PlatformProfile, factor: Rational64) -> PlatformProfile {
    profile.allow_speed_adjust = true;
    profile.max_speed_factor = factor;
    profile
}

fn builtin_profiles() -> Vec<PlatformProfile> {
    use Container::*;
    use VideoCodec::*;

    let portrait = [Resolution::FHD_PORTRAIT];
    let landscape = [Resolution::FHD, Resolution::HD];

    vec![
        profile(
            Platform::YouTube,
            (MediaTime::ZERO, minutes(12 * 60)),
            Some(256 * GB),
            &[Mp4, Mov, WebM],
            &[H264, H265, Vp8, Vp9, Av1],
            &[
                Resolution::UHD_4K,
                Resolution::QHD,
                Resolution::FHD,
                Resolution::HD,
                Resolution::SD,
            ],
            &[AspectRatio::R16_9, AspectRatio::R4_3, AspectRatio::R21_9],
            45_000_000,
            FrameRate::FPS_60,
            &["title", "description"],
        ),
        profile(
            Platform::YouTubeShorts,
            (MediaTime::ZERO, MediaTime::from_secs(60)),
            Some(256 * GB),
            &[Mp4, Mov, WebM],
            &[H264, H265, Vp9, Av1],
            &portrait,
            &[AspectRatio::R9_16],
            10_000_000,
            FrameRate::FPS_60,
            &["title"],
        ),
        profile(
            Platform::TikTok,
            (MediaTime::from_secs(3), minutes(10)),
            Some(287 * MB),
            &[Mp4, Mov],
            &[H264],
            &portrait,
            &[AspectRatio::R9_16],
            6_000_000,
            FrameRate::FPS_60,
            &["caption"],
        ),
        with_speed_adjust(
            profile(
                Platform::Instagram,
                (MediaTime::from_secs(3), MediaTime::from_secs(90)),
                Some(4 * GB),
                &[Mp4, Mov],
                &[H264],
                &[Resolution::FHD_PORTRAIT, Resolution::SQUARE_1080],
                &[AspectRatio::R9_16, AspectRatio::R1_1, AspectRatio::R4_5],
                5_000_000,
                FrameRate::FPS_30,
                &["caption"],
            ),
            Rational64::new(3, 2),
        ),
        profile(
            Platform::Facebook,
            (MediaTime::from_secs(1), minutes(240)),
            Some(10 * GB),
            &[Mp4, Mov],
            &[H264],
            &landscape,
            &[AspectRatio::R16_9, AspectRatio::R9_16, AspectRatio::R1_1],
            8_000_000,
            FrameRate::FPS_60,
            &["title"],
        ),
        profile(
            Platform::Twitter,
            (MediaTime::from_millis(500), MediaTime::from_secs(140)),
            Some(512 * MB),
            &[Mp4, Mov],
            &[H264],
            &landscape,
            &[AspectRatio::R16_9, AspectRatio::R1_1],
            25_000_000,
            FrameRate::FPS_60,
            &["tweet"],
        ),
        profile(
            Platform::LinkedIn,
            (MediaTime::from_secs(3), minutes(10)),
            Some(5 * GB),
            &[Mp4],
            &[H264],
            &landscape,
            &[AspectRatio::R16_9, AspectRatio::R1_1],
            10_000_000,
            FrameRate::FPS_60,
            &["title", "description"],
        ),
        with_speed_adjust(
            profile(
                Platform::Snapchat,
                (MediaTime::from_secs(3), MediaTime::from_secs(60)),
                Some(GB),
                &[Mp4, Mov],
                &[H264],
                &portrait,
                &[AspectRatio::R9_16],
                8_000_000,
                FrameRate::FPS_30,
                &[],
            ),
            Rational64::new(3, 2),
        ),
        profile(
            Platform::Pinterest,
            (MediaTime::from_secs(4), minutes(15)),
            Some(2 * GB),
            &[Mp4, Mov],
            &[H264],
            &[
                Resolution::FHD_PORTRAIT,
                Resolution::SQUARE_1080,
                Resolution::HD_PORTRAIT,
            ],
            &[AspectRatio::R9_16, AspectRatio::R1_1, AspectRatio::R2_3],
            8_000_000,
            FrameRate::FPS_30,
            &["title", "description"],
        ),
        profile(
            Platform::Reddit,
            (MediaTime::ZERO, minutes(15)),
            Some(GB),
            &[Mp4, Mov],
            &[H264],
            &landscape,
            &[AspectRatio::R16_9, AspectRatio::R9_16, AspectRatio::R1_1],
            10_000_000,
            FrameRate::FPS_60,
            &["title"],
        ),
        profile(
            Platform::Twitch,
            (MediaTime::ZERO, minutes(48 * 60)),
            None,
            &[Mp4, Mov, Flv],
            &[H264, H265],
            &[Resolution::UHD_4K, Resolution::FHD, Resolution::HD],
            &[AspectRatio::R16_9],
            8_000_000,
            FrameRate::FPS_60,
            &["title", "category"],
        ),
    ]
}
