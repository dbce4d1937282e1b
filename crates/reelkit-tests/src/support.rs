//! Shared fixtures for the integration tests.

use reelkit_core::{FrameRate, InMemoryCatalog, MediaItem, MediaTime, Resolution};
use reelkit_export::{PlatformProfile, PlatformRegistry};
use reelkit_timeline::{ClipId, Timeline, TrackId, TrackKind};
use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once, honoring `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn secs(s: i64) -> MediaTime {
    MediaTime::from_secs(s)
}

/// Catalog with landscape, portrait and audio sources.
pub fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::new()
        .with(MediaItem::video("landscape", secs(120), Resolution::FHD, FrameRate::FPS_30))
        .with(MediaItem::video("long_take", secs(600), Resolution::FHD, FrameRate::FPS_30))
        .with(MediaItem::video(
            "portrait",
            secs(120),
            Resolution::FHD_PORTRAIT,
            FrameRate::FPS_30,
        ))
        .with(MediaItem::video("broll", secs(20), Resolution::HD, FrameRate::FPS_24))
        .with(MediaItem::audio("music", secs(300)))
}

/// One video track holding one clip of `media` trimmed to `[0, length)`.
pub fn single_clip(
    catalog: &InMemoryCatalog,
    media: &str,
    length: i64,
) -> (Timeline, TrackId, ClipId) {
    let mut timeline = Timeline::new("integration");
    let track = timeline.add_track(TrackKind::Video);
    let clip = timeline
        .place_clip(catalog, track, media.into(), secs(0), secs(0), secs(length))
        .unwrap();
    (timeline, track, clip)
}

/// A 60-second-max profile without speed adjustment.
pub fn short_form_profile() -> PlatformProfile {
    let mut profile = PlatformRegistry::builtin()
        .profile("youtube_shorts")
        .unwrap()
        .clone();
    profile.allow_speed_adjust = false;
    profile
}
