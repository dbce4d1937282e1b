//! End-to-end scenarios: build a timeline with edits, then resolve exports.

use reelkit_core::{MediaTime, PixelRect, Resolution};
use reelkit_export::{AspectHandling, ExportResolver, Platform, PlatformRegistry, Rejection};
use reelkit_timeline::{EditError, Timeline, TrackKind};

use crate::support::{catalog, init_tracing, secs, short_form_profile, single_clip};

// ── Timeline building ──────────────────────────────────────────

#[test]
fn empty_timeline_is_rejected_everywhere() {
    init_tracing();
    let catalog = catalog();
    let resolver = ExportResolver::default();

    let no_tracks = Timeline::new("empty");
    let mut empty_tracks = Timeline::new("tracks only");
    empty_tracks.add_track(TrackKind::Video);
    empty_tracks.add_track(TrackKind::Audio);

    for profile in PlatformRegistry::builtin().iter() {
        for timeline in [&no_tracks, &empty_tracks] {
            assert_eq!(
                resolver.resolve(timeline, &catalog, profile),
                Err(Rejection::EmptyTimeline),
                "{}",
                profile.platform
            );
        }
    }
}

#[test]
fn trimmed_clip_sets_duration() {
    let catalog = catalog();
    let (timeline, _, clip) = single_clip(&catalog, "landscape", 90);
    assert_eq!(timeline.total_duration(), secs(90));
    let clip = timeline.clip(clip).unwrap();
    assert_eq!((clip.in_point, clip.out_point), (secs(0), secs(90)));
}

#[test]
fn overlapping_placement_is_refused() {
    let catalog = catalog();
    let (mut timeline, track, _) = single_clip(&catalog, "landscape", 90);
    let err = timeline
        .place_clip(&catalog, track, "broll".into(), secs(45), secs(0), secs(10))
        .unwrap_err();
    assert!(matches!(err, EditError::Overlap { .. }));
    assert_eq!(
        err.to_string().split(" (").next(),
        Some("clip overlaps an existing clip on this track")
    );
    assert_eq!(timeline.track(track).unwrap().clip_count(), 1);
}

#[test]
fn split_produces_contiguous_halves() {
    let catalog = catalog();
    let (mut timeline, track, clip) = single_clip(&catalog, "landscape", 90);
    let (left, right) = timeline.split_clip(clip, secs(30)).unwrap();
    let left = timeline.clip(left).unwrap();
    let right = timeline.clip(right).unwrap();
    assert_eq!(left.duration(), secs(30));
    assert_eq!(right.duration(), secs(60));
    assert_eq!(left.out_point, right.in_point);
    assert_eq!(timeline.track(track).unwrap().clip_count(), 2);
    assert_eq!(timeline.total_duration(), secs(90));
}

// ── Export resolution ──────────────────────────────────────────

#[test]
fn too_long_without_speed_adjust_is_rejected() {
    init_tracing();
    let catalog = catalog();
    let (timeline, _, _) = single_clip(&catalog, "long_take", 200);
    let result = ExportResolver::default().resolve(&timeline, &catalog, &short_form_profile());
    assert_eq!(
        result,
        Err(Rejection::DurationTooLong {
            measured: secs(200),
            limit: secs(60),
        })
    );
}

#[test]
fn landscape_onto_portrait_only_platform() {
    init_tracing();
    let catalog = catalog();
    let (timeline, _, _) = single_clip(&catalog, "landscape", 30);
    let registry = PlatformRegistry::builtin();
    let tiktok = registry.get(Platform::TikTok).unwrap();
    let resolver = ExportResolver::default();

    let plan = resolver.resolve(&timeline, &catalog, tiktok).unwrap();
    assert_eq!(plan.resolution, Resolution::FHD_PORTRAIT);
    assert_eq!(plan.source_resolution, Resolution::FHD);
    assert!(!plan.aspect_handling.is_native());
    assert_eq!(
        plan.aspect_handling,
        AspectHandling::Letterbox {
            content: PixelRect::new(0, 656, 1080, 607),
        }
    );
    assert_eq!(plan.duration, secs(30));

    // Same inputs, same answer.
    assert_eq!(resolver.resolve(&timeline, &catalog, tiktok), Ok(plan));
}

#[test]
fn duration_is_reported_before_resolution() {
    let catalog = catalog();
    let (timeline, _, _) = single_clip(&catalog, "long_take", 200);
    let mut profile = short_form_profile();
    profile.resolutions.clear();
    let result = ExportResolver::default().resolve(&timeline, &catalog, &profile);
    assert!(matches!(result, Err(Rejection::DurationTooLong { .. })));

    // Once it fits, the resolution problem surfaces.
    let (timeline, _, _) = single_clip(&catalog, "landscape", 30);
    let result = ExportResolver::default().resolve(&timeline, &catalog, &profile);
    assert!(matches!(
        result,
        Err(Rejection::NoCompatibleResolution { .. })
    ));
}

#[test]
fn resolution_is_reported_before_codec() {
    let catalog = catalog();
    let (timeline, _, _) = single_clip(&catalog, "landscape", 30);
    let mut profile = short_form_profile();
    profile.resolutions.clear();
    profile.video_codecs.clear();
    let result = ExportResolver::default().resolve(&timeline, &catalog, &profile);
    assert!(matches!(
        result,
        Err(Rejection::NoCompatibleResolution { .. })
    ));

    let mut profile = short_form_profile();
    profile.video_codecs.clear();
    assert_eq!(
        ExportResolver::default().resolve(&timeline, &catalog, &profile),
        Err(Rejection::NoCompatibleCodec {
            platform: Platform::YouTubeShorts
        })
    );
}

#[test]
fn multi_track_uses_largest_first_clip() {
    let catalog = catalog();
    let mut timeline = Timeline::new("multicam");
    let small = timeline.add_track(TrackKind::Video);
    let large = timeline.add_track(TrackKind::Video);
    let music = timeline.add_track(TrackKind::Audio);
    timeline
        .place_clip(&catalog, small, "broll".into(), secs(0), secs(0), secs(10))
        .unwrap();
    timeline
        .place_clip(&catalog, large, "landscape".into(), secs(5), secs(0), secs(20))
        .unwrap();
    timeline
        .place_clip(&catalog, music, "music".into(), secs(0), secs(0), secs(40))
        .unwrap();

    let registry = PlatformRegistry::builtin();
    let plan = ExportResolver::default()
        .resolve(&timeline, &catalog, registry.get(Platform::YouTube).unwrap())
        .unwrap();
    assert_eq!(plan.source_resolution, Resolution::FHD);
    assert_eq!(plan.resolution, Resolution::FHD);
    assert_eq!(plan.duration, secs(40));
    assert!(plan.audio_codec.is_some());
}

#[test]
fn plan_carries_platform_metadata() {
    let catalog = catalog();
    let (timeline, _, _) = single_clip(&catalog, "portrait", 45);
    let registry = PlatformRegistry::builtin();
    let plan = ExportResolver::default()
        .resolve(&timeline, &catalog, registry.get(Platform::Pinterest).unwrap())
        .unwrap();
    assert_eq!(plan.platform, Platform::Pinterest);
    assert_eq!(plan.required_metadata, vec!["title", "description"]);
    assert_eq!(plan.resolution, Resolution::FHD_PORTRAIT);
    assert!(plan.aspect_handling.is_native());
    assert_eq!(plan.total_frames(), 45 * 30);
    assert_eq!(plan.file_name("pin"), "pin.mp4");
    assert!(plan.duration > MediaTime::ZERO);
}
