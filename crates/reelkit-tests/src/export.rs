//! Export resolution across the built-in platform table.

use num_rational::Rational64;
use reelkit_core::{AspectRatio, Resolution};
use reelkit_export::{
    AspectHandling, ExportOptions, ExportQuality, ExportResolver, GlobalAdjustment, Platform,
    PlatformRegistry, Rejection, ResolverConfig, Watermark, WatermarkPosition,
};

use crate::support::{catalog, init_tracing, secs, single_clip};

#[test]
fn every_platform_accepts_a_short_landscape_clip() {
    init_tracing();
    let catalog = catalog();
    let (timeline, _, _) = single_clip(&catalog, "landscape", 30);
    let resolver = ExportResolver::default();

    for profile in PlatformRegistry::builtin().iter() {
        let plan = resolver
            .resolve(&timeline, &catalog, profile)
            .unwrap_or_else(|r| panic!("{}: {r}", profile.platform));

        assert!(profile.resolutions.contains(&plan.resolution));
        assert!(profile.video_codecs.contains(&plan.video_codec));
        assert!(profile.containers.contains(&plan.container));
        assert!(plan.container.supports(plan.video_codec));
        assert!(plan.video_bitrate <= profile.max_bitrate);
        assert!(plan.frame_rate.as_ratio() <= profile.max_frame_rate.as_ratio());
        if let Some(limit) = profile.max_file_size {
            assert!(plan.estimated_size_bytes() <= limit);
        }
        let ratio = plan.resolution.aspect_ratio();
        assert!(profile.aspect_ratios.is_empty() || profile.aspect_ratios.contains(&ratio));
    }
}

#[test]
fn crop_rect_stays_inside_source() {
    let catalog = catalog();
    let resolver = ExportResolver::new(ResolverConfig {
        min_crop_coverage: 0.0,
        ..ResolverConfig::default()
    });
    for media in ["landscape", "portrait", "broll"] {
        let (timeline, _, _) = single_clip(&catalog, media, 10);
        for profile in PlatformRegistry::builtin().iter() {
            let Ok(plan) = resolver.resolve(&timeline, &catalog, profile) else {
                continue;
            };
            if let AspectHandling::Crop { rect } = plan.aspect_handling {
                let source = plan.source_resolution;
                assert!(rect.right() <= source.width && rect.bottom() <= source.height);
                let cropped = rect.size().aspect_ratio().as_f64();
                assert!((cropped - plan.resolution.aspect_ratio().as_f64()).abs() < 0.01);
            }
        }
    }
}

#[test]
fn letterbox_content_stays_inside_output() {
    let catalog = catalog();
    let (timeline, _, _) = single_clip(&catalog, "portrait", 30);
    let registry = PlatformRegistry::builtin();
    let plan = ExportResolver::default()
        .resolve(&timeline, &catalog, registry.get(Platform::Twitch).unwrap())
        .unwrap();
    let AspectHandling::Letterbox { content } = plan.aspect_handling else {
        panic!("expected letterbox, got {:?}", plan.aspect_handling);
    };
    assert_eq!(plan.resolution.aspect_ratio(), AspectRatio::R16_9);
    assert!(content.right() <= plan.resolution.width);
    assert_eq!(content.height, plan.resolution.height);
}

#[test]
fn instagram_speeds_up_long_reel() {
    let catalog = catalog();
    let (timeline, _, _) = single_clip(&catalog, "portrait", 120);
    let registry = PlatformRegistry::builtin();
    let plan = ExportResolver::default()
        .resolve(&timeline, &catalog, registry.get(Platform::Instagram).unwrap())
        .unwrap();
    assert_eq!(plan.duration, secs(90));
    assert_eq!(plan.source_duration, secs(120));
    assert_eq!(
        plan.adjustments,
        vec![GlobalAdjustment::SpeedChange {
            factor: Rational64::new(4, 3)
        }]
    );
}

#[test]
fn tiktok_rejects_too_short() {
    let catalog = catalog();
    let (timeline, _, _) = single_clip(&catalog, "portrait", 2);
    let registry = PlatformRegistry::builtin();
    let rejection = ExportResolver::default()
        .resolve(&timeline, &catalog, registry.get(Platform::TikTok).unwrap())
        .unwrap_err();
    assert_eq!(
        rejection.to_string(),
        "timeline (2.000s) is shorter than platform minimum (3.000s)"
    );
}

#[test]
fn overridden_table_changes_limits() {
    let registry = PlatformRegistry::builtin();
    let mut table: serde_json::Value = serde_json::from_slice(&registry.to_json().unwrap()).unwrap();
    for profile in table["profiles"].as_array_mut().unwrap() {
        if profile["platform"] == "tiktok" {
            profile["max_duration"] = serde_json::json!(20_000_000);
        }
    }
    let custom = PlatformRegistry::from_json(&serde_json::to_vec(&table).unwrap()).unwrap();

    let catalog = catalog();
    let (timeline, _, _) = single_clip(&catalog, "portrait", 30);
    let result = ExportResolver::default().resolve(
        &timeline,
        &catalog,
        custom.profile("tiktok").unwrap(),
    );
    assert_eq!(
        result,
        Err(Rejection::DurationTooLong {
            measured: secs(30),
            limit: secs(20),
        })
    );
}

#[test]
fn audio_only_timeline_uses_first_resolution() {
    let catalog = catalog();
    let mut timeline = reelkit_timeline::Timeline::new("podcast");
    let track = timeline.add_track(reelkit_timeline::TrackKind::Audio);
    timeline
        .place_clip(&catalog, track, "music".into(), secs(0), secs(0), secs(30))
        .unwrap();
    let registry = PlatformRegistry::builtin();
    let plan = ExportResolver::default()
        .resolve(&timeline, &catalog, registry.get(Platform::YouTube).unwrap())
        .unwrap();
    assert_eq!(plan.resolution, Resolution::UHD_4K);
    assert!(plan.aspect_handling.is_native());
    assert!(plan.audio_codec.is_some());
}

#[test]
fn watermark_and_metadata_reach_every_plan() {
    let catalog = catalog();
    let (timeline, _, _) = single_clip(&catalog, "landscape", 30);
    let resolver = ExportResolver::new(ResolverConfig {
        quality: ExportQuality::Medium,
        ..ResolverConfig::default()
    });
    let options = ExportOptions::default()
        .with_watermark(Watermark::new("brand.png", WatermarkPosition::BottomLeft).with_scale(4.0))
        .with_metadata("title", "Behind the scenes")
        .with_metadata("caption", "Day one");

    for profile in PlatformRegistry::builtin().iter() {
        let plan = resolver
            .resolve_with(&timeline, &catalog, profile, &options)
            .unwrap_or_else(|r| panic!("{}: {r}", profile.platform));
        let watermark = plan.watermark.as_ref().unwrap();
        assert_eq!(watermark.scale, 1.0);
        let rect = watermark.rect(plan.resolution, AspectRatio::R16_9);
        assert!(rect.right() <= plan.resolution.width);
        assert!(rect.bottom() <= plan.resolution.height);
        assert!(plan
            .missing_metadata()
            .iter()
            .all(|field| !options.custom_metadata.contains_key(*field)));
    }
}
