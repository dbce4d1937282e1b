//! Benchmarks for export resolution and clip placement.
//!
//! Run with: cargo bench -p reelkit-export

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use reelkit_core::{FrameRate, InMemoryCatalog, MediaItem, MediaTime, Resolution};
use reelkit_export::{ExportResolver, Platform, PlatformRegistry};
use reelkit_timeline::{Timeline, TrackKind};

const CLIPS_PER_TRACK: i64 = 500;

fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::new()
        .with(MediaItem::video("cam", MediaTime::from_secs(10), Resolution::FHD, FrameRate::FPS_30))
        .with(MediaItem::audio("music", MediaTime::from_secs(10)))
}

/// A timeline with a few tracks of back-to-back one-second clips.
fn large_timeline(catalog: &InMemoryCatalog) -> Timeline {
    let mut timeline = Timeline::new("bench");
    for kind in [TrackKind::Video, TrackKind::Video, TrackKind::Audio] {
        let track = timeline.add_track(kind);
        let media = if kind == TrackKind::Audio { "music" } else { "cam" };
        for i in 0..CLIPS_PER_TRACK {
            timeline
                .place_clip(
                    catalog,
                    track,
                    media.into(),
                    MediaTime::from_secs(i),
                    MediaTime::ZERO,
                    MediaTime::from_secs(1),
                )
                .expect("clips are placed back to back");
        }
    }
    timeline
}

fn bench_resolve(c: &mut Criterion) {
    let catalog = catalog();
    let timeline = large_timeline(&catalog);
    let registry = PlatformRegistry::builtin();
    let resolver = ExportResolver::default();

    for platform in [Platform::YouTube, Platform::TikTok, Platform::Instagram] {
        let profile = registry.get(platform).expect("builtin profile");
        c.bench_function(&format!("resolve_{}_1500_clips", platform.id()), |bencher| {
            bencher.iter(|| resolver.resolve(black_box(&timeline), &catalog, black_box(profile)));
        });
    }
}

fn bench_place_clip(c: &mut Criterion) {
    let catalog = catalog();
    let timeline = large_timeline(&catalog);
    let track = timeline.tracks()[0].id;

    // Worst case for the slot check: append after the last clip.
    c.bench_function("place_clip_after_500", |bencher| {
        bencher.iter(|| {
            let mut scratch = timeline.clone();
            scratch
                .place_clip(
                    &catalog,
                    track,
                    "cam".into(),
                    black_box(MediaTime::from_secs(CLIPS_PER_TRACK)),
                    MediaTime::ZERO,
                    MediaTime::from_secs(1),
                )
                .map(|_| ())
        });
    });

    c.bench_function("place_clip_overlap_rejected", |bencher| {
        let mut scratch = timeline.clone();
        bencher.iter(|| {
            scratch
                .place_clip(
                    &catalog,
                    track,
                    "cam".into(),
                    black_box(MediaTime::from_millis(250_500)),
                    MediaTime::ZERO,
                    MediaTime::from_secs(1),
                )
                .is_err()
        });
    });
}

criterion_group!(benches, bench_resolve, bench_place_clip);
criterion_main!(benches);
